//! Object identifiers and marker symbol names.
//!
//! Marker names are built in two steps. The identifier is resolved and
//! validated first ([`ObjectId`]); only then is the [`MarkerKind`] prefix
//! attached ([`Marker`]). The token-level macros [`object_symbol!`] and
//! [`need_symbol!`] do the same on a bare identifier and yield string
//! literals, which is what assembler directives need.
//!
//! [`object_symbol!`]: crate::object_symbol
//! [`need_symbol!`]: crate::need_symbol

use core::fmt;

use thiserror::Error;

/// Name of the symbol that records a unit's debug level.
pub const DEBUG_LEVEL_SYMBOL: &str = "DEBUG_LEVEL";

#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum IdentError {
    #[error("object identifier is empty")]
    Empty,
    #[error("object identifier starts with a digit")]
    LeadingDigit,
    #[error("invalid character at byte {0} of object identifier")]
    InvalidChar(usize),
}

/// Checks that `name` can be pasted into a symbol name.
///
/// # Errors
/// Returns an error for empty names, names starting with a digit and names
/// containing anything outside `[A-Za-z0-9_]`.
pub const fn validate(name: &str) -> Result<(), IdentError> {
    let bytes = name.as_bytes();
    if bytes.is_empty() {
        return Err(IdentError::Empty);
    }
    if bytes[0].is_ascii_digit() {
        return Err(IdentError::LeadingDigit);
    }

    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if !(b.is_ascii_alphanumeric() || b == b'_') {
            return Err(IdentError::InvalidChar(i));
        }
        i += 1;
    }
    Ok(())
}

/// The build-time identity of one unit.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ObjectId(&'static str);

impl ObjectId {
    /// # Panics
    /// Panics if `name` is not a valid identifier. In a `const` or `static`
    /// initializer this stops the build.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        match validate(name) {
            Ok(()) => Self(name),
            Err(IdentError::Empty) => panic!("object identifier is empty"),
            Err(IdentError::LeadingDigit) => panic!("object identifier starts with a digit"),
            Err(IdentError::InvalidChar(_)) => {
                panic!("object identifier contains a character outside [A-Za-z0-9_]")
            }
        }
    }

    /// # Errors
    /// See [`validate`].
    pub const fn try_new(name: &'static str) -> Result<Self, IdentError> {
        match validate(name) {
            Ok(()) => Ok(Self(name)),
            Err(e) => Err(e),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }

    /// `obj_<id>`, defined by the unit itself.
    #[must_use]
    pub const fn object_marker(self) -> Marker<'static> {
        Marker {
            kind: MarkerKind::Object,
            id: self.0,
        }
    }

    /// `need_<id>`, defined by units that require this one.
    #[must_use]
    pub const fn need_marker(self) -> Marker<'static> {
        Marker {
            kind: MarkerKind::Need,
            id: self.0,
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum MarkerKind {
    Object,
    Need,
}

impl MarkerKind {
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Object => "obj_",
            Self::Need => "need_",
        }
    }
}

/// A marker symbol name: prefix plus identifier.
///
/// The lifetime lets the image scanner borrow identifiers straight out of an
/// ELF string table.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Marker<'a> {
    kind: MarkerKind,
    id: &'a str,
}

impl<'a> Marker<'a> {
    /// Splits a symbol name back into kind and identifier.
    ///
    /// Returns `None` for anything that is not a well-formed marker.
    #[must_use]
    pub fn parse(symbol: &'a str) -> Option<Self> {
        let (kind, id) = if let Some(id) = symbol.strip_prefix(MarkerKind::Object.prefix()) {
            (MarkerKind::Object, id)
        } else if let Some(id) = symbol.strip_prefix(MarkerKind::Need.prefix()) {
            (MarkerKind::Need, id)
        } else {
            return None;
        };
        validate(id).ok()?;
        Some(Self { kind, id })
    }

    #[must_use]
    pub const fn kind(&self) -> MarkerKind {
        self.kind
    }

    #[must_use]
    pub const fn id(&self) -> &'a str {
        self.id
    }

    /// The object marker this marker stands for. A need marker aliases the
    /// object marker of the same identifier.
    #[must_use]
    pub const fn target(self) -> Marker<'a> {
        Marker {
            kind: MarkerKind::Object,
            id: self.id,
        }
    }

    /// Compares against a symbol name without building the string.
    #[must_use]
    pub fn matches(&self, symbol: &str) -> bool {
        symbol.strip_prefix(self.kind.prefix()) == Some(self.id)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.kind.prefix().len() + self.id.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for Marker<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.prefix())?;
        f.write_str(self.id)
    }
}

/// Object marker name of `$id` as a string literal: `object_symbol!(nic)` is
/// `"obj_nic"`.
#[macro_export]
macro_rules! object_symbol {
    ($id:ident) => {
        concat!("obj_", stringify!($id))
    };
}

/// Need marker name of `$id` as a string literal: `need_symbol!(nic)` is
/// `"need_nic"`.
#[macro_export]
macro_rules! need_symbol {
    ($id:ident) => {
        concat!("need_", stringify!($id))
    };
}

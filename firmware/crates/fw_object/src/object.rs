//! Unit registration and inter-unit dependencies.
//!
//! A unit declares itself once, at its crate root:
//!
//! ```rust,ignore
//! fw_object::object!(nic);
//! ```
//!
//! This defines the unit's `DEBUG_LEVEL`, emits the `obj_nic` marker, emits
//! `DEBUG_LEVEL` as a symbol when the level is nonzero, and adds an
//! [`ObjectDescriptor`] to [`OBJECTS`].
//!
//! A unit that needs another one in the image says so with
//! [`require!`](crate::require):
//!
//! ```rust,ignore
//! fw_object::require!(nic from nic);
//! ```
//!
//! The marker half of `require!` defines `need_nic` on a word that refers to
//! `obj_nic`, leaving an undefined reference in the consumer's object file. The linker pulls whichever archive member
//! defines it, and fails with an unresolved symbol if none does. The `from`
//! half names the crate, so rustc puts it on the link line in the first place.

use linkme::distributed_slice;
use log::{log_enabled, trace, Level};

use crate::debug::DebugLevel;
use crate::ident::ObjectId;

/// Every unit linked into the image.
#[distributed_slice]
pub static OBJECTS: [ObjectDescriptor] = [..];

#[derive(Debug)]
pub struct ObjectDescriptor {
    id: ObjectId,
    debug_level: DebugLevel,
}

impl ObjectDescriptor {
    #[must_use]
    pub const fn new(id: ObjectId, debug_level: DebugLevel) -> Self {
        Self { id, debug_level }
    }

    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.id.as_str()
    }

    #[must_use]
    pub const fn debug_level(&self) -> DebugLevel {
        self.debug_level
    }
}

pub fn objects() -> impl Iterator<Item = &'static ObjectDescriptor> {
    OBJECTS.iter()
}

#[must_use]
pub fn find(name: &str) -> Option<&'static ObjectDescriptor> {
    OBJECTS.iter().find(|object| object.name() == name)
}

/// Logs the object table at trace level.
pub fn log_objects() {
    if log_enabled!(Level::Trace) {
        OBJECTS.iter().for_each(|object| {
            trace!(
                "have object {} (debug level {})",
                object.name(),
                object.debug_level()
            );
        });
    }
}

/// Defines `obj_<id>` as a global absolute symbol with value 0.
///
/// Emitting it twice for one identifier is a duplicate symbol at link time.
#[macro_export]
macro_rules! register_self {
    ($id:ident) => {
        #[cfg(not(any(target_vendor = "apple", target_os = "windows")))]
        ::core::arch::global_asm!(
            ::core::concat!(".globl ", $crate::object_symbol!($id)),
            ::core::concat!(".equ ", $crate::object_symbol!($id), ", 0"),
        );
    };
}

/// Makes the link depend on unit `$id`.
///
/// `need_<id>` is a local label on a word in the retained `.fw_object.need`
/// section. The word holds `obj_<id>`, so the object file carries an
/// undefined reference to it and, once linked, the word holds `obj_<id>`'s
/// value. With `from $krate`, the consumer also keeps a reference to the
/// target's descriptor, which makes `$krate` part of the link.
///
/// Each target may be required once per unit; a second `require!` of the
/// same target redefines the label.
#[macro_export]
macro_rules! require {
    ($id:ident) => {
        #[cfg(not(any(target_vendor = "apple", target_os = "windows")))]
        ::core::arch::global_asm!(
            ".pushsection .fw_object.need,\"aR\"",
            ".balign 4",
            ::core::concat!($crate::need_symbol!($id), ":"),
            ::core::concat!(".long ", $crate::object_symbol!($id)),
            ".popsection",
        );
    };
    ($id:ident from $krate:ident) => {
        $crate::require!($id);

        $crate::__private::paste::paste! {
            const _: () = {
                #[used]
                static NEED: &$crate::object::ObjectDescriptor = &::$krate::[<OBJ_ $id:upper>];
            };
        }
    };
}

/// Declares the current crate as unit `$id`.
///
/// The debug level comes from the `FW_DEBUG_<id>` variable at compile time,
/// or from an explicit `debug = N`.
#[macro_export]
macro_rules! object {
    (@define $id:ident, $level:expr) => {
        /// Debug level of this unit.
        pub const DEBUG_LEVEL: $crate::debug::DebugLevel = $level;

        $crate::register_self!($id);
        $crate::debug_symbol!(DEBUG_LEVEL);

        $crate::__private::paste::paste! {
            #[$crate::__private::linkme::distributed_slice($crate::object::OBJECTS)]
            #[linkme(crate = $crate::__private::linkme)]
            pub static [<OBJ_ $id:upper>]: $crate::object::ObjectDescriptor =
                $crate::object::ObjectDescriptor::new(
                    $crate::ident::ObjectId::new(::core::stringify!($id)),
                    DEBUG_LEVEL,
                );
        }
    };
    ($id:ident) => {
        $crate::object!(
            @define $id,
            $crate::debug::DebugLevel::from_config(::core::option_env!(::core::concat!(
                "FW_DEBUG_",
                ::core::stringify!($id)
            )))
        );
    };
    ($id:ident, debug = $level:expr) => {
        $crate::object!(@define $id, $crate::debug::DebugLevel::new($level));
    };
}

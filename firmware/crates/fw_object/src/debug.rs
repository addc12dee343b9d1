//! Per-unit debug levels.
//!
//! Each unit owns one `DEBUG_LEVEL` constant of type [`DebugLevel`], defined
//! by [`object!`](crate::object). The instrumentation macros read that constant
//! at their call site, so the level is fixed when the unit is compiled and
//! disabled instrumentation is erased rather than skipped.
//!
//! # Build-Time Selection
//!
//! The level of unit `nic` comes from the `FW_DEBUG_nic` environment variable
//! seen by rustc, which the `fw_object_build` helper sets from `objects.toml`
//! and the `FW_DEBUG` override list. An absent variable means level 0.
//!
//! ```bash
//! FW_DEBUG=nic:2,config cargo build
//! ```

use core::fmt;

/// The two instrumentation tiers.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Tier {
    /// Low-volume diagnostics, active from level 1. Assertions share it.
    Verbose,
    /// High-volume diagnostics, active from level 2.
    VeryVerbose,
}

impl Tier {
    #[must_use]
    pub const fn threshold(self) -> u32 {
        match self {
            Self::Verbose => 1,
            Self::VeryVerbose => 2,
        }
    }
}

/// Debug verbosity of one unit.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DebugLevel(u32);

impl DebugLevel {
    pub const OFF: Self = Self(0);

    #[must_use]
    pub const fn new(level: u32) -> Self {
        Self(level)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Whether the unit has any debugging at all, i.e. whether it carries a
    /// `DEBUG_LEVEL` symbol.
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        self.0 != 0
    }

    #[must_use]
    pub const fn enables(self, tier: Tier) -> bool {
        self.0 >= tier.threshold()
    }

    /// Parses a decimal level. Values beyond `u32::MAX` saturate, so they
    /// still enable every tier. The empty string is level 0.
    ///
    /// Returns `None` on anything other than decimal digits.
    #[must_use]
    pub const fn parse(value: &str) -> Option<Self> {
        let bytes = value.as_bytes();
        let mut level: u32 = 0;
        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            if !b.is_ascii_digit() {
                return None;
            }
            level = level.saturating_mul(10).saturating_add((b - b'0') as u32);
            i += 1;
        }
        Some(Self(level))
    }

    /// Parses the value of a unit's `FW_DEBUG_<id>` variable.
    ///
    /// `None` and the empty string mean level 0. Otherwise see
    /// [`parse`](Self::parse).
    ///
    /// # Panics
    /// Panics on anything other than decimal digits. Used in a `const`
    /// initializer this stops the build.
    #[must_use]
    pub const fn from_config(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::OFF;
        };

        match Self::parse(value) {
            Some(level) => level,
            None => panic!("debug level must be a non-negative decimal integer"),
        }
    }
}

impl fmt::Display for DebugLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Emits the `DEBUG_LEVEL` symbol for a nonzero level.
///
/// The level is a `const` operand of an assembler `.if`, so level 0 produces
/// no symbol at all. The symbol is local to the unit.
#[macro_export]
macro_rules! debug_symbol {
    ($level:expr) => {
        #[cfg(not(any(target_vendor = "apple", target_os = "windows")))]
        ::core::arch::global_asm!(
            ".if {level}",
            ".equ DEBUG_LEVEL, {level}",
            ".endif",
            level = const $crate::debug::DebugLevel::get($level),
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_or_empty_is_off() {
        assert_eq!(DebugLevel::from_config(None), DebugLevel::OFF);
        assert_eq!(DebugLevel::from_config(Some("")), DebugLevel::OFF);
        assert!(!DebugLevel::OFF.is_enabled());
    }

    #[test]
    fn parses_decimal_levels() {
        const LEVEL: DebugLevel = DebugLevel::from_config(Some("2"));
        assert_eq!(LEVEL.get(), 2);
        assert_eq!(DebugLevel::from_config(Some("017")).get(), 17);
    }

    #[test]
    fn overflow_saturates() {
        let level = DebugLevel::from_config(Some("99999999999999999999"));
        assert_eq!(level.get(), u32::MAX);
        assert!(level.enables(Tier::VeryVerbose));
    }

    #[test]
    fn parse_rejects_non_digits() {
        assert_eq!(DebugLevel::parse("2"), Some(DebugLevel::new(2)));
        assert_eq!(DebugLevel::parse("4294967296"), Some(DebugLevel::new(u32::MAX)));
        assert_eq!(DebugLevel::parse("+1"), None);
        assert_eq!(DebugLevel::parse("two"), None);
    }

    #[test]
    #[should_panic(expected = "non-negative decimal")]
    fn negative_levels_are_rejected() {
        let _ = DebugLevel::from_config(Some("-1"));
    }

    #[test]
    fn tiers_follow_thresholds() {
        let off = DebugLevel::new(0);
        let one = DebugLevel::new(1);
        let two = DebugLevel::new(2);
        let huge = DebugLevel::new(u32::MAX);

        assert!(!off.enables(Tier::Verbose));
        assert!(!off.enables(Tier::VeryVerbose));

        assert!(one.enables(Tier::Verbose));
        assert!(!one.enables(Tier::VeryVerbose));

        assert!(two.enables(Tier::Verbose));
        assert!(two.enables(Tier::VeryVerbose));

        assert!(huge.enables(Tier::VeryVerbose));
    }
}

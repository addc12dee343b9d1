//! Conditional diagnostics.
//!
//! [`dbg1!`](crate::dbg1), [`dbg2!`](crate::dbg2) and
//! [`dbg_assert!`](crate::dbg_assert) look up a constant named `DEBUG_LEVEL`
//! where they are invoked. Every unit has one at its crate root (see
//! [`object!`](crate::object)); submodules bring it into scope with
//! `use crate::DEBUG_LEVEL;`. The tier check is a `const` block, so a
//! disabled macro leaves no code behind and never evaluates its arguments.
//!
//! Output goes through the `log` facade: tier 1 at `debug`, tier 2 at
//! `trace`, assertion failures at `warn`, all under the caller's module path.

use core::sync::atomic::{AtomicUsize, Ordering};

use log::warn;

static ASSERTION_FAILURES: AtomicUsize = AtomicUsize::new(0);

/// Reports a failed [`dbg_assert!`](crate::dbg_assert) and returns.
#[cold]
#[inline(never)]
pub fn assertion_failed(target: &str, condition: &str, file: &str, line: u32, function: &str) {
    ASSERTION_FAILURES.fetch_add(1, Ordering::Relaxed);
    warn!(target: target, "ASSERT({}) failed at {} line {} [{}]", condition, file, line, function);
}

/// Number of failed assertions since start-up, across all units.
pub fn assertion_failures() -> usize {
    ASSERTION_FAILURES.load(Ordering::Relaxed)
}

/// Trims the helper item and closure frames off the type name produced by
/// [`enclosing_fn!`](crate::enclosing_fn).
#[doc(hidden)]
pub fn strip_fn_path(name: &'static str) -> &'static str {
    let mut name = name.strip_suffix("::__here").unwrap_or(name);
    while let Some(outer) = name.strip_suffix("::{{closure}}") {
        name = outer;
    }
    name
}

/// Path of the function this macro is expanded in.
#[macro_export]
macro_rules! enclosing_fn {
    () => {{
        fn __here() {}
        $crate::instrument::strip_fn_path(::core::any::type_name_of_val(&__here))
    }};
}

/// Tier 1 diagnostic print, compiled in when the unit's level is at least 1.
#[macro_export]
macro_rules! dbg1 {
    ($($arg:tt)+) => {
        if const { DEBUG_LEVEL.enables($crate::debug::Tier::Verbose) } {
            $crate::__private::log::debug!($($arg)+);
        }
    };
}

/// Tier 2 diagnostic print, compiled in when the unit's level is at least 2.
#[macro_export]
macro_rules! dbg2 {
    ($($arg:tt)+) => {
        if const { DEBUG_LEVEL.enables($crate::debug::Tier::VeryVerbose) } {
            $crate::__private::log::trace!($($arg)+);
        }
    };
}

/// Non-fatal assertion, compiled in when the unit's level is at least 1.
///
/// On failure the condition text, location and enclosing function are
/// reported and execution continues. Below level 1 the condition is not
/// evaluated, so it must not carry side effects the caller depends on.
#[macro_export]
macro_rules! dbg_assert {
    ($cond:expr $(,)?) => {
        if const { DEBUG_LEVEL.enables($crate::debug::Tier::Verbose) } {
            if !($cond) {
                $crate::instrument::assertion_failed(
                    ::core::module_path!(),
                    ::core::stringify!($cond),
                    ::core::file!(),
                    ::core::line!(),
                    $crate::enclosing_fn!(),
                );
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;
    use crate::debug::DebugLevel;

    #[test]
    fn enclosing_fn_names_the_caller() {
        let name = crate::enclosing_fn!();
        assert!(name.ends_with("tests::enclosing_fn_names_the_caller"), "{name}");
    }

    #[test]
    fn enclosing_fn_skips_closures() {
        let name = (|| crate::enclosing_fn!())();
        assert!(name.ends_with("::enclosing_fn_skips_closures"), "{name}");
    }

    #[test]
    fn disabled_assertion_does_not_evaluate() {
        const DEBUG_LEVEL: DebugLevel = DebugLevel::OFF;
        let evaluated = Cell::new(false);
        crate::dbg_assert!({
            evaluated.set(true);
            false
        });
        assert!(!evaluated.get());
    }

    #[test]
    fn enabled_assertion_reports_and_continues() {
        const DEBUG_LEVEL: DebugLevel = DebugLevel::new(1);
        let before = assertion_failures();
        crate::dbg_assert!(1 + 1 == 3);
        crate::dbg_assert!(2 + 2 == 4);
        assert!(assertion_failures() > before);
    }
}

//! A unit built at debug level 0 carries no instrumentation.

mod common;

use std::cell::Cell;

use fw_object::{dbg1, dbg2, dbg_assert};

fw_object::object!(quiet, debug = 0);

fn poll(evaluated: &Cell<u32>) -> u32 {
    dbg1!("poll {}", {
        evaluated.set(evaluated.get() + 1);
        1
    });
    dbg2!("poll detail {}", {
        evaluated.set(evaluated.get() + 1);
        2
    });
    dbg_assert!({
        evaluated.set(evaluated.get() + 1);
        false
    });
    7
}

#[test]
fn level_is_off() {
    assert!(!DEBUG_LEVEL.is_enabled());
    assert_eq!(OBJ_QUIET.debug_level().get(), 0);
}

#[test]
fn nothing_is_printed_or_evaluated() {
    common::install();
    let evaluated = Cell::new(0);
    let failures = fw_object::instrument::assertion_failures();

    assert_eq!(poll(&evaluated), 7);

    assert_eq!(evaluated.get(), 0);
    assert!(common::take().is_empty());
    assert_eq!(fw_object::instrument::assertion_failures(), failures);
}

#[test]
fn unit_is_registered() {
    let object = fw_object::find("quiet").expect("quiet registered");
    assert_eq!(object.debug_level(), DEBUG_LEVEL);
    assert_eq!(fw_object::objects().filter(|o| o.name() == "quiet").count(), 1);
}

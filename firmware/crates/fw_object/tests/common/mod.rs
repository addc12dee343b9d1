//! Log capture shared by the integration tests.
//!
//! The logger is process-wide but records land in a thread-local buffer, so
//! tests running in parallel only see their own output.

use std::cell::RefCell;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[derive(Debug, Clone)]
pub struct Captured {
    pub level: Level,
    pub target: String,
    pub message: String,
}

thread_local! {
    static RECORDS: RefCell<Vec<Captured>> = const { RefCell::new(Vec::new()) };
}

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        RECORDS.with(|records| {
            records.borrow_mut().push(Captured {
                level: record.level(),
                target: record.target().to_owned(),
                message: record.args().to_string(),
            });
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

pub fn install() {
    // Another test in this binary may have installed it already.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LevelFilter::Trace);
}

pub fn take() -> Vec<Captured> {
    RECORDS.with(|records| records.borrow_mut().drain(..).collect())
}

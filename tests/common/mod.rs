#![allow(dead_code)]

use log::{LevelFilter, Log, Metadata, Record};
use std::time::Duration;

struct TestLogger;

impl Log for TestLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        eprintln!(
            "[{:?}] [{}] {}",
            std::thread::current().id(),
            record.level(),
            record.args()
        );
    }

    fn flush(&self) {}
}

static LOGGER: TestLogger = TestLogger;

/// Installs the test logger once per test binary.
pub fn init_logging() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Trace);
    }
}

/// Spins until `cond` holds.
pub fn spin_until(cond: impl Fn() -> bool) {
    while !cond() {
        std::thread::yield_now();
    }
}

/// Gives other threads time to make progress they are not supposed to make.
pub fn settle() {
    std::thread::sleep(Duration::from_millis(50));
}

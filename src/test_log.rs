//! In-memory `log` sink so unit tests can check what was warned about.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::{Mutex, Once};

struct Capture {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for Capture {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut records) = self.records.lock() {
            records.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture {
    records: Mutex::new(Vec::new()),
};

/// Routes the `log` macros into the capture. Safe to call from every test.
pub(crate) fn install() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        if log::set_logger(&CAPTURE).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });
}

/// Warnings logged so far that mention `needle`. Tests run in parallel, so
/// pick a needle no other test logs.
pub(crate) fn warnings_about(needle: &str) -> Vec<String> {
    let records = CAPTURE.records.lock().unwrap();
    records
        .iter()
        .filter(|(level, message)| *level == Level::Warn && message.contains(needle))
        .map(|(_, message)| message.clone())
        .collect()
}

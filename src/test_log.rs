//! `log` backend for tests that records lines per thread.

use std::cell::RefCell;
use std::sync::Once;

use log::{Level, LevelFilter, Log, Metadata, Record};

std::thread_local! {
    static LINES: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

struct Capture;

impl Log for Capture {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        LINES.with(|lines| {
            lines
                .borrow_mut()
                .push((record.level(), record.args().to_string()))
        });
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture;
static INIT: Once = Once::new();

/// Install the capturing logger and drop anything this thread logged so far.
pub(crate) fn start() {
    INIT.call_once(|| {
        // Only this module installs a logger.
        let _ = log::set_logger(&CAPTURE);
        log::set_max_level(LevelFilter::Trace);
    });
    take();
}

/// Lines logged by this thread since the last call.
pub(crate) fn take() -> Vec<(Level, String)> {
    LINES.with(|lines| lines.borrow_mut().drain(..).collect())
}

/// Lines logged by this thread at `level` since the last call.
pub(crate) fn take_level(level: Level) -> Vec<String> {
    take()
        .into_iter()
        .filter(|(l, _)| *l == level)
        .map(|(_, line)| line)
        .collect()
}

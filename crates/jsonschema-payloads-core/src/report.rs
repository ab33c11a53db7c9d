//! Line-oriented progress reporting.

use std::fmt;
use std::io::{self, Write};
use std::sync::Mutex;

/// Writes progress lines to a sink when not silenced.
///
/// Reporting is best effort: a failing sink never fails generation.
pub struct Reporter {
    silent: bool,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl Reporter {
    /// A reporter writing to stdout.
    pub fn new(silent: bool) -> Self {
        Self::with_sink(silent, Box::new(io::stdout()))
    }

    pub fn with_sink(silent: bool, sink: Box<dyn Write + Send>) -> Self {
        Self {
            silent,
            sink: Mutex::new(sink),
        }
    }

    pub fn report(&self, message: impl fmt::Display) {
        if self.silent {
            return;
        }
        if let Ok(mut sink) = self.sink.lock() {
            let _ = writeln!(sink, "{message}");
        }
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("silent", &self.silent)
            .finish_non_exhaustive()
    }
}

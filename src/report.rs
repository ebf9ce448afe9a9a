//! Diagnostic sink shared by every pass of one session.
//!
//! The scanner, parser and resolver hand each error to the [`Reporter`] as
//! soon as it is found and keep going; the interpreter's single fatal error
//! is reported by the session.  The reporter remembers which class of error
//! it has seen so the caller can decide whether to execute and which exit
//! code to use.

use std::io::Write;

use log::{debug, warn};

use crate::error::LoxError;

pub struct Reporter {
    sink: Box<dyn Write>,
    had_error: bool,
    had_runtime_error: bool,
}

impl Reporter {
    pub fn new(sink: Box<dyn Write>) -> Self {
        Self {
            sink,
            had_error: false,
            had_runtime_error: false,
        }
    }

    /// Write one diagnostic line and raise the matching flag.
    pub fn report(&mut self, error: &LoxError) {
        if error.is_runtime() {
            self.had_runtime_error = true;
        } else {
            self.had_error = true;
        }

        debug!("Reporting: {}", error);

        if let Err(e) = writeln!(self.sink, "{}", error).and_then(|_| self.sink.flush()) {
            warn!("Failed to write diagnostic: {}", e);
        }
    }

    /// A scan, parse or resolve error has been reported since the last reset.
    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// Clear both flags.  The REPL calls this between lines.
    pub fn reset(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
    }
}

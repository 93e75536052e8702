//! Single refreshing status line (`current/total`).
//!
//! Handles are cheap clones of one shared line. Anything else writing to
//! the same stream (the log output, for one) calls [`ProgressLine::finish`]
//! first so its text starts on a fresh line instead of overwriting the
//! status.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

const LABEL: &str = "Migrating organizations";

struct Inner {
    out: Box<dyn Write + Send>,
    active: bool,
}

#[derive(Clone)]
pub struct ProgressLine {
    inner: Arc<Mutex<Inner>>,
}

impl ProgressLine {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner { out, active: false })),
        }
    }

    /// Status line on standard error.
    pub fn stderr() -> Self {
        Self::new(Box::new(io::stderr()))
    }

    /// Discards all output.
    pub fn hidden() -> Self {
        Self::new(Box::new(io::sink()))
    }

    /// Redraw the line. Display errors are ignored.
    pub fn update(&self, current: usize, total: usize) {
        let mut inner = self.lock();
        inner.active = true;
        let _ = write!(inner.out, "\r{LABEL} {current}/{total}");
        let _ = inner.out.flush();
    }

    /// Terminate the line so later output starts on a fresh one. The next
    /// [`update`](Self::update) draws a new status line.
    pub fn finish(&self) {
        let mut inner = self.lock();
        if inner.active {
            let _ = writeln!(inner.out);
            let _ = inner.out.flush();
            inner.active = false;
        }
    }

    // A panic while drawing leaves nothing half-updated worth refusing.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

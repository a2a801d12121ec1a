//! Process-wide cancellation flag.
//!
//! The binary's Ctrl-C handler sets it; copy progress callbacks read it and answer
//! `Progress::Cancel`, which stops a bulk copy cleanly between entries.
//!
//! Notes:
//! - Relaxed atomics are sufficient for a one-way "stop" flag.
//! - `request()` is safe to call from signal handlers.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::facade::Progress;

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Request a cooperative shutdown (idempotent).
#[inline]
pub fn request() {
    SHUTDOWN.store(true, Ordering::Relaxed);
}

/// Check whether a shutdown has been requested.
#[inline]
pub fn is_requested() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

/// Clear the flag. Meant for tests and for long-lived hosts reusing the process.
#[inline]
pub fn reset() {
    SHUTDOWN.store(false, Ordering::Relaxed);
}

/// Progress answer matching the flag.
pub fn progress() -> Progress {
    if is_requested() {
        Progress::Cancel
    } else {
        Progress::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn flag_drives_progress_answer() {
        reset();
        assert_eq!(progress(), Progress::Continue);
        request();
        request();
        assert!(is_requested());
        assert_eq!(progress(), Progress::Cancel);
        reset();
        assert!(!is_requested());
    }
}

//! Helpers shared by the unit tests of this package.

use std::mem;
use std::panic;
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

/// Long enough for a slow CI machine, short enough to notice a deadlocked dispatch.
const WATCHDOG_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs a test body on its own thread and fails the test if it does not finish in time.
///
/// Use this for anything that blocks on other threads, so a deadlock turns into a test failure
/// instead of a hung test run. Panics inside the body are propagated unchanged.
pub(crate) fn with_watchdog<F, R>(test_fn: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let (tx, rx) = mpsc::channel();

    let body = thread::spawn(move || {
        // The receiver is gone if we already timed out. Nothing left to report to.
        drop(tx.send(test_fn()));
    });

    match rx.recv_timeout(WATCHDOG_TIMEOUT) {
        Ok(result) => {
            body.join().expect("test body already reported its result");
            result
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            panic!("test did not finish within {WATCHDOG_TIMEOUT:?} - probable deadlock");
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => match body.join() {
            Ok(()) => panic!("test body exited without reporting a result"),
            Err(payload) => panic::resume_unwind(payload),
        },
    }
}

/// Records which callbacks were invoked, with which value, in invocation order.
#[derive(Clone, Debug, Default)]
pub(crate) struct CallLog {
    calls: Arc<Mutex<Vec<(&'static str, i32)>>>,
}

impl CallLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A callback that appends `(label, value)` to the log every time it is invoked.
    pub(crate) fn recorder(&self, label: &'static str) -> impl Fn(&i32) + Send + Sync + 'static {
        let calls = Arc::clone(&self.calls);
        move |value| calls.lock().push((label, *value))
    }

    /// Returns everything recorded so far and clears the log.
    pub(crate) fn take(&self) -> Vec<(&'static str, i32)> {
        mem::take(&mut *self.calls.lock())
    }
}

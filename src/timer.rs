//! Cancellable one-shot timers.
//!
//! `schedule` hands back a handle; `cancel` stops the timer if it has not
//! fired yet. Storing a new handle where an old one lived is the debounce
//! idiom used throughout the crate: cancel the old handle, then schedule the
//! replacement (latest timer wins).

use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

struct TimerState {
    cancelled: Mutex<bool>,
    wake: Condvar,
}

pub struct TimerHandle {
    state: Arc<TimerState>,
}

impl TimerHandle {
    /// Stop the timer. A no-op if it already fired; dropping the handle
    /// without calling this lets the timer run to completion.
    pub fn cancel(&self) {
        let mut cancelled = self.state.cancelled.lock().unwrap();
        *cancelled = true;
        self.state.wake.notify_all();
    }
}

/// Run `f` after `delay` unless the returned handle is cancelled first.
pub fn schedule<F>(delay: Duration, f: F) -> TimerHandle
where
    F: FnOnce() + Send + 'static,
{
    let state = Arc::new(TimerState {
        cancelled: Mutex::new(false),
        wake: Condvar::new(),
    });

    let worker = state.clone();
    thread::spawn(move || {
        let guard = worker.cancelled.lock().unwrap();
        let (guard, timeout) = worker
            .wake
            .wait_timeout_while(guard, delay, |cancelled| !*cancelled)
            .unwrap();
        let fire = timeout.timed_out() && !*guard;
        drop(guard);
        if fire {
            f();
        }
    });

    TimerHandle { state }
}

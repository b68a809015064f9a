//! Bounded execution for rule runs and file reads.
//!
//! Work runs on a dedicated thread while the caller waits on a channel with
//! `recv_timeout`. A timed-out thread is detached; its eventual result is
//! dropped with the channel. A timeout of 0 runs the work inline.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome<T> {
    Done(T),
    Panicked(String),
    TimedOut,
}

/// Run `f`, giving up after `timeout_ms` milliseconds.
pub fn run_with_timeout<T, F>(timeout_ms: u64, f: F) -> Outcome<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    if timeout_ms == 0 {
        return catch(f);
    }
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("smellscan-watchdog".into())
        .spawn(move || {
            let _ = tx.send(catch(f));
        });
    if let Err(e) = spawned {
        return Outcome::Panicked(format!("could not spawn worker thread: {}", e));
    }
    match rx.recv_timeout(Duration::from_millis(timeout_ms)) {
        Ok(outcome) => outcome,
        Err(RecvTimeoutError::Timeout) => Outcome::TimedOut,
        Err(RecvTimeoutError::Disconnected) => {
            Outcome::Panicked("worker exited without a result".into())
        }
    }
}

fn catch<T, F: FnOnce() -> T>(f: F) -> Outcome<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(v) => Outcome::Done(v),
        Err(payload) => Outcome::Panicked(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

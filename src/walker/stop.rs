//! One-shot broadcast stop signal
//!
//! The signal is a zero-capacity channel that never carries a message.
//! Firing it drops the only sender, which disconnects the channel and wakes
//! every worker parked on it in `select!`.

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use parking_lot::Mutex;
use std::thread;

pub struct StopSignal {
    trigger: Mutex<Option<Sender<()>>>,
    receiver: Receiver<()>,
}

impl StopSignal {
    pub fn new() -> Self {
        let (tx, rx) = bounded(0);
        Self {
            trigger: Mutex::new(Some(tx)),
            receiver: rx,
        }
    }

    /// Broadcast the stop. Returns true only for the call that fired it.
    pub fn fire(&self) -> bool {
        let sender = self.trigger.lock().take();
        sender.is_some()
    }

    pub fn is_fired(&self) -> bool {
        matches!(self.receiver.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Channel that becomes ready (disconnected) once fired
    pub fn receiver(&self) -> &Receiver<()> {
        &self.receiver
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Fires the stop signal if the owning thread unwinds
pub struct StopOnPanic<'a>(pub &'a StopSignal);

impl Drop for StopOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.fire();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fire_once() {
        let stop = StopSignal::new();
        assert!(!stop.is_fired());
        assert!(stop.fire());
        assert!(stop.is_fired());
        assert!(!stop.fire());
        assert!(stop.receiver().recv().is_err());
    }

    #[test]
    fn test_fire_wakes_waiters() {
        let stop = StopSignal::new();
        thread::scope(|s| {
            let waiters: Vec<_> = (0..4)
                .map(|_| s.spawn(|| stop.receiver().recv().is_err()))
                .collect();
            stop.fire();
            for w in waiters {
                assert!(w.join().unwrap());
            }
        });
    }

    #[test]
    fn test_panic_guard_fires() {
        let stop = StopSignal::new();
        let result = thread::scope(|s| {
            s.spawn(|| {
                let _guard = StopOnPanic(&stop);
                panic!("worker failure");
            })
            .join()
        });
        assert!(result.is_err());
        assert!(stop.is_fired());
    }

    #[test]
    fn test_guard_quiet_without_panic() {
        let stop = StopSignal::new();
        {
            let _guard = StopOnPanic(&stop);
        }
        assert!(!stop.is_fired());
    }
}

// src/debounce.rs

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

pub const DEFAULT_QUIET_INTERVAL: Duration = Duration::from_millis(1000);

type Trigger = Box<dyn FnOnce() + Send + 'static>;

enum Command {
    Schedule(Trigger),
    Cancel,
}

/// The single armed trigger and when it is due.
struct PendingTimer {
    due: Instant,
    trigger: Trigger,
}

/// Runs a trigger once the caller has stopped scheduling for a quiet
/// interval. Every `schedule` replaces the previous trigger and restarts the
/// clock, so a burst of calls fires only the last one.
///
/// Triggers run on a worker thread owned by the debouncer, started on the
/// first `schedule`. Dropping the debouncer discards a pending trigger
/// unfired and lets the worker exit.
pub struct Debouncer {
    tx: OnceLock<Sender<Command>>,
    interval: Duration,
}

impl Debouncer {
    pub fn new(interval: Duration) -> Self {
        Self {
            tx: OnceLock::new(),
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn worker(&self) -> &Sender<Command> {
        self.tx.get_or_init(|| {
            let (tx, rx) = mpsc::channel();
            let interval = self.interval;
            let spawned = std::thread::Builder::new()
                .name("debouncer".into())
                .spawn(move || run(rx, interval));
            if let Err(e) = spawned {
                tracing::error!("failed to spawn debouncer thread: {e}");
            }
            tx
        })
    }

    pub fn schedule<F>(&self, trigger: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.worker().send(Command::Schedule(Box::new(trigger))).is_err() {
            tracing::warn!("debouncer worker is gone; trigger dropped");
        }
    }

    /// Nothing can be pending before the first `schedule`, so this never
    /// starts the worker.
    pub fn cancel(&self) {
        let Some(tx) = self.tx.get() else {
            return;
        };
        if tx.send(Command::Cancel).is_err() {
            tracing::warn!("debouncer worker is gone; cancel dropped");
        }
    }

    #[cfg(test)]
    fn has_worker(&self) -> bool {
        self.tx.get().is_some()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_INTERVAL)
    }
}

fn run(rx: Receiver<Command>, interval: Duration) {
    let mut pending: Option<PendingTimer> = None;

    loop {
        let next = match &pending {
            None => match rx.recv() {
                Ok(cmd) => Some(cmd),
                Err(_) => return,
            },
            Some(timer) => {
                let wait = timer.due.saturating_duration_since(Instant::now());
                match rx.recv_timeout(wait) {
                    Ok(cmd) => Some(cmd),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => return,
                }
            }
        };

        match next {
            Some(Command::Schedule(trigger)) => {
                pending = Some(PendingTimer {
                    due: Instant::now() + interval,
                    trigger,
                });
            }
            Some(Command::Cancel) => pending = None,
            None => {
                if let Some(timer) = pending.take() {
                    (timer.trigger)();
                }
            }
        }
    }
}

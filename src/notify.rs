//! Debounced module-update notification
//!
//! The host reports changed module identifiers in bursts (one per file
//! event); live observers only need to know that the module list may be
//! stale. The debouncer is an explicit coalescing timer: a single pending
//! deadline, pushed forward by each signal, with one drain task that fires
//! the broadcast exactly once per quiescent period.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{sleep_until, Instant};

#[derive(Clone)]
pub struct UpdateDebouncer {
    inner: Arc<Inner>,
}

struct Inner {
    window: Duration,
    deadline: Mutex<Option<Instant>>,
    tx: broadcast::Sender<()>,
}

impl UpdateDebouncer {
    pub fn new(window: Duration) -> Self {
        let (tx, _) = broadcast::channel(16);
        Self {
            inner: Arc::new(Inner {
                window,
                deadline: Mutex::new(None),
                tx,
            }),
        }
    }

    /// Receiver for "module list may be stale" notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.inner.tx.subscribe()
    }

    /// Note one change signal. Must be called within a tokio runtime: the
    /// first signal of a burst spawns the drain task.
    pub fn signal(&self) {
        let idle = {
            let mut deadline = self.inner.deadline.lock();
            let idle = deadline.is_none();
            *deadline = Some(Instant::now() + self.inner.window);
            idle
        };
        if idle {
            let inner = self.inner.clone();
            tokio::spawn(async move { inner.drain().await });
        }
    }
}

impl Inner {
    /// Sleep until the deadline stops moving, then notify once. Holding the
    /// lock across the check-and-clear keeps a racing `signal` from being
    /// lost between them.
    async fn drain(&self) {
        loop {
            let next = {
                let mut deadline = self.deadline.lock();
                match *deadline {
                    Some(target) if Instant::now() < target => Some(target),
                    Some(_) => {
                        *deadline = None;
                        None
                    }
                    None => return,
                }
            };
            match next {
                Some(target) => sleep_until(target).await,
                None => break,
            }
        }
        // observers may come and go; a send with no receivers is fine
        let _ = self.tx.send(());
    }
}

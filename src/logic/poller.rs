use crate::datasources::SnapshotSource;
use crate::models::ProviderState;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Single writer for a provider's state cell.
///
/// Publishing and stopping share one lock, so once `stop` has returned no
/// publish can land, even from a fetch that was already in flight.
struct Publisher<T> {
    tx: watch::Sender<ProviderState<T>>,
    stopped: Mutex<bool>,
}

impl<T> Publisher<T> {
    /// Returns false once stopped
    fn update(&self, modify: impl FnOnce(&mut ProviderState<T>) -> bool) -> bool {
        let stopped = self.stopped.lock().unwrap_or_else(PoisonError::into_inner);
        if *stopped {
            return false;
        }
        self.tx.send_if_modified(modify);
        true
    }

    fn stop(&self) {
        *self.stopped.lock().unwrap_or_else(PoisonError::into_inner) = true;
    }

    fn is_stopped(&self) -> bool {
        *self.stopped.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A running provider. Dropping the handle stops it.
pub struct ProviderHandle<T> {
    name: &'static str,
    publisher: Arc<Publisher<T>>,
    task: JoinHandle<()>,
}

/// Start polling `source` now and then every `interval`.
///
/// Polls never overlap: ticks that come due while a fetch is pending are skipped.
pub fn start<S: SnapshotSource>(source: S, interval: Duration) -> ProviderHandle<S::Snapshot> {
    let name = source.name();
    let (tx, _rx) = watch::channel(ProviderState::new());
    let publisher = Arc::new(Publisher {
        tx,
        stopped: Mutex::new(false),
    });

    tracing::info!(provider = name, interval_secs = interval.as_secs(), "Starting provider");
    let task = tokio::spawn(poll_loop(source, interval, Arc::clone(&publisher)));

    ProviderHandle {
        name,
        publisher,
        task,
    }
}

async fn poll_loop<S: SnapshotSource>(
    source: S,
    interval: Duration,
    publisher: Arc<Publisher<S::Snapshot>>,
) {
    let name = source.name();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let marked = publisher.update(|state| {
            let changed = !state.loading;
            state.begin_fetch();
            changed
        });
        if !marked {
            break;
        }

        tracing::debug!(provider = name, "Fetching");
        let outcome = source.fetch().await;
        match &outcome {
            Ok(_) => tracing::info!(provider = name, "Snapshot updated"),
            Err(e) => tracing::warn!(provider = name, "Fetch failed: {}", e),
        }

        let published = publisher.update(|state| {
            state.record(outcome);
            true
        });
        if !published {
            break;
        }
    }

    tracing::debug!(provider = name, "Poll loop exited");
}

impl<T: Clone> ProviderHandle<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Receiver that is notified whenever the state changes
    pub fn subscribe(&self) -> watch::Receiver<ProviderState<T>> {
        self.publisher.tx.subscribe()
    }

    /// Copy of the current state
    pub fn state(&self) -> ProviderState<T> {
        self.publisher.tx.borrow().clone()
    }

    /// Halt polling. Nothing is published after this returns; a fetch already
    /// in flight is abandoned.
    pub fn stop(&self) {
        if self.publisher.is_stopped() {
            return;
        }
        self.publisher.stop();
        self.task.abort();
        tracing::info!(provider = self.name, "Provider stopped");
    }

    pub fn is_stopped(&self) -> bool {
        self.publisher.is_stopped()
    }
}

impl<T> Drop for ProviderHandle<T> {
    fn drop(&mut self) {
        self.publisher.stop();
        self.task.abort();
    }
}

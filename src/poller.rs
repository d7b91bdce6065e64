//! Scheduled refresh loop.
//!
//! The poller re-runs [`GameStore::refresh`] on a fixed cadence, but only
//! while the connection is healthy and the interval is positive. Once a
//! reconcile fails the loop parks; nothing is scheduled again until a manual
//! `refresh` succeeds and flips the health signal back on. Each tick awaits
//! its reconcile before scheduling the next, so the poller itself never has
//! two cycles in flight.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::store::GameStore;

/// Default cadence between reconciles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Handle to the background polling task.
///
/// Dropping the handle aborts the task; in-flight requests are abandoned
/// rather than applied after teardown.
pub struct Poller {
    interval_tx: watch::Sender<Option<Duration>>,
    handle: JoinHandle<()>,
}

impl Poller {
    /// Spawn the polling task against `store`. A zero `interval` starts the
    /// poller disabled; it can be enabled later via [`set_poll_interval`].
    ///
    /// [`set_poll_interval`]: Poller::set_poll_interval
    pub fn spawn(store: Arc<GameStore>, interval: Duration) -> Self {
        let (interval_tx, interval_rx) = watch::channel(normalize(interval));
        let handle = tokio::spawn(poll_loop(store, interval_rx));
        Self {
            interval_tx,
            handle,
        }
    }

    /// Reconfigure the cadence. Zero disables automatic polling.
    pub fn set_poll_interval(&self, interval: Duration) {
        self.interval_tx.send_replace(normalize(interval));
    }

    /// Stop the polling task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn normalize(interval: Duration) -> Option<Duration> {
    (!interval.is_zero()).then_some(interval)
}

async fn poll_loop(store: Arc<GameStore>, mut interval_rx: watch::Receiver<Option<Duration>>) {
    let mut connected_rx = store.connected();
    loop {
        let interval = *interval_rx.borrow_and_update();
        let connected = *connected_rx.borrow_and_update();

        let Some(interval) = interval.filter(|_| connected) else {
            // Disabled or unhealthy: park until either signal changes.
            tokio::select! {
                changed = interval_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                changed = connected_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
            continue;
        };

        // The tick is torn down and rebuilt whenever the interval or the
        // health signal changes mid-sleep.
        tokio::select! {
            _ = tokio::time::sleep(interval) => {
                if store.refresh().await.is_err() {
                    log::warn!("scheduled reconcile failed; polling paused until a manual refresh succeeds");
                }
            }
            changed = interval_rx.changed() => {
                if changed.is_err() {
                    return;
                }
            }
            changed = connected_rx.changed() => {
                if changed.is_err() {
                    return;
                }
            }
        }
    }
}

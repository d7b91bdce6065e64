//! Last-known-good game state store.
//!
//! The store is the single point of truth the presentation layer reads. It is
//! written exclusively by reconcile completions: one cycle fetches the table
//! and roster concurrently, waits for both, and replaces both wholesale. A
//! failed cycle flips `connected` off and leaves the previous values in place
//! so the caller can keep rendering last-known data through an outage.
//!
//! Every cycle carries a monotonically increasing ticket and a completion is
//! applied only if its ticket is still the most recently issued. Responses
//! that resolve after a fresher cycle are discarded, so overlapping
//! reconciles cannot write older data over newer data.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;

use crate::api_client::{Gateway, GatewayError};
use crate::entities::{PlayersSnapshot, TableState};

/// Bounded exponential backoff for the idempotent reads of a reconcile.
///
/// Only transport failures are retried; a rejection from the node is final
/// for the cycle. Action submission never goes through this policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Fail on the first transport error, with no retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }
}

/// Read-only view of the store for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot {
    pub table: Option<TableState>,
    pub players: Option<PlayersSnapshot>,
    pub loading: bool,
    pub error: Option<String>,
    pub connected: bool,
}

struct StoreInner {
    table: Option<TableState>,
    players: Option<PlayersSnapshot>,
    loading: bool,
    error: Option<String>,
    connected: bool,
    /// Ticket of the most recently issued reconcile.
    issued: u64,
}

pub struct GameStore {
    gateway: Arc<dyn Gateway>,
    inner: Mutex<StoreInner>,
    connected_tx: watch::Sender<bool>,
    retry: RetryPolicy,
}

impl GameStore {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self::with_retry(gateway, RetryPolicy::default())
    }

    pub fn with_retry(gateway: Arc<dyn Gateway>, retry: RetryPolicy) -> Self {
        let (connected_tx, _) = watch::channel(false);
        Self {
            gateway,
            inner: Mutex::new(StoreInner {
                table: None,
                players: None,
                // Nothing has been fetched yet.
                loading: true,
                error: None,
                connected: false,
                issued: 0,
            }),
            connected_tx,
            retry,
        }
    }

    /// Current state, cloned out so the lock is never held by callers.
    pub fn snapshot(&self) -> StoreSnapshot {
        let inner = self.inner.lock().expect("store mutex poisoned");
        StoreSnapshot {
            table: inner.table.clone(),
            players: inner.players.clone(),
            loading: inner.loading,
            error: inner.error.clone(),
            connected: inner.connected,
        }
    }

    /// Observe connection-health transitions (used by the poller).
    pub fn connected(&self) -> watch::Receiver<bool> {
        self.connected_tx.subscribe()
    }

    /// Perform one reconcile cycle immediately, independent of any timer.
    ///
    /// The returned result reflects this cycle's own reads. If a fresher
    /// cycle was issued while this one was in flight, nothing is applied to
    /// the store either way: the store keeps whatever the fresher cycle
    /// wrote, while this call still reports its own fetch outcome.
    ///
    /// # Errors
    ///
    /// Returns the terminal failure of this cycle's reads, after retries.
    pub async fn refresh(&self) -> Result<(), GatewayError> {
        let ticket = self.issue_ticket();
        let result = self.fetch_with_retry().await;
        self.apply(ticket, result)
    }

    fn issue_ticket(&self) -> u64 {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.issued += 1;
        inner.loading = true;
        inner.issued
    }

    /// Fetch table and roster concurrently, retrying transient transport
    /// failures with bounded exponential backoff.
    async fn fetch_with_retry(
        &self,
    ) -> Result<(TableState, PlayersSnapshot), GatewayError> {
        let mut delay = self.retry.initial_delay;
        let mut attempt = 0;
        loop {
            match self.fetch_once().await {
                Ok(pair) => return Ok(pair),
                Err(err) if err.is_transport() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    log::debug!("reconcile read failed ({err}), retry {attempt} in {delay:?}");
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(self.retry.max_delay);
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn fetch_once(&self) -> Result<(TableState, PlayersSnapshot), GatewayError> {
        let (table, players) = tokio::join!(self.gateway.table_state(), self.gateway.players());
        Ok((table?, players?))
    }

    /// Apply a cycle's outcome under last-issued-wins discipline.
    fn apply(
        &self,
        ticket: u64,
        result: Result<(TableState, PlayersSnapshot), GatewayError>,
    ) -> Result<(), GatewayError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        if ticket != inner.issued {
            // A fresher reconcile was issued while this one was in flight.
            log::debug!("discarding superseded reconcile (ticket {ticket} < {})", inner.issued);
            return result.map(|_| ());
        }
        inner.loading = false;
        match result {
            Ok((table, players)) => {
                inner.table = Some(table);
                inner.players = Some(players);
                inner.connected = true;
                inner.error = None;
                self.connected_tx.send_replace(true);
                Ok(())
            }
            Err(err) => {
                // Keep the previously held values; stale-but-present.
                inner.connected = false;
                inner.error = Some(err.to_string());
                self.connected_tx.send_replace(false);
                log::warn!("reconcile failed: {err}");
                Err(err)
            }
        }
    }
}

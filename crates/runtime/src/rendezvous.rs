//! Single-slot rendezvous between script submission and the inbound callback.
//!
//! At most one async script is in flight per session. [`PendingResponse`] is
//! the slot: `register` arms it and returns a [`ResponseWaiter`] for the
//! caller, the inbound callback path later settles it through `settle`.
//! Registration, settlement, and cleanup all go through one mutex so a
//! concurrent callback can never observe a half-armed slot, and a stray or
//! late delivery can never settle a newer registration (the originating
//! session id is validated on every settle).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use relay_protocol::AsyncScriptOutcome;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::error::{Error, Result};

#[derive(Debug)]
struct PendingEntry {
    ticket: u64,
    session_id: String,
    created_at: Instant,
    tx: oneshot::Sender<Result<Value>>,
}

/// The per-session pending async result slot.
#[derive(Debug, Default)]
pub struct PendingResponse {
    slot: Mutex<Option<PendingEntry>>,
    next_ticket: AtomicU64,
}

impl PendingResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the slot for one async script and returns the caller's waiter.
    ///
    /// A previously pending script is superseded: its waiter settles with
    /// [`Error::Superseded`] before the new registration takes the slot.
    pub fn register(
        self: &Arc<Self>,
        session_id: &str,
        timeout: Duration,
    ) -> ResponseWaiter {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();

        let mut slot = self.slot.lock();
        if let Some(prior) = slot.take() {
            tracing::warn!(
                target = "relay.rendezvous",
                session_id = %prior.session_id,
                age_ms = prior.created_at.elapsed().as_millis() as u64,
                "superseding pending async script"
            );
            let _ = prior.tx.send(Err(Error::Superseded));
        }
        *slot = Some(PendingEntry {
            ticket,
            session_id: session_id.to_owned(),
            created_at: Instant::now(),
            tx,
        });
        drop(slot);

        ResponseWaiter {
            ticket,
            timeout,
            rx,
            pending: Arc::clone(self),
            finished: false,
        }
    }

    /// Settles the pending slot with a classified outcome.
    ///
    /// Returns `false` without touching the slot when nothing is pending
    /// (a stray or late delivery) or when the delivery's session id does
    /// not match the registration's.
    pub fn settle(&self, session_id: &str, outcome: AsyncScriptOutcome) -> bool {
        let mut slot = self.slot.lock();
        let Some(entry) = slot.take() else {
            tracing::warn!(
                target = "relay.rendezvous",
                session_id,
                "received async response when none was expected, discarding"
            );
            return false;
        };
        if entry.session_id != session_id {
            tracing::warn!(
                target = "relay.rendezvous",
                delivered = session_id,
                pending = %entry.session_id,
                "async response session id does not match pending script, discarding"
            );
            *slot = Some(entry);
            return false;
        }
        drop(slot);

        let result = match outcome {
            AsyncScriptOutcome::Success(value) => Ok(value),
            AsyncScriptOutcome::Failure(failure) => Err(failure.into()),
        };
        if entry.tx.send(result).is_err() {
            tracing::debug!(
                target = "relay.rendezvous",
                session_id,
                "async response settled but the waiter is gone"
            );
        }
        true
    }

    /// Fails whatever is pending, regardless of session id.
    ///
    /// Used by the callback server lifecycle so stopping the listener never
    /// leaves a caller hanging.
    pub fn fail(&self, err: Error) -> bool {
        let Some(entry) = self.slot.lock().take() else {
            return false;
        };
        let _ = entry.tx.send(Err(err));
        true
    }

    pub fn is_pending(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Clears the slot if it still holds the given registration.
    fn abandon(&self, ticket: u64) {
        let mut slot = self.slot.lock();
        if slot.as_ref().is_some_and(|entry| entry.ticket == ticket) {
            *slot = None;
            tracing::debug!(target = "relay.rendezvous", "cleared abandoned pending slot");
        }
    }
}

/// Caller-side handle for an in-flight async script.
///
/// Dropping the waiter without awaiting it clears the slot, so an abandoned
/// caller never strands the rendezvous.
#[derive(Debug)]
pub struct ResponseWaiter {
    ticket: u64,
    timeout: Duration,
    rx: oneshot::Receiver<Result<Value>>,
    pending: Arc<PendingResponse>,
    finished: bool,
}

impl ResponseWaiter {
    /// Waits for the callback to settle the slot, bounded by the wait
    /// budget plus delivery grace chosen at registration.
    ///
    /// On timeout the slot is cleared, so a late delivery afterwards is a
    /// logged stray rather than a misdelivered result.
    pub async fn wait(mut self) -> Result<Value> {
        let result = match tokio::time::timeout(self.timeout, &mut self.rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::ChannelClosed),
            Err(_) => {
                self.pending.abandon(self.ticket);
                Err(Error::Timeout(self.timeout))
            }
        };
        self.finished = true;
        result
    }

    /// Timeout this waiter applies, exposed for the embedding driver.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Drop for ResponseWaiter {
    fn drop(&mut self) {
        if !self.finished {
            self.pending.abandon(self.ticket);
        }
    }
}

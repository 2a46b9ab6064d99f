//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

use thingdash_auth::Claims;

use crate::protocol::Envelope;

/// A handle to one live connection.
///
/// Holds the sender half of the connection's outbound queue plus the
/// identity claims attached at handshake time. The handle's `id` is the
/// socket id recorded in presence records.
#[derive(Debug)]
pub struct SocketHandle {
    /// Unique socket id.
    pub id: Uuid,
    /// Identity claims verified during the handshake.
    pub claims: Claims,
    /// Sender for outbound envelopes.
    sender: mpsc::Sender<Envelope>,
    /// When the connection was admitted.
    pub connected_at: DateTime<Utc>,
    /// Whether the connection is still alive.
    alive: AtomicBool,
}

impl SocketHandle {
    /// Create a handle for a freshly admitted connection.
    pub fn new(claims: Claims, sender: mpsc::Sender<Envelope>) -> Self {
        Self {
            id: Uuid::new_v4(),
            claims,
            sender,
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
        }
    }

    /// Queue an envelope for delivery to this connection.
    ///
    /// Never blocks: a full buffer drops the message, a closed channel
    /// marks the connection dead. Returns whether the message was queued.
    pub fn send(&self, envelope: Envelope) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(envelope) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(socket_id = %self.id, "Send buffer full, dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Check if the connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark the connection as dead.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

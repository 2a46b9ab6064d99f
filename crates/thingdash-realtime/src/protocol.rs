//! Wire-level event names and payload shapes.
//!
//! The event contract is a stable surface: dashboard clients depend on
//! the exact `{error, ...}` acknowledgment shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Room name addressing all connections bound to one user.
pub fn user_room(user_id: Uuid) -> String {
    format!("user:{user_id}")
}

/// Client → server events carried over an admitted connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Bind this connection to a user identity.
    AddUser {
        /// Target user id.
        user_id: Uuid,
    },
    /// Clear a user's presence record.
    RemoveUser {
        /// Target user id.
        user_id: Uuid,
    },
    /// Reconcile the stored socket id with this connection.
    CheckSocket {
        /// Target user id.
        user_id: Uuid,
    },
}

impl ClientEvent {
    /// The wire name the acknowledgment is emitted under.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddUser { .. } => "addUser",
            Self::RemoveUser { .. } => "removeUser",
            Self::CheckSocket { .. } => "checkSocket",
        }
    }
}

/// Structured acknowledgment for request/response style events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    /// Whether the operation failed.
    pub error: bool,
    /// Bound user id (success acks of `addUser` only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    /// Human-readable detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Ack {
    /// Success ack carrying the bound user id.
    pub fn bound(user_id: Uuid) -> Self {
        Self {
            error: false,
            user_id: Some(user_id),
            message: None,
        }
    }

    /// Success ack with a detail message.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            error: false,
            user_id: None,
            message: Some(message.into()),
        }
    }

    /// Failure ack. Never propagated as a transport-level error.
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            error: true,
            user_id: None,
            message: Some(message.into()),
        }
    }
}

/// Server → client message envelope: an event name plus its payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Event name.
    pub event: String,
    /// Application-defined payload.
    pub data: Value,
}

impl Envelope {
    /// Build an envelope, serializing the payload.
    pub fn new(event: impl Into<String>, data: impl Serialize) -> Self {
        Self {
            event: event.into(),
            data: serde_json::to_value(data).unwrap_or(Value::Null),
        }
    }
}

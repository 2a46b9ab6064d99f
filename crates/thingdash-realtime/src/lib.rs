//! # thingdash-realtime
//!
//! The presence registry and realtime gateway: authenticates every
//! inbound WebSocket connection, binds connections to user identities in
//! the presence store, and exposes the emit-to-user push primitive the
//! rest of the system addresses events with.

pub mod gateway;
pub mod handle;
pub mod protocol;
pub mod registry;
pub mod session;

pub use gateway::RealtimeGateway;
pub use handle::SocketHandle;
pub use protocol::{Ack, ClientEvent, Envelope};

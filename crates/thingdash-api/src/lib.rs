//! # thingdash-api
//!
//! HTTP API layer for ThingDash: the token-gated WebSocket upgrade, the
//! device-event push bridge, presence reads, and health checks.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;

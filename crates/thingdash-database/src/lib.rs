//! # thingdash-database
//!
//! PostgreSQL connection management and the presence store: the trait the
//! realtime gateway reads and writes presence records through, its sqlx
//! implementation, and an in-process implementation for tests and
//! development.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryPresenceStore;
pub use store::PresenceStore;

//! # thingdash-entity
//!
//! Persisted domain models for ThingDash.

pub mod user;

pub use user::User;

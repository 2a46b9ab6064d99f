//! HTTP request handlers.

pub mod device;
pub mod health;
pub mod presence;
pub mod ws;

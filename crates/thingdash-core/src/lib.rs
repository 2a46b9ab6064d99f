//! # thingdash-core
//!
//! Core crate for the ThingDash dashboard backend. Contains the
//! configuration schemas and the unified error system.
//!
//! This crate has **no** internal dependencies on other ThingDash crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::AppError;
pub use result::AppResult;

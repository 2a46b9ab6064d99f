//! # thingdash-auth
//!
//! Token verification for the ThingDash backend.
//!
//! ## Modules
//!
//! - `jwt`: JWT token creation and validation
//! - `bearer`: optional `"Bearer "` prefix handling for raw credentials

pub mod bearer;
pub mod jwt;

pub use bearer::strip_bearer;
pub use jwt::{Claims, JwtDecoder, JwtEncoder};

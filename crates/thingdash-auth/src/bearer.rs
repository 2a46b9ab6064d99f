//! Optional `"Bearer "` prefix handling for raw credentials.

/// Strip an optional `"Bearer "` prefix from a credential.
///
/// Borrows into the original value instead of mutating it; a credential
/// without the prefix is returned as-is.
pub fn strip_bearer(token: &str) -> &str {
    token.strip_prefix("Bearer ").unwrap_or(token)
}

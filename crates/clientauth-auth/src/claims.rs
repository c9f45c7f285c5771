//! Claims embedded in session tokens.

use serde::{Deserialize, Serialize};

/// Claim name holding the session subject.
pub const IDENTITY_KEY: &str = "phone_number";

/// JWT claims for session tokens.
///
/// - `phone_number`: identity key of the authenticated user
/// - `iat`: when this particular token was minted
/// - `exp`: expiry; the token is valid while `now < exp`
/// - `orig_iat`: issuance of the first token in a refresh chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub phone_number: String,
    pub iat: i64,
    pub exp: i64,
    pub orig_iat: i64,
}

impl SessionClaims {
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }

    /// Whether the chain started more than `max_refresh_secs` before `now`.
    pub fn refresh_window_elapsed_at(&self, now: i64, max_refresh_secs: i64) -> bool {
        self.orig_iat < now.saturating_sub(max_refresh_secs)
    }
}

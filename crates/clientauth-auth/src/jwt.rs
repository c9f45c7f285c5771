//! Session token minting, verification and refresh.
//!
//! Tokens are HS256 JWTs signed with [`JwtConfig::secret`]. Expiry is checked
//! here against an explicit `now` rather than by `jsonwebtoken`, so callers
//! with their own clock (the middleware, tests) get the same answer as
//! callers using wall time.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use clientauth_config::JwtConfig;

use crate::claims::SessionClaims;
use crate::error::AuthError;

/// A freshly signed token together with its claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub claims: SessionClaims,
}

impl IssuedToken {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.claims.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Mints a session token for `phone_number` using wall time.
pub fn create_session_token(
    phone_number: &str,
    jwt_config: &JwtConfig,
) -> Result<IssuedToken, AuthError> {
    create_session_token_at(phone_number, Utc::now(), jwt_config)
}

/// Mints a session token as of `now`, starting a new refresh chain.
pub fn create_session_token_at(
    phone_number: &str,
    now: DateTime<Utc>,
    jwt_config: &JwtConfig,
) -> Result<IssuedToken, AuthError> {
    let iat = now.timestamp();
    sign(
        SessionClaims {
            phone_number: phone_number.to_string(),
            iat,
            exp: expiry(iat, jwt_config)?,
            orig_iat: iat,
        },
        jwt_config,
    )
}

/// Verifies signature and expiry using wall time.
pub fn verify_session_token(
    token: &str,
    jwt_config: &JwtConfig,
) -> Result<SessionClaims, AuthError> {
    verify_session_token_at(token, Utc::now(), jwt_config)
}

/// Verifies signature and expiry as of `now`.
///
/// # Errors
///
/// - [`AuthError::InvalidSignature`] if the token was signed with another key
/// - [`AuthError::Malformed`] if it is not a JWT or lacks a required claim
/// - [`AuthError::Expired`] if `now >= exp`
pub fn verify_session_token_at(
    token: &str,
    now: DateTime<Utc>,
    jwt_config: &JwtConfig,
) -> Result<SessionClaims, AuthError> {
    let claims = decode_unchecked_expiry(token, jwt_config)?;
    if claims.is_expired_at(now.timestamp()) {
        return Err(AuthError::Expired);
    }
    if claims.phone_number.is_empty() {
        return Err(AuthError::Malformed("missing phone_number claim".to_string()));
    }
    Ok(claims)
}

/// Refreshes a token using wall time.
pub fn refresh_session_token(
    token: &str,
    jwt_config: &JwtConfig,
) -> Result<IssuedToken, AuthError> {
    refresh_session_token_at(token, Utc::now(), jwt_config)
}

/// Mints a replacement for `token` as of `now`.
///
/// The old token may already be expired; what bounds refreshing is the
/// original issuance time, which carries over unchanged into the new token.
///
/// # Errors
///
/// Returns [`AuthError::RefreshWindowElapsed`] once `orig_iat` is older than
/// `max_refresh_secs`, plus the signature/format errors of verification.
pub fn refresh_session_token_at(
    token: &str,
    now: DateTime<Utc>,
    jwt_config: &JwtConfig,
) -> Result<IssuedToken, AuthError> {
    let old = decode_unchecked_expiry(token, jwt_config)?;
    let now = now.timestamp();

    if old.refresh_window_elapsed_at(now, jwt_config.max_refresh_secs) {
        return Err(AuthError::RefreshWindowElapsed);
    }

    sign(
        SessionClaims {
            phone_number: old.phone_number,
            iat: now,
            exp: expiry(now, jwt_config)?,
            orig_iat: old.orig_iat,
        },
        jwt_config,
    )
}

fn expiry(iat: i64, jwt_config: &JwtConfig) -> Result<i64, AuthError> {
    iat.checked_add(jwt_config.timeout_secs).ok_or_else(|| {
        AuthError::Signing(format!("timeout of {}s overflows", jwt_config.timeout_secs))
    })
}

fn sign(claims: SessionClaims, jwt_config: &JwtConfig) -> Result<IssuedToken, AuthError> {
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AuthError::Signing(e.to_string()))?;

    Ok(IssuedToken { token, claims })
}

fn decode_unchecked_expiry(
    token: &str,
    jwt_config: &JwtConfig,
) -> Result<SessionClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(AuthError::from)
}

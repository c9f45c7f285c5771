//! # Clientauth Auth
//!
//! Session token primitives for the clientauth middleware.
//!
//! - [`claims`]: the [`SessionClaims`] carried by every session token
//! - [`jwt`]: minting, verification and refresh of HS256 tokens
//! - [`error`]: [`AuthError`], every way authentication can fail
//!
//! # Token lifecycle
//!
//! A token is minted at login with `iat = orig_iat = now` and
//! `exp = now + timeout`. Verification requires a valid signature and
//! `now < exp`. Refresh accepts a correctly signed token, even an expired
//! one, as long as `orig_iat` lies within the max-refresh window; the new
//! token keeps `orig_iat` so the window is never extended.
//!
//! # Example
//!
//! ```ignore
//! use clientauth_auth::{create_session_token, verify_session_token};
//! use clientauth_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let issued = create_session_token("15000000000", &config)?;
//! let claims = verify_session_token(&issued.token, &config)?;
//! assert_eq!(claims.phone_number, "15000000000");
//! ```

pub mod claims;
pub mod error;
pub mod jwt;

pub use claims::{IDENTITY_KEY, SessionClaims};
pub use error::AuthError;
pub use jwt::{
    IssuedToken, create_session_token, create_session_token_at, refresh_session_token,
    refresh_session_token_at, verify_session_token, verify_session_token_at,
};

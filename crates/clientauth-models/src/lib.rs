//! # Clientauth Models
//!
//! Data exchanged with the remote user service and the session endpoints:
//!
//! - [`users`]: the [`User`] record
//! - [`envelope`]: the `{code, data, message}` result wrapper
//! - [`auth`]: login credentials and token grants

pub mod auth;
pub mod envelope;
pub mod users;

pub use auth::{Credentials, TokenResponse};
pub use envelope::{CODE_SUCCESS, Envelope, EnvelopeError};
pub use users::User;

//! Gateway error types.

use clientauth_models::EnvelopeError;

/// Errors returned by [`crate::UserGateway`] calls.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request never produced a response (connect, timeout, TLS, ...).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not what the endpoint promises.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The service answered with a non-zero envelope code.
    #[error("remote error: {0}")]
    Envelope(#[from] EnvelopeError),

    /// No session token is held, or the service rejected it.
    #[error("authentication required: {0}")]
    Authentication(String),

    /// A login or refresh response lacked the `token` field.
    #[error("token is nil")]
    MissingToken,

    /// A successful envelope lacked the `data` the call needs.
    #[error("response carried no data")]
    MissingData,

    #[error("failed to build http client: {0}")]
    Client(String),
}

impl GatewayError {
    pub fn is_authentication(&self) -> bool {
        matches!(self, GatewayError::Authentication(_))
    }

    pub fn is_envelope(&self) -> bool {
        matches!(self, GatewayError::Envelope(_))
    }
}

//! Authentication and authorization failures.

use clientauth_core::{AppError, StatusCode};

/// Errors raised while authenticating a login or a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("auth header is empty")]
    EmptyAuthHeader,

    #[error("auth header is invalid")]
    InvalidAuthHeader,

    #[error("signature is invalid")]
    InvalidSignature,

    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("token is expired")]
    Expired,

    #[error("token refresh window has elapsed")]
    RefreshWindowElapsed,

    #[error("missing login values")]
    MissingLoginValues,

    #[error("incorrect credentials")]
    IncorrectCredentials,

    #[error("identity could not be resolved")]
    IdentityUnresolved,

    #[error("you don't have permission to access this resource")]
    Forbidden,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl AuthError {
    /// HTTP status used when this error is reported to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Label used for metrics and logs.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::EmptyAuthHeader => "empty_header",
            AuthError::InvalidAuthHeader => "invalid_header",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::Malformed(_) => "malformed",
            AuthError::Expired => "expired",
            AuthError::RefreshWindowElapsed => "refresh_window_elapsed",
            AuthError::MissingLoginValues => "missing_login_values",
            AuthError::IncorrectCredentials => "incorrect_credentials",
            AuthError::IdentityUnresolved => "identity_unresolved",
            AuthError::Forbidden => "forbidden",
            AuthError::Signing(_) => "signing",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::Malformed(err.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::new(err.status(), anyhow::Error::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AuthError::Expired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::IncorrectCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::Malformed("x".to_string()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::Signing("x".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_into_app_error_keeps_message() {
        let app: AppError = AuthError::EmptyAuthHeader.into();
        assert_eq!(app.status, StatusCode::UNAUTHORIZED);
        assert_eq!(app.message(), "auth header is empty");
    }
}

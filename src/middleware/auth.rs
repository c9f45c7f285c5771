use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use clientauth_core::AppError;

use crate::metrics;
use crate::middleware::engine::AuthEngine;
use crate::middleware::identity::Identity;

/// Guards a route: authenticates the bearer token, resolves the identity,
/// applies the authorizer and hands the [`Identity`] to the handler.
pub async fn require_session(
    State(engine): State<AuthEngine>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let identity = match engine.verify(&parts.headers).await {
        Ok(identity) => identity,
        Err(err) => {
            debug!(path = %parts.uri.path(), reason = err.reason(), "session rejected");
            metrics::track_verification(Err(&err));
            return engine.reject(&err);
        }
    };

    if let Err(err) = engine.authorize(&identity, &parts) {
        metrics::track_verification(Err(&err));
        return engine.reject(&err);
    }

    metrics::track_verification(Ok(()));
    parts.extensions.insert(identity);
    next.run(Request::from_parts(parts, body)).await
}

/// Extractor for the identity resolved by [`require_session`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl AuthUser {
    pub fn phone_number(&self) -> &str {
        self.0.phone_number()
    }

    pub fn is_superuser(&self) -> bool {
        self.0.superuser
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::unauthorized(anyhow::anyhow!("route is not protected by a session")))
    }
}

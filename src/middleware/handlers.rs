use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{info, warn};

use crate::metrics;
use crate::middleware::engine::AuthEngine;
use crate::validator::LoginCredentials;

/// `POST /login`
pub async fn login(
    State(engine): State<AuthEngine>,
    LoginCredentials(credentials): LoginCredentials,
) -> Response {
    match engine.login(&credentials).await {
        Ok((identity, issued)) => {
            info!(
                phone_number = %identity.phone_number(),
                superuser = identity.superuser,
                "login succeeded"
            );
            metrics::track_login(Ok(()));
            metrics::track_token_issued();
            engine.token_response(&issued)
        }
        Err(err) => {
            metrics::track_login(Err(&err));
            engine.reject(&err)
        }
    }
}

/// `POST /logout`
///
/// Tokens are not revoked server side; the caller drops its copy.
pub async fn logout() -> Response {
    info!("logout");
    Json(json!({ "code": StatusCode::OK.as_u16() })).into_response()
}

/// `GET /refresh_token`
pub async fn refresh_token(State(engine): State<AuthEngine>, headers: HeaderMap) -> Response {
    match engine.refresh(&headers) {
        Ok(issued) => {
            info!(phone_number = %issued.claims.phone_number, "token refreshed");
            metrics::track_refresh(Ok(()));
            metrics::track_token_issued();
            engine.token_response(&issued)
        }
        Err(err) => {
            warn!(reason = err.reason(), "refresh rejected");
            metrics::track_refresh(Err(&err));
            engine.reject(&err)
        }
    }
}

/// Fallback for unmatched paths, reached only with a valid session.
pub async fn no_route(State(engine): State<AuthEngine>) -> Response {
    engine.no_route()
}

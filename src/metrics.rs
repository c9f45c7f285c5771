use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use clientauth_auth::AuthError;

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// Check if observability is enabled via OBSERVABILITY_ENABLED env var
pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true)
    })
}

/// Installs the Prometheus recorder and its upkeep task.
/// Returns None if observability is disabled.
pub fn init_metrics() -> anyhow::Result<Option<PrometheusHandle>> {
    if !is_observability_enabled() {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )?
        .install_recorder()?;

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Ok(Some(handle))
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(req).await;

    let status = response.status().as_u16().to_string();
    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status).increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path)
        .record(start.elapsed().as_secs_f64());

    response
}

pub fn metrics_app(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

fn outcome(result: Result<(), &AuthError>) -> &'static str {
    match result {
        Ok(()) => "success",
        Err(err) => err.reason(),
    }
}

pub fn track_login(result: Result<(), &AuthError>) {
    if !is_observability_enabled() {
        return;
    }
    counter!("auth_logins_total", "status" => outcome(result)).increment(1);
}

pub fn track_superuser_login() {
    if !is_observability_enabled() {
        return;
    }
    counter!("auth_superuser_logins_total").increment(1);
}

pub fn track_token_issued() {
    if !is_observability_enabled() {
        return;
    }
    counter!("auth_tokens_issued_total").increment(1);
}

pub fn track_refresh(result: Result<(), &AuthError>) {
    if !is_observability_enabled() {
        return;
    }
    counter!("auth_token_refreshes_total", "status" => outcome(result)).increment(1);
}

pub fn track_verification(result: Result<(), &AuthError>) {
    if !is_observability_enabled() {
        return;
    }
    counter!("auth_verifications_total", "status" => outcome(result)).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(outcome(Ok(())), "success");
        assert_eq!(outcome(Err(&AuthError::Expired)), "expired");
    }

    #[test]
    fn test_tracking_without_recorder_is_noop() {
        track_login(Err(&AuthError::IncorrectCredentials));
        track_token_issued();
        track_refresh(Ok(()));
        track_verification(Err(&AuthError::Forbidden));
    }
}

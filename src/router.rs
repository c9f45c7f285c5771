use axum::{
    Json, Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;

use clientauth_config::CorsConfig;
use clientauth_models::User;

use crate::logging::logging_middleware;
use crate::metrics::{metrics_app, metrics_middleware};
use crate::middleware::{AuthEngine, AuthUser, handlers, require_session};

/// The engine's own endpoints: `POST /login`, `POST /logout` and
/// `GET /refresh_token`.
pub fn session_routes<S>(engine: &AuthEngine) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/refresh_token", get(handlers::refresh_token))
        .with_state(engine.clone())
}

/// Runs [`require_session`] in front of every route of `routes`.
///
/// `routes` must contain at least one route.
pub fn protect<S>(engine: &AuthEngine, routes: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    routes.route_layer(middleware::from_fn_with_state(
        engine.clone(),
        require_session,
    ))
}

/// Binds the engine onto a host router.
///
/// `public` routes are served as is, `protected` routes require a session,
/// and unmatched paths go through the session check before the `NoRoute`
/// hook answers.
pub fn mount<S>(public: Router<S>, protected: Router<S>, engine: &AuthEngine) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let fallback: Router = Router::new()
        .fallback(handlers::no_route)
        .layer(middleware::from_fn_with_state(
            engine.clone(),
            require_session,
        ))
        .with_state(engine.clone());

    public
        .merge(session_routes(engine))
        .merge(protect(engine, protected))
        .fallback_service(fallback)
}

/// `GET /me`
async fn me(AuthUser(identity): AuthUser) -> Json<User> {
    Json(User {
        password: String::new(),
        ..identity.user
    })
}

/// The demo host: a protected `/me`, CORS, request logging and metrics.
pub fn init_router(
    engine: &AuthEngine,
    cors_config: &CorsConfig,
    metrics_handle: Option<PrometheusHandle>,
) -> Router {
    let mut public = Router::new().route("/health", get(|| async { "ok" }));
    if let Some(handle) = metrics_handle {
        public = public.merge(metrics_app(handle));
    }
    let protected = Router::new().route("/me", get(me));

    let allowed_origins: Vec<HeaderValue> = cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    mount(public, protected, engine)
        .layer(
            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .expose_headers([header::AUTHORIZATION])
                .allow_credentials(true),
        )
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}

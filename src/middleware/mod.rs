//! Bearer-session middleware for axum hosts.
//!
//! [`AuthEngine`] owns the token lifecycle: it serves `POST /login`,
//! `POST /logout` and `GET /refresh_token`, and [`require_session`] guards
//! protected routes by authenticating the bearer token, resolving the
//! phone number claim through the [`IdentityResolver`] and applying the
//! [`Authorizer`]. Every failure is answered through the `Unauthorized`
//! hook; none is propagated to the host.
//!
//! Use [`crate::router::mount`] to wire it into a host router.

pub mod auth;
pub mod authorize;
pub mod config;
pub mod engine;
pub mod handlers;
pub mod identity;

pub use auth::{AuthUser, require_session};
pub use authorize::{AllowAll, Authorizer};
pub use config::{Clock, MiddlewareConfig, NoRouteHandler, UnauthorizedHandler};
pub use engine::AuthEngine;
pub use identity::{GatewayResolver, Identity, IdentityResolver};

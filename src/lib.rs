//! # Clientauth
//!
//! Phone number / one-time-code authentication for axum hosts.
//!
//! ## Overview
//!
//! - **Session tokens**: HS256 JWTs keyed by `phone_number`, 24 hour lifetime,
//!   refreshable within a window measured from the original login
//! - **Identity resolution**: a pluggable [`IdentityResolver`] turns the
//!   phone number claim into a user, by default through the remote user
//!   service
//! - **Authorization**: a pluggable [`Authorizer`] decides per request
//! - **Superuser**: an optional configured account that bypasses the resolver
//!
//! ## Architecture
//!
//! ```text
//! crates/
//! ├── clientauth-core/      # AppError and the failure body
//! ├── clientauth-config/    # env-driven configuration
//! ├── clientauth-models/    # User, Envelope, Credentials
//! ├── clientauth-auth/      # claims, token minting and refresh
//! ├── clientauth-gateway/   # remote user service client and token store
//! └── clientauth-cli/       # command line client
//! src/
//! ├── middleware/           # AuthEngine, hooks, handlers, extractors
//! ├── router.rs             # mounting onto a host router
//! ├── validator.rs          # login value extraction
//! ├── logging.rs
//! └── metrics.rs
//! ```
//!
//! ## Mounting
//!
//! ```ignore
//! use std::sync::Arc;
//! use axum::{Router, routing::get};
//! use clientauth::middleware::{AuthEngine, MiddlewareConfig};
//! use clientauth::router::mount;
//!
//! let gateway = Arc::new(UserGateway::new(&GatewayConfig::from_env()?)?);
//! let engine = AuthEngine::new(MiddlewareConfig::for_gateway(JwtConfig::from_env(), gateway))?;
//!
//! let app = mount(
//!     Router::new(),
//!     Router::new().route("/me", get(me)),
//!     &engine,
//! );
//! ```

pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod validator;

pub use middleware::{
    AllowAll, AuthEngine, AuthUser, Authorizer, GatewayResolver, Identity, IdentityResolver,
    MiddlewareConfig,
};

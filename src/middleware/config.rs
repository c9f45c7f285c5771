use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, Utc};

use clientauth_config::{JwtConfig, Profile, SuperuserConfig};
use clientauth_core::StatusCode;
use clientauth_gateway::UserGateway;

use crate::middleware::authorize::Authorizer;
use crate::middleware::identity::{GatewayResolver, IdentityResolver};

/// Builds the failure response for a status and message.
pub type UnauthorizedHandler = Arc<dyn Fn(StatusCode, &str) -> Response + Send + Sync>;

/// Builds the response for requests that matched no route.
pub type NoRouteHandler = Arc<dyn Fn() -> Response + Send + Sync>;

/// Source of "now" for token expiry checks.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Options for [`AuthEngine::new`](crate::middleware::AuthEngine::new).
///
/// Unset hooks fall back to the defaults: the `{code:-1,message}` failure
/// body, a 404 envelope for unmatched paths, an allow-all authorizer and
/// wall-clock time.
#[derive(Clone)]
pub struct MiddlewareConfig {
    pub jwt: JwtConfig,
    pub profile: Profile,
    pub superuser: Option<SuperuserConfig>,
    pub identity_resolver: Option<Arc<dyn IdentityResolver>>,
    pub authorizer: Option<Arc<dyn Authorizer>>,
    pub unauthorized: Option<UnauthorizedHandler>,
    pub no_route: Option<NoRouteHandler>,
    pub clock: Option<Clock>,
}

impl MiddlewareConfig {
    pub fn new(jwt: JwtConfig) -> Self {
        Self {
            jwt,
            profile: Profile::default(),
            superuser: None,
            identity_resolver: None,
            authorizer: None,
            unauthorized: None,
            no_route: None,
            clock: None,
        }
    }

    /// Resolves identities through `gateway`, following its profile.
    pub fn for_gateway(jwt: JwtConfig, gateway: Arc<UserGateway>) -> Self {
        let profile = gateway.profile();
        Self::new(jwt)
            .profile(profile)
            .identity_resolver(GatewayResolver::new(gateway))
    }

    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.jwt.realm = realm.into();
        self
    }

    pub fn profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    pub fn superuser(mut self, superuser: impl Into<Option<SuperuserConfig>>) -> Self {
        self.superuser = superuser.into();
        self
    }

    pub fn identity_resolver(mut self, resolver: impl IdentityResolver + 'static) -> Self {
        self.identity_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn authorizer(mut self, authorizer: impl Authorizer + 'static) -> Self {
        self.authorizer = Some(Arc::new(authorizer));
        self
    }

    pub fn unauthorized<F>(mut self, hook: F) -> Self
    where
        F: Fn(StatusCode, &str) -> Response + Send + Sync + 'static,
    {
        self.unauthorized = Some(Arc::new(hook));
        self
    }

    pub fn no_route<F>(mut self, hook: F) -> Self
    where
        F: Fn() -> Response + Send + Sync + 'static,
    {
        self.no_route = Some(Arc::new(hook));
        self
    }

    pub fn clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Some(Arc::new(clock));
        self
    }
}

use std::fmt;
use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    Json,
    http::{HeaderMap, HeaderValue, header, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use clientauth_auth::{
    AuthError, IssuedToken, create_session_token_at, refresh_session_token_at,
    verify_session_token_at,
};
use clientauth_config::{ConfigError, JwtConfig, Profile, SuperuserConfig, SuperuserPassword};
use clientauth_core::{AppError, ErrorBody, StatusCode};
use clientauth_models::{Credentials, TokenResponse, User};

use crate::metrics;
use crate::middleware::authorize::{AllowAll, Authorizer};
use crate::middleware::config::{Clock, MiddlewareConfig, NoRouteHandler, UnauthorizedHandler};
use crate::middleware::identity::{Identity, IdentityResolver};

/// The authentication state machine shared by every mounted route.
///
/// Cloning is cheap; all clones share the same read-only configuration.
#[derive(Clone)]
pub struct AuthEngine {
    inner: Arc<Inner>,
}

struct Inner {
    jwt: JwtConfig,
    profile: Profile,
    superuser: Option<SuperuserConfig>,
    resolver: Arc<dyn IdentityResolver>,
    authorizer: Arc<dyn Authorizer>,
    unauthorized: UnauthorizedHandler,
    no_route: NoRouteHandler,
    clock: Clock,
    challenge: HeaderValue,
}

impl AuthEngine {
    /// Validates `config` and builds the engine.
    ///
    /// Hosts must not serve when this fails.
    pub fn new(config: MiddlewareConfig) -> Result<Self, ConfigError> {
        config.jwt.validate()?;
        if let Some(superuser) = &config.superuser {
            superuser.validate()?;
        }
        let resolver = config
            .identity_resolver
            .ok_or(ConfigError::MissingIdentityResolver)?;

        let challenge = HeaderValue::from_str(&format!("JWT realm=\"{}\"", config.jwt.realm))
            .map_err(|_| ConfigError::InvalidValue {
                key: "AUTH_REALM",
                value: config.jwt.realm.clone(),
            })?;

        info!(
            realm = %config.jwt.realm,
            profile = %config.profile,
            superuser = config.superuser.is_some(),
            "auth engine ready"
        );

        let authorizer: Arc<dyn Authorizer> = match config.authorizer {
            Some(authorizer) => authorizer,
            None => Arc::new(AllowAll),
        };
        let unauthorized: UnauthorizedHandler = match config.unauthorized {
            Some(hook) => hook,
            None => Arc::new(default_unauthorized),
        };
        let no_route: NoRouteHandler = match config.no_route {
            Some(hook) => hook,
            None => Arc::new(default_no_route),
        };
        let clock: Clock = match config.clock {
            Some(clock) => clock,
            None => Arc::new(Utc::now),
        };

        Ok(Self {
            inner: Arc::new(Inner {
                jwt: config.jwt,
                profile: config.profile,
                superuser: config.superuser,
                resolver,
                authorizer,
                unauthorized,
                no_route,
                clock,
                challenge,
            }),
        })
    }

    pub fn realm(&self) -> &str {
        &self.inner.jwt.realm
    }

    pub fn profile(&self) -> Profile {
        self.inner.profile
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.inner.clock)()
    }

    /// Runs the login step and mints a token for the resulting identity.
    ///
    /// The superuser pair is checked first and never reaches the resolver.
    pub async fn login(&self, credentials: &Credentials) -> Result<(Identity, IssuedToken), AuthError> {
        let identity = match self.superuser_login(credentials) {
            Some(identity) => identity,
            None => {
                if credentials.phone_number.is_empty() {
                    return Err(AuthError::MissingLoginValues);
                }
                let user = self.inner.resolver.authenticate(credentials).await.map_err(|e| {
                    warn!(phone_number = %credentials.phone_number, error = %e, "login rejected");
                    AuthError::IncorrectCredentials
                })?;
                Identity::user(user)
            }
        };

        let issued = create_session_token_at(identity.phone_number(), self.now(), &self.inner.jwt)?;
        Ok((identity, issued))
    }

    /// Authenticates a bearer token and resolves its identity.
    pub async fn verify(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
        let token = bearer_token(headers)?;
        let claims = verify_session_token_at(&token, self.now(), &self.inner.jwt)?;

        if let Some(identity) = self.superuser_identity(&claims.phone_number) {
            return Ok(identity);
        }

        let user = self
            .inner
            .resolver
            .resolve(&claims.phone_number)
            .await
            .map_err(|e| {
                warn!(phone_number = %claims.phone_number, error = %e, "identity resolution failed");
                AuthError::IdentityUnresolved
            })?;
        Ok(Identity::user(user))
    }

    pub fn authorize(&self, identity: &Identity, request: &Parts) -> Result<(), AuthError> {
        if self.inner.authorizer.authorize(identity, request) {
            Ok(())
        } else {
            debug!(phone_number = %identity.phone_number(), path = %request.uri.path(), "access denied");
            Err(AuthError::Forbidden)
        }
    }

    /// Mints a replacement for the bearer token in `headers`.
    pub fn refresh(&self, headers: &HeaderMap) -> Result<IssuedToken, AuthError> {
        let token = bearer_token(headers)?;
        refresh_session_token_at(&token, self.now(), &self.inner.jwt)
    }

    /// Answers a login or refresh with the issued token.
    pub fn token_response(&self, issued: &IssuedToken) -> Response {
        let body = TokenResponse {
            code: i64::from(StatusCode::OK.as_u16()),
            token: issued.token.clone(),
            expire: issued.expires_at(),
        };
        let mut response = Json(body).into_response();

        if self.inner.jwt.send_authorization {
            match HeaderValue::from_str(&format!("Bearer {}", issued.token)) {
                Ok(value) => {
                    response.headers_mut().insert(header::AUTHORIZATION, value);
                }
                Err(e) => warn!(error = %e, "token is not a valid header value"),
            }
        }
        response
    }

    /// Reports an authentication or authorization failure.
    pub fn reject(&self, err: &AuthError) -> Response {
        self.unauthorized(err.status(), &err.to_string())
    }

    /// Runs the `Unauthorized` hook and adds the realm challenge.
    pub fn unauthorized(&self, status: StatusCode, message: &str) -> Response {
        let mut response = (self.inner.unauthorized)(status, message);
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, self.inner.challenge.clone());
        response
    }

    pub fn no_route(&self) -> Response {
        (self.inner.no_route)()
    }

    /// Whether `credentials` carry the configured superuser pair. The phone
    /// number field plays no part.
    pub fn is_superuser(&self, credentials: &Credentials) -> bool {
        self.inner.superuser.as_ref().is_some_and(|superuser| {
            credentials.username == superuser.username
                && password_matches(&superuser.password, &credentials.password)
        })
    }

    fn superuser_login(&self, credentials: &Credentials) -> Option<Identity> {
        if !self.is_superuser(credentials) {
            return None;
        }
        let superuser = self.inner.superuser.as_ref()?;
        info!(username = %superuser.username, "superuser login");
        metrics::track_superuser_login();
        Some(superuser_identity(superuser))
    }

    fn superuser_identity(&self, phone_number: &str) -> Option<Identity> {
        self.inner
            .superuser
            .as_ref()
            .filter(|s| s.phone_number == phone_number)
            .map(superuser_identity)
    }
}

impl fmt::Debug for AuthEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthEngine")
            .field("realm", &self.inner.jwt.realm)
            .field("profile", &self.inner.profile)
            .field("superuser", &self.inner.superuser.is_some())
            .finish_non_exhaustive()
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    match headers.get(header::AUTHORIZATION) {
        None => return Err(AuthError::EmptyAuthHeader),
        Some(value) if value.is_empty() => return Err(AuthError::EmptyAuthHeader),
        Some(_) => {}
    }
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidAuthHeader)
}

fn password_matches(expected: &SuperuserPassword, given: &str) -> bool {
    match expected {
        SuperuserPassword::Plain(password) => !given.is_empty() && password == given,
        SuperuserPassword::Bcrypt(hash) => bcrypt::verify(given, hash).unwrap_or(false),
    }
}

fn superuser_identity(superuser: &SuperuserConfig) -> Identity {
    Identity {
        user: User {
            username: superuser.username.clone(),
            phone_number: superuser.phone_number.clone(),
            ..User::default()
        },
        superuser: true,
    }
}

fn default_unauthorized(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorBody::new(message))).into_response()
}

fn default_no_route() -> Response {
    AppError::not_found(anyhow!("page not found")).into_response()
}

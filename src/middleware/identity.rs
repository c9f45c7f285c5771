use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, bail};
use async_trait::async_trait;
use serde::Serialize;

use clientauth_config::Profile;
use clientauth_gateway::UserGateway;
use clientauth_models::{Credentials, User};

/// The identity attached to an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user: User,
    /// Set when the session belongs to the configured superuser.
    pub superuser: bool,
}

impl Identity {
    pub fn user(user: User) -> Self {
        Self {
            user,
            superuser: false,
        }
    }

    pub fn phone_number(&self) -> &str {
        &self.user.phone_number
    }
}

/// Turns a phone number claim into an application user.
///
/// Implementations are shared by every in-flight request and must tolerate
/// concurrent calls.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, phone_number: &str) -> anyhow::Result<User>;

    /// Performs the login step. Defaults to resolving the phone number.
    async fn authenticate(&self, credentials: &Credentials) -> anyhow::Result<User> {
        self.resolve(&credentials.phone_number).await
    }
}

#[async_trait]
impl<F, Fut> IdentityResolver for F
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<User>> + Send + 'static,
{
    async fn resolve(&self, phone_number: &str) -> anyhow::Result<User> {
        (self)(phone_number.to_string()).await
    }
}

/// Resolves identities against the remote user service.
///
/// Under [`Profile::Registration`] the login step exchanges the phone
/// number and code through `register_or_login`; otherwise it is a lookup.
/// Lookups never require the gateway to hold a session of its own.
#[derive(Debug, Clone)]
pub struct GatewayResolver {
    gateway: Arc<UserGateway>,
}

impl GatewayResolver {
    pub fn new(gateway: Arc<UserGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl IdentityResolver for GatewayResolver {
    async fn resolve(&self, phone_number: &str) -> anyhow::Result<User> {
        self.gateway
            .lookup_user_by_phone_number(phone_number)
            .await
            .with_context(|| format!("looking up {phone_number}"))
    }

    async fn authenticate(&self, credentials: &Credentials) -> anyhow::Result<User> {
        match self.gateway.profile() {
            Profile::Standard => self.resolve(&credentials.phone_number).await,
            Profile::Registration => {
                if credentials.code.is_empty() {
                    bail!("registration login requires a code");
                }
                let user = self
                    .gateway
                    .register_or_login(&credentials.phone_number, &credentials.code)
                    .await?;
                Ok(user)
            }
        }
    }
}

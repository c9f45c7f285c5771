//! The remote user service client.

use reqwest::{Method, RequestBuilder, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use clientauth_config::{GatewayConfig, Profile};
use clientauth_models::{Credentials, Envelope, User};

use crate::error::GatewayError;
use crate::token_store::TokenStore;

/// Client for the remote user service.
///
/// Construct one per session and pass it by reference; each instance owns
/// its own [`TokenStore`]. Whether user CRUD carries the stored bearer token
/// is decided by the configured [`Profile`].
///
/// Per-call timeouts come from [`GatewayConfig::request_timeout`]. Dropping
/// a returned future cancels the call.
#[derive(Debug)]
pub struct UserGateway {
    config: GatewayConfig,
    http: reqwest::Client,
    tokens: TokenStore,
}

impl UserGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GatewayError::Client(e.to_string()))?;

        Ok(Self::with_client(config.clone(), http))
    }

    pub fn with_client(config: GatewayConfig, http: reqwest::Client) -> Self {
        Self {
            config,
            http,
            tokens: TokenStore::new(),
        }
    }

    pub fn profile(&self) -> Profile {
        self.config.profile
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// The currently held session token, if any.
    pub fn token(&self) -> Option<String> {
        self.tokens.get()
    }

    /// Seeds the slot with a token obtained elsewhere.
    pub fn set_token(&self, token: impl Into<String>) {
        self.tokens.set(token);
    }

    /// Requests a one-time registration code for `phone_number`.
    #[instrument(skip(self))]
    pub async fn get_register_code(&self, phone_number: &str) -> Result<String, GatewayError> {
        let response = self
            .request(Method::GET, "/register")
            .query(&[("phone_number", phone_number)])
            .send()
            .await?;

        Self::envelope::<String>(response)
            .await?
            .ok_or(GatewayError::MissingData)
    }

    /// Registers `phone_number` if needed and returns its user record.
    #[instrument(skip(self, code))]
    pub async fn register_or_login(
        &self,
        phone_number: &str,
        code: &str,
    ) -> Result<User, GatewayError> {
        let response = self
            .request(Method::POST, "/register")
            .query(&[("phone_number", phone_number), ("code", code)])
            .send()
            .await?;

        Self::envelope::<User>(response)
            .await?
            .ok_or(GatewayError::MissingData)
    }

    /// Registration-profile variant of [`Self::register_or_login`] that also
    /// sends the initial user record.
    #[instrument(skip(self, code, user))]
    pub async fn register_user(
        &self,
        phone_number: &str,
        code: &str,
        user: &User,
    ) -> Result<User, GatewayError> {
        let response = self
            .request(Method::POST, "/register")
            .query(&[("phone_number", phone_number), ("code", code)])
            .json(user)
            .send()
            .await?;

        Self::envelope::<User>(response)
            .await?
            .ok_or(GatewayError::MissingData)
    }

    #[instrument(skip(self))]
    pub async fn get_user_by_id(&self, id: &str) -> Result<User, GatewayError> {
        self.get_user(&[("id", id)]).await
    }

    #[instrument(skip(self))]
    pub async fn get_user_by_phone_number(&self, phone_number: &str) -> Result<User, GatewayError> {
        self.get_user(&[("phone_number", phone_number)]).await
    }

    /// Looks a user up on behalf of a server-side host.
    ///
    /// The held token is attached when there is one; otherwise the request
    /// goes out bare and the service decides.
    #[instrument(skip(self))]
    pub async fn lookup_user_by_phone_number(
        &self,
        phone_number: &str,
    ) -> Result<User, GatewayError> {
        let builder = self
            .request(Method::GET, "/user")
            .query(&[("phone_number", phone_number)]);
        let response = self.attach_held_token(builder).send().await?;

        Self::envelope::<User>(response)
            .await?
            .ok_or(GatewayError::MissingData)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_user_by_id(&self, id: &str, patch: &User) -> Result<(), GatewayError> {
        let builder = self
            .request(Method::PUT, "/user")
            .query(&[("id", id)])
            .json(patch);
        let response = self.authorize(builder)?.send().await?;

        Self::envelope::<serde_json::Value>(response).await?;
        Ok(())
    }

    /// Deletes a user. An empty or non-envelope body counts as an
    /// acknowledgement; a failure envelope is still an error.
    #[instrument(skip(self))]
    pub async fn delete_user_by_id(&self, id: &str) -> Result<(), GatewayError> {
        let builder = self.request(Method::DELETE, "/user").query(&[("id", id)]);
        let response = self.authorize(builder)?.send().await?;

        let status = response.status();
        let body = response.bytes().await?;
        if status == StatusCode::UNAUTHORIZED {
            return Err(Self::rejection(status, &body));
        }
        match serde_json::from_slice::<Envelope<serde_json::Value>>(&body) {
            Ok(envelope) => {
                envelope.into_result()?;
            }
            Err(_) => debug!(%status, "delete acknowledged without envelope"),
        }
        Ok(())
    }

    /// Logs in and stores the returned token.
    #[instrument(skip(self, credentials), fields(phone_number = %credentials.phone_number))]
    pub async fn login(&self, credentials: &Credentials) -> Result<String, GatewayError> {
        let _session = self.tokens.session().await;

        let response = self
            .request(Method::POST, "/login")
            .query(&credentials.to_query())
            .send()
            .await?;

        let token = Self::token_grant(response).await?;
        self.tokens.set(token.clone());
        Ok(token)
    }

    /// Notifies the service and drops the held token.
    ///
    /// The slot is cleared as soon as the request was delivered, whatever
    /// the service answers. A transport failure leaves it untouched.
    #[instrument(skip(self, user), fields(phone_number = %user.phone_number))]
    pub async fn logout(&self, user: &User) -> Result<(), GatewayError> {
        let _session = self.tokens.session().await;

        let response = self
            .request(Method::POST, "/logout")
            .json(user)
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "logout not acknowledged, clearing token anyway");
        }
        self.tokens.clear();
        Ok(())
    }

    /// Exchanges `token` for a new one and stores it.
    #[instrument(skip(self, token))]
    pub async fn refresh_token(&self, token: &str) -> Result<String, GatewayError> {
        let _session = self.tokens.session().await;

        let response = self
            .request(Method::GET, "/refresh_token")
            .bearer_auth(token)
            .send()
            .await?;

        let refreshed = Self::token_grant(response).await?;
        self.tokens.set(refreshed.clone());
        Ok(refreshed)
    }

    /// Refreshes whatever token is currently held.
    pub async fn refresh_current(&self) -> Result<String, GatewayError> {
        let token = self.tokens.get().ok_or_else(Self::no_session)?;
        self.refresh_token(&token).await
    }

    async fn get_user(&self, query: &[(&str, &str)]) -> Result<User, GatewayError> {
        let builder = self.request(Method::GET, "/user").query(query);
        let response = self.authorize(builder)?.send().await?;

        Self::envelope::<User>(response)
            .await?
            .ok_or(GatewayError::MissingData)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.config.url(path))
            .header(header::ACCEPT, "application/json")
    }

    /// Attaches the stored token when the profile protects CRUD.
    fn authorize(&self, builder: RequestBuilder) -> Result<RequestBuilder, GatewayError> {
        if !self.config.profile.requires_bearer_crud() {
            return Ok(builder);
        }
        let token = self.tokens.get().ok_or_else(Self::no_session)?;
        Ok(builder.bearer_auth(token))
    }

    fn attach_held_token(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.tokens.get() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn no_session() -> GatewayError {
        GatewayError::Authentication("no session token held, login first".to_string())
    }

    async fn envelope<T: DeserializeOwned>(response: Response) -> Result<Option<T>, GatewayError> {
        let status = response.status();
        let body = response.bytes().await?;
        if status == StatusCode::UNAUTHORIZED {
            return Err(Self::rejection(status, &body));
        }

        let envelope: Envelope<T> = serde_json::from_slice(&body)?;
        Ok(envelope.into_result()?)
    }

    /// Reads the bare `{"token": ...}` map of login and refresh responses.
    async fn token_grant(response: Response) -> Result<String, GatewayError> {
        let status = response.status();
        let body = response.bytes().await?;
        if status == StatusCode::UNAUTHORIZED {
            return Err(Self::rejection(status, &body));
        }

        let value: serde_json::Value = serde_json::from_slice(&body)?;
        value
            .get("token")
            .and_then(|t| t.as_str())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or(GatewayError::MissingToken)
    }

    fn rejection(status: StatusCode, body: &[u8]) -> GatewayError {
        let message = serde_json::from_slice::<Envelope<serde_json::Value>>(body)
            .ok()
            .map(|e| e.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| status.to_string());
        GatewayError::Authentication(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(profile: Profile) -> UserGateway {
        UserGateway::new(&GatewayConfig::new("http://127.0.0.1:9").with_profile(profile)).unwrap()
    }

    #[test]
    fn test_standard_profile_requires_token_for_crud() {
        let gateway = gateway(Profile::Standard);
        let builder = gateway.request(Method::GET, "/user");
        let err = gateway.authorize(builder).unwrap_err();
        assert!(err.is_authentication());
    }

    #[test]
    fn test_registration_profile_skips_bearer() {
        let gateway = gateway(Profile::Registration);
        let builder = gateway.request(Method::GET, "/user");
        let request = gateway.authorize(builder).unwrap().build().unwrap();
        assert!(request.headers().get(header::AUTHORIZATION).is_none());
    }

    #[test]
    fn test_bearer_reads_current_token() {
        let gateway = gateway(Profile::Standard);
        gateway.set_token("abc");
        let request = gateway
            .authorize(gateway.request(Method::GET, "/user"))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            request.headers().get(header::AUTHORIZATION).unwrap(),
            "Bearer abc"
        );
    }

    #[test]
    fn test_held_token_is_optional_for_lookups() {
        let gateway = gateway(Profile::Standard);
        let request = gateway
            .attach_held_token(gateway.request(Method::GET, "/user"))
            .build()
            .unwrap();
        assert!(request.headers().get(header::AUTHORIZATION).is_none());

        gateway.set_token("abc");
        let request = gateway
            .attach_held_token(gateway.request(Method::GET, "/user"))
            .build()
            .unwrap();
        assert_eq!(
            request.headers().get(header::AUTHORIZATION).unwrap(),
            "Bearer abc"
        );
    }

    #[test]
    fn test_rejection_prefers_envelope_message() {
        let err = UserGateway::rejection(
            StatusCode::UNAUTHORIZED,
            br#"{"code":-1,"message":"token is expired"}"#,
        );
        assert_eq!(err.to_string(), "authentication required: token is expired");

        let err = UserGateway::rejection(StatusCode::UNAUTHORIZED, b"");
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_refresh_current_without_token_fails_fast() {
        let gateway = gateway(Profile::Standard);
        let err = gateway.refresh_current().await.unwrap_err();
        assert!(err.is_authentication());
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        let gateway = gateway(Profile::Registration);
        let err = gateway.get_register_code("15000000000").await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }
}

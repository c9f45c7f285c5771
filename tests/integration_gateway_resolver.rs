mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::{Json, Router, routing::get};
use clientauth::middleware::{AuthEngine, AuthUser, Identity, MiddlewareConfig};
use clientauth::router::mount;
use clientauth_config::{GatewayConfig, Profile};
use clientauth_gateway::UserGateway;
use clientauth_models::Credentials;
use common::{
    REGISTER_CODE, SUPERUSER_NAME, SUPERUSER_PASSWORD, StubService, generate_phone_number,
    spawn_stub_service, test_jwt_config,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

async fn me(AuthUser(identity): AuthUser) -> Json<Identity> {
    Json(identity)
}

/// A host that resolves identities through the stub user service.
struct GatewayHost {
    router: Router,
    gateway: Arc<UserGateway>,
}

impl GatewayHost {
    fn new(stub: &StubService, profile: Profile) -> Self {
        let gateway = Arc::new(
            UserGateway::new(&GatewayConfig::new(stub.endpoint.as_str()).with_profile(profile))
                .unwrap(),
        );
        let engine =
            AuthEngine::new(MiddlewareConfig::for_gateway(test_jwt_config(), gateway.clone()))
                .unwrap();
        assert_eq!(engine.profile(), profile);

        let router = mount(Router::new(), Router::new().route("/me", get(me)), &engine);
        Self { router, gateway }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    async fn login(&self, query: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(format!("/login?{}", query))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    async fn me(&self, token: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .uri("/me")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }
}

#[tokio::test]
async fn test_standard_lookup_without_gateway_session() {
    let stub = spawn_stub_service(false).await;
    let host = GatewayHost::new(&stub, Profile::Standard);
    let phone_number = generate_phone_number();
    let user = stub.table.register(&phone_number, None);

    assert!(host.gateway.token().is_none());
    let (status, body) = host
        .login(&format!("phone_number={}", phone_number))
        .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");

    let token = body["token"].as_str().unwrap();
    let (status, body) = host.me(token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], user.id.as_str());
    assert_eq!(body["superuser"], false);
}

#[tokio::test]
async fn test_standard_lookup_of_unknown_user() {
    let stub = spawn_stub_service(false).await;
    let host = GatewayHost::new(&stub, Profile::Standard);

    let (status, body) = host
        .login(&format!("phone_number={}", generate_phone_number()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "incorrect credentials");
}

#[tokio::test]
async fn test_standard_lookup_follows_remote_decision() {
    let stub = spawn_stub_service(true).await;
    let host = GatewayHost::new(&stub, Profile::Standard);
    let phone_number = generate_phone_number();
    stub.table.register(&phone_number, None);
    let query = format!("phone_number={}", phone_number);

    // the service refuses bare lookups
    let (status, _) = host.login(&query).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // with an ops session held, the lookup carries its bearer
    host.gateway
        .login(&Credentials::username_and_password(
            SUPERUSER_NAME,
            SUPERUSER_PASSWORD,
        ))
        .await
        .unwrap();
    let (status, body) = host.login(&query).await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
}

#[tokio::test]
async fn test_registration_login_registers_user() {
    let stub = spawn_stub_service(false).await;
    let host = GatewayHost::new(&stub, Profile::Registration);
    let phone_number = generate_phone_number();

    let (status, body) = host
        .login(&format!(
            "phone_number={}&code={}",
            phone_number, REGISTER_CODE
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    let user = stub.table.find_by_phone(&phone_number).unwrap();

    let token = body["token"].as_str().unwrap();
    let (status, body) = host.me(token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], user.id.as_str());

    // logging in again finds the same record
    let (status, _) = host
        .login(&format!(
            "phone_number={}&code={}",
            phone_number, REGISTER_CODE
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stub.table.find_by_phone(&phone_number).unwrap().id, user.id);
}

#[tokio::test]
async fn test_registration_login_requires_valid_code() {
    let stub = spawn_stub_service(false).await;
    let host = GatewayHost::new(&stub, Profile::Registration);
    let phone_number = generate_phone_number();

    let (status, body) = host
        .login(&format!("phone_number={}", phone_number))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "incorrect credentials");

    let (status, _) = host
        .login(&format!("phone_number={}&code=000000", phone_number))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(stub.table.find_by_phone(&phone_number).is_none());
}

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    routing::get,
};
use fake::Fake;
use fake::faker::internet::en::Username;
use serde::Deserialize;

use clientauth::middleware::{AuthEngine, IdentityResolver, MiddlewareConfig};
use clientauth::router::mount;
use clientauth_config::{JwtConfig, SuperuserConfig, SuperuserPassword};
use clientauth_models::{Credentials, Envelope, User};

pub const REGISTER_CODE: &str = "123456";
pub const SUPERUSER_NAME: &str = "admin";
pub const SUPERUSER_PASSWORD: &str = "admin@123456";
pub const SUPERUSER_PHONE: &str = "18888888888";

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret".to_string(),
        timeout_secs: 3600,
        max_refresh_secs: 7200,
        realm: "test zone".to_string(),
        send_authorization: false,
    }
}

pub fn test_superuser() -> SuperuserConfig {
    SuperuserConfig::new(
        SUPERUSER_NAME,
        SuperuserPassword::Plain(SUPERUSER_PASSWORD.to_string()),
        SUPERUSER_PHONE,
    )
}

pub fn generate_phone_number() -> String {
    (15_000_000_000u64..15_999_999_999).fake::<u64>().to_string()
}

pub fn generate_username() -> String {
    Username().fake()
}

/// In-memory user table of the stub user service.
#[derive(Default)]
pub struct UserTable {
    users: Mutex<HashMap<String, User>>,
    next_id: AtomicU64,
}

impl UserTable {
    pub fn find_by_phone(&self, phone_number: &str) -> Option<User> {
        let users = self.users.lock().unwrap();
        users
            .values()
            .find(|u| u.phone_number == phone_number)
            .cloned()
    }

    pub fn find(&self, id: &str) -> Option<User> {
        self.users.lock().unwrap().get(id).cloned()
    }

    pub fn register(&self, phone_number: &str, draft: Option<User>) -> User {
        if let Some(user) = self.find_by_phone(phone_number) {
            return user;
        }
        let id = format!("u-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let draft = draft.unwrap_or_default();
        let user = User {
            id: id.clone(),
            phone_number: phone_number.to_string(),
            username: if draft.username.is_empty() {
                generate_username()
            } else {
                draft.username
            },
            password: draft.password,
            created_at: Some(chrono::Utc::now()),
            updated_at: Some(chrono::Utc::now()),
        };
        self.users.lock().unwrap().insert(id, user.clone());
        user
    }

    pub fn update(&self, id: &str, patch: User) -> bool {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(id) {
            Some(user) => {
                if !patch.username.is_empty() {
                    user.username = patch.username;
                }
                if !patch.password.is_empty() {
                    user.password = patch.password;
                }
                user.updated_at = Some(chrono::Utc::now());
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, id: &str) {
        self.users.lock().unwrap().remove(id);
    }
}

/// Looks users up in the table; logs in by register-or-login with the
/// fixed code. Counts every call.
#[derive(Clone)]
pub struct TableResolver {
    pub table: Arc<UserTable>,
    pub calls: Arc<AtomicUsize>,
}

impl TableResolver {
    pub fn new(table: Arc<UserTable>) -> Self {
        Self {
            table,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityResolver for TableResolver {
    async fn resolve(&self, phone_number: &str) -> anyhow::Result<User> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.table
            .find_by_phone(phone_number)
            .ok_or_else(|| anyhow::anyhow!("no user with phone number {phone_number}"))
    }

    async fn authenticate(&self, credentials: &Credentials) -> anyhow::Result<User> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::ensure!(credentials.code == REGISTER_CODE, "invalid code");
        Ok(self.table.register(&credentials.phone_number, None))
    }
}

#[derive(Deserialize)]
struct PhoneQuery {
    phone_number: String,
    #[serde(default)]
    code: String,
}

#[derive(Deserialize)]
struct UserQuery {
    #[serde(default)]
    id: String,
    #[serde(default)]
    phone_number: String,
}

async fn get_register_code(Query(query): Query<PhoneQuery>) -> Json<Envelope<String>> {
    if query.phone_number.is_empty() {
        return Json(Envelope::failure(1, "phone_number is required"));
    }
    Json(Envelope::success(REGISTER_CODE.to_string()))
}

async fn register(
    State(table): State<Arc<UserTable>>,
    Query(query): Query<PhoneQuery>,
    body: Bytes,
) -> Json<Envelope<User>> {
    if query.code != REGISTER_CODE {
        return Json(Envelope::failure(1, "invalid code"));
    }
    let draft = serde_json::from_slice::<User>(&body).ok();
    let user = table.register(&query.phone_number, draft);
    Json(Envelope::success(user))
}

async fn get_user(
    State(table): State<Arc<UserTable>>,
    Query(query): Query<UserQuery>,
) -> Json<Envelope<User>> {
    let user = if query.id.is_empty() {
        table.find_by_phone(&query.phone_number)
    } else {
        table.find(&query.id)
    };
    match user {
        Some(user) => Json(Envelope::success(user)),
        None => Json(Envelope::failure(1, "user not found")),
    }
}

async fn update_user(
    State(table): State<Arc<UserTable>>,
    Query(query): Query<UserQuery>,
    Json(patch): Json<User>,
) -> Json<Envelope<()>> {
    if table.update(&query.id, patch) {
        Json(Envelope::ok())
    } else {
        Json(Envelope::failure(1, "user not found"))
    }
}

async fn delete_user(State(table): State<Arc<UserTable>>, Query(query): Query<UserQuery>) {
    table.remove(&query.id);
}

pub struct StubService {
    pub endpoint: String,
    pub table: Arc<UserTable>,
    pub resolver: TableResolver,
    pub engine: AuthEngine,
}

/// Serves a stub user service on an ephemeral port.
///
/// Login, logout and refresh are answered by an [`AuthEngine`]; `/user`
/// requires a session when `protect_crud` is set.
pub async fn spawn_stub_service(protect_crud: bool) -> StubService {
    let table = Arc::new(UserTable::default());
    let resolver = TableResolver::new(table.clone());
    let engine = AuthEngine::new(
        MiddlewareConfig::new(test_jwt_config())
            .identity_resolver(resolver.clone())
            .superuser(test_superuser()),
    )
    .unwrap();

    let public = Router::new()
        .route("/register", get(get_register_code).post(register))
        .with_state(table.clone());
    let crud = Router::new()
        .route("/user", get(get_user).put(update_user).delete(delete_user))
        .with_state(table.clone());

    let app: Router = if protect_crud {
        mount(public, crud, &engine)
    } else {
        mount(public.merge(crud), Router::new().route("/ping", get(|| async {})), &engine)
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubService {
        endpoint: format!("http://{}", addr),
        table,
        resolver,
        engine,
    }
}

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use reqwest::StatusCode;
use serde_json::Value;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use uuid::Uuid;

use recombinant::auth::{StoreIdentityProvider, TokenGenerator};
use recombinant::config::ProviderConfig;
use recombinant::quota::PlanTable;
use recombinant::server::{AppState, create_router};
use recombinant::store::{SqliteStore, Store};
use recombinant::types::{Token, User};
use recombinant::vcs::{Provider, VcsConnector};

/// An in-process server on an ephemeral port, backed by a throwaway
/// database.
pub struct TestServer {
    pub temp_dir: TempDir,
    pub base_url: String,
    pub store: Arc<dyn Store>,
    client: reqwest::Client,
    handle: JoinHandle<()>,
}

/// A registered caller with a working API token.
pub struct TestUser {
    pub id: String,
    pub token: String,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::with_providers(ProviderConfig::default()).await
    }

    pub async fn with_providers(providers: ProviderConfig) -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let store = SqliteStore::new(temp_dir.path().join("recombinant.db")).expect("open store");
        store.initialize().expect("initialize store");
        let store: Arc<dyn Store> = Arc::new(store);

        let state = Arc::new(AppState {
            identity: Arc::new(StoreIdentityProvider::new(store.clone())),
            store: store.clone(),
            vcs: VcsConnector::new(&providers).expect("build http client"),
            plans: PlanTable::default(),
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr: SocketAddr = listener.local_addr().expect("local addr");
        let app = create_router(state);
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        Self {
            temp_dir,
            base_url: format!("http://{addr}"),
            store,
            client: reqwest::Client::new(),
            handle,
        }
    }

    pub fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn create_user(&self, plan_id: Option<&str>) -> TestUser {
        let id = Uuid::new_v4().to_string();
        self.store
            .create_user(&User {
                id: id.clone(),
                email: format!("{id}@example.com"),
                display_name: "Test User".to_string(),
                plan_id: plan_id.map(str::to_string),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .expect("create user");

        let generated = TokenGenerator::new().generate().expect("generate token");
        self.store
            .create_token(&Token {
                id: Uuid::new_v4().to_string(),
                token_hash: generated.hash,
                token_lookup: generated.lookup,
                user_id: id.clone(),
                created_at: Utc::now(),
                expires_at: None,
                last_used_at: None,
            })
            .expect("create token");

        TestUser {
            id,
            token: generated.raw,
        }
    }

    pub fn link_token(&self, user: &TestUser, provider: Provider, token: &str) {
        self.store
            .set_access_token(&user.id, provider, token)
            .expect("link provider token");
    }

    pub async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.expect("send request");
        let status = response.status();
        let text = response.text().await.expect("read body");
        let value = serde_json::from_str(&text).unwrap_or(Value::String(text));
        (status, value)
    }

    pub async fn get(&self, path: &str, user: &TestUser) -> (StatusCode, Value) {
        self.request(reqwest::Method::GET, path, Some(&user.token), None)
            .await
    }

    pub async fn post(&self, path: &str, user: &TestUser, body: Value) -> (StatusCode, Value) {
        self.request(reqwest::Method::POST, path, Some(&user.token), Some(body))
            .await
    }

    pub async fn put(&self, path: &str, user: &TestUser, body: Value) -> (StatusCode, Value) {
        self.request(reqwest::Method::PUT, path, Some(&user.token), Some(body))
            .await
    }

    pub async fn delete(&self, path: &str, user: &TestUser) -> (StatusCode, Value) {
        self.request(reqwest::Method::DELETE, path, Some(&user.token), None)
            .await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tallybook::bootstrap::{assemble_app_state, AppComponents};
use tallybook::config::{Config, LockBackend};
use tallybook::domain::entities::{LoginResponse, OpenIdentity};
use tallybook::domain::ports::identity_provider::IdentityProvider;
use tallybook::infrastructure::http::middleware::{ApiError, ApiResult, AppState};
use tallybook::infrastructure::lock::MemoryLockStore;
use tallybook::infrastructure::persistence::Database;
use tallybook::infrastructure::runtime::ManualClock;
use uuid::Uuid;

use super::test_db::setup_test_db;

pub const STUB_PROVIDER: &str = "stub";
/// Login code the stub provider refuses
pub const REJECTED_CODE: &str = "rejected";

/// Identity provider that treats the login code as the openid.
pub struct StubIdentityProvider;

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
    fn provider(&self) -> &str {
        STUB_PROVIDER
    }

    async fn resolve(&self, code: &str) -> ApiResult<OpenIdentity> {
        if code == REJECTED_CODE {
            return Err(ApiError::Unauthorized);
        }
        Ok(OpenIdentity {
            provider: STUB_PROVIDER.to_string(),
            openid: code.to_string(),
            nickname: Some(format!("nick-{}", code)),
            avatar: None,
        })
    }
}

pub struct TestApp {
    pub db: Database,
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    pub lock_store: Arc<MemoryLockStore>,
    pub config: Config,
}

impl TestApp {
    pub fn upload_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.upload_dir)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.config.upload_dir);
    }
}

pub fn test_config() -> Config {
    let upload_dir = std::env::temp_dir().join(format!("tallybook_uploads_{}", Uuid::new_v4()));
    Config {
        database_url: "sqlite::memory:".to_string(),
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        lock_backend: LockBackend::Memory,
        redis_url: "redis://127.0.0.1:6379/0".to_string(),
        lock_namespace: "test".to_string(),
        lock_ttl_seconds: 5,
        jwt_secret: "test-jwt-secret".to_string(),
        jwt_issuer: "tallybook".to_string(),
        jwt_ttl_seconds: 3600,
        invite_secret: "test-invite-secret".to_string(),
        invite_ttl_seconds: 3600,
        upload_dir: upload_dir.display().to_string(),
        upload_public_prefix: "/upload".to_string(),
        cdn_base_url: "https://cdn.example.com".to_string(),
        wechat_app_id: String::new(),
        wechat_app_secret: String::new(),
        wechat_code2session_url: String::new(),
        otel_exporter_endpoint: None,
        service_name: "tallybook-test".to_string(),
        metrics_port: 0,
    }
}

pub async fn setup_test_app() -> TestApp {
    let db = setup_test_db().await;
    let config = test_config();
    let clock = Arc::new(ManualClock::new());
    let lock_store = Arc::new(MemoryLockStore::new(clock.clone()));

    let state = assemble_app_state(
        AppComponents {
            db: db.clone(),
            lock_store: lock_store.clone(),
            identity_provider: Arc::new(StubIdentityProvider),
            clock: clock.clone(),
        },
        &config,
    );

    TestApp {
        db,
        state,
        clock,
        lock_store,
        config,
    }
}

/// Log in (registering on first use) a user identified by `code`.
pub async fn login(app: &TestApp, code: &str) -> LoginResponse {
    app.state
        .user_service
        .login(code)
        .await
        .expect("Failed to log in test user")
}

/// Id of the default book created for a freshly registered user.
pub async fn default_book_id(app: &TestApp, user_id: &str) -> String {
    let books = app
        .state
        .book_service
        .list_books(user_id, true)
        .await
        .expect("Failed to list books");
    books
        .into_iter()
        .find(|b| b.owner_id == user_id)
        .map(|b| b.id)
        .expect("User has no owned book")
}

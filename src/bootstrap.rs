use crate::application::services::*;
use crate::config::{Config, LockBackend};
use crate::domain::ports::book_repository::BookRepository;
use crate::domain::ports::category_repository::CategoryRepository;
use crate::domain::ports::clock::Clock;
use crate::domain::ports::file_storage::FileStorage;
use crate::domain::ports::identity_provider::IdentityProvider;
use crate::domain::ports::lock_store::LockStore;
use crate::domain::ports::record_repository::RecordRepository;
use crate::domain::ports::subscription_repository::SubscriptionRepository;
use crate::domain::ports::user_repository::UserRepository;
use crate::infrastructure::http::middleware::AppState;
use crate::infrastructure::lock::{MemoryLockStore, RedisLockStore};
use crate::infrastructure::persistence::Database;
use crate::infrastructure::providers::WechatIdentityProvider;
use crate::infrastructure::runtime::SystemClock;
use crate::infrastructure::storage::LocalFileStorage;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Adapters the services are wired on top of.
pub struct AppComponents {
    pub db: Database,
    pub lock_store: Arc<dyn LockStore>,
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub clock: Arc<dyn Clock>,
}

/// Connect the lock store selected by `LOCK_BACKEND`.
pub async fn build_lock_store(
    config: &Config,
    clock: Arc<dyn Clock>,
) -> Result<Arc<dyn LockStore>, Box<dyn std::error::Error>> {
    match config.lock_backend {
        LockBackend::Redis => {
            let store: Arc<dyn LockStore> =
                Arc::new(RedisLockStore::connect(&config.redis_url).await?);
            Ok(store)
        }
        LockBackend::Memory => {
            tracing::warn!("Using in-process lock store; locks are not shared between instances");
            let store: Arc<dyn LockStore> = Arc::new(MemoryLockStore::new(clock));
            Ok(store)
        }
    }
}

/// Build the production adapters and wire the application state.
pub async fn build_app_state(
    db: Database,
    config: &Config,
) -> Result<AppState, Box<dyn std::error::Error>> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let lock_store = build_lock_store(config, clock.clone()).await?;

    if config.wechat_app_id.is_empty() {
        tracing::warn!("WECHAT_APP_ID is not set; logins will be rejected by the provider");
    }
    let identity_provider: Arc<dyn IdentityProvider> = Arc::new(WechatIdentityProvider::new(
        config.wechat_app_id.clone(),
        config.wechat_app_secret.clone(),
        config.wechat_code2session_url.clone(),
    )?);

    std::fs::create_dir_all(&config.upload_dir)?;

    Ok(assemble_app_state(
        AppComponents {
            db,
            lock_store,
            identity_provider,
            clock,
        },
        config,
    ))
}

/// Wire services over the given adapters.
pub fn assemble_app_state(components: AppComponents, config: &Config) -> AppState {
    let AppComponents {
        db,
        lock_store,
        identity_provider,
        clock,
    } = components;

    let locks = LockService::new(
        lock_store,
        config.lock_namespace.clone(),
        Duration::from_secs(config.lock_ttl_seconds),
    );
    tracing::info!(
        "Lock service initialized (namespace={}, ttl={}s)",
        config.lock_namespace,
        config.lock_ttl_seconds
    );

    let tokens = TokenService::new(
        &config.jwt_secret,
        config.jwt_issuer.clone(),
        config.jwt_ttl_seconds,
        clock.clone(),
    );
    let invites = InviteCodec::new(&config.invite_secret, config.invite_ttl_seconds);

    let user_repo = Arc::new(db.clone()) as Arc<dyn UserRepository>;
    let book_repo = Arc::new(db.clone()) as Arc<dyn BookRepository>;
    let category_repo = Arc::new(db.clone()) as Arc<dyn CategoryRepository>;
    let record_repo = Arc::new(db.clone()) as Arc<dyn RecordRepository>;
    let subscription_repo = Arc::new(db) as Arc<dyn SubscriptionRepository>;

    let user_service = UserService::new(
        user_repo.clone(),
        identity_provider,
        tokens,
        locks.clone(),
    );
    let book_service = BookService::new(
        book_repo,
        user_repo,
        locks.clone(),
        invites,
        clock.clone(),
    );
    let category_service = CategoryService::new(category_repo);
    let record_service = RecordService::new(
        record_repo.clone(),
        book_service.clone(),
        category_service.clone(),
        locks,
        clock.clone(),
    );
    let statistics_service = StatisticsService::new(record_repo, book_service.clone());

    let upload_dir = PathBuf::from(&config.upload_dir);
    let storage = Arc::new(LocalFileStorage::new(upload_dir.clone())) as Arc<dyn FileStorage>;
    let upload_public_prefix = public_prefix(&config.upload_public_prefix);
    let upload_service = UploadService::new(
        storage,
        &upload_public_prefix,
        &config.cdn_base_url,
        clock,
    );
    let subscription_service = SubscriptionService::new(subscription_repo);

    AppState {
        user_service,
        book_service,
        category_service,
        record_service,
        statistics_service,
        upload_service,
        subscription_service,
        upload_dir,
        upload_public_prefix,
    }
}

/// `/segment` form of the public upload prefix
fn public_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/upload".to_string()
    } else {
        format!("/{}", trimmed)
    }
}

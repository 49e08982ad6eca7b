pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{Config, ConfigError, LockBackend};
pub use domain::errors::{DomainError, LockError, LockResult};
pub use infrastructure::http::middleware::{ApiError, ApiResult, AppState};

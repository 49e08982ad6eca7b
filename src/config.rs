use std::env;
use std::str::FromStr;

/// Where distributed locks live.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockBackend {
    Redis,
    /// Process-local store; only safe with a single server instance
    Memory,
}

impl FromStr for LockBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redis" => Ok(LockBackend::Redis),
            "memory" => Ok(LockBackend::Memory),
            other => Err(ConfigError::InvalidLockBackend(other.to_string())),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub lock_backend: LockBackend,
    pub redis_url: String,
    pub lock_namespace: String,
    pub lock_ttl_seconds: u64,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_ttl_seconds: i64,
    pub invite_secret: String,
    pub invite_ttl_seconds: i64,
    pub upload_dir: String,
    pub upload_public_prefix: String,
    pub cdn_base_url: String,
    pub wechat_app_id: String,
    pub wechat_app_secret: String,
    pub wechat_code2session_url: String,
    pub otel_exporter_endpoint: Option<String>,
    pub service_name: String,
    pub metrics_port: u16,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    var_or(name, default)
        .parse()
        .map_err(|_| ConfigError::InvalidNumber(name))
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let database_url = var_or("DATABASE_URL", "sqlite://tallybook.db?mode=rwc");
        let server_host = var_or("SERVER_HOST", "127.0.0.1");
        let server_port = var_or("SERVER_PORT", "3000")
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let lock_backend = var_or("LOCK_BACKEND", "redis").parse()?;
        let redis_url = var_or("REDIS_URL", "redis://127.0.0.1:6379/0");
        let lock_namespace = var_or("LOCK_NAMESPACE", "default");
        if lock_namespace.trim().is_empty() {
            return Err(ConfigError::EmptyLockNamespace);
        }
        let lock_ttl_seconds: u64 = parse_var("LOCK_TTL_SECONDS", "5")?;
        if lock_ttl_seconds == 0 {
            return Err(ConfigError::InvalidNumber("LOCK_TTL_SECONDS"));
        }

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::MissingJwtSecret)?;
        let jwt_issuer = var_or("JWT_ISSUER", "tallybook");
        let jwt_ttl_seconds = parse_var("JWT_TTL_SECONDS", "3600")?;

        let invite_secret =
            env::var("INVITE_SECRET").map_err(|_| ConfigError::MissingInviteSecret)?;
        let invite_ttl_seconds = parse_var("INVITE_TTL_SECONDS", "3600")?;

        let upload_dir = var_or("UPLOAD_DIR", "./public/upload");
        let upload_public_prefix = var_or("UPLOAD_PUBLIC_PREFIX", "/upload");
        let cdn_base_url = var_or("CDN_BASE_URL", "");

        let wechat_app_id = var_or("WECHAT_APP_ID", "");
        let wechat_app_secret = var_or("WECHAT_APP_SECRET", "");
        let wechat_code2session_url = var_or(
            "WECHAT_CODE2SESSION_URL",
            crate::infrastructure::providers::wechat::DEFAULT_CODE2SESSION_URL,
        );

        let otel_exporter_endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok();
        let service_name = var_or("SERVICE_NAME", "tallybook");
        let metrics_port = parse_var("METRICS_PORT", "9000")?;

        Ok(Config {
            database_url,
            server_host,
            server_port,
            lock_backend,
            redis_url,
            lock_namespace,
            lock_ttl_seconds,
            jwt_secret,
            jwt_issuer,
            jwt_ttl_seconds,
            invite_secret,
            invite_ttl_seconds,
            upload_dir,
            upload_public_prefix,
            cdn_base_url,
            wechat_app_id,
            wechat_app_secret,
            wechat_code2session_url,
            otel_exporter_endpoint,
            service_name,
            metrics_port,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET environment variable not set")]
    MissingJwtSecret,

    #[error("INVITE_SECRET environment variable not set")]
    MissingInviteSecret,

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid numeric value for {0}")]
    InvalidNumber(&'static str),

    #[error("Unknown LOCK_BACKEND '{0}', expected 'redis' or 'memory'")]
    InvalidLockBackend(String),

    #[error("LOCK_NAMESPACE must not be empty")]
    EmptyLockNamespace,
}

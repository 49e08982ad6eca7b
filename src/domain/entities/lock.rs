use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_LOCK_NAMESPACE: &str = "default";
pub const DEFAULT_LOCK_TTL_SECONDS: u64 = 5;

const COUNTER_HASH_PREFIX: &str = "lock_counter:";
const COUNTER_FIELD_PREFIX: &str = "cnt:";

/// Parameters of a single acquisition attempt.
#[derive(Debug, Clone)]
pub struct LockRequest {
    pub owner_id: String,
    pub resource_id: String,
    pub caller_ip: String,
    pub namespace: String,
    pub ttl: Duration,
}

impl LockRequest {
    pub fn new(owner_id: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            resource_id: resource_id.into(),
            caller_ip: "127.0.0.1".to_string(),
            namespace: DEFAULT_LOCK_NAMESPACE.to_string(),
            ttl: Duration::from_secs(DEFAULT_LOCK_TTL_SECONDS),
        }
    }

    pub fn caller_ip(mut self, ip: impl Into<String>) -> Self {
        self.caller_ip = ip.into();
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// `{namespace}:{owner_id}:{resource_id}`
    pub fn lock_key(&self) -> String {
        format!("{}:{}:{}", self.namespace, self.owner_id, self.resource_id)
    }

    /// `{caller_ip}_{owner_id}_{resource_id}_{uuid}`
    pub fn ownership_token(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.caller_ip,
            self.owner_id,
            self.resource_id,
            uuid::Uuid::new_v4()
        )
    }
}

/// Proof of a successful acquisition, required to release the lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockHandle {
    pub namespace: String,
    pub lock_key: String,
    pub ownership_token: String,
    pub counter_value: i64,
}

impl LockHandle {
    pub fn counter_hash_key(&self) -> String {
        counter_hash_key(&self.namespace)
    }

    pub fn counter_field(&self) -> String {
        counter_field(&self.lock_key)
    }
}

pub fn counter_hash_key(namespace: &str) -> String {
    format!("{}{}", COUNTER_HASH_PREFIX, namespace)
}

pub fn counter_field(lock_key: &str) -> String {
    format!("{}{}", COUNTER_FIELD_PREFIX, lock_key)
}

/// Result of a release attempt. Only `Released` means this caller deleted its
/// own live lock; the other three tell the caller whether the protected work
/// may have run concurrently with another holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseOutcome {
    Released,
    /// The lock expired before release and nobody re-acquired it since.
    ExpiredClean,
    /// The lock expired and was acquired again by someone else in between.
    ExpiredContended,
    /// A different acquirer currently holds the lock.
    NotOwner,
}

impl ReleaseOutcome {
    /// Maps the integer reply of the release script.
    pub fn from_script_reply(reply: i64) -> Option<Self> {
        match reply {
            0 => Some(ReleaseOutcome::NotOwner),
            1 => Some(ReleaseOutcome::Released),
            2 => Some(ReleaseOutcome::ExpiredClean),
            3 => Some(ReleaseOutcome::ExpiredContended),
            _ => None,
        }
    }

    pub fn script_reply(&self) -> i64 {
        match self {
            ReleaseOutcome::NotOwner => 0,
            ReleaseOutcome::Released => 1,
            ReleaseOutcome::ExpiredClean => 2,
            ReleaseOutcome::ExpiredContended => 3,
        }
    }

    pub fn is_released(&self) -> bool {
        matches!(self, ReleaseOutcome::Released)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseOutcome::Released => "released",
            ReleaseOutcome::ExpiredClean => "expired_clean",
            ReleaseOutcome::ExpiredContended => "expired_contended",
            ReleaseOutcome::NotOwner => "not_owner",
        }
    }
}

impl fmt::Display for ReleaseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

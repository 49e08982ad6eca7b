use crate::domain::errors::LockResult;
use async_trait::async_trait;
use std::time::Duration;

/// Keys and arguments of the atomic release check.
#[derive(Debug, Clone, Copy)]
pub struct ReleaseScriptInput<'a> {
    pub lock_key: &'a str,
    pub counter_hash_key: &'a str,
    pub counter_field: &'a str,
    pub ownership_token: &'a str,
    pub counter_value: i64,
}

/// Shared key-value store the lock manager coordinates through.
#[async_trait]
pub trait LockStore: Send + Sync {
    /// Whether a live (non-expired) value exists under `key`.
    async fn exists(&self, key: &str) -> LockResult<bool>;

    /// Set `key` to `value` with a TTL only if it does not exist.
    /// Returns false when the key was already present.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> LockResult<bool>;

    /// Increment a hash field by one and return the new value.
    async fn increment_counter(&self, hash_key: &str, field: &str) -> LockResult<i64>;

    /// Delete `key` only while it still holds `value`.
    async fn delete_if_equals(&self, key: &str, value: &str) -> LockResult<bool>;

    /// Run the release check atomically and return its raw reply:
    /// `2`/`3` when the key is gone (counter matches / differs), `1` when the
    /// key held the token and was deleted, `0` when another token holds it.
    async fn release(&self, input: ReleaseScriptInput<'_>) -> LockResult<i64>;
}

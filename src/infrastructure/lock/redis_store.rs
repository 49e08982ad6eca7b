use crate::domain::errors::{LockError, LockResult};
use crate::domain::ports::lock_store::{LockStore, ReleaseScriptInput};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{RedisError, Script};
use std::time::Duration;

/// KEYS: lock key, counter hash, counter field. ARGV: ownership token, counter.
const RELEASE_SCRIPT: &str = r#"
if redis.call('ttl', KEYS[1]) == -2 then
    if redis.call('hget', KEYS[2], KEYS[3]) == ARGV[2] then
        return 2
    else
        return 3
    end
elseif redis.call('get', KEYS[1]) == ARGV[1] then
    return redis.call('del', KEYS[1])
else
    return 0
end
"#;

const DELETE_IF_EQUALS_SCRIPT: &str = r#"
if redis.call('get', KEYS[1]) == ARGV[1] then
    return redis.call('del', KEYS[1])
else
    return 0
end
"#;

/// Lock store backed by Redis. The connection manager multiplexes one
/// connection and reconnects on its own; cloning it is cheap.
#[derive(Clone)]
pub struct RedisLockStore {
    connection: ConnectionManager,
    release_script: Script,
    delete_script: Script,
}

impl RedisLockStore {
    pub async fn connect(url: &str) -> LockResult<Self> {
        let client = redis::Client::open(url).map_err(store_error)?;
        let connection = ConnectionManager::new(client).await.map_err(store_error)?;
        tracing::info!("Redis lock store connected");

        Ok(Self {
            connection,
            release_script: Script::new(RELEASE_SCRIPT),
            delete_script: Script::new(DELETE_IF_EQUALS_SCRIPT),
        })
    }
}

fn store_error(err: RedisError) -> LockError {
    LockError::Store(err.to_string())
}

#[async_trait]
impl LockStore for RedisLockStore {
    async fn exists(&self, key: &str) -> LockResult<bool> {
        let mut conn = self.connection.clone();
        redis::cmd("EXISTS")
            .arg(key)
            .query_async::<_, bool>(&mut conn)
            .await
            .map_err(store_error)
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> LockResult<bool> {
        let mut conn = self.connection.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async(&mut conn)
            .await
            .map_err(store_error)?;
        Ok(reply.is_some())
    }

    async fn increment_counter(&self, hash_key: &str, field: &str) -> LockResult<i64> {
        let mut conn = self.connection.clone();
        redis::cmd("HINCRBY")
            .arg(hash_key)
            .arg(field)
            .arg(1)
            .query_async::<_, i64>(&mut conn)
            .await
            .map_err(store_error)
    }

    async fn delete_if_equals(&self, key: &str, value: &str) -> LockResult<bool> {
        let mut conn = self.connection.clone();
        let deleted: i64 = self
            .delete_script
            .key(key)
            .arg(value)
            .invoke_async(&mut conn)
            .await
            .map_err(store_error)?;
        Ok(deleted > 0)
    }

    async fn release(&self, input: ReleaseScriptInput<'_>) -> LockResult<i64> {
        let mut conn = self.connection.clone();
        self.release_script
            .key(input.lock_key)
            .key(input.counter_hash_key)
            .key(input.counter_field)
            .arg(input.ownership_token)
            .arg(input.counter_value)
            .invoke_async::<_, i64>(&mut conn)
            .await
            .map_err(store_error)
    }
}

use crate::domain::errors::LockResult;
use crate::domain::ports::clock::Clock;
use crate::domain::ports::lock_store::{LockStore, ReleaseScriptInput};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    values: HashMap<String, Entry>,
    hashes: HashMap<String, HashMap<String, i64>>,
}

impl State {
    /// Live value under `key`, dropping it first if it has expired.
    fn live(&mut self, key: &str, now: DateTime<Utc>) -> Option<&Entry> {
        let expired = self
            .values
            .get(key)
            .map_or(false, |entry| entry.expires_at <= now);
        if expired {
            self.values.remove(key);
        }
        self.values.get(key)
    }
}

/// In-process lock store for single-node deployments and tests.
///
/// Every operation runs under one mutex, which gives the release check the
/// same atomicity the Redis script has.
pub struct MemoryLockStore {
    clock: Arc<dyn Clock>,
    state: Mutex<State>,
}

impl MemoryLockStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: Mutex::new(State::default()),
        }
    }

    pub async fn counter(&self, hash_key: &str, field: &str) -> Option<i64> {
        let state = self.state.lock().await;
        state.hashes.get(hash_key).and_then(|h| h.get(field)).copied()
    }
}

#[async_trait]
impl LockStore for MemoryLockStore {
    async fn exists(&self, key: &str) -> LockResult<bool> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        Ok(state.live(key, now).is_some())
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> LockResult<bool> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        if state.live(key, now).is_some() {
            return Ok(false);
        }

        let ttl = chrono::Duration::seconds(ttl.as_secs().max(1) as i64);
        state.values.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(true)
    }

    async fn increment_counter(&self, hash_key: &str, field: &str) -> LockResult<i64> {
        let mut state = self.state.lock().await;
        let counter = state
            .hashes
            .entry(hash_key.to_string())
            .or_default()
            .entry(field.to_string())
            .or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn delete_if_equals(&self, key: &str, value: &str) -> LockResult<bool> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        let owned = state
            .live(key, now)
            .map_or(false, |entry| entry.value == value);
        if owned {
            state.values.remove(key);
        }
        Ok(owned)
    }

    async fn release(&self, input: ReleaseScriptInput<'_>) -> LockResult<i64> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;

        let current = state.live(input.lock_key, now).map(|e| e.value.clone());
        let reply = match current {
            None => {
                let counter = state
                    .hashes
                    .get(input.counter_hash_key)
                    .and_then(|h| h.get(input.counter_field))
                    .copied();
                if counter == Some(input.counter_value) {
                    2
                } else {
                    3
                }
            }
            Some(value) if value == input.ownership_token => {
                state.values.remove(input.lock_key);
                1
            }
            Some(_) => 0,
        };

        Ok(reply)
    }
}

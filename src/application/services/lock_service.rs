use crate::domain::entities::{
    counter_field, counter_hash_key, LockHandle, LockRequest, ReleaseOutcome,
};
use crate::domain::errors::{LockError, LockResult};
use crate::domain::ports::lock_store::{LockStore, ReleaseScriptInput};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub const LOCK_ACQUIRE_TOTAL: &str = "lock_acquire_total";
pub const LOCK_RELEASE_TOTAL: &str = "lock_release_total";

/// Register help text for the lock counters with the installed recorder.
pub fn describe_lock_metrics() {
    metrics::describe_counter!(LOCK_ACQUIRE_TOTAL, "Lock acquisition attempts by result");
    metrics::describe_counter!(LOCK_RELEASE_TOTAL, "Lock releases by outcome");
}

/// Try-lock manager over a shared key-value store.
///
/// Acquire never waits: contention is reported as [`LockError::AlreadyHeld`]
/// and the caller decides whether to retry. A crashed holder's lock frees
/// itself when its TTL elapses; there is no sweeper. Protected work must finish
/// within the TTL or a second acquirer may run concurrently.
#[derive(Clone)]
pub struct LockService {
    store: Arc<dyn LockStore>,
    namespace: String,
    ttl: Duration,
}

impl LockService {
    pub fn new(store: Arc<dyn LockStore>, namespace: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            ttl,
        }
    }

    /// Build a request carrying this service's namespace and TTL.
    pub fn request(&self, owner_id: &str, resource_id: &str) -> LockRequest {
        LockRequest::new(owner_id, resource_id)
            .namespace(self.namespace.clone())
            .ttl(self.ttl)
    }

    pub async fn acquire(&self, request: &LockRequest) -> LockResult<LockHandle> {
        let lock_key = request.lock_key();

        if self.store.exists(&lock_key).await? {
            metrics::counter!(LOCK_ACQUIRE_TOTAL, "result" => "already_held").increment(1);
            return Err(LockError::AlreadyHeld { lock_key });
        }

        let ownership_token = request.ownership_token();
        let set = self
            .store
            .set_if_absent(&lock_key, &ownership_token, request.ttl)
            .await
            .map_err(|e| {
                metrics::counter!(LOCK_ACQUIRE_TOTAL, "result" => "set_failed").increment(1);
                LockError::SetFailed {
                    lock_key: lock_key.clone(),
                    reason: e.to_string(),
                }
            })?;

        // Lost the race between the existence check and the conditional set
        if !set {
            metrics::counter!(LOCK_ACQUIRE_TOTAL, "result" => "already_held").increment(1);
            return Err(LockError::AlreadyHeld { lock_key });
        }

        let hash_key = counter_hash_key(&request.namespace);
        let field = counter_field(&lock_key);
        let counter_value = match self.store.increment_counter(&hash_key, &field).await {
            Ok(value) => value,
            Err(e) => {
                // Nobody holds a handle for this token, drop it instead of
                // leaving it to block the resource until the TTL runs out
                if let Err(rollback) = self.store.delete_if_equals(&lock_key, &ownership_token).await {
                    tracing::error!(
                        "Failed to roll back lock {} after counter failure: {}",
                        lock_key,
                        rollback
                    );
                }
                metrics::counter!(LOCK_ACQUIRE_TOTAL, "result" => "counter_failed").increment(1);
                return Err(LockError::CounterWriteFailed {
                    lock_key,
                    reason: e.to_string(),
                });
            }
        };

        metrics::counter!(LOCK_ACQUIRE_TOTAL, "result" => "acquired").increment(1);
        tracing::debug!("Lock acquired: key={}, counter={}", lock_key, counter_value);

        Ok(LockHandle {
            namespace: request.namespace.clone(),
            lock_key,
            ownership_token,
            counter_value,
        })
    }

    /// Release a lock and report what happened to it.
    pub async fn release(&self, handle: &LockHandle) -> LockResult<ReleaseOutcome> {
        validate_handle(handle)?;

        let counter_hash_key = handle.counter_hash_key();
        let counter_field = handle.counter_field();
        let reply = self
            .store
            .release(ReleaseScriptInput {
                lock_key: &handle.lock_key,
                counter_hash_key: &counter_hash_key,
                counter_field: &counter_field,
                ownership_token: &handle.ownership_token,
                counter_value: handle.counter_value,
            })
            .await?;

        let outcome = ReleaseOutcome::from_script_reply(reply).ok_or_else(|| {
            LockError::UnexpectedScriptReply {
                lock_key: handle.lock_key.clone(),
                reply,
            }
        })?;

        metrics::counter!(LOCK_RELEASE_TOTAL, "outcome" => outcome.as_str()).increment(1);
        tracing::debug!("Lock release: key={}, outcome={}", handle.lock_key, outcome);
        Ok(outcome)
    }

    /// Like [`release`](Self::release) but anything other than `Released` is an error.
    pub async fn release_checked(&self, handle: &LockHandle) -> LockResult<()> {
        match self.release(handle).await? {
            ReleaseOutcome::Released => Ok(()),
            outcome => Err(LockError::ReleaseRejected {
                lock_key: handle.lock_key.clone(),
                outcome,
            }),
        }
    }

    /// Run `work` while holding the lock described by `request`.
    ///
    /// The work's own result is returned untouched; a release that did not
    /// cleanly delete our lock is logged since the work may have overlapped
    /// with another holder. The release outcome never reaches the caller, use
    /// [`with_lock_outcome`](Self::with_lock_outcome) to act on it.
    pub async fn with_lock<T, E, F, Fut>(&self, request: LockRequest, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<LockError>,
    {
        let handle = self.acquire(&request).await?;
        let result = work().await;

        let released = self.release(&handle).await;
        log_release(&handle, request.ttl, &released);

        result
    }

    /// Like [`with_lock`](Self::with_lock) but hands the release outcome back
    /// next to the work's value. A failed release surfaces as an error.
    ///
    /// When the work itself fails its error wins and the outcome is only logged.
    pub async fn with_lock_outcome<T, E, F, Fut>(
        &self,
        request: LockRequest,
        work: F,
    ) -> Result<(T, ReleaseOutcome), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<LockError>,
    {
        let handle = self.acquire(&request).await?;
        let result = work().await;
        let released = self.release(&handle).await;

        match result {
            Ok(value) => Ok((value, released?)),
            Err(e) => {
                log_release(&handle, request.ttl, &released);
                Err(e)
            }
        }
    }
}

fn log_release(handle: &LockHandle, ttl: Duration, released: &LockResult<ReleaseOutcome>) {
    match released {
        Ok(ReleaseOutcome::Released) => {}
        Ok(ReleaseOutcome::ExpiredClean) => {
            tracing::warn!(
                "Lock {} expired before release (ttl {:?})",
                handle.lock_key,
                ttl
            );
        }
        Ok(outcome) => {
            tracing::error!(
                "Lock {} lost while held: {}; protected work may have run twice",
                handle.lock_key,
                outcome
            );
        }
        Err(e) => {
            tracing::error!("Failed to release lock {}: {}", handle.lock_key, e);
        }
    }
}

fn validate_handle(handle: &LockHandle) -> LockResult<()> {
    if handle.namespace.is_empty() {
        return Err(LockError::InvalidReleaseArgs("namespace"));
    }
    if handle.lock_key.is_empty() {
        return Err(LockError::InvalidReleaseArgs("lock_key"));
    }
    if handle.ownership_token.is_empty() {
        return Err(LockError::InvalidReleaseArgs("ownership_token"));
    }
    if handle.counter_value <= 0 {
        return Err(LockError::InvalidReleaseArgs("counter_value"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[test]
    fn test_lock_metrics_are_described() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            describe_lock_metrics();
            metrics::counter!(LOCK_ACQUIRE_TOTAL, "result" => "acquired").increment(1);
            metrics::counter!(LOCK_RELEASE_TOTAL, "outcome" => "released").increment(1);
        });

        let rendered = handle.render();
        assert!(rendered.contains("# HELP lock_acquire_total Lock acquisition attempts by result"));
        assert!(rendered.contains("# HELP lock_release_total Lock releases by outcome"));
        assert!(rendered.contains("lock_acquire_total{result=\"acquired\"} 1"));
    }
}

use thiserror::Error;

/// Rejections raised by entity validators before anything is stored.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Failures of the distributed lock manager.
///
/// Release outcomes other than `Released` are not errors by themselves, see
/// [`crate::domain::entities::ReleaseOutcome`]; `ReleaseRejected` only shows up
/// when a caller asks for a strict release.
#[derive(Error, Debug)]
pub enum LockError {
    #[error("lock already held: {lock_key}")]
    AlreadyHeld { lock_key: String },

    #[error("failed to set lock {lock_key}: {reason}")]
    SetFailed { lock_key: String, reason: String },

    #[error("failed to record acquisition counter for {lock_key}: {reason}")]
    CounterWriteFailed { lock_key: String, reason: String },

    #[error("invalid release arguments: {0} is empty")]
    InvalidReleaseArgs(&'static str),

    #[error("unexpected release script reply {reply} for {lock_key}")]
    UnexpectedScriptReply { lock_key: String, reply: i64 },

    #[error("lock {lock_key} not released: {outcome}")]
    ReleaseRejected {
        lock_key: String,
        outcome: crate::domain::entities::ReleaseOutcome,
    },

    #[error("lock store error: {0}")]
    Store(String),
}

pub type LockResult<T> = Result<T, LockError>;

#![forbid(unsafe_code)]

use thiserror::Error;

/// Queue bookkeeping errors, distinct from job failures (those travel
/// inside the ticket outcome as the job's own error type).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// The queue was torn down before the request was dispatched.
    /// Seen during runtime shutdown; callers treat it as detachment.
    #[error("queue dropped before the request was dispatched")]
    Abandoned,
}

pub type QueueResult<T> = Result<T, QueueError>;

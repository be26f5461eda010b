#![forbid(unsafe_code)]

use thiserror::Error;

/// Condition parsing errors. These indicate a configuration mistake and
/// surface at placeholder construction time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("empty media condition")]
    EmptyCondition,

    #[error("invalid media condition syntax: {0}")]
    Syntax(String),

    #[error("unsupported media feature: {0}")]
    UnsupportedFeature(String),

    #[error("invalid length (expected `<integer>px`): {0}")]
    InvalidLength(String),

    #[error("invalid orientation (expected `landscape` or `portrait`): {0}")]
    InvalidOrientation(String),
}

pub type MediaResult<T> = Result<T, MediaError>;

#![forbid(unsafe_code)]

use mosaic_core::SourceId;
use thiserror::Error;

/// Facade-level errors.
#[derive(Debug, Error)]
pub enum MosaicError {
    /// A source's condition expression failed to parse.
    #[error("invalid source condition: {0}")]
    Condition(#[from] mosaic_media::MediaError),

    /// Loader resolution or loading failed.
    #[error(transparent)]
    Load(#[from] mosaic_loaders::LoadError),

    /// A placeholder was declared without any candidate sources.
    #[error("placeholder has no sources")]
    NoSources,

    /// Dispatch was asked for a source this placeholder does not own.
    #[error("unknown source: {0}")]
    UnknownSource(SourceId),
}

pub type MosaicResult<T> = Result<T, MosaicError>;

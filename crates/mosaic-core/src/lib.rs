#![forbid(unsafe_code)]

//! # mosaic-core
//!
//! Shared primitives for the mosaic media loading pipeline: instance
//! identifiers and the displayable [`Media`] value produced by loaders.

mod id;
mod media;

pub use id::{PlaceholderId, SourceId};
pub use media::Media;

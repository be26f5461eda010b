#![forbid(unsafe_code)]

//! # mosaic-loaders
//!
//! Pluggable, type-keyed media loaders and the registry that resolves a
//! source descriptor to the loader responsible for fetching it.
//!
//! Resolution order: an explicit loader value on the request wins, then an
//! explicit loader name, then type inference — a MIME-like type hint when
//! present, otherwise the locator's file extension. Type keys accept
//! suffixed MIME variants, so `image/svg+xml` matches a loader registered
//! under `svg`.
//!
//! A loader may refuse a request (`attempt` returns `None`); dispatch then
//! falls through to the next candidate in registration order.

mod error;
mod fetch;
mod loader;
mod raster;
mod registry;
mod request;
#[cfg(any(test, feature = "test-utils"))]
mod testing;
mod timeout;
mod vector;

pub use error::{LoadError, LoadResult};
pub use fetch::{ByteStream, Fetch, FetchError, FetchedBody, FetchedStream, HttpFetch};
pub use loader::Loader;
pub use raster::RasterLoader;
pub use registry::LoaderRegistry;
pub use request::{LoadRequest, LoaderHint};
#[cfg(any(test, feature = "test-utils"))]
pub use testing::MemoryFetch;
pub use timeout::TimeoutLoader;
pub use vector::InlineVectorLoader;

#![forbid(unsafe_code)]

use url::Url;

/// Events emitted by loaders while fetching.
#[derive(Debug, Clone, PartialEq)]
pub enum LoaderEvent {
    /// Bytes received so far for an in-flight fetch.
    Progress {
        url: Url,
        received: u64,
        total: Option<u64>,
    },
}

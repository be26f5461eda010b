//! Process-unique identifiers for placeholders and their candidate sources.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_PLACEHOLDER: AtomicU64 = AtomicU64::new(1);
static NEXT_SOURCE: AtomicU64 = AtomicU64::new(1);

/// Identifier of one placeholder (one controller instance).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceholderId(u64);

impl PlaceholderId {
    /// Mint a fresh, process-unique id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_PLACEHOLDER.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for PlaceholderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "placeholder#{}", self.0)
    }
}

/// Identifier of one candidate source within a placeholder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u64);

impl SourceId {
    /// Mint a fresh, process-unique id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_SOURCE.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "source#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = SourceId::next();
        let b = SourceId::next();
        assert_ne!(a, b);

        let p = PlaceholderId::next();
        let q = PlaceholderId::next();
        assert_ne!(p, q);
    }
}

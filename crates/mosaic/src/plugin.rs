#![forbid(unsafe_code)]

use crate::controller::SourceController;

/// Extension point invoked once per controller at construction.
///
/// A plugin keeps a clone of the controller handle and drives its public
/// capabilities — the canonical example calls `load()` when the
/// placeholder scrolls into view, pairing with
/// [`Autoload::Lazy`](crate::Autoload::Lazy). Capability swaps (an
/// alternate scheduler, a different viewport source) are wired on the
/// runtime instead of patched onto controllers.
pub trait Plugin: Send + Sync {
    fn initialize(&self, controller: &SourceController);
}

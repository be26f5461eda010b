#![forbid(unsafe_code)]

//! Viewport state and the watch-channel feed that distributes it.

use tokio::sync::watch;
use tracing::trace;

/// A viewport snapshot in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Read access to the current viewport.
///
/// `None` means the platform cannot evaluate viewport conditions at all —
/// conditioned sources then never match, unconditioned ones still do.
pub trait ViewportSource: Send + Sync {
    fn current(&self) -> Option<Viewport>;
}

/// A viewport source that always reports the same value.
///
/// Useful for fixed-size embeddings and tests.
#[derive(Clone, Copy, Debug)]
pub struct StaticViewport(Option<Viewport>);

impl StaticViewport {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self(Some(viewport))
    }

    /// A source modelling a platform without condition-evaluation capability.
    #[must_use]
    pub fn unavailable() -> Self {
        Self(None)
    }
}

impl ViewportSource for StaticViewport {
    fn current(&self) -> Option<Viewport> {
        self.0
    }
}

/// Publisher for viewport changes.
///
/// The embedder owns the feed and pushes a new [`Viewport`] whenever its
/// surface resizes; controllers hold subscriptions and re-run selection on
/// each change. Dropping a subscription unsubscribes it.
#[derive(Debug)]
pub struct ViewportFeed {
    tx: watch::Sender<Option<Viewport>>,
}

impl ViewportFeed {
    #[must_use]
    pub fn new(initial: Option<Viewport>) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// Publish a new viewport value, waking all subscriptions.
    pub fn set(&self, viewport: Viewport) {
        trace!(width = viewport.width, height = viewport.height, "viewport updated");
        self.tx.send_replace(Some(viewport));
    }

    /// Drop viewport capability; conditioned sources stop matching.
    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    /// Subscribe to future viewport changes.
    #[must_use]
    pub fn subscribe(&self) -> ViewportSubscription {
        ViewportSubscription {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for ViewportFeed {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ViewportSource for ViewportFeed {
    fn current(&self) -> Option<Viewport> {
        *self.tx.borrow()
    }
}

/// One subscriber's view of the feed.
pub struct ViewportSubscription {
    rx: watch::Receiver<Option<Viewport>>,
}

impl ViewportSubscription {
    /// Wait for the next change. Returns `false` once the feed is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// The value as of the last observed change.
    #[must_use]
    pub fn current(&self) -> Option<Viewport> {
        *self.rx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_reports_latest_value() {
        let feed = ViewportFeed::new(None);
        assert_eq!(feed.current(), None);

        feed.set(Viewport::new(1024, 768));
        assert_eq!(feed.current(), Some(Viewport::new(1024, 768)));

        feed.clear();
        assert_eq!(feed.current(), None);
    }

    #[tokio::test]
    async fn subscription_wakes_on_change() {
        let feed = ViewportFeed::new(Some(Viewport::new(320, 480)));
        let mut sub = feed.subscribe();

        feed.set(Viewport::new(800, 600));
        assert!(sub.changed().await);
        assert_eq!(sub.current(), Some(Viewport::new(800, 600)));
    }

    #[tokio::test]
    async fn subscription_ends_when_feed_dropped() {
        let feed = ViewportFeed::new(None);
        let mut sub = feed.subscribe();
        drop(feed);
        assert!(!sub.changed().await);
    }
}

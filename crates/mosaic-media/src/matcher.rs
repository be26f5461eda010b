#![forbid(unsafe_code)]

use std::sync::Arc;

use crate::{condition::MediaCondition, viewport::ViewportSource};

/// Evaluates whether a source's condition currently holds.
///
/// Matching is recomputed from the live viewport on every call — never
/// cached — because the same condition can flip between calls as the
/// viewport changes.
#[derive(Clone)]
pub struct ConditionMatcher {
    viewport: Arc<dyn ViewportSource>,
}

impl ConditionMatcher {
    #[must_use]
    pub fn new(viewport: Arc<dyn ViewportSource>) -> Self {
        Self { viewport }
    }

    /// Whether the condition currently holds.
    ///
    /// A missing condition always matches. With no viewport capability,
    /// conditioned sources never match (unconditioned sources keep working).
    #[must_use]
    pub fn matches(&self, condition: Option<&MediaCondition>) -> bool {
        let Some(condition) = condition else {
            return true;
        };
        match self.viewport.current() {
            Some(viewport) => condition.evaluate(viewport),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::viewport::{StaticViewport, Viewport, ViewportFeed};

    use super::*;

    fn condition(expr: &str) -> MediaCondition {
        MediaCondition::parse(expr).unwrap()
    }

    #[test]
    fn missing_condition_always_matches() {
        let matcher = ConditionMatcher::new(Arc::new(StaticViewport::unavailable()));
        assert!(matcher.matches(None));
    }

    #[test]
    fn no_viewport_capability_rejects_conditions() {
        let matcher = ConditionMatcher::new(Arc::new(StaticViewport::unavailable()));
        assert!(!matcher.matches(Some(&condition("(min-width: 1px)"))));
    }

    #[test]
    fn evaluation_is_fresh_on_every_call() {
        let feed = Arc::new(ViewportFeed::new(Some(Viewport::new(1024, 768))));
        let matcher = ConditionMatcher::new(Arc::clone(&feed) as Arc<dyn ViewportSource>);
        let wide = condition("(min-width: 800px)");

        assert!(matcher.matches(Some(&wide)));

        feed.set(Viewport::new(400, 700));
        assert!(!matcher.matches(Some(&wide)));

        feed.set(Viewport::new(900, 700));
        assert!(matcher.matches(Some(&wide)));
    }
}

//! Section behaviors and per-pass section instances.
//!
//! A [`Section`] is the capability interface every registered implementation
//! provides: reveal once, tear down on pass end. A [`SectionInstance`] binds
//! one discovered node to its freshly constructed behavior for the lifetime
//! of a discovery pass and owns the pass-scoped flags.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::animator::Animator;
use crate::events::{DiscoveryEvents, RevealEvent};
use crate::node::SectionNode;
use crate::result::RevelarResult;

/// Context handed to a section's reveal behavior.
#[derive(Debug, Clone)]
pub struct RevealContext {
    /// The node being revealed
    pub node: SectionNode,
    /// Animator for driving the reveal
    pub animator: Arc<Animator>,
    /// Whether this reveal belongs to the initial page paint
    pub is_first_paint: bool,
}

/// Capability interface for a registered section implementation.
///
/// Implementations are constructed fresh per discovery pass by their
/// registered factory and own no state across passes.
#[async_trait]
pub trait Section: Send + Sync {
    /// Run the reveal animation, resolving when it has finished.
    async fn reveal(&self, ctx: RevealContext) -> RevelarResult<()>;

    /// Called once when the owning pass is torn down.
    fn teardown(&self) {}
}

/// One discovered node bound to its resolved behavior for one pass.
pub struct SectionInstance {
    name: String,
    index: usize,
    node: SectionNode,
    section: Box<dyn Section>,
    is_visible: AtomicBool,
    has_revealed: AtomicBool,
    /// Cached vertical offset, refreshed once per frame tick (f64 bits).
    top: AtomicU64,
}

impl SectionInstance {
    /// Bind `node` to its resolved `section` behavior.
    ///
    /// `index` is the zero-based position among all discovered nodes in
    /// document order at this pass.
    #[must_use]
    pub fn new(index: usize, node: SectionNode, section: Box<dyn Section>) -> Self {
        let name = node.section_name().to_string();
        let top = node.top();
        Self {
            name,
            index,
            node,
            section,
            is_visible: AtomicBool::new(false),
            has_revealed: AtomicBool::new(false),
            top: AtomicU64::new(top.to_bits()),
        }
    }

    /// Declared section name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Zero-based discovery index.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The owned node handle.
    #[must_use]
    pub fn node(&self) -> &SectionNode {
        &self.node
    }

    /// Last known intersection state.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.is_visible.load(Ordering::SeqCst)
    }

    /// Update the intersection state.
    pub fn set_visible(&self, visible: bool) {
        self.is_visible.store(visible, Ordering::SeqCst);
    }

    /// Whether the reveal has been triggered.
    #[must_use]
    pub fn has_revealed(&self) -> bool {
        self.has_revealed.load(Ordering::SeqCst)
    }

    /// Mark the instance revealed; returns the previous value.
    ///
    /// The flag is monotonic within a pass: callers that observe `false`
    /// own the single reveal for this instance.
    pub fn mark_revealed(&self) -> bool {
        self.has_revealed.swap(true, Ordering::SeqCst)
    }

    /// Cached vertical offset from the viewport top.
    #[must_use]
    pub fn top(&self) -> f64 {
        f64::from_bits(self.top.load(Ordering::SeqCst))
    }

    /// Refresh the cached offset from the node's live geometry.
    pub fn refresh_top(&self) {
        self.top.store(self.node.top().to_bits(), Ordering::SeqCst);
    }

    /// Identity key used for change-notification deduplication.
    #[must_use]
    pub fn identity_key(&self) -> String {
        format!("{}#{}", self.name, self.index)
    }

    /// Invoke the behavior's teardown hook.
    pub fn teardown(&self) {
        self.section.teardown();
    }

    /// Run the reveal and emit the completion notification.
    ///
    /// If the node declares a valid reveal-time override, the behavior is
    /// started without being awaited and completion is reported after the
    /// declared duration instead. Otherwise the behavior's own completion is
    /// awaited. The completion notification fires exactly once per reveal,
    /// after whichever completion source applies.
    ///
    /// # Errors
    ///
    /// Propagates the behavior's failure when it is awaited; a failure in an
    /// override-detached reveal is logged, not returned.
    pub async fn perform_reveal(
        self: &Arc<Self>,
        animator: &Arc<Animator>,
        is_first_paint: bool,
        events: &Arc<DiscoveryEvents>,
    ) -> RevelarResult<()> {
        let ctx = RevealContext {
            node: self.node.clone(),
            animator: Arc::clone(animator),
            is_first_paint,
        };

        match self.node.reveal_time_override() {
            Some(seconds) => {
                let instance = Arc::clone(self);
                tokio::spawn(async move {
                    if let Err(error) = instance.section.reveal(ctx).await {
                        tracing::error!(
                            section = %instance.name,
                            %error,
                            "detached reveal failed"
                        );
                    }
                });
                tokio::time::sleep(Duration::from_secs_f64(seconds)).await;
            }
            None => self.section.reveal(ctx).await?,
        }

        events.reveal.emit(&RevealEvent {
            name: self.name.clone(),
            index: self.index,
            node: self.node.id(),
        });
        Ok(())
    }
}

impl std::fmt::Debug for SectionInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionInstance")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("node", &self.node.id())
            .field("is_visible", &self.is_visible())
            .field("has_revealed", &self.has_revealed())
            .field("top", &self.top())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::Instant;

    /// Behavior that records reveals and sleeps a configurable duration.
    struct TimedSection {
        reveals: Arc<AtomicUsize>,
        duration: Duration,
    }

    #[async_trait]
    impl Section for TimedSection {
        async fn reveal(&self, _ctx: RevealContext) -> RevelarResult<()> {
            tokio::time::sleep(self.duration).await;
            self.reveals.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn timed_instance(node: SectionNode, duration: Duration) -> (Arc<SectionInstance>, Arc<AtomicUsize>) {
        let reveals = Arc::new(AtomicUsize::new(0));
        let section = TimedSection {
            reveals: Arc::clone(&reveals),
            duration,
        };
        (
            Arc::new(SectionInstance::new(0, node, Box::new(section))),
            reveals,
        )
    }

    #[test]
    fn test_mark_revealed_is_monotonic() {
        let (instance, _) = timed_instance(SectionNode::new("hero"), Duration::ZERO);
        assert!(!instance.mark_revealed());
        assert!(instance.mark_revealed());
        assert!(instance.has_revealed());
    }

    #[test]
    fn test_identity_key() {
        let node = SectionNode::new("card-grid");
        let (instance, _) = timed_instance(node, Duration::ZERO);
        assert_eq!(instance.identity_key(), "card-grid#0");
    }

    #[test]
    fn test_refresh_top_tracks_node() {
        let node = SectionNode::new("hero").with_top(100.0);
        let (instance, _) = timed_instance(node.clone(), Duration::ZERO);
        assert!((instance.top() - 100.0).abs() < f64::EPSILON);

        node.set_top(250.0);
        assert!((instance.top() - 100.0).abs() < f64::EPSILON);
        instance.refresh_top();
        assert!((instance.top() - 250.0).abs() < f64::EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn test_perform_reveal_awaits_behavior() {
        let (instance, reveals) = timed_instance(
            SectionNode::new("hero"),
            Duration::from_millis(400),
        );
        let animator = Arc::new(Animator::instant());
        let events = Arc::new(DiscoveryEvents::new());

        let start = Instant::now();
        instance
            .perform_reveal(&animator, false, &events)
            .await
            .unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(400));
        assert_eq!(reveals.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_time_override_caps_completion() {
        // Behavior takes 5s, but the node declares 0.8s: completion (and the
        // event) happens at 800ms regardless of the animation duration.
        let node = SectionNode::new("hero").with_reveal_time("0.8");
        let (instance, _) = timed_instance(node, Duration::from_secs(5));
        let animator = Arc::new(Animator::instant());
        let events = Arc::new(DiscoveryEvents::new());

        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);
        events.reveal.on(move |event| {
            assert_eq!(event.name, "hero");
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        let start = Instant::now();
        instance
            .perform_reveal(&animator, false, &events)
            .await
            .unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(800));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_override_falls_back_to_behavior() {
        let node = SectionNode::new("hero").with_reveal_time("not-a-number");
        let (instance, reveals) = timed_instance(node, Duration::from_millis(300));
        let animator = Arc::new(Animator::instant());
        let events = Arc::new(DiscoveryEvents::new());

        let start = Instant::now();
        instance
            .perform_reveal(&animator, false, &events)
            .await
            .unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(300));
        assert_eq!(reveals.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_event_carries_name_and_fires_once() {
        let (instance, _) = timed_instance(SectionNode::new("cta-reveal"), Duration::ZERO);
        let animator = Arc::new(Animator::instant());
        let events = Arc::new(DiscoveryEvents::new());

        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        events.reveal.on(move |event| {
            if let Ok(mut log) = seen_clone.lock() {
                log.push((event.name.clone(), event.index));
            }
        });

        instance
            .perform_reveal(&animator, false, &events)
            .await
            .unwrap();

        let log = seen.lock().unwrap();
        assert_eq!(log.as_slice(), [("cta-reveal".to_string(), 0)]);
    }

    #[tokio::test]
    async fn test_failing_reveal_propagates_and_skips_event() {
        struct FailingSection;

        #[async_trait]
        impl Section for FailingSection {
            async fn reveal(&self, ctx: RevealContext) -> RevelarResult<()> {
                Err(crate::result::RevelarError::RevealFailed {
                    name: ctx.node.section_name().to_string(),
                    message: "boom".to_string(),
                })
            }
        }

        let instance = Arc::new(SectionInstance::new(
            0,
            SectionNode::new("hero"),
            Box::new(FailingSection),
        ));
        let animator = Arc::new(Animator::instant());
        let events = Arc::new(DiscoveryEvents::new());
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);
        events.reveal.on(move |_| {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        let result = instance.perform_reveal(&animator, false, &events).await;
        assert!(result.is_err());
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}

//! Discovery coordinator: owns the full section lifecycle for one pass.
//!
//! `discover` enumerates matching nodes in document order, resolves each to
//! a registered behavior, wires visibility tracking to the batch scheduler,
//! and starts the frame tick. `destroy_all` tears the pass down without
//! leaking observers, timers, or duplicate reveals; a new `discover` always
//! tears down the previous pass first.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::animator::Animator;
use crate::batch::{BatchConfig, BatchScheduler};
use crate::events::{DiscoveryEvents, Subscription};
use crate::naming::try_naming_strategies;
use crate::node::{SectionSource, Viewport};
use crate::observer::{IntersectionEntry, ObserverOptions, VisibilityTracker};
use crate::registry::SectionRegistry;
use crate::section::SectionInstance;
use crate::ticker::{FrameTicker, DEFAULT_TICK_PERIOD};

/// Default discovery selector: nodes carrying the section marker attribute.
pub const DEFAULT_SECTION_SELECTOR: &str = "[data-revelar-section]";

/// Pass-scoped state, rebuilt by every `discover` call.
#[derive(Debug, Default)]
struct PassState {
    all: Vec<Arc<SectionInstance>>,
    by_name: HashMap<String, Vec<Arc<SectionInstance>>>,
    tracker: VisibilityTracker,
    scheduler: Option<Arc<BatchScheduler>>,
    ticker: Option<FrameTicker>,
    last_visible_keys: String,
    last_top_key: String,
}

/// Section discovery and lifecycle coordinator.
pub struct SectionDiscovery {
    registry: SectionRegistry,
    animator: Arc<Animator>,
    viewport: Arc<Viewport>,
    selector: String,
    batch_config: Option<BatchConfig>,
    tick_period: Duration,
    events: Arc<DiscoveryEvents>,
    pass: Mutex<PassState>,
}

impl SectionDiscovery {
    /// Create a coordinator with the default selector and no batching.
    #[must_use]
    pub fn new(
        registry: SectionRegistry,
        animator: Arc<Animator>,
        viewport: Arc<Viewport>,
    ) -> Self {
        Self {
            registry,
            animator,
            viewport,
            selector: DEFAULT_SECTION_SELECTOR.to_string(),
            batch_config: None,
            tick_period: DEFAULT_TICK_PERIOD,
            events: Arc::new(DiscoveryEvents::new()),
            pass: Mutex::new(PassState::default()),
        }
    }

    /// Override the discovery selector (builder form).
    #[must_use]
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = selector.into();
        self
    }

    /// Enable batching with the given policy (builder form).
    #[must_use]
    pub fn with_batch(mut self, config: BatchConfig) -> Self {
        self.batch_config = Some(config);
        self
    }

    /// Override the frame-tick period (builder form).
    #[must_use]
    pub const fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// The active discovery selector.
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Options the host intersection primitive should honor for this pass.
    #[must_use]
    pub fn observer_options(&self) -> ObserverOptions {
        self.pass
            .lock()
            .map(|pass| pass.tracker.options().clone())
            .unwrap_or_default()
    }

    /// The coordinator's notification channels.
    #[must_use]
    pub fn events(&self) -> &Arc<DiscoveryEvents> {
        &self.events
    }

    /// Run a discovery pass over `root`.
    ///
    /// Tears down any previous pass first (observer, timers, instances,
    /// pending queue; change listeners survive, see [`Self::destroy_all`]).
    /// Nodes are enumerated in document order; the discovery index counts
    /// every matched node, including ones skipped for lacking a registered
    /// implementation. Immediate-flagged nodes reveal right away, bypassing
    /// the scheduler, with `is_first_paint` forwarded.
    ///
    /// Must be called within a Tokio runtime.
    pub fn discover(self: &Arc<Self>, root: &dyn SectionSource, is_first_paint: bool) {
        self.teardown_pass();

        let nodes = root.query(&self.selector);
        tracing::debug!(
            nodes = nodes.len(),
            selector = %self.selector,
            is_first_paint,
            "starting discovery pass"
        );

        let mut immediates = Vec::new();
        if let Ok(mut pass) = self.pass.lock() {
            for (index, node) in nodes.into_iter().enumerate() {
                let resolved =
                    try_naming_strategies(node.section_name(), |name| self.registry.get(name));
                let Some(factory) = resolved else {
                    tracing::warn!(
                        section = %node.section_name(),
                        "no implementation registered under any naming strategy, skipping node"
                    );
                    continue;
                };

                let section = factory(node.clone());
                let instance = Arc::new(SectionInstance::new(index, node, section));
                pass.tracker.observe(&instance);
                pass.by_name
                    .entry(instance.name().to_string())
                    .or_default()
                    .push(Arc::clone(&instance));

                if instance.node().is_immediate() {
                    instance.mark_revealed();
                    immediates.push(Arc::clone(&instance));
                }
                pass.all.push(instance);
            }

            if let Some(config) = self.batch_config.as_ref().filter(|config| config.enabled) {
                pass.scheduler = Some(Arc::new(BatchScheduler::new(
                    config.clone(),
                    Arc::clone(&self.viewport),
                    Arc::clone(&self.animator),
                    Arc::clone(&self.events),
                )));
            }

            let weak = Arc::downgrade(self);
            pass.ticker = Some(FrameTicker::start(self.tick_period, move || {
                if let Some(discovery) = weak.upgrade() {
                    discovery.tick();
                }
            }));
        }

        for instance in immediates {
            let animator = Arc::clone(&self.animator);
            let events = Arc::clone(&self.events);
            tokio::spawn(async move {
                if let Err(error) = instance
                    .perform_reveal(&animator, is_first_paint, &events)
                    .await
                {
                    tracing::error!(section = %instance.name(), %error, "immediate reveal failed");
                }
            });
        }
    }

    /// Route a batch of host intersection updates.
    ///
    /// Updates for nodes of a torn-down pass are ignored. Newly eligible
    /// instances flow into the pass's scheduler, or reveal directly when
    /// batching is disabled.
    pub fn handle_intersections(self: &Arc<Self>, entries: &[IntersectionEntry]) {
        let (eligible, scheduler) = match self.pass.lock() {
            Ok(pass) => (pass.tracker.process(entries), pass.scheduler.clone()),
            Err(_) => return,
        };

        for instance in eligible {
            match &scheduler {
                Some(scheduler) => scheduler.enqueue(&instance),
                None => {
                    if instance.mark_revealed() {
                        continue;
                    }
                    let animator = Arc::clone(&self.animator);
                    let events = Arc::clone(&self.events);
                    tokio::spawn(async move {
                        if let Err(error) =
                            instance.perform_reveal(&animator, false, &events).await
                        {
                            tracing::error!(
                                section = %instance.name(),
                                %error,
                                "direct reveal failed"
                            );
                        }
                    });
                }
            }
        }
    }

    /// One frame tick: refresh cached offsets and emit derived-view changes.
    fn tick(&self) {
        let (visible_payload, top_payload) = {
            let Ok(mut pass) = self.pass.lock() else {
                return;
            };
            for instance in &pass.all {
                instance.refresh_top();
            }

            let visible = Self::visible_of(&pass.all);
            let visible_keys = visible
                .iter()
                .map(|instance| instance.identity_key())
                .collect::<Vec<_>>()
                .join("|");
            let top = visible.first().cloned();
            let top_key = top
                .as_ref()
                .map(|instance| instance.identity_key())
                .unwrap_or_default();

            let visible_payload = if visible_keys == pass.last_visible_keys {
                None
            } else {
                pass.last_visible_keys = visible_keys;
                Some(visible)
            };
            let top_payload = if top_key == pass.last_top_key {
                None
            } else {
                pass.last_top_key = top_key;
                Some(top)
            };
            (visible_payload, top_payload)
        };

        // Emit after releasing the pass lock so listeners may query freely.
        if let Some(visible) = visible_payload {
            self.events.visible_change.emit(&visible);
        }
        if let Some(top) = top_payload {
            self.events.top_visible_change.emit(&top);
        }
    }

    fn visible_of(all: &[Arc<SectionInstance>]) -> Vec<Arc<SectionInstance>> {
        let mut visible: Vec<_> = all
            .iter()
            .filter(|instance| instance.is_visible())
            .cloned()
            .collect();
        visible.sort_by(|a, b| a.top().total_cmp(&b.top()));
        visible
    }

    /// All instances of the current pass in discovery order.
    #[must_use]
    pub fn get_all(&self) -> Vec<Arc<SectionInstance>> {
        self.pass
            .lock()
            .map(|pass| pass.all.clone())
            .unwrap_or_default()
    }

    /// Instances declared under `name`, in discovery order.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Vec<Arc<SectionInstance>> {
        self.pass
            .lock()
            .map(|pass| pass.by_name.get(name).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Currently visible instances, ordered by ascending cached offset.
    #[must_use]
    pub fn get_visible(&self) -> Vec<Arc<SectionInstance>> {
        self.pass
            .lock()
            .map(|pass| Self::visible_of(&pass.all))
            .unwrap_or_default()
    }

    /// The top-most visible instance, if any.
    #[must_use]
    pub fn get_top_visible(&self) -> Option<Arc<SectionInstance>> {
        self.get_visible().into_iter().next()
    }

    /// Visible instances excluding the top-most one.
    #[must_use]
    pub fn get_visible_after_top(&self) -> Vec<Arc<SectionInstance>> {
        let visible = self.get_visible();
        if visible.is_empty() {
            return Vec::new();
        }
        visible.into_iter().skip(1).collect()
    }

    /// All instances after the top-most visible one, in discovery order.
    #[must_use]
    pub fn get_all_after_top_visible(&self) -> Vec<Arc<SectionInstance>> {
        let Some(top) = self.get_top_visible() else {
            return Vec::new();
        };
        let all = self.get_all();
        match all.iter().position(|instance| Arc::ptr_eq(instance, &top)) {
            Some(position) => all.into_iter().skip(position + 1).collect(),
            None => Vec::new(),
        }
    }

    /// Subscribe to visible-set changes.
    pub fn on_visible_change(
        &self,
        listener: impl Fn(&Vec<Arc<SectionInstance>>) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.visible_change.on(listener)
    }

    /// Unsubscribe from visible-set changes.
    pub fn off_visible_change(&self, subscription: Subscription) {
        self.events.visible_change.off(subscription);
    }

    /// Subscribe to top-most-visible changes.
    pub fn on_top_visible_change(
        &self,
        listener: impl Fn(&Option<Arc<SectionInstance>>) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.top_visible_change.on(listener)
    }

    /// Unsubscribe from top-most-visible changes.
    pub fn off_top_visible_change(&self, subscription: Subscription) {
        self.events.top_visible_change.off(subscription);
    }

    /// Subscribe to reveal completions.
    pub fn on_reveal(
        &self,
        listener: impl Fn(&crate::events::RevealEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.reveal.on(listener)
    }

    /// Unsubscribe from reveal completions.
    pub fn off_reveal(&self, subscription: Subscription) {
        self.events.reveal.off(subscription);
    }

    /// Tear down the current pass and detach all change listeners.
    ///
    /// After this returns no reveal, timer, or notification fires for
    /// instances of the torn-down pass, even if a stale intersection signal
    /// arrives later. Already-started reveals are not aborted.
    pub fn destroy_all(&self) {
        self.teardown_pass();
        self.events.clear();
        tracing::debug!("discovery destroyed");
    }

    /// Tear down pass-scoped state: observer, timers, queue, instances.
    fn teardown_pass(&self) {
        let (instances, scheduler, ticker) = match self.pass.lock() {
            Ok(mut pass) => {
                pass.tracker.disconnect();
                pass.by_name.clear();
                pass.last_visible_keys.clear();
                pass.last_top_key.clear();
                (
                    std::mem::take(&mut pass.all),
                    pass.scheduler.take(),
                    pass.ticker.take(),
                )
            }
            Err(_) => return,
        };

        if let Some(mut ticker) = ticker {
            ticker.cancel();
        }
        if let Some(scheduler) = scheduler {
            scheduler.teardown();
        }
        for instance in instances {
            instance.teardown();
        }
    }
}

impl std::fmt::Debug for SectionDiscovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionDiscovery")
            .field("selector", &self.selector)
            .field("batch", &self.batch_config)
            .field("sections", &self.get_all().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{SectionNode, StaticPage};
    use crate::result::RevelarResult;
    use crate::section::{RevealContext, Section};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Behavior that counts reveals and teardowns and records first-paint.
    struct CountingSection {
        reveals: Arc<AtomicUsize>,
        teardowns: Arc<AtomicUsize>,
        first_paints: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Section for CountingSection {
        async fn reveal(&self, ctx: RevealContext) -> RevelarResult<()> {
            self.reveals.fetch_add(1, Ordering::SeqCst);
            if ctx.is_first_paint {
                self.first_paints.fetch_add(1, Ordering::SeqCst);
            }
            Ok(())
        }

        fn teardown(&self) {
            self.teardowns.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Fixture {
        discovery: Arc<SectionDiscovery>,
        page: StaticPage,
        reveals: Arc<AtomicUsize>,
        teardowns: Arc<AtomicUsize>,
        first_paints: Arc<AtomicUsize>,
    }

    impl Fixture {
        fn new(names: &[&str], batch: Option<BatchConfig>) -> Self {
            let reveals = Arc::new(AtomicUsize::new(0));
            let teardowns = Arc::new(AtomicUsize::new(0));
            let first_paints = Arc::new(AtomicUsize::new(0));

            let mut registry = SectionRegistry::new();
            for name in names {
                let reveals = Arc::clone(&reveals);
                let teardowns = Arc::clone(&teardowns);
                let first_paints = Arc::clone(&first_paints);
                registry.register(*name, move |_node| {
                    Box::new(CountingSection {
                        reveals: Arc::clone(&reveals),
                        teardowns: Arc::clone(&teardowns),
                        first_paints: Arc::clone(&first_paints),
                    })
                });
            }

            let mut discovery = SectionDiscovery::new(
                registry,
                Arc::new(Animator::instant()),
                Arc::new(Viewport::new(800.0)),
            )
            // Keep the automatic tick out of the way; tests tick manually.
            .with_tick_period(Duration::from_secs(3600));
            if let Some(config) = batch {
                discovery = discovery.with_batch(config);
            }

            Self {
                discovery: Arc::new(discovery),
                page: StaticPage::new(),
                reveals,
                teardowns,
                first_paints,
            }
        }

        fn node(&self, name: &str, top: f64) -> SectionNode {
            let node = SectionNode::new(name).with_top(top);
            self.page.push_node(DEFAULT_SECTION_SELECTOR, node.clone());
            node
        }

        fn intersect(&self, node: &SectionNode, ratio: f64) {
            self.discovery
                .handle_intersections(&[IntersectionEntry::new(node.id(), true, ratio)]);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_discover_assigns_document_order_indices() {
        let fixture = Fixture::new(&["hero", "card-grid"], None);
        fixture.node("hero", 0.0);
        fixture.node("mystery", 100.0); // unresolved, still consumes an index
        fixture.node("card-grid", 200.0);

        fixture.discovery.discover(&fixture.page, true);

        let all = fixture.discovery.get_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name(), "hero");
        assert_eq!(all[0].index(), 0);
        assert_eq!(all[1].name(), "card-grid");
        assert_eq!(all[1].index(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_discover_resolves_via_naming_strategies() {
        let fixture = Fixture::new(&["CardGridSection"], None);
        fixture.node("card-grid", 0.0);

        fixture.discovery.discover(&fixture.page, true);
        assert_eq!(fixture.discovery.get_all().len(), 1);
        assert_eq!(fixture.discovery.get_by_name("card-grid").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_node_reveals_on_discover_with_first_paint() {
        let fixture = Fixture::new(&["hero"], Some(BatchConfig::new()));
        let node = SectionNode::new("hero").with_immediate(true);
        fixture.page.push_node(DEFAULT_SECTION_SELECTOR, node.clone());

        fixture.discovery.discover(&fixture.page, true);
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert_eq!(fixture.reveals.load(Ordering::SeqCst), 1);
        assert_eq!(fixture.first_paints.load(Ordering::SeqCst), 1);

        // A later intersection must not reveal it again.
        fixture.intersect(&node, 1.0);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fixture.reveals.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_intersection_reveals_directly_without_batching() {
        let fixture = Fixture::new(&["hero"], None);
        let node = fixture.node("hero", 50.0);

        fixture.discovery.discover(&fixture.page, false);
        fixture.intersect(&node, 0.5);
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert_eq!(fixture.reveals.load(Ordering::SeqCst), 1);
        assert_eq!(fixture.first_paints.load(Ordering::SeqCst), 0);

        // Repeated signals never reveal twice.
        fixture.intersect(&node, 1.0);
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(fixture.reveals.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_intersections_flow_through_scheduler_when_batched() {
        let fixture = Fixture::new(&["hero", "card-grid"], Some(BatchConfig::new()));
        let hero = fixture.node("hero", 50.0);
        let cards = fixture.node("card-grid", 300.0);

        fixture.discovery.discover(&fixture.page, false);
        fixture.intersect(&hero, 0.5);
        fixture.intersect(&cards, 0.5);

        // Inside the collection window nothing has revealed yet.
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(fixture.reveals.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fixture.reveals.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_visible_queries_order_by_offset() {
        let fixture = Fixture::new(&["a", "b", "c"], None);
        let a = fixture.node("a", 300.0);
        let b = fixture.node("b", 100.0);
        let c = fixture.node("c", 500.0);

        fixture.discovery.discover(&fixture.page, false);
        for node in [&a, &b, &c] {
            fixture.intersect(node, 0.2);
        }

        let visible: Vec<_> = fixture
            .discovery
            .get_visible()
            .iter()
            .map(|instance| instance.name().to_string())
            .collect();
        assert_eq!(visible, ["b", "a", "c"]);

        let top = fixture.discovery.get_top_visible().unwrap();
        assert_eq!(top.name(), "b");

        let after_top: Vec<_> = fixture
            .discovery
            .get_visible_after_top()
            .iter()
            .map(|instance| instance.name().to_string())
            .collect();
        assert_eq!(after_top, ["a", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_all_after_top_visible_uses_discovery_order() {
        let fixture = Fixture::new(&["a", "b", "c"], None);
        let a = fixture.node("a", 300.0);
        let _b = fixture.node("b", 100.0);
        let _c = fixture.node("c", 500.0);

        fixture.discovery.discover(&fixture.page, false);
        // Only "a" (discovery index 0) is visible → everything after it in
        // document order follows, visible or not.
        fixture.intersect(&a, 0.2);

        let after: Vec<_> = fixture
            .discovery
            .get_all_after_top_visible()
            .iter()
            .map(|instance| instance.name().to_string())
            .collect();
        assert_eq!(after, ["b", "c"]);

        assert!(fixture
            .discovery
            .get_visible_after_top()
            .is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_emits_visible_change_once_per_change() {
        let fixture = Fixture::new(&["hero"], None);
        let node = fixture.node("hero", 50.0);
        fixture.discovery.discover(&fixture.page, false);

        let emissions = Arc::new(AtomicUsize::new(0));
        let emissions_clone = Arc::clone(&emissions);
        fixture.discovery.on_visible_change(move |visible| {
            assert_eq!(visible.len(), 1);
            emissions_clone.fetch_add(1, Ordering::SeqCst);
        });

        fixture.intersect(&node, 0.5);
        fixture.discovery.tick();
        fixture.discovery.tick();
        fixture.discovery.tick();

        assert_eq!(emissions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_emits_top_change_with_none_when_emptied() {
        let fixture = Fixture::new(&["hero"], None);
        let node = fixture.node("hero", 50.0);
        fixture.discovery.discover(&fixture.page, false);

        let tops = Arc::new(Mutex::new(Vec::new()));
        let tops_clone = Arc::clone(&tops);
        fixture.discovery.on_top_visible_change(move |top| {
            if let Ok(mut log) = tops_clone.lock() {
                log.push(top.as_ref().map(|instance| instance.name().to_string()));
            }
        });

        fixture.intersect(&node, 0.5);
        fixture.discovery.tick();
        fixture
            .discovery
            .handle_intersections(&[IntersectionEntry::new(node.id(), false, 0.0)]);
        fixture.discovery.tick();

        let log = tops.lock().unwrap();
        assert_eq!(log.as_slice(), [Some("hero".to_string()), None]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_destroy_all_silences_everything() {
        let fixture = Fixture::new(&["hero"], Some(BatchConfig::new()));
        let node = fixture.node("hero", 50.0);
        fixture.discovery.discover(&fixture.page, false);

        let emissions = Arc::new(AtomicUsize::new(0));
        let emissions_clone = Arc::clone(&emissions);
        fixture.discovery.on_visible_change(move |_| {
            emissions_clone.fetch_add(1, Ordering::SeqCst);
        });

        fixture.discovery.destroy_all();
        assert_eq!(fixture.teardowns.load(Ordering::SeqCst), 1);
        assert!(fixture.discovery.get_all().is_empty());

        // Late intersection signal for a torn-down node is a no-op.
        fixture.intersect(&node, 1.0);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(fixture.reveals.load(Ordering::SeqCst), 0);
        assert_eq!(emissions.load(Ordering::SeqCst), 0);
        assert!(fixture.discovery.events().visible_change.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_destroy_cancels_collection_window() {
        let fixture = Fixture::new(&["hero"], Some(BatchConfig::new()));
        let node = fixture.node("hero", 50.0);
        fixture.discovery.discover(&fixture.page, false);

        fixture.intersect(&node, 0.5);
        fixture.discovery.destroy_all();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(fixture.reveals.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rediscover_replaces_pass_without_duplicates() {
        let fixture = Fixture::new(&["hero"], None);
        let first = fixture.node("hero", 50.0);

        fixture.discovery.discover(&fixture.page, true);
        fixture.intersect(&first, 0.5);
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(fixture.reveals.load(Ordering::SeqCst), 1);

        // Page transition: new content, fresh pass.
        let second = SectionNode::new("hero").with_top(80.0);
        fixture
            .page
            .set_nodes(DEFAULT_SECTION_SELECTOR, vec![second.clone()]);
        fixture.discovery.discover(&fixture.page, false);
        assert_eq!(fixture.teardowns.load(Ordering::SeqCst), 1);

        // Old node signals are stale; the new node reveals exactly once.
        fixture.intersect(&first, 1.0);
        fixture.intersect(&second, 0.5);
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(fixture.reveals.load(Ordering::SeqCst), 2);

        let all = fixture.discovery.get_all();
        assert_eq!(all.len(), 1);
        assert!(all[0].node().same_node(&second));
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_selector() {
        let fixture = Fixture::new(&["hero"], None);
        let discovery = Arc::new(
            SectionDiscovery::new(
                {
                    let mut registry = SectionRegistry::new();
                    let reveals = Arc::clone(&fixture.reveals);
                    registry.register("hero", move |_node| {
                        Box::new(CountingSection {
                            reveals: Arc::clone(&reveals),
                            teardowns: Arc::new(AtomicUsize::new(0)),
                            first_paints: Arc::new(AtomicUsize::new(0)),
                        })
                    });
                    registry
                },
                Arc::new(Animator::instant()),
                Arc::new(Viewport::new(800.0)),
            )
            .with_selector("[data-motion]"),
        );

        let page = StaticPage::new();
        page.push_node("[data-motion]", SectionNode::new("hero"));
        discovery.discover(&page, true);
        assert_eq!(discovery.get_all().len(), 1);
        assert_eq!(discovery.selector(), "[data-motion]");
    }
}

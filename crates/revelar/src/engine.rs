//! Engine facade: configuration, construction, and page-transition wiring.
//!
//! [`Revelar`] binds the configuration surface to a discovery coordinator,
//! an animator, and an optional transition overlay, and attaches to the
//! host's page-transition hooks at the three lifecycle points: about to
//! leave, content replaced, entry finished.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::animator::{AnimationDriver, Animator, InstantDriver};
use crate::batch::BatchConfig;
use crate::discovery::{SectionDiscovery, DEFAULT_SECTION_SELECTOR};
use crate::events::{RevealEvent, Subscription};
use crate::node::{SectionSource, Viewport};
use crate::observer::IntersectionEntry;
use crate::overlay::{OverlayConfig, OverlayTransition};
use crate::registry::{
    load_sections_from_modules, ModuleFilter, SectionFactory, SectionRegistry,
};
use crate::result::{RevelarError, RevelarResult};
use crate::section::SectionInstance;

/// Reduced-motion policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReducedMotion {
    /// Skip animations when the host signals the user preference
    #[default]
    Respect,
    /// Animate regardless of the host preference
    Ignore,
}

/// Registration points of the host's page-transition library.
///
/// Each hook must fire exactly once per transition, at its semantic point.
pub trait TransitionHooks {
    /// The current page is about to leave.
    fn on_leave(&mut self, hook: TransitionHook);
    /// The document content has been replaced with the next page.
    fn on_content_replace(&mut self, hook: TransitionHook);
    /// The entry animation of the next page has finished.
    fn on_enter_done(&mut self, hook: TransitionHook);
}

/// Callback registered at a transition lifecycle point.
pub type TransitionHook = Box<dyn Fn() + Send + Sync>;

/// Engine configuration.
///
/// A section source is mandatory: either a pre-built registry or a module
/// map. Everything else has defaults.
#[derive(Default)]
pub struct EngineConfig {
    /// Discovery selector (defaults to the section marker attribute)
    pub discover_selector: Option<String>,
    /// Pre-built section registry
    pub sections: Option<SectionRegistry>,
    /// Pre-loaded implementation modules (identifier, factory)
    pub modules: Option<Vec<(String, SectionFactory)>>,
    /// Filters applied when loading `modules`
    pub module_filter: ModuleFilter,
    /// Removed path-based discovery knob; setting it is a construction error
    pub sections_path: Option<String>,
    /// Reduced-motion policy
    pub reduced_motion: ReducedMotion,
    /// Transition overlay configuration
    pub overlay: Option<OverlayConfig>,
    /// Batch-reveal configuration
    pub batch: Option<BatchConfig>,
    /// Live viewport handle (defaults to a detached zero-height viewport)
    pub viewport: Option<Arc<Viewport>>,
    /// Animation driver (defaults to [`InstantDriver`])
    pub driver: Option<Arc<dyn AnimationDriver>>,
    /// Frame tick period override
    pub tick_period: Option<Duration>,
}

impl EngineConfig {
    /// Empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the discovery selector.
    #[must_use]
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.discover_selector = Some(selector.into());
        self
    }

    /// Provide a pre-built section registry.
    #[must_use]
    pub fn with_sections(mut self, sections: SectionRegistry) -> Self {
        self.sections = Some(sections);
        self
    }

    /// Provide pre-loaded implementation modules.
    #[must_use]
    pub fn with_modules(mut self, modules: Vec<(String, SectionFactory)>) -> Self {
        self.modules = Some(modules);
        self
    }

    /// Set the module-loading filter.
    #[must_use]
    pub fn with_module_filter(mut self, filter: ModuleFilter) -> Self {
        self.module_filter = filter;
        self
    }

    /// Set the reduced-motion policy.
    #[must_use]
    pub const fn with_reduced_motion(mut self, policy: ReducedMotion) -> Self {
        self.reduced_motion = policy;
        self
    }

    /// Configure the transition overlay.
    #[must_use]
    pub fn with_overlay(mut self, overlay: OverlayConfig) -> Self {
        self.overlay = Some(overlay);
        self
    }

    /// Configure batch reveals.
    #[must_use]
    pub fn with_batch(mut self, batch: BatchConfig) -> Self {
        self.batch = Some(batch);
        self
    }

    /// Provide the live viewport handle.
    #[must_use]
    pub fn with_viewport(mut self, viewport: Arc<Viewport>) -> Self {
        self.viewport = Some(viewport);
        self
    }

    /// Provide the animation driver.
    #[must_use]
    pub fn with_driver(mut self, driver: Arc<dyn AnimationDriver>) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Override the frame tick period.
    #[must_use]
    pub const fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = Some(period);
        self
    }
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("discover_selector", &self.discover_selector)
            .field("sections", &self.sections.as_ref().map(SectionRegistry::len))
            .field("modules", &self.modules.as_ref().map(Vec::len))
            .field("reduced_motion", &self.reduced_motion)
            .field("overlay", &self.overlay)
            .field("batch", &self.batch)
            .finish_non_exhaustive()
    }
}

/// Top-level engine binding configuration, transition hooks, and the
/// optional overlay to the discovery coordinator.
pub struct Revelar {
    discovery: Arc<SectionDiscovery>,
    overlay: Option<Arc<OverlayTransition>>,
    animator: Arc<Animator>,
    root: Mutex<Option<Arc<dyn SectionSource>>>,
    attached: AtomicBool,
}

impl Revelar {
    /// Build an engine from configuration.
    ///
    /// # Errors
    ///
    /// [`RevelarError::MissingSections`] when neither `sections` nor
    /// `modules` is provided; [`RevelarError::SectionsPathRemoved`] when
    /// only the removed `sections_path` knob is set.
    pub fn new(config: EngineConfig) -> RevelarResult<Self> {
        let registry = if let Some(sections) = config.sections {
            sections
        } else if let Some(modules) = config.modules {
            load_sections_from_modules(modules, &config.module_filter)
        } else if config.sections_path.is_some() {
            return Err(RevelarError::SectionsPathRemoved);
        } else {
            return Err(RevelarError::MissingSections);
        };

        let driver = config
            .driver
            .unwrap_or_else(|| Arc::new(InstantDriver));
        let animator = Arc::new(Animator::new(
            driver,
            config.reduced_motion == ReducedMotion::Respect,
        ));
        let viewport = config.viewport.unwrap_or_default();

        let mut discovery =
            SectionDiscovery::new(registry, Arc::clone(&animator), viewport).with_selector(
                config
                    .discover_selector
                    .unwrap_or_else(|| DEFAULT_SECTION_SELECTOR.to_string()),
            );
        if let Some(batch) = config.batch {
            discovery = discovery.with_batch(batch);
        }
        if let Some(period) = config.tick_period {
            discovery = discovery.with_tick_period(period);
        }

        let overlay = config
            .overlay
            .filter(|overlay| overlay.enabled)
            .map(|overlay| Arc::new(OverlayTransition::new(Arc::clone(&animator), overlay)));

        Ok(Self {
            discovery: Arc::new(discovery),
            overlay,
            animator,
            root: Mutex::new(None),
            attached: AtomicBool::new(false),
        })
    }

    /// Run the initial, first-paint discovery pass over `root`.
    ///
    /// Must be called within a Tokio runtime.
    pub fn start(&self, root: Arc<dyn SectionSource>) {
        if let Ok(mut slot) = self.root.lock() {
            *slot = Some(Arc::clone(&root));
        }
        self.discovery.discover(root.as_ref(), true);
    }

    /// Bind the page-transition lifecycle and run the initial discovery.
    ///
    /// Binding a second integration is a no-op with a warning.
    pub fn attach(&self, root: Arc<dyn SectionSource>, hooks: &mut dyn TransitionHooks) {
        if self.attached.swap(true, Ordering::SeqCst) {
            tracing::warn!("transition hooks already attached to this engine, ignoring");
            return;
        }

        self.start(Arc::clone(&root));

        let overlay = self.overlay.clone();
        let discovery = Arc::clone(&self.discovery);
        hooks.on_leave(Box::new(move || {
            if let Some(overlay) = overlay.clone() {
                tokio::spawn(async move {
                    if let Err(error) = overlay.cover().await {
                        tracing::error!(%error, "overlay cover failed");
                    }
                });
            }
            discovery.destroy_all();
        }));

        let discovery = Arc::clone(&self.discovery);
        let replaced_root = Arc::clone(&root);
        hooks.on_content_replace(Box::new(move || {
            discovery.discover(replaced_root.as_ref(), false);
        }));

        let overlay = self.overlay.clone();
        hooks.on_enter_done(Box::new(move || {
            if let Some(overlay) = overlay.clone() {
                tokio::spawn(async move {
                    if let Err(error) = overlay.uncover().await {
                        tracing::error!(%error, "overlay uncover failed");
                    }
                });
            }
        }));
    }

    /// Whether a transition integration is bound.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// The page root of the last `start`/`attach` call, if any.
    #[must_use]
    pub fn root(&self) -> Option<Arc<dyn SectionSource>> {
        self.root.lock().ok().and_then(|slot| slot.clone())
    }

    /// The discovery coordinator.
    #[must_use]
    pub fn discovery(&self) -> &Arc<SectionDiscovery> {
        &self.discovery
    }

    /// The engine's animator.
    #[must_use]
    pub fn animator(&self) -> &Arc<Animator> {
        &self.animator
    }

    /// The transition overlay, when configured and enabled.
    #[must_use]
    pub fn overlay(&self) -> Option<&Arc<OverlayTransition>> {
        self.overlay.as_ref()
    }

    /// Forward host intersection updates to the current pass.
    pub fn handle_intersections(&self, entries: &[IntersectionEntry]) {
        self.discovery.handle_intersections(entries);
    }

    /// Subscribe to visible-set changes.
    pub fn on_visible_change(
        &self,
        listener: impl Fn(&Vec<Arc<SectionInstance>>) + Send + Sync + 'static,
    ) -> Subscription {
        self.discovery.on_visible_change(listener)
    }

    /// Unsubscribe from visible-set changes.
    pub fn off_visible_change(&self, subscription: Subscription) {
        self.discovery.off_visible_change(subscription);
    }

    /// Subscribe to top-most-visible changes.
    pub fn on_top_visible_change(
        &self,
        listener: impl Fn(&Option<Arc<SectionInstance>>) + Send + Sync + 'static,
    ) -> Subscription {
        self.discovery.on_top_visible_change(listener)
    }

    /// Unsubscribe from top-most-visible changes.
    pub fn off_top_visible_change(&self, subscription: Subscription) {
        self.discovery.off_top_visible_change(subscription);
    }

    /// Subscribe to reveal completions.
    pub fn on_reveal(
        &self,
        listener: impl Fn(&RevealEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.discovery.on_reveal(listener)
    }

    /// Unsubscribe from reveal completions.
    pub fn off_reveal(&self, subscription: Subscription) {
        self.discovery.off_reveal(subscription);
    }
}

impl std::fmt::Debug for Revelar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Revelar")
            .field("attached", &self.is_attached())
            .field("overlay", &self.overlay.is_some())
            .finish_non_exhaustive()
    }
}

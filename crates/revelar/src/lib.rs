//! Revelar: scroll-reveal orchestration for host-rendered pages.
//!
//! Revelar discovers nodes tagged as animated sections, tracks their
//! viewport visibility through a host intersection primitive, and triggers
//! each section's reveal exactly once, coalescing near-simultaneous
//! eligibility into batches with configurable ordering and stagger policies,
//! and re-running the whole lifecycle safely across client-side page
//! transitions.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                       REVELAR Architecture                          │
//! ├────────────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌─────────────┐   ┌────────────┐   ┌────────────┐  │
//! │  │ Host     │   │ Section     │   │ Visibility │   │ Batch      │  │
//! │  │ page +   │──►│ Discovery   │──►│ Tracker    │──►│ Scheduler  │  │
//! │  │ observer │   │ (registry)  │   │ (tick)     │   │ (reveals)  │  │
//! │  └──────────┘   └─────────────┘   └────────────┘   └────────────┘  │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The host supplies three primitives: a [`node::SectionSource`] serving
//! selector queries, intersection updates fed to
//! [`discovery::SectionDiscovery::handle_intersections`], and an
//! [`animator::AnimationDriver`] running keyframe payloads. Everything else
//! (resolution, eligibility, batching, change notifications, teardown) is
//! owned here.
//!
//! # Quick start
//!
//! ```no_run
//! use revelar::{BatchConfig, BatchStrategy, EngineConfig, Revelar, SectionRegistry};
//! use revelar::{RevealContext, RevelarResult, Section, StaticPage};
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! struct HeroSection;
//!
//! #[async_trait]
//! impl Section for HeroSection {
//!     async fn reveal(&self, ctx: RevealContext) -> RevelarResult<()> {
//!         ctx.animator
//!             .animate(&ctx.node, &serde_json::json!({"opacity": [0, 1]}), &Default::default())
//!             .await
//!     }
//! }
//!
//! # async fn run() -> RevelarResult<()> {
//! let mut sections = SectionRegistry::new();
//! sections.register("hero", |_node| Box::new(HeroSection));
//!
//! let engine = Revelar::new(
//!     EngineConfig::new()
//!         .with_sections(sections)
//!         .with_batch(BatchConfig::new().with_strategy(BatchStrategy::TopToBottom)),
//! )?;
//! engine.start(Arc::new(StaticPage::new()));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod animator;
pub mod batch;
pub mod discovery;
pub mod events;
pub mod naming;
pub mod node;
pub mod observer;
pub mod overlay;
pub mod registry;
pub mod result;
pub mod section;
pub mod ticker;

mod engine;

pub use animator::{
    AnimateOptions, AnimationDriver, Animator, InstantDriver, Keyframes, TimelineStep,
    DEFAULT_STAGGER_STEP,
};
pub use batch::{
    BatchConfig, BatchScheduler, BatchStrategy, DelayFn, DEFAULT_COLLECT_WINDOW_MS,
    DEFAULT_DELAY_STEP_MS,
};
pub use discovery::{SectionDiscovery, DEFAULT_SECTION_SELECTOR};
pub use engine::{
    EngineConfig, ReducedMotion, Revelar, TransitionHook, TransitionHooks,
};
pub use events::{DiscoveryEvents, Emitter, RevealEvent, Subscription};
pub use naming::{
    kebab_to_camel_case, kebab_to_pascal_case, pascal_to_kebab_case, try_naming_strategies,
    SECTION_SUFFIX,
};
pub use node::{
    NodeId, SectionNode, SectionSource, StaticPage, Viewport, REVEAL_IMMEDIATE, SECTION_ATTR,
};
pub use observer::{
    IntersectionEntry, ObserverOptions, VisibilityTracker, BOTTOM_MARGIN_FRACTION,
    INTERSECTION_THRESHOLDS,
};
pub use overlay::{OverlayConfig, OverlayTransition};
#[allow(deprecated)]
pub use registry::load_sections_from_path;
pub use registry::{
    load_sections_from_modules, ModuleFilter, SectionFactory, SectionRegistry,
};
pub use result::{RevelarError, RevelarResult};
pub use section::{RevealContext, Section, SectionInstance};
pub use ticker::{FrameTicker, DEFAULT_TICK_PERIOD};

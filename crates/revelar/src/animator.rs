//! Animation driver interface and the reduced-motion-aware facade.
//!
//! The animation primitives are an external collaborator: the host supplies
//! an [`AnimationDriver`] that runs a keyframe payload on a node and
//! resolves when finished. [`Animator`] layers the reduced-motion policy and
//! the timeline/stagger composition helpers on top, so section behaviors
//! never talk to the driver directly.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::node::SectionNode;
use crate::result::RevelarResult;

/// Default stagger step between children, in seconds.
pub const DEFAULT_STAGGER_STEP: f64 = 0.075;

/// Keyframe payload interpreted by the host driver.
pub type Keyframes = serde_json::Value;

/// Options for a single animation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimateOptions {
    /// Duration in seconds (driver default when absent)
    pub duration: Option<f64>,
    /// Delay before starting, in seconds
    pub delay: Option<f64>,
    /// Easing name (driver-interpreted)
    pub easing: Option<String>,
}

impl AnimateOptions {
    /// Create empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration in seconds.
    #[must_use]
    pub const fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    /// Set the start delay in seconds.
    #[must_use]
    pub const fn with_delay(mut self, seconds: f64) -> Self {
        self.delay = Some(seconds);
        self
    }

    /// Set the easing name.
    #[must_use]
    pub fn with_easing(mut self, easing: impl Into<String>) -> Self {
        self.easing = Some(easing.into());
        self
    }
}

/// Host-implemented animation primitive.
///
/// `animate` must resolve once the animation has finished on `target`.
/// `prefers_reduced_motion` surfaces the host's user preference; the
/// [`Animator`] consults it when the engine is configured to respect it.
#[async_trait]
pub trait AnimationDriver: Send + Sync {
    /// Run `keyframes` on `target`, resolving when finished.
    async fn animate(
        &self,
        target: &SectionNode,
        keyframes: &Keyframes,
        options: &AnimateOptions,
    ) -> RevelarResult<()>;

    /// Whether the host signals a user preference for reduced motion.
    fn prefers_reduced_motion(&self) -> bool {
        false
    }
}

/// Driver that completes every animation instantly.
///
/// The default when no driver is configured; also useful in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantDriver;

#[async_trait]
impl AnimationDriver for InstantDriver {
    async fn animate(
        &self,
        _target: &SectionNode,
        _keyframes: &Keyframes,
        _options: &AnimateOptions,
    ) -> RevelarResult<()> {
        Ok(())
    }
}

/// One step of a timeline: a target, a keyframe payload, and options.
#[derive(Debug, Clone)]
pub struct TimelineStep {
    /// Node the step animates
    pub target: SectionNode,
    /// Keyframe payload
    pub keyframes: Keyframes,
    /// Animation options
    pub options: AnimateOptions,
}

impl TimelineStep {
    /// Create a timeline step.
    #[must_use]
    pub fn new(target: SectionNode, keyframes: Keyframes, options: AnimateOptions) -> Self {
        Self {
            target,
            keyframes,
            options,
        }
    }
}

/// Reduced-motion-aware facade over an [`AnimationDriver`].
pub struct Animator {
    driver: Arc<dyn AnimationDriver>,
    respect_reduced_motion: bool,
}

impl Animator {
    /// Wrap a driver with the given reduced-motion policy.
    #[must_use]
    pub fn new(driver: Arc<dyn AnimationDriver>, respect_reduced_motion: bool) -> Self {
        Self {
            driver,
            respect_reduced_motion,
        }
    }

    /// Animator that completes everything instantly.
    #[must_use]
    pub fn instant() -> Self {
        Self::new(Arc::new(InstantDriver), true)
    }

    /// Run one animation, resolving when finished.
    ///
    /// Short-circuits to immediate completion when reduced motion applies.
    ///
    /// # Errors
    ///
    /// Propagates the driver's failure.
    pub async fn animate(
        &self,
        target: &SectionNode,
        keyframes: &Keyframes,
        options: &AnimateOptions,
    ) -> RevelarResult<()> {
        if self.should_reduce() {
            return Ok(());
        }
        self.driver.animate(target, keyframes, options).await
    }

    /// Run timeline steps sequentially, resolving when the last finishes.
    ///
    /// # Errors
    ///
    /// Stops at and propagates the first failing step.
    pub async fn timeline(&self, steps: &[TimelineStep]) -> RevelarResult<()> {
        for step in steps {
            self.animate(&step.target, &step.keyframes, &step.options)
                .await?;
        }
        Ok(())
    }

    /// Animate `children` concurrently with staggered starts.
    ///
    /// Each child waits `options.delay` when set, else `index × delay_step`
    /// (default [`DEFAULT_STAGGER_STEP`]); all runs complete before this
    /// resolves.
    ///
    /// # Errors
    ///
    /// Waits for every child, then propagates the first failure.
    pub async fn stagger(
        &self,
        children: &[SectionNode],
        keyframes: &Keyframes,
        options: &AnimateOptions,
        delay_step: Option<f64>,
    ) -> RevelarResult<()> {
        let step = delay_step.unwrap_or(DEFAULT_STAGGER_STEP);
        let runs = children.iter().enumerate().map(|(index, child)| {
            let delay = options.delay.unwrap_or(index as f64 * step);
            async move {
                if delay > 0.0 {
                    tokio::time::sleep(Duration::from_secs_f64(delay)).await;
                }
                self.animate(child, keyframes, options).await
            }
        });

        join_all(runs)
            .await
            .into_iter()
            .collect::<RevelarResult<Vec<()>>>()
            .map(|_| ())
    }

    /// Whether animations are currently short-circuited.
    #[must_use]
    pub fn should_reduce(&self) -> bool {
        self.respect_reduced_motion && self.driver.prefers_reduced_motion()
    }

    /// The underlying driver.
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn AnimationDriver> {
        &self.driver
    }
}

impl std::fmt::Debug for Animator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animator")
            .field("respect_reduced_motion", &self.respect_reduced_motion)
            .finish_non_exhaustive()
    }
}

//! Full-page transition overlay.
//!
//! An optional curtain that covers the page while a transition leaves and
//! uncovers it once the next page has entered. The overlay owns a detached
//! node; the host renders it fixed over the page with the configured color
//! and stacking order, and the animator drives the two timelines.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::animator::{AnimateOptions, Animator, TimelineStep};
use crate::node::SectionNode;
use crate::result::RevelarResult;

/// Overlay appearance and stacking configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Whether the overlay is active
    pub enabled: bool,
    /// Background color
    pub color: String,
    /// Stacking order
    pub z_index: i64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            color: "#000".to_string(),
            z_index: 9999,
        }
    }
}

impl OverlayConfig {
    /// Enabled overlay with default appearance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the enabled flag.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the background color.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Set the stacking order.
    #[must_use]
    pub const fn with_z_index(mut self, z_index: i64) -> Self {
        self.z_index = z_index;
        self
    }
}

/// Full-screen transition overlay.
pub struct OverlayTransition {
    node: SectionNode,
    animator: Arc<Animator>,
    config: OverlayConfig,
}

impl OverlayTransition {
    /// Create an overlay curtain.
    #[must_use]
    pub fn new(animator: Arc<Animator>, config: OverlayConfig) -> Self {
        Self {
            node: SectionNode::new("transition-overlay"),
            animator,
            config,
        }
    }

    /// The overlay's node handle, for the host to render.
    #[must_use]
    pub fn node(&self) -> &SectionNode {
        &self.node
    }

    /// The overlay's appearance configuration.
    #[must_use]
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Slide the curtain over the page (page leave).
    ///
    /// # Errors
    ///
    /// Propagates the animator's failure.
    pub async fn cover(&self) -> RevelarResult<()> {
        self.animator
            .timeline(&[
                TimelineStep::new(
                    self.node.clone(),
                    json!({ "opacity": [0, 1] }),
                    AnimateOptions::new().with_duration(0.15),
                ),
                TimelineStep::new(
                    self.node.clone(),
                    json!({ "transform": ["translateY(100%)", "translateY(0%)"] }),
                    AnimateOptions::new().with_duration(0.25),
                ),
            ])
            .await
    }

    /// Slide the curtain away (page enter finished).
    ///
    /// # Errors
    ///
    /// Propagates the animator's failure.
    pub async fn uncover(&self) -> RevelarResult<()> {
        self.animator
            .timeline(&[
                TimelineStep::new(
                    self.node.clone(),
                    json!({ "transform": ["translateY(0%)", "translateY(-100%)"] }),
                    AnimateOptions::new().with_duration(0.35),
                ),
                TimelineStep::new(
                    self.node.clone(),
                    json!({ "opacity": [1, 0] }),
                    AnimateOptions::new().with_duration(0.15),
                ),
            ])
            .await
    }
}

impl std::fmt::Debug for OverlayTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayTransition")
            .field("node", &self.node.id())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::{AnimationDriver, Keyframes};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Driver that records each animated keyframe payload.
    #[derive(Default)]
    struct RecordingDriver {
        runs: Mutex<Vec<(String, Keyframes)>>,
    }

    #[async_trait]
    impl AnimationDriver for RecordingDriver {
        async fn animate(
            &self,
            target: &SectionNode,
            keyframes: &Keyframes,
            _options: &AnimateOptions,
        ) -> RevelarResult<()> {
            if let Ok(mut runs) = self.runs.lock() {
                runs.push((target.section_name().to_string(), keyframes.clone()));
            }
            Ok(())
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = OverlayConfig::default();
        assert!(config.enabled);
        assert_eq!(config.color, "#000");
        assert_eq!(config.z_index, 9999);
    }

    #[test]
    fn test_config_builders() {
        let config = OverlayConfig::new()
            .with_color("#112233")
            .with_z_index(42)
            .with_enabled(false);
        assert_eq!(config.color, "#112233");
        assert_eq!(config.z_index, 42);
        assert!(!config.enabled);
    }

    #[tokio::test]
    async fn test_cover_runs_fade_then_slide() {
        let driver = Arc::new(RecordingDriver::default());
        let animator = Arc::new(Animator::new(driver.clone(), false));
        let overlay = OverlayTransition::new(animator, OverlayConfig::default());

        overlay.cover().await.unwrap();

        let runs = driver.runs.lock().unwrap();
        assert_eq!(runs.len(), 2);
        assert!(runs[0].1.get("opacity").is_some());
        assert!(runs[1].1.get("transform").is_some());
        assert_eq!(runs[0].0, "transition-overlay");
    }

    #[tokio::test]
    async fn test_uncover_runs_slide_then_fade() {
        let driver = Arc::new(RecordingDriver::default());
        let animator = Arc::new(Animator::new(driver.clone(), false));
        let overlay = OverlayTransition::new(animator, OverlayConfig::default());

        overlay.uncover().await.unwrap();

        let runs = driver.runs.lock().unwrap();
        assert_eq!(runs.len(), 2);
        assert!(runs[0].1.get("transform").is_some());
        assert!(runs[1].1.get("opacity").is_some());
    }
}

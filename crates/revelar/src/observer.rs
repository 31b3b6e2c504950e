//! Viewport-intersection tracking for one discovery pass.
//!
//! The host's intersection primitive is configured from [`ObserverOptions`]
//! and delivers [`IntersectionEntry`] updates; the tracker maps entries back
//! to their instances, maintains the live visibility flag and cached offset,
//! and surfaces the instances that just became reveal-eligible.

use std::collections::HashMap;
use std::sync::Arc;

use crate::node::NodeId;
use crate::section::SectionInstance;

/// Intersection ratios at which the host should report updates.
pub const INTERSECTION_THRESHOLDS: [f64; 4] = [0.0, 0.2, 0.5, 1.0];

/// Fraction of the viewport height shaved off the bottom edge, so reveals
/// trigger slightly before a section's bottom reaches the true viewport
/// bottom.
pub const BOTTOM_MARGIN_FRACTION: f64 = 0.10;

/// Configuration the host intersection primitive must honor.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverOptions {
    /// Ratios at which updates are delivered
    pub thresholds: Vec<f64>,
    /// Fraction of viewport height removed from the bottom edge
    pub bottom_margin_fraction: f64,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            thresholds: INTERSECTION_THRESHOLDS.to_vec(),
            bottom_margin_fraction: BOTTOM_MARGIN_FRACTION,
        }
    }
}

/// One intersection update delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    /// Node the update concerns
    pub node: NodeId,
    /// Whether the node currently intersects the (margin-shrunk) viewport
    pub is_intersecting: bool,
    /// Overlap ratio in `[0, 1]`
    pub ratio: f64,
}

impl IntersectionEntry {
    /// Create an entry.
    #[must_use]
    pub const fn new(node: NodeId, is_intersecting: bool, ratio: f64) -> Self {
        Self {
            node,
            is_intersecting,
            ratio,
        }
    }
}

/// Per-pass visibility tracker.
#[derive(Debug, Default)]
pub struct VisibilityTracker {
    options: ObserverOptions,
    observed: HashMap<NodeId, Arc<SectionInstance>>,
}

impl VisibilityTracker {
    /// Create a tracker with the given observer options.
    #[must_use]
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            options,
            observed: HashMap::new(),
        }
    }

    /// Options the host intersection primitive should be configured with.
    #[must_use]
    pub fn options(&self) -> &ObserverOptions {
        &self.options
    }

    /// Start observing an instance's node.
    pub fn observe(&mut self, instance: &Arc<SectionInstance>) {
        self.observed
            .insert(instance.node().id(), Arc::clone(instance));
    }

    /// Number of observed nodes.
    #[must_use]
    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }

    /// Apply a batch of host intersection updates.
    ///
    /// Every matched instance gets its visibility flag and cached offset
    /// refreshed. Returned are the instances that just became eligible for
    /// reveal: now intersecting with positive overlap, not yet revealed, and
    /// not flagged for immediate reveal. Entries for unknown nodes (e.g.
    /// late signals from a torn-down pass) are ignored.
    pub fn process(&self, entries: &[IntersectionEntry]) -> Vec<Arc<SectionInstance>> {
        let mut eligible = Vec::new();
        for entry in entries {
            let Some(instance) = self.observed.get(&entry.node) else {
                continue;
            };

            let now_visible = entry.is_intersecting && entry.ratio > 0.0;
            if now_visible && !instance.has_revealed() && !instance.node().is_immediate() {
                eligible.push(Arc::clone(instance));
            }
            instance.set_visible(now_visible);
            instance.refresh_top();
        }
        eligible
    }

    /// Stop observing everything.
    ///
    /// Must run before a new discovery pass starts or on destroy.
    pub fn disconnect(&mut self) {
        self.observed.clear();
    }
}

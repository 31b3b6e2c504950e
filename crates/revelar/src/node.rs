//! Host node handles and the page abstraction.
//!
//! Revelar does not own a document model. The host (a browser adapter, a
//! canvas UI, a test harness) exposes its animatable regions as
//! [`SectionNode`] handles and serves selector queries through a
//! [`SectionSource`]. Handles are cheap to clone and carry the node's
//! declarative attributes plus a live vertical offset the host keeps fresh.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Attribute marking a node as a section root (the default discovery
/// selector targets it).
pub const SECTION_ATTR: &str = "data-revelar-section";

/// Attribute value flagging a node for immediate, non-viewport-gated reveal.
pub const REVEAL_IMMEDIATE: &str = "immediate";

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identifier for a host node within this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

#[derive(Debug)]
struct NodeInner {
    id: NodeId,
    section_name: String,
    immediate: AtomicBool,
    reveal_time: Mutex<Option<String>>,
    /// Vertical offset from the viewport top, stored as f64 bits.
    top: AtomicU64,
}

/// Handle for one host node tagged as a section root.
///
/// Attributes mirror the declarative surface: the declared section name, an
/// optional immediate-reveal flag, and an optional reveal-time override in
/// seconds (kept raw; parsed at reveal time). The vertical offset is live
/// state the host updates as the page scrolls or relayouts.
#[derive(Clone)]
pub struct SectionNode {
    inner: Arc<NodeInner>,
}

impl SectionNode {
    /// Create a node handle declaring the given section name.
    #[must_use]
    pub fn new(section_name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(NodeInner {
                id: NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::SeqCst)),
                section_name: section_name.into(),
                immediate: AtomicBool::new(false),
                reveal_time: Mutex::new(None),
                top: AtomicU64::new(0f64.to_bits()),
            }),
        }
    }

    /// Flag the node for immediate reveal (builder form).
    #[must_use]
    pub fn with_immediate(self, immediate: bool) -> Self {
        self.set_immediate(immediate);
        self
    }

    /// Set the raw reveal-time attribute (builder form).
    #[must_use]
    pub fn with_reveal_time(self, raw: impl Into<String>) -> Self {
        self.set_reveal_time(Some(raw.into()));
        self
    }

    /// Set the initial vertical offset (builder form).
    #[must_use]
    pub fn with_top(self, top: f64) -> Self {
        self.set_top(top);
        self
    }

    /// Node identifier.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.inner.id
    }

    /// Declared kebab-case section name.
    #[must_use]
    pub fn section_name(&self) -> &str {
        &self.inner.section_name
    }

    /// Whether the node is flagged for immediate reveal.
    #[must_use]
    pub fn is_immediate(&self) -> bool {
        self.inner.immediate.load(Ordering::SeqCst)
    }

    /// Update the immediate-reveal flag.
    pub fn set_immediate(&self, immediate: bool) {
        self.inner.immediate.store(immediate, Ordering::SeqCst);
    }

    /// Update the raw reveal-time attribute (`None` removes it).
    pub fn set_reveal_time(&self, raw: Option<String>) {
        if let Ok(mut slot) = self.inner.reveal_time.lock() {
            *slot = raw;
        }
    }

    /// Reveal-time override in seconds, if declared and valid.
    ///
    /// Invalid or negative values are treated as absent.
    #[must_use]
    pub fn reveal_time_override(&self) -> Option<f64> {
        let raw = self
            .inner
            .reveal_time
            .lock()
            .ok()
            .and_then(|slot| slot.clone())?;
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|seconds| seconds.is_finite() && *seconds >= 0.0)
    }

    /// Current vertical offset from the viewport top.
    #[must_use]
    pub fn top(&self) -> f64 {
        f64::from_bits(self.inner.top.load(Ordering::SeqCst))
    }

    /// Update the vertical offset (host geometry callback).
    pub fn set_top(&self, top: f64) {
        self.inner.top.store(top.to_bits(), Ordering::SeqCst);
    }

    /// Whether two handles refer to the same host node.
    #[must_use]
    pub fn same_node(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for SectionNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionNode")
            .field("id", &self.inner.id)
            .field("section_name", &self.inner.section_name)
            .field("immediate", &self.is_immediate())
            .field("top", &self.top())
            .finish_non_exhaustive()
    }
}

/// Live viewport handle the host keeps current.
///
/// Only the height participates in scheduling (the center strategy orders by
/// distance from the vertical midpoint).
#[derive(Debug, Default)]
pub struct Viewport {
    height: AtomicU64,
}

impl Viewport {
    /// Create a viewport with the given height.
    #[must_use]
    pub fn new(height: f64) -> Self {
        let viewport = Self::default();
        viewport.set_height(height);
        viewport
    }

    /// Current viewport height.
    #[must_use]
    pub fn height(&self) -> f64 {
        f64::from_bits(self.height.load(Ordering::SeqCst))
    }

    /// Update the viewport height (host resize callback).
    pub fn set_height(&self, height: f64) {
        self.height.store(height.to_bits(), Ordering::SeqCst);
    }

    /// Vertical midpoint of the viewport.
    #[must_use]
    pub fn midpoint(&self) -> f64 {
        self.height() / 2.0
    }
}

/// Source of section nodes for a discovery pass.
///
/// The host implements this over its document model; `query` must return
/// nodes matching the selector in document order.
pub trait SectionSource: Send + Sync {
    /// All nodes matching `selector`, in document order.
    fn query(&self, selector: &str) -> Vec<SectionNode>;
}

/// In-memory [`SectionSource`] for tests, demos, and scripted hosts.
///
/// Holds one node list per selector; replacing a list simulates a page
/// transition swapping the document content.
#[derive(Debug, Default)]
pub struct StaticPage {
    nodes: Mutex<HashMap<String, Vec<SectionNode>>>,
}

impl StaticPage {
    /// Create an empty page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the node list served for `selector`.
    pub fn set_nodes(&self, selector: impl Into<String>, nodes: Vec<SectionNode>) {
        if let Ok(mut map) = self.nodes.lock() {
            map.insert(selector.into(), nodes);
        }
    }

    /// Append a node to the list served for `selector`.
    pub fn push_node(&self, selector: impl Into<String>, node: SectionNode) {
        if let Ok(mut map) = self.nodes.lock() {
            map.entry(selector.into()).or_default().push(node);
        }
    }

    /// Remove all nodes (simulates navigating to an empty document).
    pub fn clear(&self) {
        if let Ok(mut map) = self.nodes.lock() {
            map.clear();
        }
    }
}

impl SectionSource for StaticPage {
    fn query(&self, selector: &str) -> Vec<SectionNode> {
        self.nodes
            .lock()
            .map(|map| map.get(selector).cloned().unwrap_or_default())
            .unwrap_or_default()
    }
}

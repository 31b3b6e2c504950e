//! Typed change-notification channels.
//!
//! Replaces host-level event bubbling with an explicit callback registry
//! scoped to the discovery coordinator: listeners subscribe per channel and
//! receive a borrowed payload. Emission snapshots the listener list first so
//! a callback may subscribe or unsubscribe without deadlocking the channel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::node::NodeId;
use crate::section::SectionInstance;

/// Listener handle returned by [`Emitter::on`]; pass it back to
/// [`Emitter::off`] to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Callback registry for one event type.
pub struct Emitter<T> {
    listeners: Mutex<Vec<(u64, Listener<T>)>>,
    next_id: AtomicU64,
}

impl<T> Emitter<T> {
    /// Create an empty emitter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a listener; returns its [`Subscription`] handle.
    pub fn on(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push((id, Arc::new(listener)));
        }
        Subscription(id)
    }

    /// Remove a listener; unknown handles are ignored.
    pub fn off(&self, subscription: Subscription) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.retain(|(id, _)| *id != subscription.0);
        }
    }

    /// Invoke every registered listener with `payload`.
    pub fn emit(&self, payload: &T) {
        let snapshot: Vec<Listener<T>> = self
            .listeners
            .lock()
            .map(|listeners| listeners.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default();
        for listener in snapshot {
            listener(payload);
        }
    }

    /// Remove all listeners.
    pub fn clear(&self) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.clear();
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }

    /// Whether no listeners are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.len())
            .finish()
    }
}

/// Payload of the reveal-completion notification: fired exactly once per
/// completed reveal, carrying the section's declared name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealEvent {
    /// Declared section name
    pub name: String,
    /// Discovery index within the pass
    pub index: usize,
    /// Host node the reveal ran on
    pub node: NodeId,
}

/// The coordinator's notification channels.
#[derive(Debug, Default)]
pub struct DiscoveryEvents {
    /// Visible set changed (ordered top → bottom)
    pub visible_change: Emitter<Vec<Arc<SectionInstance>>>,
    /// Top-most visible section changed (`None` when nothing is visible)
    pub top_visible_change: Emitter<Option<Arc<SectionInstance>>>,
    /// A section's reveal completed
    pub reveal: Emitter<RevealEvent>,
}

impl DiscoveryEvents {
    /// Create the channel set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Detach every listener on every channel.
    pub fn clear(&self) {
        self.visible_change.clear();
        self.top_visible_change.clear();
        self.reveal.clear();
    }
}

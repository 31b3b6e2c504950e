//! Batch-reveal scheduling.
//!
//! Sections that become reveal-eligible within a short collection window are
//! coalesced into one batch, ordered by the configured strategy, and
//! revealed either concurrently with staggered delays or strictly one after
//! another. The pending queue and its window timer form a small state
//! machine (empty → collecting → flushing) owned by exactly one scheduler
//! per discovery pass; all mutation goes through enqueue and flush.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::animator::Animator;
use crate::events::DiscoveryEvents;
use crate::node::Viewport;
use crate::section::SectionInstance;

/// Default delay step between staggered reveals, in milliseconds.
pub const DEFAULT_DELAY_STEP_MS: u64 = 150;

/// Default collection window before a batch flush, in milliseconds.
pub const DEFAULT_COLLECT_WINDOW_MS: u64 = 50;

/// Ordering/timing strategy applied to each batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BatchStrategy {
    /// Ascending cached vertical offset
    #[default]
    TopToBottom,
    /// Descending cached vertical offset
    BottomToTop,
    /// Ascending distance from the viewport's vertical midpoint
    Center,
    /// Top-to-bottom ordering, each reveal awaited before the next
    Wait,
    /// Input order preserved; timing fully delegated to the delay function
    Custom,
}

impl BatchStrategy {
    /// Configuration name of the strategy.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TopToBottom => "topToBottom",
            Self::BottomToTop => "bottomToTop",
            Self::Center => "center",
            Self::Wait => "wait",
            Self::Custom => "custom",
        }
    }
}

impl std::fmt::Display for BatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Delay function for custom pacing: receives the ordered batch and the
/// member's position, returns milliseconds to wait before that reveal.
pub type DelayFn = Arc<dyn Fn(&[Arc<SectionInstance>], usize) -> u64 + Send + Sync>;

/// Static-for-the-pass batching policy.
#[derive(Clone)]
pub struct BatchConfig {
    /// Whether batching is active
    pub enabled: bool,
    /// Ordering/timing strategy
    pub strategy: BatchStrategy,
    /// Milliseconds between staggered reveals
    pub delay_step_ms: u64,
    /// Maximum sections per flushed batch
    pub max_batch_size: Option<usize>,
    /// Collection window before a flush, in milliseconds
    pub collect_window_ms: u64,
    /// Custom per-member delay function
    pub custom_delay: Option<DelayFn>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strategy: BatchStrategy::default(),
            delay_step_ms: DEFAULT_DELAY_STEP_MS,
            max_batch_size: None,
            collect_window_ms: DEFAULT_COLLECT_WINDOW_MS,
            custom_delay: None,
        }
    }
}

impl BatchConfig {
    /// Enabled config with default strategy and timings.
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

    /// Set the ordering strategy.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: BatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the stagger delay step in milliseconds.
    #[must_use]
    pub const fn with_delay_step_ms(mut self, delay_step_ms: u64) -> Self {
        self.delay_step_ms = delay_step_ms;
        self
    }

    /// Set the maximum batch size.
    #[must_use]
    pub const fn with_max_batch_size(mut self, max: usize) -> Self {
        self.max_batch_size = Some(max);
        self
    }

    /// Set the collection window in milliseconds.
    #[must_use]
    pub const fn with_collect_window_ms(mut self, window_ms: u64) -> Self {
        self.collect_window_ms = window_ms;
        self
    }

    /// Set a custom delay function.
    #[must_use]
    pub fn with_custom_delay(
        mut self,
        delay: impl Fn(&[Arc<SectionInstance>], usize) -> u64 + Send + Sync + 'static,
    ) -> Self {
        self.custom_delay = Some(Arc::new(delay));
        self
    }
}

impl std::fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchConfig")
            .field("enabled", &self.enabled)
            .field("strategy", &self.strategy)
            .field("delay_step_ms", &self.delay_step_ms)
            .field("max_batch_size", &self.max_batch_size)
            .field("collect_window_ms", &self.collect_window_ms)
            .field("custom_delay", &self.custom_delay.is_some())
            .finish()
    }
}

/// Per-pass batch scheduler.
///
/// Owns the pending-reveal queue and the single collection-window timer.
/// Teardown stops issuing new reveals and clears pending state; it does not
/// abort a reveal that has already started.
pub struct BatchScheduler {
    config: BatchConfig,
    viewport: Arc<Viewport>,
    animator: Arc<Animator>,
    events: Arc<DiscoveryEvents>,
    pending: Mutex<Vec<Arc<SectionInstance>>>,
    window_timer: Mutex<Option<JoinHandle<()>>>,
    epoch: AtomicU64,
}

impl BatchScheduler {
    /// Create a scheduler for one discovery pass.
    #[must_use]
    pub fn new(
        config: BatchConfig,
        viewport: Arc<Viewport>,
        animator: Arc<Animator>,
        events: Arc<DiscoveryEvents>,
    ) -> Self {
        Self {
            config,
            viewport,
            animator,
            events,
            pending: Mutex::new(Vec::new()),
            window_timer: Mutex::new(None),
            epoch: AtomicU64::new(0),
        }
    }

    /// The scheduler's batching policy.
    #[must_use]
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Number of queued-but-not-yet-flushed instances.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.lock().map(|queue| queue.len()).unwrap_or(0)
    }

    /// Queue an instance that just became reveal-eligible.
    ///
    /// No-op when the instance has already been revealed or queued (the
    /// revealed flag is set eagerly here, which is what guards re-entry).
    /// Each enqueue restarts the collection window, so the flush fires once
    /// a burst of near-simultaneous eligibility events quiets down.
    pub fn enqueue(self: &Arc<Self>, instance: &Arc<SectionInstance>) {
        if instance.mark_revealed() {
            return;
        }
        if let Ok(mut pending) = self.pending.lock() {
            pending.push(Arc::clone(instance));
        }
        tracing::debug!(
            section = %instance.name(),
            pending = self.pending_len(),
            "queued reveal"
        );
        self.arm_window();
    }

    /// (Re)start the collection-window timer.
    fn arm_window(self: &Arc<Self>) {
        let scheduler = Arc::clone(self);
        let epoch = self.epoch.load(Ordering::SeqCst);
        let window = Duration::from_millis(self.config.collect_window_ms);

        if let Ok(mut timer) = self.window_timer.lock() {
            if let Some(previous) = timer.take() {
                previous.abort();
            }
            *timer = Some(tokio::spawn(async move {
                tokio::time::sleep(window).await;
                if scheduler.epoch.load(Ordering::SeqCst) != epoch {
                    return;
                }
                // The flush runs as its own task so aborting a re-armed
                // timer never cancels an in-flight batch.
                let flushing = Arc::clone(&scheduler);
                tokio::spawn(async move {
                    flushing.flush().await;
                });
            }));
        }
    }

    /// Snapshot and execute the pending queue.
    async fn flush(self: Arc<Self>) {
        let snapshot = self
            .pending
            .lock()
            .map(|mut queue| std::mem::take(&mut *queue))
            .unwrap_or_default();
        if snapshot.is_empty() {
            return;
        }

        let max = self
            .config
            .max_batch_size
            .filter(|max| *max > 0)
            .unwrap_or(snapshot.len());
        let mut batch = snapshot;
        if batch.len() > max {
            let remainder = batch.split_off(max);
            if let Ok(mut pending) = self.pending.lock() {
                let trailing = std::mem::take(&mut *pending);
                *pending = remainder;
                pending.extend(trailing);
            }
            // Remainder is never dropped: collection re-arms immediately.
            self.arm_window();
        }

        tracing::debug!(
            batch = batch.len(),
            strategy = %self.config.strategy,
            "flushing reveal batch"
        );
        let epoch = self.epoch.load(Ordering::SeqCst);
        self.run_batch(batch, epoch).await;
    }

    /// Reveal one ordered batch per the configured strategy.
    async fn run_batch(&self, batch: Vec<Arc<SectionInstance>>, epoch: u64) {
        let ordered = self.order_batch(batch);

        if self.config.strategy == BatchStrategy::Wait {
            for instance in &ordered {
                if self.epoch.load(Ordering::SeqCst) != epoch {
                    return;
                }
                if let Err(error) = instance
                    .perform_reveal(&self.animator, false, &self.events)
                    .await
                {
                    tracing::error!(
                        section = %instance.name(),
                        %error,
                        "sequential reveal failed, aborting batch remainder"
                    );
                    return;
                }
            }
            return;
        }

        let reveals = ordered.iter().enumerate().map(|(index, instance)| {
            let delay = self.delay_for(&ordered, index);
            let instance = Arc::clone(instance);
            async move {
                if delay > 0 {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                if self.epoch.load(Ordering::SeqCst) != epoch {
                    return;
                }
                if let Err(error) = instance
                    .perform_reveal(&self.animator, false, &self.events)
                    .await
                {
                    tracing::error!(section = %instance.name(), %error, "batched reveal failed");
                }
            }
        });
        join_all(reveals).await;
    }

    /// Order a batch per the configured strategy.
    fn order_batch(&self, mut batch: Vec<Arc<SectionInstance>>) -> Vec<Arc<SectionInstance>> {
        match self.config.strategy {
            BatchStrategy::TopToBottom | BatchStrategy::Wait => {
                batch.sort_by(|a, b| a.top().total_cmp(&b.top()));
            }
            BatchStrategy::BottomToTop => {
                batch.sort_by(|a, b| b.top().total_cmp(&a.top()));
            }
            BatchStrategy::Center => {
                let midpoint = self.viewport.midpoint();
                batch.sort_by(|a, b| {
                    (a.top() - midpoint)
                        .abs()
                        .total_cmp(&(b.top() - midpoint).abs())
                });
            }
            BatchStrategy::Custom => {}
        }
        batch
    }

    /// Milliseconds to wait before starting the reveal at `index`.
    fn delay_for(&self, ordered: &[Arc<SectionInstance>], index: usize) -> u64 {
        match &self.config.custom_delay {
            Some(delay) => delay(ordered, index),
            None => index as u64 * self.config.delay_step_ms,
        }
    }

    /// Stop issuing reveals and clear pending state.
    pub fn teardown(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut timer) = self.window_timer.lock() {
            if let Some(handle) = timer.take() {
                handle.abort();
            }
        }
        if let Ok(mut pending) = self.pending.lock() {
            pending.clear();
        }
    }
}

impl std::fmt::Debug for BatchScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchScheduler")
            .field("config", &self.config)
            .field("pending", &self.pending_len())
            .finish_non_exhaustive()
    }
}

//! In-process registry of mounted wizard flows

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::Duration;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::common::FlowId;
use crate::domains::onboarding::WizardFlow;
use crate::kernel::BaseClock;

struct MountedFlow {
    flow: Arc<Mutex<WizardFlow>>,
    /// Unix millis of the last mount or lookup
    last_seen_ms: AtomicI64,
}

/// Mounted flows keyed by the client's flow id. Each flow is behind its own
/// lock so requests for one tab are applied in order.
///
/// Flows not looked up for `idle_ttl` are dropped on the next mount; their
/// drafts stay in the scoped store, so a later mount resumes the fields.
pub struct FlowRegistry {
    flows: DashMap<FlowId, MountedFlow>,
    clock: Arc<dyn BaseClock>,
    idle_ttl: Duration,
}

impl FlowRegistry {
    pub fn new(clock: Arc<dyn BaseClock>, idle_ttl: Duration) -> Self {
        Self {
            flows: DashMap::new(),
            clock,
            idle_ttl,
        }
    }

    fn now_ms(&self) -> i64 {
        self.clock.now().timestamp_millis()
    }

    /// Register a freshly mounted flow, replacing any earlier mount of the same id
    pub fn insert(&self, flow: WizardFlow) -> Arc<Mutex<WizardFlow>> {
        self.evict_idle();

        let id = flow.id();
        let flow = Arc::new(Mutex::new(flow));
        self.flows.insert(
            id,
            MountedFlow {
                flow: flow.clone(),
                last_seen_ms: AtomicI64::new(self.now_ms()),
            },
        );
        flow
    }

    pub fn get(&self, id: FlowId) -> Option<Arc<Mutex<WizardFlow>>> {
        self.flows.get(&id).map(|entry| {
            entry.last_seen_ms.store(self.now_ms(), Ordering::Relaxed);
            entry.flow.clone()
        })
    }

    pub fn remove(&self, id: FlowId) {
        self.flows.remove(&id);
    }

    /// Drop every flow idle for longer than the configured ttl
    pub fn evict_idle(&self) {
        let cutoff = self.now_ms() - self.idle_ttl.num_milliseconds();
        let before = self.flows.len();
        self.flows
            .retain(|_, entry| entry.last_seen_ms.load(Ordering::Relaxed) >= cutoff);

        let evicted = before.saturating_sub(self.flows.len());
        if evicted > 0 {
            debug!(evicted, "Evicted idle wizard flows");
        }
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}

/// Deferred badge trigger scheduler
///
/// A badge check fired right after a contribution may not yet see the
/// contribution row, so each trigger waits a fixed delay first. The delay is
/// a heuristic, not a synchronisation barrier.
///
/// Pending triggers live in a table owned by the scheduler, so they can be
/// listed, cancelled one by one, or aborted together on shutdown.
use super::{check_badges, BadgeCheckRequest, TriggerAction};
use crate::{functions::FunctionInvoker, metrics};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{info, warn};
use uuid::Uuid;

pub type TriggerId = Uuid;

/// A scheduled trigger that has not fired yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTrigger {
    pub id: TriggerId,
    #[serde(flatten)]
    pub request: BadgeCheckRequest,
    pub scheduled_at: DateTime<Utc>,
    pub fires_at: DateTime<Utc>,
}

struct Slot {
    trigger: PendingTrigger,
    handle: JoinHandle<()>,
}

struct SchedulerInner {
    invoker: Arc<dyn FunctionInvoker>,
    function_name: String,
    delay: Duration,
    pending: Mutex<HashMap<TriggerId, Slot>>,
    closed: AtomicBool,
}

/// Schedules badge checks a fixed delay after the triggering action
#[derive(Clone)]
pub struct BadgeScheduler {
    inner: Arc<SchedulerInner>,
}

impl BadgeScheduler {
    pub fn new(
        invoker: Arc<dyn FunctionInvoker>,
        function_name: impl Into<String>,
        delay: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                invoker,
                function_name: function_name.into(),
                delay,
                pending: Mutex::new(HashMap::new()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    pub fn delay(&self) -> Duration {
        self.inner.delay
    }

    /// Schedule a badge check and return without waiting for it.
    ///
    /// Returns `None` once the scheduler has been shut down, or when the
    /// configured delay cannot be represented as a firing time.
    pub async fn schedule(
        &self,
        user_id: impl Into<String>,
        trigger_action: TriggerAction,
    ) -> Option<TriggerId> {
        let request = BadgeCheckRequest::new(user_id, trigger_action);

        let scheduled_at = Utc::now();
        let Some(fires_at) = chrono::Duration::from_std(self.inner.delay)
            .ok()
            .and_then(|delay| scheduled_at.checked_add_signed(delay))
        else {
            warn!(
                "Badge delay {:?} out of range, dropping {} trigger for {}",
                self.inner.delay,
                trigger_action.as_str(),
                request.user_id
            );
            return None;
        };

        // `closed` is only read and written under the pending lock, so a trigger
        // can never slip in after shutdown has drained the table
        let mut pending = self.inner.pending.lock().await;
        if self.inner.closed.load(Ordering::SeqCst) {
            warn!(
                "Scheduler shut down, dropping {} trigger for {}",
                trigger_action.as_str(),
                request.user_id
            );
            return None;
        }

        let id = Uuid::new_v4();
        let trigger = PendingTrigger {
            id,
            request: request.clone(),
            scheduled_at,
            fires_at,
        };

        // Spawned under the lock so the task cannot look itself up before it is inserted
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(inner.delay).await;
            inner.fire(id, request).await;
        });
        pending.insert(id, Slot { trigger, handle });
        metrics::set_pending_triggers(pending.len());

        Some(id)
    }

    /// Triggers that have not fired yet, oldest first
    pub async fn pending(&self) -> Vec<PendingTrigger> {
        let pending = self.inner.pending.lock().await;
        let mut triggers: Vec<PendingTrigger> =
            pending.values().map(|slot| slot.trigger.clone()).collect();
        triggers.sort_by_key(|t| t.scheduled_at);
        triggers
    }

    /// Cancel one pending trigger. `false` if it already fired or is unknown.
    pub async fn cancel(&self, id: TriggerId) -> bool {
        let mut pending = self.inner.pending.lock().await;
        let cancelled = match pending.remove(&id) {
            Some(slot) => {
                slot.handle.abort();
                true
            }
            None => false,
        };
        metrics::set_pending_triggers(pending.len());
        cancelled
    }

    /// Refuse new triggers and abort every pending one, returning how many
    /// were cancelled
    pub async fn shutdown(&self) -> usize {
        let mut pending = self.inner.pending.lock().await;
        self.inner.closed.store(true, Ordering::SeqCst);

        let count = pending.len();
        for (_, slot) in pending.drain() {
            slot.handle.abort();
        }
        metrics::set_pending_triggers(0);

        if count > 0 {
            info!("Cancelled {} pending badge triggers", count);
        }
        count
    }
}

impl SchedulerInner {
    async fn fire(&self, id: TriggerId, request: BadgeCheckRequest) {
        // Leave the table first; from here on the check can no longer be cancelled
        {
            let mut pending = self.pending.lock().await;
            if pending.remove(&id).is_none() {
                return;
            }
            metrics::set_pending_triggers(pending.len());
        }

        let result = check_badges(self.invoker.as_ref(), &self.function_name, &request).await;
        if result.success {
            info!(
                "Badge check for {} after {} completed",
                request.user_id,
                request.trigger_action.as_str()
            );
        } else {
            warn!(
                "Badge check for {} after {} failed: {}",
                request.user_id,
                request.trigger_action.as_str(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}

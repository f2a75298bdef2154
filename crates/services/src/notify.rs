//! # Notification Dispatch
//!
//! Fire-and-forget fan-out of published warnings. Each dispatch is one
//! spawned task: no retry, no delivery confirmation. Recipients go to the
//! transport in batches, and each batch is bounded by a per-recipient budget
//! times its size, so a slow transport loses at most the batch in flight.
//! Nothing it does can fail the request that triggered it.

use std::sync::Arc;
use std::time::Duration;

use domains::{Notifier, UserRepository, WarningMessage};
use tokio::task::JoinHandle;
use tracing::{info, warn, Instrument};

/// Recipients handed to the transport per call.
pub const BATCH_SIZE: usize = 10;

/// Outcome of one broadcast, as far as the transport reported it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    pub total: usize,
    pub reached: usize,
    /// Recipients in batches the transport rejected outright.
    pub failed: usize,
    /// Recipients in batches that ran past their budget.
    pub timed_out: usize,
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    users: Arc<dyn UserRepository>,
    notifier: Arc<dyn Notifier>,
    per_recipient: Duration,
}

impl NotificationDispatcher {
    pub fn new(users: Arc<dyn UserRepository>, notifier: Arc<dyn Notifier>, per_recipient: Duration) -> Self {
        Self { users, notifier, per_recipient }
    }

    /// Schedules the broadcast of `warning` to every registered email and
    /// returns immediately. The handle is only useful to tests.
    pub fn dispatch_warning(&self, warning: WarningMessage) -> JoinHandle<BroadcastReport> {
        let this = self.clone();
        let span = tracing::info_span!("warning_broadcast", warning_id = warning.id);

        tokio::spawn(async move { this.deliver(&warning).await }.instrument(span))
    }

    async fn deliver(&self, warning: &WarningMessage) -> BroadcastReport {
        let recipients = match self.users.list_emails().await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "warning broadcast failed: recipients unavailable");
                return BroadcastReport::default();
            }
        };
        let mut report = BroadcastReport { total: recipients.len(), ..Default::default() };

        for batch in recipients.chunks(BATCH_SIZE) {
            let budget = self.per_recipient.saturating_mul(batch.len() as u32);
            match tokio::time::timeout(budget, self.notifier.broadcast_warning(batch, warning)).await {
                Ok(Ok(sent)) => report.reached += sent,
                Ok(Err(e)) => {
                    report.failed += batch.len();
                    warn!(error = %e, batch = batch.len(), "warning batch failed");
                }
                Err(_) => {
                    report.timed_out += batch.len();
                    warn!(
                        budget_ms = budget.as_millis() as u64,
                        batch = batch.len(),
                        reached = report.reached,
                        total = report.total,
                        "warning batch timed out"
                    );
                }
            }
        }

        if report.total > 0 {
            info!(
                total = report.total,
                reached = report.reached,
                failed = report.failed,
                timed_out = report.timed_out,
                "warning broadcast finished"
            );
        }
        report
    }
}

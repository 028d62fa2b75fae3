//! Supervisor notification sink. Notifications are best-effort: a failure
//! here never rolls back a persisted workflow transition.

use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, supervisor_id: &str, leave_id: Uuid) -> anyhow::Result<()>;
}

/// Default sink: records the notification in the service log. A real
/// deployment swaps in a mail/queue-backed implementation.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, supervisor_id: &str, leave_id: Uuid) -> anyhow::Result<()> {
        tracing::info!(supervisor_id, leave_id = %leave_id, "Supervisor notified of leave request");
        Ok(())
    }
}

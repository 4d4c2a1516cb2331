//! Best-effort audit trail.
//!
//! Events are written after the operation they describe has succeeded. A failed
//! write is logged at `warn` and swallowed: the caller's note operation has
//! already happened and is reported as a success.

use store::{AuditAction, AuditEvent, AuditSink};
use uuid::Uuid;

use crate::error::Result;

pub struct AuditTrail<A> {
    sink: A,
}

impl<A: AuditSink> AuditTrail<A> {
    pub fn new(sink: A) -> Self {
        Self { sink }
    }

    pub async fn record(
        &self,
        actor_id: Uuid,
        action: AuditAction,
        target: impl Into<String>,
        source_addr: Option<&str>,
    ) {
        let event = AuditEvent::new(actor_id, action, target, source_addr.map(str::to_string));
        if let Err(e) = self.sink.append(event).await {
            tracing::warn!(%actor_id, %action, error = %e, "Failed to write audit event");
        }
    }

    /// The actor's own events, newest first.
    pub async fn list_for(&self, actor_id: Uuid) -> Result<Vec<AuditEvent>> {
        Ok(self.sink.list_by_actor(actor_id).await?)
    }
}

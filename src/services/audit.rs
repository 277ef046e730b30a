//! Audit trail service.
//!
//! Writes one structured entry per mutating catalog event and serves the
//! dashboard's recent-activity view: the last 7 qualifying events, most
//! recent first.

use serde_json::Value;

use crate::{
    error::AppResult,
    models::audit::{ActivityEntry, AuditAction, AuditEntry},
    repository::Repository,
};

/// Number of events shown on the dashboard
pub const DASHBOARD_ACTIVITY_LIMIT: i64 = 7;

#[derive(Clone)]
pub struct AuditService {
    repository: Repository,
}

impl AuditService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Record a mutating book event. `detail` optionally carries the full
    /// serialized record for forensic replay.
    pub async fn record(
        &self,
        action: AuditAction,
        actor: &str,
        lib_id: &str,
        title: &str,
        detail: Option<Value>,
    ) -> AppResult<()> {
        let message = action.describe(actor, lib_id, title);
        self.repository
            .audit
            .append(action, actor, &message, detail.as_ref())
            .await
    }

    /// The dashboard's recent-activity feed
    pub async fn recent_activity(&self) -> AppResult<Vec<ActivityEntry>> {
        self.repository.audit.recent(DASHBOARD_ACTIVITY_LIMIT).await
    }

    /// Every audit entry referencing a catalog identifier, oldest first
    pub async fn history_for(&self, lib_id: &str) -> AppResult<Vec<AuditEntry>> {
        self.repository.audit.for_lib_id(lib_id).await
    }
}

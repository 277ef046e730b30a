//! Audit log repository.
//!
//! The audit trail is an append-only table of structured records, not a
//! log file. `created_at` carries microsecond precision so the dashboard
//! ordering is stable even for events within the same second.

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::audit::{ActivityEntry, AuditAction, AuditEntry},
};

#[derive(Clone)]
pub struct AuditRepository {
    pool: Pool<Postgres>,
}

impl AuditRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Append one entry. `detail` is the optional full-record snapshot
    /// kept for forensic replay.
    pub async fn append(
        &self,
        action: AuditAction,
        actor: &str,
        message: &str,
        detail: Option<&serde_json::Value>,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO audit_log (action, actor, message, detail) VALUES ($1, $2, $3, $4)",
        )
        .bind(action.as_code())
        .bind(actor)
        .bind(message)
        .bind(detail)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// The most recent entries carrying a known action code, newest
    /// first. Rows with any other action value are skipped.
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<ActivityEntry>> {
        let entries = sqlx::query_as::<_, ActivityEntry>(
            r#"
            SELECT action, message, created_at
            FROM audit_log
            WHERE action IN ('ADD', 'EDT', 'DLT')
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    /// Full audit entries for an identifier, oldest first (forensic view)
    pub async fn for_lib_id(&self, lib_id: &str) -> AppResult<Vec<AuditEntry>> {
        let pattern = format!("%(ID={})%", lib_id);
        let entries = sqlx::query_as::<_, AuditEntry>(
            r#"
            SELECT id, action, actor, message, detail, created_at
            FROM audit_log
            WHERE message LIKE $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}

//! Audit trail types.
//!
//! One entry is appended per mutating catalog event, tagged with a
//! 3-letter action code. The dashboard consumes the most recent entries
//! whose action is one of the known codes; anything else in the store is
//! skipped by the reader.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Action kind of an audit entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AuditAction {
    Add,
    Edit,
    Delete,
}

impl AuditAction {
    /// The 3-letter code stored with each entry
    pub fn as_code(&self) -> &'static str {
        match self {
            AuditAction::Add => "ADD",
            AuditAction::Edit => "EDT",
            AuditAction::Delete => "DLT",
        }
    }

    /// Parse a stored action code. Unknown codes yield `None` and are
    /// skipped by readers.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ADD" => Some(AuditAction::Add),
            "EDT" => Some(AuditAction::Edit),
            "DLT" => Some(AuditAction::Delete),
            _ => None,
        }
    }

    /// Human-readable description of a book event, naming the record
    /// kind, its catalog identifier and title.
    pub fn describe(&self, actor: &str, lib_id: &str, title: &str) -> String {
        match self {
            AuditAction::Add => format!(
                "@{} created a new record: Book (ID={}), title \"{}\"",
                actor, lib_id, title
            ),
            AuditAction::Edit => format!(
                "@{} altered record: Book (ID={}), title \"{}\"",
                actor, lib_id, title
            ),
            AuditAction::Delete => format!(
                "@{} deleted record: Book (ID={}), title \"{}\"",
                actor, lib_id, title
            ),
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

/// Full audit row, including the optional serialized record snapshot
/// kept for forensic replay
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AuditEntry {
    pub id: i64,
    pub action: String,
    pub actor: String,
    pub message: String,
    #[schema(value_type = Object)]
    pub detail: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Dashboard view of one audit event
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ActivityEntry {
    pub action: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_codes() {
        assert_eq!(AuditAction::Add.as_code(), "ADD");
        assert_eq!(AuditAction::Edit.as_code(), "EDT");
        assert_eq!(AuditAction::Delete.as_code(), "DLT");
    }

    #[test]
    fn test_from_code_rejects_unknown() {
        assert_eq!(AuditAction::from_code("ADD"), Some(AuditAction::Add));
        assert_eq!(AuditAction::from_code("EDT"), Some(AuditAction::Edit));
        assert_eq!(AuditAction::from_code("DLT"), Some(AuditAction::Delete));
        assert_eq!(AuditAction::from_code("XYZ"), None);
        assert_eq!(AuditAction::from_code(""), None);
    }

    #[test]
    fn test_describe_names_record_and_title() {
        let msg = AuditAction::Add.describe("clerk", "NOV3", "The Trial");
        assert_eq!(msg, "@clerk created a new record: Book (ID=NOV3), title \"The Trial\"");

        let msg = AuditAction::Delete.describe("clerk", "NOV3", "The Trial");
        assert!(msg.contains("deleted"));
        assert!(msg.contains("NOV3"));
        assert!(msg.contains("The Trial"));
    }
}

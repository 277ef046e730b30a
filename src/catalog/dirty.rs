//! Change detection for book edits.
//!
//! Before persisting an edit, the tracked fields of the persisted record
//! are captured as a [`BookSnapshot`] and compared field-by-field against
//! the candidate built from the submitted form. Only when at least one
//! tracked field differs is the write performed, `last_edit_time` stamped,
//! `last_editor` set and an audit entry emitted. A no-op submission leaves
//! all of that untouched.

/// The tracked (editable) fields of a book. Every field editable through
/// the edit workflow is tracked; `lib_id`, the type and the registration
/// metadata are not editable and therefore not part of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookSnapshot {
    pub author_id: i32,
    pub location_id: Option<i32>,
    pub language_id: Option<i32>,
    pub title: String,
    pub subject: Option<String>,
    pub section: Option<String>,
    pub publisher: Option<String>,
    pub publishing_date: Option<String>,
    pub isbn: Option<String>,
    pub number_of_copies: i32,
}

impl BookSnapshot {
    /// Names of the tracked fields whose values differ between the
    /// persisted snapshot and the candidate.
    pub fn changed_fields(&self, candidate: &BookSnapshot) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if self.author_id != candidate.author_id {
            changed.push("author");
        }
        if self.location_id != candidate.location_id {
            changed.push("location");
        }
        if self.language_id != candidate.language_id {
            changed.push("language");
        }
        if self.title != candidate.title {
            changed.push("title");
        }
        if self.subject != candidate.subject {
            changed.push("subject");
        }
        if self.section != candidate.section {
            changed.push("section");
        }
        if self.publisher != candidate.publisher {
            changed.push("publisher");
        }
        if self.publishing_date != candidate.publishing_date {
            changed.push("publishing_date");
        }
        if self.isbn != candidate.isbn {
            changed.push("isbn");
        }
        if self.number_of_copies != candidate.number_of_copies {
            changed.push("number_of_copies");
        }
        changed
    }

    /// True when at least one tracked field differs.
    pub fn is_dirty(&self, candidate: &BookSnapshot) -> bool {
        !self.changed_fields(candidate).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> BookSnapshot {
        BookSnapshot {
            author_id: 1,
            location_id: Some(2),
            language_id: None,
            title: "The Trial".to_string(),
            subject: Some("law".to_string()),
            section: None,
            publisher: Some("Verlag".to_string()),
            publishing_date: Some("1925".to_string()),
            isbn: None,
            number_of_copies: 3,
        }
    }

    #[test]
    fn test_identical_snapshot_is_clean() {
        let persisted = snapshot();
        let candidate = snapshot();
        assert!(!persisted.is_dirty(&candidate));
        assert!(persisted.changed_fields(&candidate).is_empty());
    }

    #[test]
    fn test_single_field_change_is_dirty() {
        let persisted = snapshot();
        let mut candidate = snapshot();
        candidate.number_of_copies = 4;
        assert!(persisted.is_dirty(&candidate));
        assert_eq!(persisted.changed_fields(&candidate), vec!["number_of_copies"]);
    }

    #[test]
    fn test_nullable_field_change_is_dirty() {
        let persisted = snapshot();
        let mut candidate = snapshot();
        candidate.isbn = Some("9782070408504".to_string());
        assert_eq!(persisted.changed_fields(&candidate), vec!["isbn"]);

        let mut cleared = snapshot();
        cleared.subject = None;
        assert_eq!(persisted.changed_fields(&cleared), vec!["subject"]);
    }

    #[test]
    fn test_multiple_changes_reported_together() {
        let persisted = snapshot();
        let mut candidate = snapshot();
        candidate.title = "The Castle".to_string();
        candidate.author_id = 7;
        let changed = persisted.changed_fields(&candidate);
        assert_eq!(changed, vec!["author", "title"]);
    }
}

//! Book (catalog record) model and related types.
//!
//! The persisted row carries foreign-key ids; the related author, type,
//! location and language entities are loaded separately and attached for
//! API responses.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::catalog::BookSnapshot;

use super::refs::{Author, BookType, Language, Location};

/// Full book model (DB + API)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    /// Derived catalog code, e.g. "NOV3". A display aid, not a key.
    pub lib_id: String,
    pub author_id: i32,
    pub title: String,
    pub subject: Option<String>,
    pub type_id: i32,
    pub section: Option<String>,
    pub location_id: Option<i32>,
    pub publisher: Option<String>,
    pub publishing_date: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    /// Storage key of the PDF summary attachment
    pub summary_file: Option<String>,
    /// Storage key of the cover image attachment
    pub cover_file: Option<String>,
    pub isbn: Option<String>,
    pub number_of_copies: i32,
    pub language_id: Option<i32>,
    pub date_of_registration: DateTime<Utc>,
    pub registrator_id: Option<i32>,
    pub last_editor_id: Option<i32>,
    pub last_edit_time: DateTime<Utc>,
    // Relations (loaded separately)
    #[sqlx(skip)]
    #[serde(default)]
    pub author: Option<Author>,
    #[sqlx(skip)]
    #[serde(default)]
    pub book_type: Option<BookType>,
    #[sqlx(skip)]
    #[serde(default)]
    pub location: Option<Location>,
    #[sqlx(skip)]
    #[serde(default)]
    pub language: Option<Language>,
}

impl Book {
    /// Capture the tracked (editable) fields for change detection.
    pub fn snapshot(&self) -> BookSnapshot {
        BookSnapshot {
            author_id: self.author_id,
            location_id: self.location_id,
            language_id: self.language_id,
            title: self.title.clone(),
            subject: self.subject.clone(),
            section: self.section.clone(),
            publisher: self.publisher.clone(),
            publishing_date: self.publishing_date.clone(),
            isbn: self.isbn.clone(),
            number_of_copies: self.number_of_copies,
        }
    }
}

/// Short book representation for lists, with joined reference names
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub lib_id: String,
    pub title: String,
    pub publisher: Option<String>,
    pub number_of_copies: i32,
    pub date_of_registration: DateTime<Utc>,
    pub author_name: String,
    pub type_name: String,
    pub type_code: String,
    pub location_code: Option<String>,
    pub language_code: Option<String>,
}

/// New-book form data (the multipart text fields; attachments arrive
/// alongside as file parts)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    pub author_id: i32,
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    pub subject: Option<String>,
    pub type_id: i32,
    pub section: Option<String>,
    pub location_id: Option<i32>,
    pub language_id: Option<i32>,
    pub publisher: Option<String>,
    pub publishing_date: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    #[validate(length(max = 14, message = "ISBN must be at most 14 characters"))]
    pub isbn: Option<String>,
    #[validate(range(min = 0, message = "Number of copies must not be negative"))]
    pub number_of_copies: i32,
}

/// Edit-book form data. The type and purchase date are fixed at
/// registration time and not editable.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    pub author_id: i32,
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    pub subject: Option<String>,
    pub section: Option<String>,
    pub location_id: Option<i32>,
    pub language_id: Option<i32>,
    pub publisher: Option<String>,
    pub publishing_date: Option<String>,
    #[validate(length(max = 14, message = "ISBN must be at most 14 characters"))]
    pub isbn: Option<String>,
    #[validate(range(min = 0, message = "Number of copies must not be negative"))]
    pub number_of_copies: i32,
}

impl UpdateBook {
    /// The candidate snapshot this submission describes.
    pub fn snapshot(&self) -> BookSnapshot {
        BookSnapshot {
            author_id: self.author_id,
            location_id: self.location_id,
            language_id: self.language_id,
            title: self.title.trim().to_string(),
            subject: self.subject.clone(),
            section: self.section.clone(),
            publisher: self.publisher.clone(),
            publishing_date: self.publishing_date.clone(),
            isbn: self.isbn.clone(),
            number_of_copies: self.number_of_copies,
        }
    }
}

/// Listing parameters. Page size is resolved against the configured
/// options; `desc` reverses the insertion order.
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub desc: Option<bool>,
}

/// Catalog query parameters. `id` or the `type_code`+`number` composite
/// select the exact-lookup path; the remaining fields are conjunctive
/// substring filters.
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Exact lookup by numeric id
    pub id: Option<i32>,
    /// Exact lookup: lib_id type-code prefix (with `number`)
    pub type_code: Option<String>,
    /// Exact lookup: lib_id numeric suffix (with `type_code`)
    pub number: Option<u32>,
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub location: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub language: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

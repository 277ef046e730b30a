//! Reference (lookup) entities: authors, types, locations, languages.
//!
//! Authors, types and locations are protected from deletion while any book
//! references them; deleting a language nulls the reference on dependent
//! books. The schema enforces both, the repository surfaces friendly
//! errors before the constraint fires.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub name: String,
}

/// Book type, carrying the short alphabetic code used as the `lib_id`
/// prefix (e.g. "NOV" for novels).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookType {
    pub id: i32,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Location {
    pub id: i32,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Language {
    pub id: i32,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(length(min = 1, message = "Author name must not be empty"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookType {
    #[validate(length(min = 1, message = "Type name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, max = 3, message = "Type code must be 1-3 characters"))]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLocation {
    #[validate(length(min = 1, message = "Location code must not be empty"))]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLanguage {
    #[validate(length(min = 1, message = "Language name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, max = 3, message = "Language code must be 1-3 characters"))]
    pub code: String,
}

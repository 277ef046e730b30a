//! Reference entities repository: authors, types, locations, languages.
//!
//! Authors, types and locations refuse deletion while referenced by any
//! book; deleting a language nulls the reference on dependent books (the
//! schema declares ON DELETE SET NULL, so a plain delete suffices).

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::refs::{
        Author, BookType, CreateAuthor, CreateBookType, CreateLanguage, CreateLocation, Language,
        Location,
    },
};

#[derive(Clone)]
pub struct RefsRepository {
    pool: Pool<Postgres>,
}

impl RefsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn books_referencing(&self, column: &str, id: i32) -> AppResult<i64> {
        // column is one of our own constants, never user input
        let q = format!("SELECT COUNT(*) FROM books WHERE {} = $1", column);
        let count: i64 = sqlx::query_scalar(&q).bind(id).fetch_one(&self.pool).await?;
        Ok(count)
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>("SELECT id, name FROM authors ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(authors)
    }

    pub async fn create_author(&self, data: &CreateAuthor) -> AppResult<Author> {
        let author = sqlx::query_as::<_, Author>(
            "INSERT INTO authors (name) VALUES ($1) RETURNING id, name",
        )
        .bind(data.name.trim())
        .fetch_one(&self.pool)
        .await?;
        Ok(author)
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        let referenced = self.books_referencing("author_id", id).await?;
        if referenced > 0 {
            return Err(AppError::Conflict(format!(
                "Author is referenced by {} book(s) and cannot be deleted",
                referenced
            )));
        }
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author with id {} not found", id)));
        }
        Ok(())
    }

    // =========================================================================
    // TYPES
    // =========================================================================

    pub async fn list_types(&self) -> AppResult<Vec<BookType>> {
        let types = sqlx::query_as::<_, BookType>("SELECT id, name, code FROM types ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(types)
    }

    pub async fn get_type(&self, id: i32) -> AppResult<BookType> {
        sqlx::query_as::<_, BookType>("SELECT id, name, code FROM types WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::Reference(format!("Type with id {} not found", id)))
    }

    pub async fn create_type(&self, data: &CreateBookType) -> AppResult<BookType> {
        let book_type = sqlx::query_as::<_, BookType>(
            "INSERT INTO types (name, code) VALUES ($1, $2) RETURNING id, name, code",
        )
        .bind(data.name.trim())
        .bind(data.code.trim())
        .fetch_one(&self.pool)
        .await?;
        Ok(book_type)
    }

    pub async fn delete_type(&self, id: i32) -> AppResult<()> {
        let referenced = self.books_referencing("type_id", id).await?;
        if referenced > 0 {
            return Err(AppError::Conflict(format!(
                "Type is referenced by {} book(s) and cannot be deleted",
                referenced
            )));
        }
        let result = sqlx::query("DELETE FROM types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Type with id {} not found", id)));
        }
        Ok(())
    }

    // =========================================================================
    // LOCATIONS
    // =========================================================================

    pub async fn list_locations(&self) -> AppResult<Vec<Location>> {
        // Presented ordered by code in the catalog forms
        let locations =
            sqlx::query_as::<_, Location>("SELECT id, code FROM locations ORDER BY code")
                .fetch_all(&self.pool)
                .await?;
        Ok(locations)
    }

    pub async fn create_location(&self, data: &CreateLocation) -> AppResult<Location> {
        let location = sqlx::query_as::<_, Location>(
            "INSERT INTO locations (code) VALUES ($1) RETURNING id, code",
        )
        .bind(data.code.trim())
        .fetch_one(&self.pool)
        .await?;
        Ok(location)
    }

    pub async fn delete_location(&self, id: i32) -> AppResult<()> {
        let referenced = self.books_referencing("location_id", id).await?;
        if referenced > 0 {
            return Err(AppError::Conflict(format!(
                "Location is referenced by {} book(s) and cannot be deleted",
                referenced
            )));
        }
        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Location with id {} not found", id)));
        }
        Ok(())
    }

    // =========================================================================
    // LANGUAGES
    // =========================================================================

    pub async fn list_languages(&self) -> AppResult<Vec<Language>> {
        let languages =
            sqlx::query_as::<_, Language>("SELECT id, name, code FROM languages ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(languages)
    }

    pub async fn create_language(&self, data: &CreateLanguage) -> AppResult<Language> {
        let language = sqlx::query_as::<_, Language>(
            "INSERT INTO languages (name, code) VALUES ($1, $2) RETURNING id, name, code",
        )
        .bind(data.name.trim())
        .bind(data.code.trim())
        .fetch_one(&self.pool)
        .await?;
        Ok(language)
    }

    /// Delete a language; dependent books get their reference nulled by
    /// the schema's SET NULL action.
    pub async fn delete_language(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM languages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Language with id {} not found", id)));
        }
        Ok(())
    }
}

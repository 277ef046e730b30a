//! Books repository for database operations.
//!
//! Creation runs in a single transaction covering the title-uniqueness
//! check, the sequential lib_id computation and the insert, so two
//! concurrent creations cannot race each other into the same identifier
//! or a duplicate title. The UNIQUE constraint on title is the backstop.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    catalog::{lib_id, BookFilters, FilterField},
    error::{AppError, AppResult},
    models::{
        book::{Book, BookShort, CreateBook, UpdateBook},
        refs::{Author, BookType, Language, Location},
    },
};

/// Shared SELECT for list rows, joining reference names onto each book
const BOOK_SHORT_SELECT: &str = r#"
    SELECT b.id, b.lib_id, b.title, b.publisher, b.number_of_copies,
           b.date_of_registration,
           a.name AS author_name, t.name AS type_name, t.code AS type_code,
           l.code AS location_code, lg.code AS language_code
    FROM books b
    JOIN authors a ON a.id = b.author_id
    JOIN types t ON t.id = b.type_id
    LEFT JOIN locations l ON l.id = b.location_id
    LEFT JOIN languages lg ON lg.id = b.language_id
"#;

const BOOK_SHORT_COUNT: &str = r#"
    SELECT COUNT(*)
    FROM books b
    JOIN authors a ON a.id = b.author_id
    JOIN types t ON t.id = b.type_id
    LEFT JOIN locations l ON l.id = b.location_id
    LEFT JOIN languages lg ON lg.id = b.language_id
"#;

/// Map a unique-constraint violation on insert/update to a domain conflict
fn map_title_conflict(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db) = e {
        if db.code().as_deref() == Some("23505") {
            return AppError::Conflict(
                "A book already exists with that title. Choose another one and try again."
                    .to_string(),
            );
        }
    }
    AppError::Database(e)
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Get a book by numeric id, with reference entities attached
    pub async fn get(&self, id: i32) -> AppResult<Book> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        self.attach_refs(book).await
    }

    /// Get a book by its catalog identifier (exact match)
    pub async fn get_by_lib_id(&self, lib_id: &str) -> AppResult<Book> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE lib_id = $1")
            .bind(lib_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", lib_id)))?;

        self.attach_refs(book).await
    }

    async fn attach_refs(&self, mut book: Book) -> AppResult<Book> {
        book.author = sqlx::query_as::<_, Author>("SELECT id, name FROM authors WHERE id = $1")
            .bind(book.author_id)
            .fetch_optional(&self.pool)
            .await?;

        book.book_type =
            sqlx::query_as::<_, BookType>("SELECT id, name, code FROM types WHERE id = $1")
                .bind(book.type_id)
                .fetch_optional(&self.pool)
                .await?;

        book.location = sqlx::query_as::<_, Location>("SELECT id, code FROM locations WHERE id = $1")
            .bind(book.location_id)
            .fetch_optional(&self.pool)
            .await?;

        book.language =
            sqlx::query_as::<_, Language>("SELECT id, name, code FROM languages WHERE id = $1")
                .bind(book.language_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(book)
    }

    /// List books in insertion order by id; `desc` reverses fully
    pub async fn list(&self, page: i64, per_page: i64, desc: bool) -> AppResult<(Vec<BookShort>, i64)> {
        let offset = (page - 1) * per_page;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        let order = if desc { "DESC" } else { "ASC" };
        let select = format!(
            "{} ORDER BY b.id {} LIMIT {} OFFSET {}",
            BOOK_SHORT_SELECT, order, per_page, offset
        );

        let books = sqlx::query_as::<_, BookShort>(&select)
            .fetch_all(&self.pool)
            .await?;

        Ok((books, total))
    }

    /// The `n` most recently registered books
    pub async fn latest(&self, n: i64) -> AppResult<Vec<BookShort>> {
        let select = format!("{} ORDER BY b.id DESC LIMIT {}", BOOK_SHORT_SELECT, n);
        let books = sqlx::query_as::<_, BookShort>(&select)
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    // =========================================================================
    // SEARCH
    // =========================================================================

    /// Run a conjunctive substring filter query. All filter values are
    /// bound as parameters, never interpolated.
    pub async fn search(
        &self,
        filters: &BookFilters,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<BookShort>, i64)> {
        let offset = (page - 1) * per_page;

        let mut conditions = Vec::new();
        for (idx, (field, _)) in filters.iter().enumerate() {
            let column = match field {
                FilterField::Type => "t.name",
                FilterField::Location => "l.code",
                FilterField::Title => "b.title",
                FilterField::Content => "b.subject",
                FilterField::Language => "lg.code",
                FilterField::Author => "a.name",
                FilterField::Publisher => "b.publisher",
            };
            conditions.push(format!("{} ILIKE '%' || ${} || '%'", column, idx + 1));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_q = format!("{} {}", BOOK_SHORT_COUNT, where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_q);
        for (_, value) in filters.iter() {
            count_builder = count_builder.bind(value);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_q = format!(
            "{} {} ORDER BY b.id ASC LIMIT {} OFFSET {}",
            BOOK_SHORT_SELECT, where_clause, per_page, offset
        );
        let mut builder = sqlx::query_as::<_, BookShort>(&select_q);
        for (_, value) in filters.iter() {
            builder = builder.bind(value);
        }
        let books = builder.fetch_all(&self.pool).await?;

        Ok((books, total))
    }

    // =========================================================================
    // CREATE
    // =========================================================================

    /// Create a new book. Title uniqueness, reference resolution, the
    /// lib_id computation and the insert share one transaction.
    pub async fn create(
        &self,
        data: &CreateBook,
        registrator_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let title = data.title.trim();
        let title_taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE title = $1)")
                .bind(title)
                .fetch_one(&mut *tx)
                .await?;
        if title_taken {
            return Err(AppError::Conflict(
                "A book already exists with that title. Choose another one and try again."
                    .to_string(),
            ));
        }

        let type_code: Option<String> = sqlx::query_scalar("SELECT code FROM types WHERE id = $1")
            .bind(data.type_id)
            .fetch_optional(&mut *tx)
            .await?;
        let type_code = type_code
            .ok_or_else(|| AppError::Reference(format!("Type with id {} not found", data.type_id)))?;

        let author_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE id = $1)")
                .bind(data.author_id)
                .fetch_one(&mut *tx)
                .await?;
        if !author_exists {
            return Err(AppError::Reference(format!(
                "Author with id {} not found",
                data.author_id
            )));
        }

        if let Some(location_id) = data.location_id {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM locations WHERE id = $1)")
                    .bind(location_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if !exists {
                return Err(AppError::Reference(format!(
                    "Location with id {} not found",
                    location_id
                )));
            }
        }

        if let Some(language_id) = data.language_id {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM languages WHERE id = $1)")
                    .bind(language_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if !exists {
                return Err(AppError::Reference(format!(
                    "Language with id {} not found",
                    language_id
                )));
            }
        }

        let existing_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE type_id = $1")
                .bind(data.type_id)
                .fetch_one(&mut *tx)
                .await?;
        let lib_id = lib_id::generate(&type_code, existing_count);

        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO books (
                lib_id, author_id, title, subject, type_id, section,
                location_id, publisher, publishing_date, purchase_date,
                isbn, number_of_copies, language_id,
                date_of_registration, registrator_id, last_editor_id, last_edit_time
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $15, $14
            ) RETURNING id
            "#,
        )
        .bind(&lib_id)
        .bind(data.author_id)
        .bind(title)
        .bind(&data.subject)
        .bind(data.type_id)
        .bind(&data.section)
        .bind(data.location_id)
        .bind(&data.publisher)
        .bind(&data.publishing_date)
        .bind(data.purchase_date)
        .bind(&data.isbn)
        .bind(data.number_of_copies)
        .bind(data.language_id)
        .bind(now)
        .bind(registrator_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_title_conflict)?;

        tx.commit().await?;

        self.get(id).await
    }

    // =========================================================================
    // UPDATE
    // =========================================================================

    /// Persist an edit. The caller has already run change detection; this
    /// writes every tracked field and stamps the edit metadata.
    pub async fn update(
        &self,
        id: i32,
        data: &UpdateBook,
        editor_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Book> {
        let author_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE id = $1)")
                .bind(data.author_id)
                .fetch_one(&self.pool)
                .await?;
        if !author_exists {
            return Err(AppError::Reference(format!(
                "Author with id {} not found",
                data.author_id
            )));
        }

        if let Some(location_id) = data.location_id {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM locations WHERE id = $1)")
                    .bind(location_id)
                    .fetch_one(&self.pool)
                    .await?;
            if !exists {
                return Err(AppError::Reference(format!(
                    "Location with id {} not found",
                    location_id
                )));
            }
        }

        if let Some(language_id) = data.language_id {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM languages WHERE id = $1)")
                    .bind(language_id)
                    .fetch_one(&self.pool)
                    .await?;
            if !exists {
                return Err(AppError::Reference(format!(
                    "Language with id {} not found",
                    language_id
                )));
            }
        }

        let result = sqlx::query(
            r#"
            UPDATE books SET
                author_id = $1, title = $2, subject = $3, section = $4,
                location_id = $5, language_id = $6, publisher = $7,
                publishing_date = $8, isbn = $9, number_of_copies = $10,
                last_editor_id = $11, last_edit_time = $12
            WHERE id = $13
            "#,
        )
        .bind(data.author_id)
        .bind(data.title.trim())
        .bind(&data.subject)
        .bind(&data.section)
        .bind(data.location_id)
        .bind(data.language_id)
        .bind(&data.publisher)
        .bind(&data.publishing_date)
        .bind(&data.isbn)
        .bind(data.number_of_copies)
        .bind(editor_id)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_title_conflict)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        self.get(id).await
    }

    /// Set or clear the summary attachment storage key
    pub async fn set_summary_file(&self, id: i32, value: Option<&str>) -> AppResult<()> {
        sqlx::query("UPDATE books SET summary_file = $1 WHERE id = $2")
            .bind(value)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Set or clear the cover attachment storage key
    pub async fn set_cover_file(&self, id: i32, value: Option<&str>) -> AppResult<()> {
        sqlx::query("UPDATE books SET cover_file = $1 WHERE id = $2")
            .bind(value)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // =========================================================================
    // DELETE
    // =========================================================================

    /// Delete a book. Deletion is permitted unconditionally.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    // =========================================================================
    // EXISTENCE CHECKS
    // =========================================================================

    /// Check whether a title is already taken (case-sensitive exact match)
    pub async fn title_exists(&self, title: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE title = $1 AND id != $2)")
                .bind(title)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE title = $1)")
                .bind(title)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }
}

//! Book catalog service: creation with identity assignment, edits gated
//! by change detection, deletion, and the query/filter engine.

use chrono::Utc;
use validator::Validate;

use crate::{
    catalog::{lib_id, BookFilters, FilterField},
    error::{AppError, AppResult},
    models::{
        audit::{AuditAction, AuditEntry},
        book::{Book, BookQuery, BookShort, CreateBook, UpdateBook},
        refs::{
            Author, BookType, CreateAuthor, CreateBookType, CreateLanguage, CreateLocation,
            Language, Location,
        },
    },
    repository::Repository,
    services::{
        audit::AuditService,
        storage::{attachment_key, extension_of, AttachmentKind, StorageService},
    },
};

/// Books shown on the dashboard
const DASHBOARD_LATEST_BOOKS: i64 = 5;

/// An uploaded attachment as received from the multipart form
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Validate the upload against the attachment kind and derive its
    /// storage extension. No write happens before this check passes.
    fn checked_extension(&self, kind: AttachmentKind) -> AppResult<String> {
        if !kind.accepts(&self.content_type) {
            return Err(AppError::Validation(kind.rejection().to_string()));
        }
        extension_of(&self.filename)
            .ok_or_else(|| AppError::Validation(kind.rejection().to_string()))
    }
}

/// Outcome of a catalog query
pub enum QueryOutcome {
    /// Exact identifier lookup hit a single record
    Exact(Book),
    /// Filter query matched a (non-empty) collection
    Matches { books: Vec<BookShort>, total: i64 },
}

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
    audit: AuditService,
    storage: StorageService,
}

impl BooksService {
    pub fn new(repository: Repository, audit: AuditService, storage: StorageService) -> Self {
        Self {
            repository,
            audit,
            storage,
        }
    }

    /// List books in insertion order; `desc` reverses fully
    pub async fn list(&self, page: i64, per_page: i64, desc: bool) -> AppResult<(Vec<BookShort>, i64)> {
        self.repository.books.list(page.max(1), per_page, desc).await
    }

    /// Get one book with reference entities attached
    pub async fn get(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get(id).await
    }

    /// The most recently registered books, for the dashboard
    pub async fn latest(&self) -> AppResult<Vec<BookShort>> {
        self.repository.books.latest(DASHBOARD_LATEST_BOOKS).await
    }

    // =========================================================================
    // CREATE
    // =========================================================================

    /// Register a new book. Attachment types are checked before any
    /// write; the lib_id is assigned inside the creation transaction;
    /// attachment keys derive from the allocated id. One ADD audit entry
    /// is appended with the full record snapshot.
    pub async fn create(
        &self,
        actor: &str,
        actor_id: i32,
        data: CreateBook,
        summary: Option<Upload>,
        cover: Option<Upload>,
    ) -> AppResult<Book> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let summary_ext = summary
            .as_ref()
            .map(|u| u.checked_extension(AttachmentKind::Summary))
            .transpose()?;
        let cover_ext = cover
            .as_ref()
            .map(|u| u.checked_extension(AttachmentKind::Cover))
            .transpose()?;

        let book = self
            .repository
            .books
            .create(&data, actor_id, Utc::now())
            .await?;

        // Record save and attachment writes form one unit: a failed write
        // unwinds the freshly created record.
        let stored = self
            .store_new_attachments(book.id, summary, summary_ext, cover, cover_ext)
            .await;
        if let Err(e) = stored {
            if let Err(cleanup) = self.repository.books.delete(book.id).await {
                tracing::error!("Failed to unwind book {} after attachment error: {}", book.id, cleanup);
            }
            return Err(e);
        }

        let book = self.repository.books.get(book.id).await?;

        self.audit
            .record(
                AuditAction::Add,
                actor,
                &book.lib_id,
                &book.title,
                serde_json::to_value(&book).ok(),
            )
            .await?;

        tracing::info!("Book {} registered by @{}", book.lib_id, actor);

        Ok(book)
    }

    async fn store_new_attachments(
        &self,
        book_id: i32,
        summary: Option<Upload>,
        summary_ext: Option<String>,
        cover: Option<Upload>,
        cover_ext: Option<String>,
    ) -> AppResult<()> {
        if let (Some(upload), Some(ext)) = (summary, summary_ext) {
            self.store_attachment(book_id, AttachmentKind::Summary, &upload, &ext)
                .await?;
        }
        if let (Some(upload), Some(ext)) = (cover, cover_ext) {
            self.store_attachment(book_id, AttachmentKind::Cover, &upload, &ext)
                .await?;
        }
        Ok(())
    }

    async fn store_attachment(
        &self,
        book_id: i32,
        kind: AttachmentKind,
        upload: &Upload,
        ext: &str,
    ) -> AppResult<()> {
        let key = attachment_key(kind, book_id, ext);
        self.storage.save(&key, &upload.bytes).await?;
        match kind {
            AttachmentKind::Summary => {
                self.repository.books.set_summary_file(book_id, Some(&key)).await
            }
            AttachmentKind::Cover => {
                self.repository.books.set_cover_file(book_id, Some(&key)).await
            }
        }
    }

    // =========================================================================
    // EDIT
    // =========================================================================

    /// Apply an edit through change detection. A submission identical to
    /// the persisted record writes nothing: no timestamp, no editor, no
    /// audit entry. A dirty submission stamps both and appends one EDT
    /// entry.
    pub async fn edit(&self, actor: &str, actor_id: i32, id: i32, data: UpdateBook) -> AppResult<Book> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let persisted = self.repository.books.get(id).await?;

        let title = data.title.trim();
        if self.repository.books.title_exists(title, Some(id)).await? {
            return Err(AppError::Conflict(
                "Book with that title already exists. Please try again with another one.".to_string(),
            ));
        }

        let candidate = data.snapshot();
        if !persisted.snapshot().is_dirty(&candidate) {
            return Ok(persisted);
        }

        let updated = self
            .repository
            .books
            .update(id, &data, actor_id, Utc::now())
            .await?;

        self.audit
            .record(
                AuditAction::Edit,
                actor,
                &updated.lib_id,
                &updated.title,
                serde_json::to_value(&updated).ok(),
            )
            .await?;

        Ok(updated)
    }

    // =========================================================================
    // DELETE
    // =========================================================================

    /// Delete a book unconditionally, removing its attachments and
    /// appending one DLT entry naming its lib_id and title.
    pub async fn delete(&self, actor: &str, id: i32) -> AppResult<()> {
        let book = self.repository.books.get(id).await?;

        self.repository.books.delete(id).await?;

        // Attachment removal is best-effort once the record is gone
        for key in [&book.summary_file, &book.cover_file].into_iter().flatten() {
            if let Err(e) = self.storage.remove(key).await {
                tracing::warn!("Failed to remove attachment {}: {}", key, e);
            }
        }

        self.audit
            .record(AuditAction::Delete, actor, &book.lib_id, &book.title, None)
            .await?;

        Ok(())
    }

    // =========================================================================
    // QUERY
    // =========================================================================

    /// Resolve a catalog query. An exact lookup miss is a not-found
    /// outcome; a filter set matching zero books is an empty-result
    /// outcome. The two carry distinct error codes.
    pub async fn query(&self, query: &BookQuery, per_page: i64) -> AppResult<QueryOutcome> {
        if let Some(id) = query.id {
            let book = self.repository.books.get(id).await?;
            return Ok(QueryOutcome::Exact(book));
        }

        match (&query.type_code, query.number) {
            (Some(code), Some(number)) => {
                let lib_id = lib_id::compose(code, number);
                let book = self.repository.books.get_by_lib_id(&lib_id).await?;
                return Ok(QueryOutcome::Exact(book));
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(AppError::Validation(
                    "An exact lookup needs both the type code and the number.".to_string(),
                ));
            }
            (None, None) => {}
        }

        let mut filters = BookFilters::new();
        filters.push(FilterField::Type, query.type_name.as_deref());
        filters.push(FilterField::Location, query.location.as_deref());
        filters.push(FilterField::Title, query.title.as_deref());
        filters.push(FilterField::Content, query.content.as_deref());
        filters.push(FilterField::Language, query.language.as_deref());
        filters.push(FilterField::Author, query.author.as_deref());
        filters.push(FilterField::Publisher, query.publisher.as_deref());

        let page = query.page.unwrap_or(1).max(1);
        let (books, total) = self.repository.books.search(&filters, page, per_page).await?;

        if total == 0 {
            return Err(AppError::NoResults(
                "No books matched the given query.".to_string(),
            ));
        }

        Ok(QueryOutcome::Matches { books, total })
    }

    // =========================================================================
    // ATTACHMENTS
    // =========================================================================

    /// Attach a summary or cover to a book that has none yet
    pub async fn add_attachment(&self, id: i32, kind: AttachmentKind, upload: Upload) -> AppResult<Book> {
        let book = self.repository.books.get(id).await?;

        let existing = match kind {
            AttachmentKind::Summary => &book.summary_file,
            AttachmentKind::Cover => &book.cover_file,
        };
        if existing.is_some() {
            return Err(AppError::Conflict(format!(
                "Book already has a {} attachment",
                kind
            )));
        }

        let ext = upload.checked_extension(kind)?;
        self.store_attachment(id, kind, &upload, &ext).await?;

        self.repository.books.get(id).await
    }

    /// Remove an attachment from a book
    pub async fn remove_attachment(&self, id: i32, kind: AttachmentKind) -> AppResult<Book> {
        let book = self.repository.books.get(id).await?;

        let existing = match kind {
            AttachmentKind::Summary => book.summary_file.clone(),
            AttachmentKind::Cover => book.cover_file.clone(),
        };

        if let Some(key) = existing {
            self.storage.remove(&key).await?;
            match kind {
                AttachmentKind::Summary => {
                    self.repository.books.set_summary_file(id, None).await?
                }
                AttachmentKind::Cover => self.repository.books.set_cover_file(id, None).await?,
            }
        }

        self.repository.books.get(id).await
    }

    // =========================================================================
    // REFERENCE ENTITIES
    // =========================================================================

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository.refs.list_authors().await
    }

    pub async fn create_author(&self, data: CreateAuthor) -> AppResult<Author> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.refs.create_author(&data).await
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.refs.delete_author(id).await
    }

    pub async fn list_types(&self) -> AppResult<Vec<BookType>> {
        self.repository.refs.list_types().await
    }

    /// Create a type. The code becomes a lib_id prefix, so it must be
    /// purely alphabetic for identifiers to stay parseable.
    pub async fn create_type(&self, data: CreateBookType) -> AppResult<BookType> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let code = data.code.trim();
        if !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AppError::Validation(
                "Type code must contain only letters.".to_string(),
            ));
        }
        self.repository.refs.create_type(&data).await
    }

    pub async fn delete_type(&self, id: i32) -> AppResult<()> {
        self.repository.refs.delete_type(id).await
    }

    pub async fn list_locations(&self) -> AppResult<Vec<Location>> {
        self.repository.refs.list_locations().await
    }

    pub async fn create_location(&self, data: CreateLocation) -> AppResult<Location> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.refs.create_location(&data).await
    }

    pub async fn delete_location(&self, id: i32) -> AppResult<()> {
        self.repository.refs.delete_location(id).await
    }

    pub async fn list_languages(&self) -> AppResult<Vec<Language>> {
        self.repository.refs.list_languages().await
    }

    pub async fn create_language(&self, data: CreateLanguage) -> AppResult<Language> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.refs.create_language(&data).await
    }

    pub async fn delete_language(&self, id: i32) -> AppResult<()> {
        self.repository.refs.delete_language(id).await
    }

    // =========================================================================
    // HISTORY
    // =========================================================================

    /// Full audit history for one book's catalog identifier
    pub async fn history(&self, id: i32) -> AppResult<Vec<AuditEntry>> {
        let book = self.repository.books.get(id).await?;
        self.audit.history_for(&book.lib_id).await
    }
}

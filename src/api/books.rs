//! Book (catalog) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::Multipart;
use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{
        audit::AuditEntry,
        book::{Book, BookQuery, BookShort, CreateBook, ListQuery, UpdateBook},
    },
    services::{
        books::{QueryOutcome, Upload},
        storage::AttachmentKind,
    },
};

use super::AuthenticatedUser;

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// List of records
    pub books: Vec<T>,
    /// Total number of records
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Records per page
    pub per_page: i64,
}

/// Query result payload. An exact lookup fills `exact`; a filter query
/// fills `books`.
#[derive(Serialize, ToSchema)]
pub struct QueryResponse {
    pub exact: Option<Book>,
    pub books: Vec<BookShort>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// List books with pagination
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    params(ListQuery),
    responses(
        (status = 200, description = "List of books", body = PaginatedResponse<BookShort>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PaginatedResponse<BookShort>>> {
    claims.require_view_books()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = state.config.catalog.resolve_per_page(query.per_page);
    let desc = query.desc.unwrap_or(false);

    let (books, total) = state.services.books.list(page, per_page, desc).await?;

    Ok(Json(PaginatedResponse {
        books,
        total,
        page,
        per_page,
    }))
}

/// Run a catalog query: exact lookup by id or lib_id composite, or a
/// conjunctive filter set
#[utoipa::path(
    get,
    path = "/books/query",
    tag = "books",
    security(("bearer_auth" = [])),
    params(BookQuery),
    responses(
        (status = 200, description = "Query results", body = QueryResponse),
        (status = 404, description = "Exact lookup missed (NoSuchRecord) or no books matched (NoSuchData)")
    )
)]
pub async fn query_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<QueryResponse>> {
    claims.require_view_books()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = state.config.catalog.resolve_per_page(query.per_page);

    let outcome = state.services.books.query(&query, per_page).await?;

    let response = match outcome {
        QueryOutcome::Exact(book) => QueryResponse {
            exact: Some(book),
            books: Vec::new(),
            total: 1,
            page: 1,
            per_page,
        },
        QueryOutcome::Matches { books, total } => QueryResponse {
            exact: None,
            books,
            total,
            page,
            per_page,
        },
    };

    Ok(Json(response))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    claims.require_view_books()?;

    let book = state.services.books.get(id).await?;
    Ok(Json(book))
}

/// Register a new book (multipart form: text fields plus optional
/// `summary` PDF and `cover` image parts)
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "A book with that title already exists")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Book>)> {
    claims.require_add_books()?;

    let (data, summary, cover) = parse_book_form(multipart).await?;

    let created = state
        .services
        .books
        .create(&claims.sub, claims.user_id, data, summary, cover)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Edit a book. A submission identical to the stored record is a no-op.
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book (updated or unchanged)", body = Book),
        (status = 404, description = "Book not found"),
        (status = 409, description = "A book with that title already exists")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    claims.require_change_books()?;

    let book = state
        .services
        .books
        .edit(&claims.sub, claims.user_id, id, data)
        .await?;
    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_delete_books()?;

    state.services.books.delete(&claims.sub, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Attach a PDF summary to a book that has none
#[utoipa::path(
    post,
    path = "/books/{id}/summary",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book with attachment", body = Book),
        (status = 400, description = "File type for summary invalid"),
        (status = 409, description = "Book already has a summary")
    )
)]
pub async fn add_summary(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> AppResult<Json<Book>> {
    claims.require_change_books()?;

    let upload = parse_single_file(multipart).await?;
    let book = state
        .services
        .books
        .add_attachment(id, AttachmentKind::Summary, upload)
        .await?;
    Ok(Json(book))
}

/// Remove the PDF summary from a book
#[utoipa::path(
    delete,
    path = "/books/{id}/summary",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses((status = 200, description = "Book without attachment", body = Book))
)]
pub async fn remove_summary(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    claims.require_change_books()?;

    let book = state
        .services
        .books
        .remove_attachment(id, AttachmentKind::Summary)
        .await?;
    Ok(Json(book))
}

/// Attach a cover image to a book that has none
#[utoipa::path(
    post,
    path = "/books/{id}/cover",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book with attachment", body = Book),
        (status = 400, description = "File type for image cover invalid"),
        (status = 409, description = "Book already has a cover")
    )
)]
pub async fn add_cover(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> AppResult<Json<Book>> {
    claims.require_change_books()?;

    let upload = parse_single_file(multipart).await?;
    let book = state
        .services
        .books
        .add_attachment(id, AttachmentKind::Cover, upload)
        .await?;
    Ok(Json(book))
}

/// Remove the cover image from a book
#[utoipa::path(
    delete,
    path = "/books/{id}/cover",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses((status = 200, description = "Book without attachment", body = Book))
)]
pub async fn remove_cover(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    claims.require_change_books()?;

    let book = state
        .services
        .books
        .remove_attachment(id, AttachmentKind::Cover)
        .await?;
    Ok(Json(book))
}

/// Audit history for one book's catalog identifier
#[utoipa::path(
    get,
    path = "/books/{id}/history",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Audit entries, oldest first", body = Vec<AuditEntry>),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<AuditEntry>>> {
    claims.require_view_books()?;

    let entries = state.services.books.history(id).await?;
    Ok(Json(entries))
}

// =============================================================================
// Multipart parsing
// =============================================================================

#[derive(Default)]
struct BookForm {
    author_id: Option<i32>,
    title: Option<String>,
    subject: Option<String>,
    type_id: Option<i32>,
    section: Option<String>,
    location_id: Option<i32>,
    language_id: Option<i32>,
    publisher: Option<String>,
    publishing_date: Option<String>,
    purchase_date: Option<NaiveDate>,
    isbn: Option<String>,
    number_of_copies: Option<i32>,
}

fn parse_i32(name: &str, value: &str) -> AppResult<i32> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid value for {}", name)))
}

/// Empty form values mean "not given"
fn opt_text(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

async fn read_upload(field: axum_extra::extract::multipart::Field) -> AppResult<Option<Upload>> {
    let filename = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().unwrap_or_default().to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read uploaded file: {}", e)))?;
    if bytes.is_empty() && filename.is_empty() {
        // Empty file inputs are submitted as empty parts
        return Ok(None);
    }
    Ok(Some(Upload {
        filename,
        content_type,
        bytes: bytes.to_vec(),
    }))
}

/// Parse the new-book multipart form into its text fields and optional
/// attachments
async fn parse_book_form(
    mut multipart: Multipart,
) -> AppResult<(CreateBook, Option<Upload>, Option<Upload>)> {
    let mut form = BookForm::default();
    let mut summary = None;
    let mut cover = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "summary" => summary = read_upload(field).await?,
            "cover" => cover = read_upload(field).await?,
            _ => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Malformed field {}: {}", name, e)))?;
                match name.as_str() {
                    "author_id" => form.author_id = Some(parse_i32("author_id", &value)?),
                    "title" => form.title = opt_text(value),
                    "subject" => form.subject = opt_text(value),
                    "type_id" => form.type_id = Some(parse_i32("type_id", &value)?),
                    "section" => form.section = opt_text(value),
                    "location_id" => {
                        form.location_id = opt_text(value)
                            .map(|v| parse_i32("location_id", &v))
                            .transpose()?
                    }
                    "language_id" => {
                        form.language_id = opt_text(value)
                            .map(|v| parse_i32("language_id", &v))
                            .transpose()?
                    }
                    "publisher" => form.publisher = opt_text(value),
                    "publishing_date" => form.publishing_date = opt_text(value),
                    "purchase_date" => {
                        form.purchase_date = opt_text(value)
                            .map(|v| {
                                NaiveDate::parse_from_str(&v, "%Y-%m-%d").map_err(|_| {
                                    AppError::Validation("Invalid purchase_date".to_string())
                                })
                            })
                            .transpose()?
                    }
                    "isbn" => form.isbn = opt_text(value),
                    "number_of_copies" => {
                        form.number_of_copies = Some(parse_i32("number_of_copies", &value)?)
                    }
                    // Unknown fields are ignored
                    _ => {}
                }
            }
        }
    }

    let data = CreateBook {
        author_id: form
            .author_id
            .ok_or_else(|| AppError::Validation("author_id is required".to_string()))?,
        title: form
            .title
            .ok_or_else(|| AppError::Validation("title is required".to_string()))?,
        subject: form.subject,
        type_id: form
            .type_id
            .ok_or_else(|| AppError::Validation("type_id is required".to_string()))?,
        section: form.section,
        location_id: form.location_id,
        language_id: form.language_id,
        publisher: form.publisher,
        publishing_date: form.publishing_date,
        purchase_date: form.purchase_date,
        isbn: form.isbn,
        number_of_copies: form
            .number_of_copies
            .ok_or_else(|| AppError::Validation("number_of_copies is required".to_string()))?,
    };

    Ok((data, summary, cover))
}

/// Parse a multipart body carrying exactly one file part
async fn parse_single_file(mut multipart: Multipart) -> AppResult<Upload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {}", e)))?
    {
        if let Some(upload) = read_upload(field).await? {
            return Ok(upload);
        }
    }
    Err(AppError::Validation("No file found in request".to_string()))
}

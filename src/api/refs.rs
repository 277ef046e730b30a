//! Reference entity endpoints: authors, types, locations, languages

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::refs::{
        Author, BookType, CreateAuthor, CreateBookType, CreateLanguage, CreateLocation, Language,
        Location,
    },
};

use super::AuthenticatedUser;

// =============================================================================
// AUTHORS
// =============================================================================

/// List authors
#[utoipa::path(
    get,
    path = "/authors",
    tag = "refs",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "List of authors", body = Vec<Author>))
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Author>>> {
    claims.require_view_books()?;
    Ok(Json(state.services.books.list_authors().await?))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "refs",
    security(("bearer_auth" = [])),
    request_body = CreateAuthor,
    responses((status = 201, description = "Author created", body = Author))
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateAuthor>,
) -> AppResult<(StatusCode, Json<Author>)> {
    claims.require_staff()?;
    let author = state.services.books.create_author(data).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

/// Delete an author. Refused while any book references it.
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "refs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 409, description = "Author is referenced by books")
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;
    state.services.books.delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// TYPES
// =============================================================================

/// List book types
#[utoipa::path(
    get,
    path = "/types",
    tag = "refs",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "List of types", body = Vec<BookType>))
)]
pub async fn list_types(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BookType>>> {
    claims.require_view_books()?;
    Ok(Json(state.services.books.list_types().await?))
}

/// Create a book type. The code becomes the lib_id prefix.
#[utoipa::path(
    post,
    path = "/types",
    tag = "refs",
    security(("bearer_auth" = [])),
    request_body = CreateBookType,
    responses(
        (status = 201, description = "Type created", body = BookType),
        (status = 400, description = "Type code must be alphabetic")
    )
)]
pub async fn create_type(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateBookType>,
) -> AppResult<(StatusCode, Json<BookType>)> {
    claims.require_staff()?;
    let book_type = state.services.books.create_type(data).await?;
    Ok((StatusCode::CREATED, Json(book_type)))
}

/// Delete a book type. Refused while any book references it.
#[utoipa::path(
    delete,
    path = "/types/{id}",
    tag = "refs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Type ID")),
    responses(
        (status = 204, description = "Type deleted"),
        (status = 409, description = "Type is referenced by books")
    )
)]
pub async fn delete_type(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;
    state.services.books.delete_type(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// LOCATIONS
// =============================================================================

/// List locations, ordered by code
#[utoipa::path(
    get,
    path = "/locations",
    tag = "refs",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "List of locations", body = Vec<Location>))
)]
pub async fn list_locations(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Location>>> {
    claims.require_view_books()?;
    Ok(Json(state.services.books.list_locations().await?))
}

/// Create a location
#[utoipa::path(
    post,
    path = "/locations",
    tag = "refs",
    security(("bearer_auth" = [])),
    request_body = CreateLocation,
    responses((status = 201, description = "Location created", body = Location))
)]
pub async fn create_location(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateLocation>,
) -> AppResult<(StatusCode, Json<Location>)> {
    claims.require_staff()?;
    let location = state.services.books.create_location(data).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

/// Delete a location. Refused while any book references it.
#[utoipa::path(
    delete,
    path = "/locations/{id}",
    tag = "refs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Location ID")),
    responses(
        (status = 204, description = "Location deleted"),
        (status = 409, description = "Location is referenced by books")
    )
)]
pub async fn delete_location(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;
    state.services.books.delete_location(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// LANGUAGES
// =============================================================================

/// List languages
#[utoipa::path(
    get,
    path = "/languages",
    tag = "refs",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "List of languages", body = Vec<Language>))
)]
pub async fn list_languages(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Language>>> {
    claims.require_view_books()?;
    Ok(Json(state.services.books.list_languages().await?))
}

/// Create a language
#[utoipa::path(
    post,
    path = "/languages",
    tag = "refs",
    security(("bearer_auth" = [])),
    request_body = CreateLanguage,
    responses((status = 201, description = "Language created", body = Language))
)]
pub async fn create_language(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateLanguage>,
) -> AppResult<(StatusCode, Json<Language>)> {
    claims.require_staff()?;
    let language = state.services.books.create_language(data).await?;
    Ok((StatusCode::CREATED, Json(language)))
}

/// Delete a language; dependent books get the reference nulled
#[utoipa::path(
    delete,
    path = "/languages/{id}",
    tag = "refs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Language ID")),
    responses((status = 204, description = "Language deleted"))
)]
pub async fn delete_language(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;
    state.services.books.delete_language(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

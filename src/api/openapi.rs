//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, dashboard, health, refs, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Artax API",
        version = "1.0.0",
        description = "Library Catalog Management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Artax Network", email = "email.the.artax.network@gmail.com")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        auth::confirm_email,
        auth::update_profile,
        auth::change_password,
        // Books
        books::list_books,
        books::query_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::add_summary,
        books::remove_summary,
        books::add_cover,
        books::remove_cover,
        books::book_history,
        // Reference entities
        refs::list_authors,
        refs::create_author,
        refs::delete_author,
        refs::list_types,
        refs::create_type,
        refs::delete_type,
        refs::list_locations,
        refs::create_location,
        refs::delete_location,
        refs::list_languages,
        refs::create_language,
        refs::delete_language,
        // Users
        users::create_user,
        // Dashboard
        dashboard::dashboard,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::ConfirmResponse,
            // Books
            crate::models::book::Book,
            crate::models::book::BookShort,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            books::QueryResponse,
            // Reference entities
            crate::models::refs::Author,
            crate::models::refs::BookType,
            crate::models::refs::Location,
            crate::models::refs::Language,
            crate::models::refs::CreateAuthor,
            crate::models::refs::CreateBookType,
            crate::models::refs::CreateLocation,
            crate::models::refs::CreateLanguage,
            // Users
            crate::models::user::User,
            crate::models::user::CreateUser,
            crate::models::user::UpdateProfile,
            crate::models::user::ChangePassword,
            crate::models::user::Role,
            // Audit
            crate::models::audit::AuditAction,
            crate::models::audit::AuditEntry,
            crate::models::audit::ActivityEntry,
            // Dashboard
            dashboard::DashboardResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication and profile endpoints"),
        (name = "books", description = "Catalog book management"),
        (name = "refs", description = "Reference entities (authors, types, locations, languages)"),
        (name = "users", description = "User registration"),
        (name = "dashboard", description = "Dashboard data")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

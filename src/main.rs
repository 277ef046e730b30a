//! Artax Server - Library Catalog Management System
//!
//! A Rust REST API server for library catalog management.

use axum::{
    routing::{get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use artax_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("artax_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Artax Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(
        repository,
        config.auth.clone(),
        config.email.clone(),
        config.storage.clone(),
        &config.server,
    );

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        .route("/auth/confirm/:token", get(api::auth::confirm_email))
        .route("/auth/profile", put(api::auth::update_profile))
        .route("/auth/change-password", post(api::auth::change_password))
        // Books (catalog)
        .route("/books", get(api::books::list_books).post(api::books::create_book))
        .route("/books/query", get(api::books::query_books))
        .route(
            "/books/:id",
            get(api::books::get_book)
                .put(api::books::update_book)
                .delete(api::books::delete_book),
        )
        .route(
            "/books/:id/summary",
            post(api::books::add_summary).delete(api::books::remove_summary),
        )
        .route(
            "/books/:id/cover",
            post(api::books::add_cover).delete(api::books::remove_cover),
        )
        .route("/books/:id/history", get(api::books::book_history))
        // Reference entities
        .route("/authors", get(api::refs::list_authors).post(api::refs::create_author))
        .route("/authors/:id", axum::routing::delete(api::refs::delete_author))
        .route("/types", get(api::refs::list_types).post(api::refs::create_type))
        .route("/types/:id", axum::routing::delete(api::refs::delete_type))
        .route("/locations", get(api::refs::list_locations).post(api::refs::create_location))
        .route("/locations/:id", axum::routing::delete(api::refs::delete_location))
        .route("/languages", get(api::refs::list_languages).post(api::refs::create_language))
        .route("/languages/:id", axum::routing::delete(api::refs::delete_language))
        // Users
        .route("/users", post(api::users::create_user))
        // Dashboard
        .route("/dashboard", get(api::dashboard::dashboard))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

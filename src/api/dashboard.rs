//! Dashboard endpoint: the latest registered books and the recent
//! catalog activity feed

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{audit::ActivityEntry, book::BookShort},
};

use super::AuthenticatedUser;

#[derive(Serialize, ToSchema)]
pub struct DashboardResponse {
    /// Most recently registered books
    pub latest_books: Vec<BookShort>,
    /// Last audit events (ADD/EDT/DLT only), most recent first
    pub activity: Vec<ActivityEntry>,
}

/// Dashboard data
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard data", body = DashboardResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn dashboard(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<DashboardResponse>> {
    claims.require_view_books()?;

    let latest_books = state.services.books.latest().await?;
    let activity = state.services.audit.recent_activity().await?;

    Ok(Json(DashboardResponse {
        latest_books,
        activity,
    }))
}

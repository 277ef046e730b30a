//! User management endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::user::{CreateUser, User},
};

use super::AuthenticatedUser;

/// Register a new user (staff only). The account stays inactive until
/// the emailed confirmation link is followed.
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created, confirmation mail sent", body = User),
        (status = 403, description = "Staff privileges required"),
        (status = 409, description = "Username or email already in use"),
        (status = 502, description = "Confirmation email could not be delivered; account kept inactive")
    )
)]
pub async fn create_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    claims.require_staff()?;

    let user = state.services.users.register(data).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

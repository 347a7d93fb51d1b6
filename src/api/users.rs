//! Own profile endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::user::{UpdateProfile, UserProfile},
};

use super::AuthenticatedUser;

/// Get the caller's profile, creating it on first sign-in
#[utoipa::path(
    get,
    path = "/me",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserProfile),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<UserProfile>> {
    let profile = state.services.users.ensure_profile(&claims).await?;
    Ok(Json(profile))
}

/// Update the caller's own profile
#[utoipa::path(
    put,
    path = "/me",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = UserProfile),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn update_my_profile(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(update): Json<UpdateProfile>,
) -> AppResult<Json<UserProfile>> {
    let profile = state.services.users.update_profile(&claims, update).await?;
    Ok(Json(profile))
}

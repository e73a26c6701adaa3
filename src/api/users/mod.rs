//! Profile endpoints for the authenticated user

use axum::{extract::State, routing::get, Router};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, ValidatedJson};
use crate::domain::user::{SocialLinks, User};
use crate::infrastructure::user::UpdateProfileRequest;

/// Create the users router
pub fn create_users_router() -> Router<AppState> {
    Router::new().route(
        "/profile",
        get(get_profile)
            .patch(update_profile)
            .delete(delete_profile),
    )
}

/// Partial profile update; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileBody {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 3, max = 30, message = "must be 3-30 characters"))]
    pub username: Option<String>,
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub bio: Option<String>,
    #[validate(length(max = 50, message = "must list at most 50 skills"))]
    pub skills: Option<Vec<String>>,
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    pub location: Option<String>,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub website: Option<String>,
    pub social_links: Option<SocialLinks>,
    #[validate(length(max = 2048, message = "must be at most 2048 characters"))]
    pub profile_image: Option<String>,
}

impl From<UpdateProfileBody> for UpdateProfileRequest {
    fn from(body: UpdateProfileBody) -> Self {
        Self {
            name: body.name,
            username: body.username,
            bio: body.bio,
            skills: body.skills,
            location: body.location,
            website: body.website,
            social_links: body.social_links,
            profile_image: body.profile_image,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: User,
}

/// GET /users/profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth: RequireUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = state
        .user_service
        .get(&auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(ProfileResponse {
        success: true,
        user: user.sanitized(),
    }))
}

/// PATCH /users/profile
pub async fn update_profile(
    State(state): State<AppState>,
    auth: RequireUser,
    ValidatedJson(body): ValidatedJson<UpdateProfileBody>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = state
        .user_service
        .update_profile(&auth.user_id, body.into())
        .await?;

    Ok(Json(ProfileResponse {
        success: true,
        user,
    }))
}

#[derive(Debug, Serialize)]
pub struct DeleteAccountResponse {
    pub success: bool,
    pub message: String,
}

/// DELETE /users/profile
///
/// Removes the account and signs it out everywhere. Access tokens already
/// issued stay valid until they expire.
pub async fn delete_profile(
    State(state): State<AppState>,
    auth: RequireUser,
) -> Result<Json<DeleteAccountResponse>, ApiError> {
    state.auth_service.delete_account(&auth.user_id).await?;

    Ok(Json(DeleteAccountResponse {
        success: true,
        message: "Account deleted successfully".to_string(),
    }))
}

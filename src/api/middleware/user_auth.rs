//! Bearer token authentication for user routes

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::UserId;

/// Extractor that requires a valid access token
///
/// Reads `Authorization: Bearer <token>` and verifies it with the token codec
/// only; the user record is not loaded.
#[derive(Debug, Clone)]
pub struct RequireUser {
    pub user_id: UserId,
    pub username: String,
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;

        let payload = state.auth_service.verify_bearer(&token).map_err(|e| {
            debug!(error = %e, "Bearer token rejected");
            ApiError::from(e)
        })?;

        Ok(RequireUser {
            user_id: payload.user_id,
            username: payload.username,
        })
    }
}

/// Extract the bearer token from the Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let missing = || {
        ApiError::unauthorized(
            "Authentication required. Provide a token via 'Authorization: Bearer <token>' header",
        )
    };

    let auth_str = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(missing)?
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header encoding"))?;

    match auth_str.strip_prefix("Bearer ").map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(missing()),
    }
}

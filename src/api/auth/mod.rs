//! Authentication API endpoints
//!
//! Signup, signin, refresh-token rotation and logout.

use axum::{extract::State, http::StatusCode, routing::post, Router};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, ValidatedJson};
use crate::domain::auth::TokenPair;
use crate::domain::user::User;
use crate::infrastructure::user::CreateUserRequest;

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/refresh-token", post(refresh_token))
        .route("/logout", post(logout))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignupBody {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    #[validate(length(min = 3, max = 30, message = "must be 3-30 characters"))]
    pub username: String,
    #[validate(length(min = 6, max = 128, message = "must be 6-128 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SigninBody {
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenBody {
    #[validate(length(min = 1, message = "is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub success: bool,
    pub message: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct SigninResponse {
    pub success: bool,
    pub message: String,
    pub user: User,
    pub tokens: TokenPair,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub tokens: TokenPair,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

/// POST /auth/signup
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<SignupBody>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let user = state
        .auth_service
        .signup(CreateUserRequest {
            name: body.name,
            email: body.email,
            username: body.username,
            password: body.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            success: true,
            message: "User created successfully.".to_string(),
            user,
        }),
    ))
}

/// POST /auth/signin
pub async fn signin(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<SigninBody>,
) -> Result<Json<SigninResponse>, ApiError> {
    let result = state
        .auth_service
        .signin(&body.email, &body.password)
        .await?;

    Ok(Json(SigninResponse {
        success: true,
        message: "Login successful.".to_string(),
        user: result.user,
        tokens: result.tokens,
    }))
}

/// POST /auth/refresh-token
pub async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RefreshTokenBody>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let tokens = state
        .auth_service
        .refresh(&body.refresh_token)
        .await
        .map_err(ApiError::from_refresh)?;

    Ok(Json(RefreshResponse {
        success: true,
        tokens,
    }))
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RefreshTokenBody>,
) -> Result<Json<LogoutResponse>, ApiError> {
    state.auth_service.logout(&body.refresh_token).await?;

    Ok(Json(LogoutResponse {
        success: true,
        message: "Logout successful".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::test_support::{send, test_router};

    async fn signup_alice(app: &axum::Router) {
        let (status, _) = send(
            app,
            "POST",
            "/auth/signup",
            None,
            Some(json!({
                "name": "Alice",
                "email": "a@x.com",
                "username": "alice",
                "password": "secret123"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    async fn signin_alice(app: &axum::Router) -> serde_json::Value {
        let (status, body) = send(
            app,
            "POST",
            "/auth/signin",
            None,
            Some(json!({ "email": "a@x.com", "password": "secret123" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    #[tokio::test]
    async fn test_signup_returns_created_user_without_hash() {
        let app = test_router().await;

        let (status, body) = send(
            &app,
            "POST",
            "/auth/signup",
            None,
            Some(json!({
                "name": "Alice",
                "email": "A@X.com",
                "username": "alice",
                "password": "secret123"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["user"]["email"], "a@x.com");
        assert_eq!(body["user"]["username"], "alice");
        assert!(body["user"].get("passwordHash").is_none());
        assert!(body["user"].get("password").is_none());
    }

    #[tokio::test]
    async fn test_signup_duplicate_email_is_conflict() {
        let app = test_router().await;
        signup_alice(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            "/auth/signup",
            None,
            Some(json!({
                "name": "Other",
                "email": "a@x.com",
                "username": "other",
                "password": "secret123"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["type"], "conflict_error");
    }

    #[tokio::test]
    async fn test_signup_schema_violation_is_bad_request() {
        let app = test_router().await;

        let (status, body) = send(
            &app,
            "POST",
            "/auth/signup",
            None,
            Some(json!({
                "name": "Alice",
                "email": "not-an-email",
                "username": "al",
                "password": "123"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn test_signup_missing_field_is_bad_request() {
        let app = test_router().await;

        let (status, _) = send(
            &app,
            "POST",
            "/auth/signup",
            None,
            Some(json!({ "email": "a@x.com" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_signin_returns_tokens() {
        let app = test_router().await;
        signup_alice(&app).await;

        let body = signin_alice(&app).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["user"]["username"], "alice");
        assert!(body["user"].get("passwordHash").is_none());
        assert!(body["tokens"]["accessToken"].is_string());
        assert!(body["tokens"]["refreshToken"].is_string());
    }

    #[tokio::test]
    async fn test_signin_wrong_password_and_unknown_email_look_the_same() {
        let app = test_router().await;
        signup_alice(&app).await;

        let (wrong_status, wrong_body) = send(
            &app,
            "POST",
            "/auth/signin",
            None,
            Some(json!({ "email": "a@x.com", "password": "wrong-password" })),
        )
        .await;
        let (unknown_status, unknown_body) = send(
            &app,
            "POST",
            "/auth/signin",
            None,
            Some(json!({ "email": "nobody@x.com", "password": "secret123" })),
        )
        .await;

        assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_body, unknown_body);
        assert_eq!(wrong_body["error"]["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_refresh_rotates_and_old_token_fails() {
        let app = test_router().await;
        signup_alice(&app).await;
        let signin = signin_alice(&app).await;
        let old = signin["tokens"]["refreshToken"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            "POST",
            "/auth/refresh-token",
            None,
            Some(json!({ "refreshToken": old })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_ne!(body["tokens"]["refreshToken"], old.as_str());

        let (status, body) = send(
            &app,
            "POST",
            "/auth/refresh-token",
            None,
            Some(json!({ "refreshToken": old })),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "Invalid refresh token");
    }

    #[tokio::test]
    async fn test_refresh_requires_token() {
        let app = test_router().await;

        let (status, _) = send(
            &app,
            "POST",
            "/auth/refresh-token",
            None,
            Some(json!({ "refreshToken": "" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_logout_then_refresh_fails() {
        let app = test_router().await;
        signup_alice(&app).await;
        let signin = signin_alice(&app).await;
        let token = signin["tokens"]["refreshToken"].clone();

        let (status, body) = send(
            &app,
            "POST",
            "/auth/logout",
            None,
            Some(json!({ "refreshToken": token })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        // Second logout is still a success
        let (status, _) = send(
            &app,
            "POST",
            "/auth/logout",
            None,
            Some(json!({ "refreshToken": token })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            "POST",
            "/auth/refresh-token",
            None,
            Some(json!({ "refreshToken": token })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

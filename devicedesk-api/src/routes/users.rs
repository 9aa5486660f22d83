/// User endpoints
///
/// Registration, listing, and a single stateless login check. There is no
/// session or token layer: a successful login just confirms the credentials
/// and returns the user's identity.
///
/// # Endpoints
///
/// - `POST /register` - register a new user
/// - `GET /users` - list users (digests are never serialized)
/// - `POST /login` - check credentials
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use devicedesk_shared::models::user::{CreateUser, User};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
///
/// Missing fields deserialize to empty strings so presence validation
/// produces a uniform 400 before any hashing or store access.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,

    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// ID assigned by the store
    pub id: i64,
}

/// Login request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Authenticated user's ID
    pub user_id: i64,

    /// Authenticated user's name
    pub username: String,
}

/// Registers a new user
///
/// The password is hashed through the credential hasher before the row is
/// inserted; the plaintext never reaches the store.
///
/// # Errors
///
/// - `400 Bad Request`: missing username, password, or email
/// - `409 Conflict`: username already exists
/// - `500 Internal Server Error`: hashing or store failure
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    req.validate()?;

    let password_digest = state.hasher.hash(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            password_digest,
            email: req.email,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User registered");
    Ok((StatusCode::CREATED, Json(RegisterResponse { id: user.id })))
}

/// Lists all users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    let users = User::list(&state.db).await?;
    Ok(Json(users))
}

/// Checks a user's credentials
///
/// # Errors
///
/// - `400 Bad Request`: missing username or password
/// - `404 Not Found`: no such username
/// - `401 Unauthorized`: digest mismatch; the body does not say which
///   credential was wrong
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let valid = state.hasher.verify(&req.password, &user.password_digest)?;
    if !valid {
        return Err(ApiError::Unauthorized("Login failed".to_string()));
    }

    Ok(Json(LoginResponse {
        user_id: user.id,
        username: user.username,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_missing_fields_fail_validation() {
        let req: RegisterRequest = serde_json::from_str("{}").unwrap();
        let err = req.validate().unwrap_err();
        assert_eq!(err.field_errors().len(), 3);

        let req: RegisterRequest = serde_json::from_str(
            r#"{"username": "jorge", "password": "pw", "email": "j@example.com"}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_login_request_empty_password_fails_validation() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"username": "jorge", "password": ""}"#).unwrap();
        assert!(req.validate().is_err());
    }
}

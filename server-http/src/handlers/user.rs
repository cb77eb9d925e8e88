use crate::api::{
    ApiError, LoginRequest, MessageResponse, SessionResponse, UserDetailResponse, UsersResponse,
    json_body,
};
use crate::middleware::{ensure_self_or_admin, extract_bearer_token};
use crate::state::AppState;
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use bazaar::auth::{SignupRequest, User};
use tracing::info;

/// POST /user/new
///
/// Register a user and log them straight in.
pub async fn signup(
    State(state): State<AppState>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let user = state.user_service.signup(json_body(body)?).await?;
    let message = format!("Welcome, {}", user.name);
    let response = start_session(&state, user, message).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /user/login
///
/// Accepts either:
/// 1. JSON body: {"email": "...", "password": "..."}
/// 2. Basic Auth header: Authorization: Basic base64(email:password)
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, ApiError> {
    let (email, password) = match body {
        Ok(Json(login)) => (login.email, login.password),
        Err(_) => headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(extract_basic_auth)
            .ok_or_else(|| {
                ApiError::bad_request(
                    "Missing credentials. Provide either JSON body or Basic Auth header",
                )
            })?,
    };

    let user = state.auth_service.authenticate(&email, &password).await?;
    info!("LOGIN: user {}", user.id);

    let message = format!("Welcome back, {}", user.name);
    Ok(Json(start_session(&state, user, message).await?))
}

/// POST /user/logout
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
        .ok_or_else(|| ApiError::unauthorized("Please login first"))?;

    if state.session_store.invalidate_session(&token).await? {
        Ok(Json(MessageResponse::new("Logged out successfully")))
    } else {
        Err(ApiError::new(
            StatusCode::NOT_FOUND,
            "Session not found or already expired",
        ))
    }
}

/// GET /user/all
pub async fn list_users(State(state): State<AppState>) -> Result<Json<UsersResponse>, ApiError> {
    let users = state.user_service.list_users().await?;

    Ok(Json(UsersResponse {
        success: true,
        users: users.into_iter().map(Into::into).collect(),
    }))
}

/// GET /user/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<UserDetailResponse>, ApiError> {
    ensure_self_or_admin(&current_user, &id)?;
    let user = state.user_service.get_user(&id).await?;

    Ok(Json(UserDetailResponse {
        success: true,
        user: user.into(),
    }))
}

/// DELETE /user/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = state.user_service.delete_user(&current_user.id, &id).await?;

    Ok(Json(MessageResponse::new(format!(
        "User {} deleted successfully",
        user.email
    ))))
}

async fn start_session(
    state: &AppState,
    user: User,
    message: String,
) -> Result<SessionResponse, ApiError> {
    let session = state.session_store.create_session(user).await?;

    Ok(SessionResponse {
        success: true,
        message,
        token: session.token,
        expires_in: state.session_store.ttl().as_secs(),
        user: session.user.into(),
    })
}

/// Extract Basic Auth credentials from Authorization header
fn extract_basic_auth(auth_header: &str) -> Option<(String, String)> {
    // Authorization: Basic <base64>
    let parts: Vec<&str> = auth_header.split_whitespace().collect();

    if parts.len() != 2 || parts[0] != "Basic" {
        return None;
    }

    let decoded = STANDARD.decode(parts[1]).ok()?;
    let decoded_str = String::from_utf8(decoded).ok()?;

    // Split email:password
    let (email, password) = decoded_str.split_once(':')?;
    Some((email.to_string(), password.to_string()))
}

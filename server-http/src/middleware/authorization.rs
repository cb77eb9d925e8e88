use crate::api::ApiError;
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use bazaar::auth::User;

/// Only admins get past this layer. Must run after `auth_middleware`.
pub async fn admin_only(request: Request, next: Next) -> Result<Response, Response> {
    let user = extract_user_from_request(&request)?;

    if !user.is_admin() {
        return Err(ApiError::forbidden("Only admins can access this resource").into_response());
    }

    Ok(next.run(request).await)
}

/// Extract the User from the Request object
fn extract_user_from_request(request: &Request) -> Result<&User, Response> {
    request
        .extensions()
        .get::<User>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required").into_response())
}

/// Handler-side check for routes open to the owner of a resource or an admin
pub fn ensure_self_or_admin(user: &User, owner_id: &str) -> Result<(), ApiError> {
    if user.is_admin() || user.id == owner_id {
        Ok(())
    } else {
        Err(ApiError::forbidden(
            "You are not allowed to access this resource",
        ))
    }
}

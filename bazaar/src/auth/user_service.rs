use super::error::AuthError;
use super::models::{User, UserRole};
use super::password::hash_password;
use super::repository::UserRepository;
use super::session_store::SessionStore;
use crate::cache::{ChangeDescriptor, InvalidationPolicy};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Registration form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Option<String>,
}

impl SignupRequest {
    fn check_required(&self) -> Result<(), AuthError> {
        if self.name.trim().is_empty() {
            return Err(AuthError::MissingField("name"));
        }
        if self.email.trim().is_empty() {
            return Err(AuthError::MissingField("email"));
        }
        if self.password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }
        if self.confirm_password.is_empty() {
            return Err(AuthError::MissingField("confirm_password"));
        }
        Ok(())
    }
}

/// User management. User counts feed the dashboard, so every
/// membership change evicts the admin aggregates.
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    sessions: SessionStore,
    invalidation: InvalidationPolicy,
}

impl UserService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        sessions: SessionStore,
        invalidation: InvalidationPolicy,
    ) -> Self {
        Self {
            user_repo,
            sessions,
            invalidation,
        }
    }

    pub async fn signup(&self, request: SignupRequest) -> Result<User, AuthError> {
        request.check_required()?;

        if request.password != request.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        if self.user_repo.email_exists(&request.email).await? {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(&request.password)?;
        let user = User::new(
            request.name.trim().to_string(),
            request.email,
            password_hash,
            UserRole::parse(request.role.as_deref()),
        );

        let user = self.user_repo.create(user).await?;
        self.invalidation.invalidate(&ChangeDescriptor::admin())?;

        info!("SIGNUP: user {} ({:?})", user.id, user.role);
        Ok(user)
    }

    pub async fn get_user(&self, id: &str) -> Result<User, AuthError> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        let mut users = self.user_repo.list_all().await?;
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }

    /// Delete a user and end all of their sessions
    pub async fn delete_user(&self, current_user_id: &str, id: &str) -> Result<User, AuthError> {
        if current_user_id == id {
            return Err(AuthError::CannotDeleteSelf);
        }

        let user = self.user_repo.delete(id).await?;
        let ended = self.sessions.invalidate_user_sessions(&user.id).await?;
        self.invalidation.invalidate(&ChangeDescriptor::admin())?;

        info!("DELETE_USER: user {} removed, {} sessions ended", user.id, ended);
        Ok(user)
    }
}

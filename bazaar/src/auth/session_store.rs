use super::models::User;
use super::session::{Session, SessionToken};
use async_trait::async_trait;
use shared::Result;
use std::sync::Arc;
use std::time::Duration;

/// Storage for live sessions
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create_session(&self, user: User, ttl: Duration) -> Result<Session>;

    /// Resolve a token to its user; unknown or expired tokens are `NotFound`
    async fn get_session(&self, token: &SessionToken) -> Result<User>;

    async fn delete_session(&self, token: &SessionToken) -> Result<bool>;

    async fn get_user_sessions(&self, user_id: &str) -> Result<Vec<Session>>;

    /// Drop every session of a user, returning how many were live
    async fn delete_user_sessions(&self, user_id: &str) -> Result<usize>;
}

/// Session service used by login, logout and the auth middleware
#[derive(Clone)]
pub struct SessionStore {
    repository: Arc<dyn SessionRepository>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(repository: Arc<dyn SessionRepository>, ttl: Duration) -> Self {
        Self { repository, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn create_session(&self, user: User) -> Result<Session> {
        self.repository.create_session(user, self.ttl).await
    }

    pub async fn validate_session(&self, token: &SessionToken) -> Result<User> {
        self.repository.get_session(token).await
    }

    pub async fn invalidate_session(&self, token: &SessionToken) -> Result<bool> {
        self.repository.delete_session(token).await
    }

    pub async fn user_sessions(&self, user_id: &str) -> Result<Vec<Session>> {
        self.repository.get_user_sessions(user_id).await
    }

    pub async fn invalidate_user_sessions(&self, user_id: &str) -> Result<usize> {
        self.repository.delete_user_sessions(user_id).await
    }
}

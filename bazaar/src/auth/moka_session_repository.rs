use super::models::User;
use super::session::{Session, SessionToken, generate_session_token};
use super::session_store::SessionRepository;
use async_trait::async_trait;
use moka::future::Cache;
use parking_lot::RwLock;
use shared::{Error, Result};
use std::sync::Arc;
use std::time::Duration;

type UserId = String;

/// In-memory session repository indexed by token and by user
pub struct MokaSessionRepository {
    // token -> session
    sessions: Cache<SessionToken, Session>,
    // user id -> tokens issued to that user
    user_sessions: Cache<UserId, Arc<RwLock<Vec<SessionToken>>>>,
}

impl MokaSessionRepository {
    pub fn new(max_sessions: Option<u64>, ttl: Option<Duration>) -> Self {
        let mut sessions_builder = Cache::builder();
        let mut user_sessions_builder = Cache::builder();

        if let Some(capacity) = max_sessions {
            sessions_builder = sessions_builder.max_capacity(capacity);
            user_sessions_builder = user_sessions_builder.max_capacity(capacity);
        }

        if let Some(ttl) = ttl {
            sessions_builder = sessions_builder.time_to_live(ttl);
            user_sessions_builder = user_sessions_builder.time_to_live(ttl);
        }

        Self {
            sessions: sessions_builder.build(),
            user_sessions: user_sessions_builder.build(),
        }
    }

    /// Unbounded, one hour TTL
    pub fn with_defaults() -> Self {
        Self::new(None, Some(Duration::from_secs(3600)))
    }

    async fn tokens_of(&self, user_id: &str) -> Vec<SessionToken> {
        let Some(tokens) = self.user_sessions.get(user_id).await else {
            return Vec::new();
        };
        let list = tokens.read().clone();
        list
    }
}

#[async_trait]
impl SessionRepository for MokaSessionRepository {
    async fn create_session(&self, user: User, ttl: Duration) -> Result<Session> {
        let token = generate_session_token();
        let user_id = user.id.clone();
        let session = Session::new(token.clone(), user, ttl);

        self.sessions.insert(token.clone(), session.clone()).await;

        let tokens = self
            .user_sessions
            .get_with(user_id, async { Arc::new(RwLock::new(Vec::new())) })
            .await;
        tokens.write().push(token);

        Ok(session)
    }

    async fn get_session(&self, token: &SessionToken) -> Result<User> {
        let mut session = self
            .sessions
            .get(token)
            .await
            .ok_or_else(|| Error::not_found("session"))?;

        if session.is_expired() {
            self.sessions.invalidate(token).await;
            return Err(Error::not_found("session"));
        }

        session.touch();
        let user = session.user.clone();
        self.sessions.insert(token.clone(), session).await;

        Ok(user)
    }

    async fn delete_session(&self, token: &SessionToken) -> Result<bool> {
        let session = self.sessions.remove(token).await;

        if let Some(data) = &session {
            if let Some(tokens) = self.user_sessions.get(&data.user.id).await {
                tokens.write().retain(|t| t != token);
            }
        }

        Ok(session.is_some())
    }

    async fn get_user_sessions(&self, user_id: &str) -> Result<Vec<Session>> {
        let mut sessions = Vec::new();

        for token in self.tokens_of(user_id).await {
            if let Some(session) = self.sessions.get(&token).await {
                if !session.is_expired() {
                    sessions.push(session);
                }
            }
        }

        Ok(sessions)
    }

    async fn delete_user_sessions(&self, user_id: &str) -> Result<usize> {
        let mut count = 0;

        for token in self.tokens_of(user_id).await {
            if self.sessions.remove(&token).await.is_some() {
                count += 1;
            }
        }
        self.user_sessions.invalidate(user_id).await;

        Ok(count)
    }
}

use super::models::User;
use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use std::time::Duration;

/// Opaque bearer token handed to clients at login
pub type SessionToken = String;

/// A logged-in user plus bookkeeping timestamps
#[derive(Debug, Clone)]
pub struct Session {
    pub token: SessionToken,
    pub user: User,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
}

impl Session {
    pub fn new(token: SessionToken, user: User, ttl: Duration) -> Self {
        let now = Utc::now();
        let ttl = TimeDelta::milliseconds(ttl.as_millis().min(i64::MAX as u128) as i64);

        Self {
            token,
            user,
            created_at: now,
            expires_at: now + ttl,
            last_accessed: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    pub fn touch(&mut self) {
        self.last_accessed = Utc::now();
    }

    /// Remaining lifetime, zero once expired
    pub fn remaining(&self) -> Duration {
        (self.expires_at - Utc::now()).to_std().unwrap_or(Duration::ZERO)
    }
}

/// 32 random bytes, hex encoded (64 characters)
pub fn generate_session_token() -> SessionToken {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

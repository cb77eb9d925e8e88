use super::error::AuthError;
use super::models::User;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user; fails with `UserAlreadyExists` if the email is taken
    async fn create(&self, user: User) -> Result<User, AuthError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AuthError>;

    async fn list_all(&self) -> Result<Vec<User>, AuthError>;

    /// Delete a user by ID, returning the removed record
    async fn delete(&self, id: &str) -> Result<User, AuthError>;

    async fn email_exists(&self, email: &str) -> Result<bool, AuthError>;
}

use super::error::AuthError;
use super::models::User;
use super::password::verify_password;
use super::repository::UserRepository;
use std::sync::Arc;

pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
}

impl AuthService {
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }

    /// Authenticate a user by email and password
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        match verify_password(password, &user.password_hash) {
            Ok(true) => Ok(user),
            Ok(false) | Err(AuthError::PasswordHashError(_)) => Err(AuthError::InvalidCredentials),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::UserRole;
    use crate::auth::password::hash_password;
    use crate::auth::sled_repository::SledUserRepository;
    use tempfile::TempDir;

    async fn service_with_user(email: &str, password: &str) -> (TempDir, AuthService) {
        let temp_dir = TempDir::new().unwrap();
        let db = sled::open(temp_dir.path().join("auth.sled")).unwrap();
        let repo = Arc::new(SledUserRepository::new(db));

        let user = User::new(
            "Meera".to_string(),
            email.to_string(),
            hash_password(password).unwrap(),
            UserRole::User,
        );
        repo.create(user).await.unwrap();

        (temp_dir, AuthService::new(repo))
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let (_dir, service) = service_with_user("meera@example.com", "password123").await;

        let user = service
            .authenticate("Meera@Example.com", "password123")
            .await
            .unwrap();
        assert_eq!(user.email, "meera@example.com");
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let (_dir, service) = service_with_user("meera@example.com", "password123").await;

        let result = service.authenticate("meera@example.com", "password124").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_email() {
        let (_dir, service) = service_with_user("meera@example.com", "password123").await;

        let result = service.authenticate("nobody@example.com", "password123").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));

        let result = service.authenticate("", "").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }
}

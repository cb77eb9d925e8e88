use super::error::AuthError;
use super::models::{User, UserRole};
use super::password::hash_password;
use super::repository::UserRepository;
use tracing::info;

/// Build the default admin account
pub fn create_default_admin(name: &str, email: &str, password: &str) -> Result<User, AuthError> {
    let password_hash = hash_password(password)?;
    Ok(User::new(
        name.to_string(),
        email.to_string(),
        password_hash,
        UserRole::Admin,
    ))
}

/// Create the default admin unless its email is already registered.
/// Returns the account when one was created.
pub async fn ensure_default_admin(
    user_repo: &dyn UserRepository,
    name: &str,
    email: &str,
    password: &str,
) -> Result<Option<User>, AuthError> {
    if user_repo.email_exists(email).await? {
        return Ok(None);
    }

    let admin = user_repo
        .create(create_default_admin(name, email, password)?)
        .await?;
    info!("Created default admin user: {}", admin.email);

    Ok(Some(admin))
}

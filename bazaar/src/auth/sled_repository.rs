use super::error::AuthError;
use super::models::User;
use super::repository::UserRepository;
use async_trait::async_trait;
use sled::Db;

const USERS_TREE: &str = "users";
const USERS_BY_EMAIL_TREE: &str = "users_by_email";

#[derive(Clone)]
pub struct SledUserRepository {
    db: Db,
}

impl SledUserRepository {
    /// Share the catalog's database; users live in their own trees
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    fn users_tree(&self) -> Result<sled::Tree, AuthError> {
        Ok(self.db.open_tree(USERS_TREE)?)
    }

    fn users_by_email_tree(&self) -> Result<sled::Tree, AuthError> {
        Ok(self.db.open_tree(USERS_BY_EMAIL_TREE)?)
    }
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl UserRepository for SledUserRepository {
    async fn create(&self, user: User) -> Result<User, AuthError> {
        let users_tree = self.users_tree()?;
        let email_tree = self.users_by_email_tree()?;

        // Reserve the email before writing the record
        let reserved = email_tree.compare_and_swap(
            email_key(&user.email).as_bytes(),
            None as Option<&[u8]>,
            Some(user.id.as_bytes()),
        )?;
        if reserved.is_err() {
            return Err(AuthError::UserAlreadyExists);
        }

        users_tree.insert(user.id.as_bytes(), serde_json::to_vec(&user)?)?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let email_tree = self.users_by_email_tree()?;
        let users_tree = self.users_tree()?;

        if let Some(user_id) = email_tree.get(email_key(email).as_bytes())? {
            if let Some(user_data) = users_tree.get(&user_id)? {
                return Ok(Some(serde_json::from_slice(&user_data)?));
            }
        }

        Ok(None)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AuthError> {
        let users_tree = self.users_tree()?;

        match users_tree.get(id.as_bytes())? {
            Some(user_data) => Ok(Some(serde_json::from_slice(&user_data)?)),
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> Result<Vec<User>, AuthError> {
        let users_tree = self.users_tree()?;
        let mut users = Vec::new();

        for item in users_tree.iter() {
            let (_, user_data) = item?;
            users.push(serde_json::from_slice(&user_data)?);
        }

        Ok(users)
    }

    async fn delete(&self, id: &str) -> Result<User, AuthError> {
        let users_tree = self.users_tree()?;
        let email_tree = self.users_by_email_tree()?;

        let user_data = users_tree
            .remove(id.as_bytes())?
            .ok_or(AuthError::UserNotFound)?;
        let user: User = serde_json::from_slice(&user_data)?;

        email_tree.remove(email_key(&user.email).as_bytes())?;

        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        let email_tree = self.users_by_email_tree()?;
        Ok(email_tree.contains_key(email_key(email).as_bytes())?)
    }
}

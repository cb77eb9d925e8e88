use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Password does not meet strength requirements")]
    WeakPassword,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Cannot delete user's own account")]
    CannotDeleteSelf,

    #[error("Please provide {0}")]
    MissingField(&'static str),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Password hashing error: {0}")]
    PasswordHashError(String),

    #[error(transparent)]
    Core(#[from] shared::Error),
}

impl From<sled::Error> for AuthError {
    fn from(err: sled::Error) -> Self {
        AuthError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::SerializationError(err.to_string())
    }
}

impl From<AuthError> for shared::Error {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Core(e) => e,
            AuthError::UserNotFound => shared::Error::not_found("user"),
            AuthError::StorageError(msg) => shared::Error::Storage(msg),
            AuthError::SerializationError(msg) => shared::Error::Serialization(msg),
            other => shared::Error::Internal(other.to_string()),
        }
    }
}

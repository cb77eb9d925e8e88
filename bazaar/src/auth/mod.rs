pub mod auth_service;
pub mod defaults;
pub mod error;
pub mod models;
pub mod moka_session_repository;
pub mod password;
pub mod repository;
pub mod session;
pub mod session_store;
pub mod sled_repository;
pub mod user_service;

// Re-export commonly used types
pub use auth_service::AuthService;
pub use error::AuthError;
pub use models::{User, UserRole};
pub use moka_session_repository::MokaSessionRepository;
pub use repository::UserRepository;
pub use session::{Session, SessionToken, generate_session_token};
pub use session_store::{SessionRepository, SessionStore};
pub use sled_repository::SledUserRepository;
pub use user_service::{SignupRequest, UserService};

pub mod authentication;
pub mod authorization;

pub use authentication::{auth_middleware, extract_bearer_token};
pub use authorization::{admin_only, ensure_self_or_admin};

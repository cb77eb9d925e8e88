pub mod dashboard;
pub mod health;
pub mod order;
pub mod payment;
pub mod product;
pub mod user;

pub use health::health_check;

pub mod auth;
pub mod cache;
pub mod domain;
pub mod persistence;
pub mod ports;
pub mod services;

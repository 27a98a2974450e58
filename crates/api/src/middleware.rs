pub mod auth;
pub mod cookies;
pub mod error_handling;
pub mod jwt;

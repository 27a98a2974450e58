pub mod auth;
pub mod schedule;
pub mod user;

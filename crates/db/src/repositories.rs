pub mod schedule;
pub mod token;
pub mod user;

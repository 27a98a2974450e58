//! Request validation.
//!
//! [`schedule`] holds the rules a schedule must satisfy before it is written;
//! [`user`] holds the field checks applied to registration and login bodies.

pub mod schedule;
pub mod user;

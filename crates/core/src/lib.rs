//! # schedman core
//!
//! Domain types and rules shared by the API server and the persistence layer:
//! the schedule model, the validation rules applied before a schedule is
//! persisted, the grouped per-day view, and the repository seam the rules are
//! executed against.

pub mod errors;
pub mod grouping;
pub mod models;
pub mod repository;
pub mod services;
pub mod validation;

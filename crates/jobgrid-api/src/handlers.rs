//! Request handlers.

pub mod applicants;
pub mod applications;
pub mod companies;
pub mod health;
pub mod jobs;
pub mod tokens;

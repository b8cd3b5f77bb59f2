//! Shared data models for the JobGrid backend.
//!
//! This crate provides Serde-serializable types for:
//! - Companies, jobs and employees
//! - Applicants and applications (with the status state machine)
//! - Accounts and principals (identity/role scoping)
//! - Filter predicates and pagination envelopes

pub mod account;
pub mod applicant;
pub mod application;
pub mod company;
pub mod filter;
pub mod job;
pub mod page;
pub mod principal;

// Re-export common types
pub use account::Account;
pub use applicant::Applicant;
pub use application::{Application, ApplicationStatus, StatusChange};
pub use company::Company;
pub use filter::{ApplicantFilter, JobFilter, PageRequest};
pub use job::{Employee, Job, JobStatus};
pub use page::Page;
pub use principal::{Principal, Role};

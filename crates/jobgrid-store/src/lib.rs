//! Persistence layer for the JobGrid backend.
//!
//! Exposes one repository trait per entity, each carrying only the query
//! shapes the engine and gateway need, and [`MemoryStore`], a transactional
//! in-memory implementation backing the server and the test suites.
//! Check-then-write operations (unique application insert, status
//! compare-and-set, guarded company delete) run inside a single write
//! lock, which is the store's transaction boundary.

pub mod error;
pub mod memory;
pub mod repos;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use repos::{
    AccountRepo, ApplicantRepo, ApplicationRepo, CompanyRepo, EmployeeRepo, JobRepo, Store,
    TokenRepo,
};

//! Repository traits, one per entity.
//!
//! Each trait exposes only the query shapes the engine and gateway
//! actually use, keeping them decoupled from any particular persistence
//! engine. Implementations must make every method an atomic unit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use jobgrid_models::{
    Account, Applicant, ApplicantFilter, Application, ApplicationStatus, Company, Employee, Job,
    JobFilter, StatusChange,
};

use crate::error::StoreResult;

/// Login accounts.
#[async_trait]
pub trait AccountRepo: Send + Sync {
    /// Insert a new account. Fails with `Duplicate` when the email is taken.
    async fn insert_account(&self, account: Account) -> StoreResult<Account>;
    async fn account_by_id(&self, id: Uuid) -> StoreResult<Option<Account>>;
    async fn account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;
}

/// Companies.
#[async_trait]
pub trait CompanyRepo: Send + Sync {
    async fn insert_company(&self, company: Company) -> StoreResult<Company>;
    async fn company_by_id(&self, id: Uuid) -> StoreResult<Option<Company>>;
    async fn update_company(&self, company: Company) -> StoreResult<Company>;
    /// Delete a company. Fails with `Precondition` while open jobs exist.
    async fn delete_company(&self, id: Uuid) -> StoreResult<()>;
    /// All companies, ordered by creation time.
    async fn list_companies(&self) -> StoreResult<Vec<Company>>;
}

/// Employer staff associations.
#[async_trait]
pub trait EmployeeRepo: Send + Sync {
    async fn insert_employee(&self, employee: Employee) -> StoreResult<Employee>;
    /// Companies an account is associated with, via employee records
    /// or direct company ownership.
    async fn company_ids_for_account(&self, account_id: Uuid) -> StoreResult<Vec<Uuid>>;
}

/// Job postings.
#[async_trait]
pub trait JobRepo: Send + Sync {
    async fn insert_job(&self, job: Job) -> StoreResult<Job>;
    async fn job_by_id(&self, id: Uuid) -> StoreResult<Option<Job>>;
    async fn update_job(&self, job: Job) -> StoreResult<Job>;
    async fn delete_job(&self, id: Uuid) -> StoreResult<()>;
    /// Jobs matching a filter, ordered by creation time (newest first).
    async fn list_jobs(&self, filter: &JobFilter) -> StoreResult<Vec<Job>>;
    async fn jobs_for_company(&self, company_id: Uuid) -> StoreResult<Vec<Job>>;
}

/// Applicant profiles.
#[async_trait]
pub trait ApplicantRepo: Send + Sync {
    async fn insert_applicant(&self, applicant: Applicant) -> StoreResult<Applicant>;
    async fn applicant_by_id(&self, id: Uuid) -> StoreResult<Option<Applicant>>;
    async fn applicant_by_account(&self, account_id: Uuid) -> StoreResult<Option<Applicant>>;
    async fn update_applicant(&self, applicant: Applicant) -> StoreResult<Applicant>;
    async fn list_applicants(&self, filter: &ApplicantFilter) -> StoreResult<Vec<Applicant>>;
}

/// Applications. Submit and transition are check-then-write operations
/// and must be atomic.
#[async_trait]
pub trait ApplicationRepo: Send + Sync {
    /// Atomically: verify the job exists and is open, verify the
    /// applicant exists, enforce (applicant, job) uniqueness, insert the
    /// application and bump the job's application counter.
    ///
    /// Errors: `NotFound("job")`, `NotFound("applicant")`,
    /// `Precondition("job is closed")`, `Duplicate("application")`.
    async fn submit_application(
        &self,
        applicant_id: Uuid,
        job_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<Application>;

    async fn application_by_id(&self, id: Uuid) -> StoreResult<Option<Application>>;

    /// Compare-and-set status change. Fails with `Precondition` when the
    /// current status no longer equals `expected`, so concurrent
    /// transitions cannot both apply.
    async fn transition_application(
        &self,
        id: Uuid,
        expected: ApplicationStatus,
        change: StatusChange,
    ) -> StoreResult<Application>;

    /// Applications for a job, ordered by submission time.
    async fn applications_for_job(&self, job_id: Uuid) -> StoreResult<Vec<Application>>;
    /// Applications submitted by an applicant, ordered by submission time.
    async fn applications_for_applicant(&self, applicant_id: Uuid)
        -> StoreResult<Vec<Application>>;
}

/// Refresh-token revocation list.
#[async_trait]
pub trait TokenRepo: Send + Sync {
    /// Blacklist a refresh token id until it would have expired anyway.
    async fn revoke_token(&self, jti: &str, expires_at: DateTime<Utc>) -> StoreResult<()>;
    async fn is_token_revoked(&self, jti: &str) -> StoreResult<bool>;
}

/// The full persistence surface the server wires together.
pub trait Store:
    AccountRepo + CompanyRepo + EmployeeRepo + JobRepo + ApplicantRepo + ApplicationRepo + TokenRepo
{
}

impl<T> Store for T where
    T: AccountRepo
        + CompanyRepo
        + EmployeeRepo
        + JobRepo
        + ApplicantRepo
        + ApplicationRepo
        + TokenRepo
{
}

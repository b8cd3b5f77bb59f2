//! In-memory store engine.
//!
//! A single `RwLock` over the whole dataset is the transaction boundary:
//! every guarded check-then-write runs under one write guard, so the
//! uniqueness and compare-and-set guarantees hold under concurrent
//! requests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use jobgrid_models::{
    Account, Applicant, ApplicantFilter, Application, ApplicationStatus, Company, Employee, Job,
    JobFilter, StatusChange,
};

use crate::error::{StoreError, StoreResult};
use crate::repos::{
    AccountRepo, ApplicantRepo, ApplicationRepo, CompanyRepo, EmployeeRepo, JobRepo, TokenRepo,
};

#[derive(Default)]
struct Inner {
    accounts: HashMap<Uuid, Account>,
    emails: HashMap<String, Uuid>,
    companies: HashMap<Uuid, Company>,
    employees: Vec<Employee>,
    jobs: HashMap<Uuid, Job>,
    applicants: HashMap<Uuid, Applicant>,
    applications: HashMap<Uuid, Application>,
    // (applicant_id, job_id) uniqueness index
    application_pairs: HashSet<(Uuid, Uuid)>,
    revoked_tokens: HashMap<String, DateTime<Utc>>,
}

/// Transactional in-memory implementation of every repository trait.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepo for MemoryStore {
    async fn insert_account(&self, account: Account) -> StoreResult<Account> {
        let mut inner = self.inner.write().await;
        let email = account.email.to_lowercase();
        if inner.emails.contains_key(&email) {
            return Err(StoreError::Duplicate("account email"));
        }
        inner.emails.insert(email, account.id);
        inner.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn account_by_id(&self, id: Uuid) -> StoreResult<Option<Account>> {
        Ok(self.inner.read().await.accounts.get(&id).cloned())
    }

    async fn account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let inner = self.inner.read().await;
        Ok(inner
            .emails
            .get(&email.to_lowercase())
            .and_then(|id| inner.accounts.get(id))
            .cloned())
    }
}

#[async_trait]
impl CompanyRepo for MemoryStore {
    async fn insert_company(&self, company: Company) -> StoreResult<Company> {
        let mut inner = self.inner.write().await;
        inner.companies.insert(company.id, company.clone());
        Ok(company)
    }

    async fn company_by_id(&self, id: Uuid) -> StoreResult<Option<Company>> {
        Ok(self.inner.read().await.companies.get(&id).cloned())
    }

    async fn update_company(&self, company: Company) -> StoreResult<Company> {
        let mut inner = self.inner.write().await;
        if !inner.companies.contains_key(&company.id) {
            return Err(StoreError::NotFound("company"));
        }
        inner.companies.insert(company.id, company.clone());
        Ok(company)
    }

    async fn delete_company(&self, id: Uuid) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.companies.contains_key(&id) {
            return Err(StoreError::NotFound("company"));
        }
        let has_open_jobs = inner
            .jobs
            .values()
            .any(|j| j.company_id == id && j.is_open());
        if has_open_jobs {
            return Err(StoreError::Precondition("company has open jobs"));
        }
        // Cascade: remove remaining (closed) jobs and their applications.
        let job_ids: Vec<Uuid> = inner
            .jobs
            .values()
            .filter(|j| j.company_id == id)
            .map(|j| j.id)
            .collect();
        for job_id in &job_ids {
            inner.jobs.remove(job_id);
        }
        inner.applications.retain(|_, a| !job_ids.contains(&a.job_id));
        inner
            .application_pairs
            .retain(|(_, job_id)| !job_ids.contains(job_id));
        inner.employees.retain(|e| e.company_id != id);
        inner.companies.remove(&id);
        debug!(company_id = %id, "Deleted company");
        Ok(())
    }

    async fn list_companies(&self) -> StoreResult<Vec<Company>> {
        let inner = self.inner.read().await;
        let mut companies: Vec<Company> = inner.companies.values().cloned().collect();
        companies.sort_by_key(|c| c.created_at);
        Ok(companies)
    }
}

#[async_trait]
impl EmployeeRepo for MemoryStore {
    async fn insert_employee(&self, employee: Employee) -> StoreResult<Employee> {
        let mut inner = self.inner.write().await;
        if !inner.companies.contains_key(&employee.company_id) {
            return Err(StoreError::NotFound("company"));
        }
        inner.employees.push(employee.clone());
        Ok(employee)
    }

    async fn company_ids_for_account(&self, account_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let inner = self.inner.read().await;
        let mut ids: Vec<Uuid> = inner
            .employees
            .iter()
            .filter(|e| e.account_id == account_id)
            .map(|e| e.company_id)
            .collect();
        for company in inner.companies.values() {
            if company.is_owned_by(account_id) && !ids.contains(&company.id) {
                ids.push(company.id);
            }
        }
        Ok(ids)
    }
}

#[async_trait]
impl JobRepo for MemoryStore {
    async fn insert_job(&self, job: Job) -> StoreResult<Job> {
        let mut inner = self.inner.write().await;
        if !inner.companies.contains_key(&job.company_id) {
            return Err(StoreError::NotFound("company"));
        }
        inner.jobs.insert(job.id, job.clone());
        Ok(job)
    }

    async fn job_by_id(&self, id: Uuid) -> StoreResult<Option<Job>> {
        Ok(self.inner.read().await.jobs.get(&id).cloned())
    }

    async fn update_job(&self, job: Job) -> StoreResult<Job> {
        let mut inner = self.inner.write().await;
        if !inner.jobs.contains_key(&job.id) {
            return Err(StoreError::NotFound("job"));
        }
        inner.jobs.insert(job.id, job.clone());
        Ok(job)
    }

    async fn delete_job(&self, id: Uuid) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if inner.jobs.remove(&id).is_none() {
            return Err(StoreError::NotFound("job"));
        }
        inner.applications.retain(|_, a| a.job_id != id);
        inner.application_pairs.retain(|(_, job_id)| *job_id != id);
        Ok(())
    }

    async fn list_jobs(&self, filter: &JobFilter) -> StoreResult<Vec<Job>> {
        let inner = self.inner.read().await;
        let mut jobs: Vec<Job> = inner
            .jobs
            .values()
            .filter(|j| filter.matches(j))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(jobs)
    }

    async fn jobs_for_company(&self, company_id: Uuid) -> StoreResult<Vec<Job>> {
        let inner = self.inner.read().await;
        let mut jobs: Vec<Job> = inner
            .jobs
            .values()
            .filter(|j| j.company_id == company_id)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(jobs)
    }
}

#[async_trait]
impl ApplicantRepo for MemoryStore {
    async fn insert_applicant(&self, applicant: Applicant) -> StoreResult<Applicant> {
        let mut inner = self.inner.write().await;
        inner.applicants.insert(applicant.id, applicant.clone());
        Ok(applicant)
    }

    async fn applicant_by_id(&self, id: Uuid) -> StoreResult<Option<Applicant>> {
        Ok(self.inner.read().await.applicants.get(&id).cloned())
    }

    async fn applicant_by_account(&self, account_id: Uuid) -> StoreResult<Option<Applicant>> {
        let inner = self.inner.read().await;
        Ok(inner
            .applicants
            .values()
            .find(|a| a.account_id == account_id)
            .cloned())
    }

    async fn update_applicant(&self, applicant: Applicant) -> StoreResult<Applicant> {
        let mut inner = self.inner.write().await;
        if !inner.applicants.contains_key(&applicant.id) {
            return Err(StoreError::NotFound("applicant"));
        }
        inner.applicants.insert(applicant.id, applicant.clone());
        Ok(applicant)
    }

    async fn list_applicants(&self, filter: &ApplicantFilter) -> StoreResult<Vec<Applicant>> {
        let inner = self.inner.read().await;
        let mut applicants: Vec<Applicant> = inner
            .applicants
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        applicants.sort_by_key(|a| (a.created_at, a.id));
        Ok(applicants)
    }
}

#[async_trait]
impl ApplicationRepo for MemoryStore {
    async fn submit_application(
        &self,
        applicant_id: Uuid,
        job_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<Application> {
        // One write guard spans the whole check-then-write.
        let mut inner = self.inner.write().await;

        let job = inner.jobs.get(&job_id).ok_or(StoreError::NotFound("job"))?;
        if !job.is_open() {
            return Err(StoreError::Precondition("job is closed"));
        }
        if !inner.applicants.contains_key(&applicant_id) {
            return Err(StoreError::NotFound("applicant"));
        }
        if inner.application_pairs.contains(&(applicant_id, job_id)) {
            return Err(StoreError::Duplicate("application"));
        }

        let application = Application::new(job_id, applicant_id, now);
        inner.application_pairs.insert((applicant_id, job_id));
        inner
            .applications
            .insert(application.id, application.clone());
        if let Some(job) = inner.jobs.get_mut(&job_id) {
            job.applications_count += 1;
        }

        debug!(application_id = %application.id, job_id = %job_id, "Submitted application");
        Ok(application)
    }

    async fn application_by_id(&self, id: Uuid) -> StoreResult<Option<Application>> {
        Ok(self.inner.read().await.applications.get(&id).cloned())
    }

    async fn transition_application(
        &self,
        id: Uuid,
        expected: ApplicationStatus,
        change: StatusChange,
    ) -> StoreResult<Application> {
        let mut inner = self.inner.write().await;
        let application = inner
            .applications
            .get_mut(&id)
            .ok_or(StoreError::NotFound("application"))?;
        if application.status != expected {
            return Err(StoreError::Precondition("application status changed"));
        }
        application.record_transition(change.to, change.at, change.actor_id);
        Ok(application.clone())
    }

    async fn applications_for_job(&self, job_id: Uuid) -> StoreResult<Vec<Application>> {
        let inner = self.inner.read().await;
        let mut apps: Vec<Application> = inner
            .applications
            .values()
            .filter(|a| a.job_id == job_id)
            .cloned()
            .collect();
        apps.sort_by_key(|a| (a.submitted_at, a.id));
        Ok(apps)
    }

    async fn applications_for_applicant(
        &self,
        applicant_id: Uuid,
    ) -> StoreResult<Vec<Application>> {
        let inner = self.inner.read().await;
        let mut apps: Vec<Application> = inner
            .applications
            .values()
            .filter(|a| a.applicant_id == applicant_id)
            .cloned()
            .collect();
        apps.sort_by_key(|a| (a.submitted_at, a.id));
        Ok(apps)
    }
}

#[async_trait]
impl TokenRepo for MemoryStore {
    async fn revoke_token(&self, jti: &str, expires_at: DateTime<Utc>) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        // Drop entries for tokens that have expired on their own.
        let now = Utc::now();
        inner.revoked_tokens.retain(|_, exp| *exp > now);
        inner.revoked_tokens.insert(jti.to_string(), expires_at);
        Ok(())
    }

    async fn is_token_revoked(&self, jti: &str) -> StoreResult<bool> {
        Ok(self.inner.read().await.revoked_tokens.contains_key(jti))
    }
}

//! Authorization policy.
//!
//! One pure function over a closed role × action × ownership table.
//! Every pipeline operation and every gateway CRUD call goes through
//! [`authorize`]; there are no per-endpoint permission checks anywhere
//! else in the codebase.

use jobgrid_models::{Applicant, Application, Company, Job, Principal, Role};

use crate::error::{EngineError, EngineResult};

/// The closed set of actions the policy understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    List,
    Create,
    Update,
    Delete,
    /// Submit an application against a job.
    Submit,
    /// Move an application through its lifecycle.
    Transition,
}

/// The resource an action targets, carrying the ownership facts the
/// table needs. Collection variants cover listing endpoints.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Company(&'a Company),
    Companies,
    Job(&'a Job),
    Jobs,
    Applicant(&'a Applicant),
    Applicants,
    Application {
        application: &'a Application,
        job: &'a Job,
    },
    /// The applications belonging to a job (listing and ranking).
    JobApplications(&'a Job),
}

/// Decide whether `principal` may perform `action` on `resource`.
///
/// Anonymous principals get read access to open jobs and companies and
/// nothing else; everything beyond that is decided by role and ownership.
pub fn authorize(principal: &Principal, action: Action, resource: Resource) -> EngineResult<()> {
    if principal.is_admin() {
        return Ok(());
    }

    let allowed = match (principal.role, action, resource) {
        // Public read surface: companies and open jobs.
        (_, Action::Read, Resource::Company(_)) => true,
        (_, Action::List, Resource::Companies) => true,
        (_, Action::List, Resource::Jobs) => true,
        (Role::Anonymous, Action::Read, Resource::Job(job)) => job.is_open(),
        (Role::Applicant, Action::Read, Resource::Job(job)) => job.is_open(),
        (Role::Employer, Action::Read, Resource::Job(job)) => {
            job.is_open() || principal.covers_company(job.company_id)
        }

        // Applicants act on themselves.
        // Openness is checked atomically at submit time by the store.
        (Role::Applicant, Action::Submit, Resource::Job(_)) => principal.applicant_id.is_some(),
        (Role::Applicant, Action::Read | Action::Update, Resource::Applicant(applicant)) => {
            applicant.account_id == principal.account_id
        }
        (Role::Applicant, Action::Read, Resource::Application { application, .. }) => {
            principal.applicant_id == Some(application.applicant_id)
        }

        // Employers act within their company scope.
        (Role::Employer, Action::Create, Resource::Companies) => true,
        (Role::Employer, Action::Update | Action::Delete, Resource::Company(company)) => {
            company.is_owned_by(principal.account_id)
                || principal.covers_company(company.id)
        }
        (Role::Employer, Action::Create | Action::Update | Action::Delete, Resource::Job(job)) => {
            principal.covers_company(job.company_id)
        }
        (Role::Employer, Action::List, Resource::JobApplications(job)) => {
            principal.covers_company(job.company_id)
        }
        (
            Role::Employer,
            Action::Read | Action::Transition,
            Resource::Application { job, .. },
        ) => principal.covers_company(job.company_id),
        (Role::Employer, Action::Read, Resource::Applicant(_)) => true,
        (Role::Employer, Action::List, Resource::Applicants) => true,

        // Everything else is denied.
        _ => false,
    };

    if allowed {
        Ok(())
    } else if principal.is_anonymous() {
        Err(EngineError::Unauthenticated)
    } else {
        Err(EngineError::Unauthorized("insufficient role or ownership"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobgrid_models::JobStatus;
    use uuid::Uuid;

    fn employer_of(company_id: Uuid) -> Principal {
        Principal {
            account_id: Uuid::new_v4(),
            role: Role::Employer,
            company_ids: vec![company_id],
            applicant_id: None,
        }
    }

    fn applicant_principal(applicant_id: Uuid) -> Principal {
        Principal {
            account_id: Uuid::new_v4(),
            role: Role::Applicant,
            company_ids: vec![],
            applicant_id: Some(applicant_id),
        }
    }

    #[test]
    fn test_anonymous_reads_open_jobs_only() {
        let anon = Principal::anonymous();
        let mut job = Job::new(Uuid::new_v4(), "Engineer");

        assert!(authorize(&anon, Action::Read, Resource::Job(&job)).is_ok());
        assert!(authorize(&anon, Action::List, Resource::Jobs).is_ok());

        job.status = JobStatus::Closed;
        let err = authorize(&anon, Action::Read, Resource::Job(&job)).unwrap_err();
        assert!(matches!(err, EngineError::Unauthenticated));

        let err = authorize(&anon, Action::Create, Resource::Job(&job)).unwrap_err();
        assert!(matches!(err, EngineError::Unauthenticated));
    }

    #[test]
    fn test_employer_scope_gates_job_writes() {
        let company_id = Uuid::new_v4();
        let job = Job::new(company_id, "Engineer");
        let foreign_job = Job::new(Uuid::new_v4(), "Engineer");

        let employer = employer_of(company_id);
        assert!(authorize(&employer, Action::Update, Resource::Job(&job)).is_ok());
        assert!(authorize(&employer, Action::Delete, Resource::Job(&job)).is_ok());

        let err = authorize(&employer, Action::Update, Resource::Job(&foreign_job)).unwrap_err();
        assert!(matches!(err, EngineError::Unauthorized(_)));
    }

    #[test]
    fn test_closed_job_reads_stay_within_company_scope() {
        let company_id = Uuid::new_v4();
        let mut job = Job::new(company_id, "Engineer");
        job.status = JobStatus::Closed;

        let owner = employer_of(company_id);
        assert!(authorize(&owner, Action::Read, Resource::Job(&job)).is_ok());

        let foreign = employer_of(Uuid::new_v4());
        let err = authorize(&foreign, Action::Read, Resource::Job(&job)).unwrap_err();
        assert!(matches!(err, EngineError::Unauthorized(_)));

        // Reopened, the posting is public again
        job.status = JobStatus::Open;
        assert!(authorize(&foreign, Action::Read, Resource::Job(&job)).is_ok());
    }

    #[test]
    fn test_employer_cannot_submit_applications() {
        let company_id = Uuid::new_v4();
        let job = Job::new(company_id, "Engineer");
        let employer = employer_of(company_id);
        assert!(authorize(&employer, Action::Submit, Resource::Job(&job)).is_err());
    }

    #[test]
    fn test_applicant_reads_own_application_only() {
        let applicant_id = Uuid::new_v4();
        let job = Job::new(Uuid::new_v4(), "Engineer");
        let own = Application::new(job.id, applicant_id, chrono::Utc::now());
        let foreign = Application::new(job.id, Uuid::new_v4(), chrono::Utc::now());

        let principal = applicant_principal(applicant_id);
        assert!(authorize(
            &principal,
            Action::Read,
            Resource::Application { application: &own, job: &job }
        )
        .is_ok());
        assert!(authorize(
            &principal,
            Action::Read,
            Resource::Application { application: &foreign, job: &job }
        )
        .is_err());
        assert!(authorize(
            &principal,
            Action::Transition,
            Resource::Application { application: &own, job: &job }
        )
        .is_err());
    }

    #[test]
    fn test_admin_allows_everything() {
        let admin = Principal {
            account_id: Uuid::new_v4(),
            role: Role::Admin,
            company_ids: vec![],
            applicant_id: None,
        };
        let job = Job::new(Uuid::new_v4(), "Engineer");
        assert!(authorize(&admin, Action::Delete, Resource::Job(&job)).is_ok());
        assert!(authorize(&admin, Action::List, Resource::Applicants).is_ok());
    }
}

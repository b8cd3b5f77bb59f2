//! Application pipeline engine.
//!
//! Owns the application lifecycle: submission, status transitions,
//! permission-scoped listings and deterministic ranking. All persistence
//! goes through the repository traits; check-then-write operations are
//! delegated to the store's atomic primitives.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use jobgrid_models::{Application, ApplicationStatus, Job, StatusChange};
use jobgrid_store::{Store, StoreError};

use crate::context::RequestContext;
use crate::error::{EngineError, EngineResult};
use crate::policy::{authorize, Action, Resource};

/// Criteria for ranked application listings.
#[derive(Debug, Clone, Default)]
pub struct RankCriteria {
    /// Restrict to one lifecycle status.
    pub status: Option<ApplicationStatus>,
    /// Cap the number of results.
    pub limit: Option<usize>,
}

/// The pipeline engine. Cheap to clone; state lives in the store.
#[derive(Clone)]
pub struct Pipeline {
    store: Arc<dyn Store>,
}

impl Pipeline {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn job(&self, job_id: Uuid) -> EngineResult<Job> {
        self.store
            .job_by_id(job_id)
            .await?
            .ok_or(EngineError::NotFound("job"))
    }

    async fn application(&self, id: Uuid) -> EngineResult<Application> {
        self.store
            .application_by_id(id)
            .await?
            .ok_or(EngineError::NotFound("application"))
    }

    /// Submit an application for `applicant_id` against `job_id`.
    ///
    /// The acting principal must be that applicant (or admin). The store
    /// performs the duplicate check, the open-job check and the insert as
    /// one atomic unit, so two concurrent submissions cannot both pass.
    #[instrument(skip(self, ctx), fields(applicant = %applicant_id, job = %job_id))]
    pub async fn submit(
        &self,
        ctx: &RequestContext,
        applicant_id: Uuid,
        job_id: Uuid,
    ) -> EngineResult<Application> {
        let job = self.job(job_id).await?;
        authorize(&ctx.principal, Action::Submit, Resource::Job(&job))?;
        if !ctx.principal.is_applicant(applicant_id) {
            return Err(EngineError::Unauthorized(
                "cannot submit on behalf of another applicant",
            ));
        }

        let application = self
            .store
            .submit_application(applicant_id, job_id, ctx.now)
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(_) => EngineError::DuplicateApplication,
                StoreError::Precondition(_) => EngineError::JobClosed,
                StoreError::NotFound(entity) => EngineError::NotFound(entity),
                other => EngineError::Store(other),
            })?;

        info!(application = %application.id, "application submitted");
        Ok(application)
    }

    /// Move an application to `requested`.
    ///
    /// Only a principal scoped over the job's company may transition, and
    /// only along the transition table. The write is a compare-and-set on
    /// the current status, so a concurrent transition surfaces as
    /// `InvalidTransition` instead of silently double-applying.
    #[instrument(skip(self, ctx), fields(application = %application_id, to = %requested))]
    pub async fn transition(
        &self,
        ctx: &RequestContext,
        application_id: Uuid,
        requested: ApplicationStatus,
    ) -> EngineResult<Application> {
        let application = self.application(application_id).await?;
        let job = self.job(application.job_id).await?;

        authorize(
            &ctx.principal,
            Action::Transition,
            Resource::Application {
                application: &application,
                job: &job,
            },
        )?;

        if !application.status.can_transition_to(requested) {
            return Err(EngineError::InvalidTransition {
                from: application.status,
                to: requested,
            });
        }

        let change = StatusChange {
            from: application.status,
            to: requested,
            at: ctx.now,
            actor_id: ctx.principal.account_id,
        };
        let updated = self
            .store
            .transition_application(application_id, application.status, change)
            .await
            .map_err(|e| match e {
                // Lost the race: the status moved under us.
                StoreError::Precondition(_) => EngineError::InvalidTransition {
                    from: application.status,
                    to: requested,
                },
                other => EngineError::Store(other),
            })?;

        info!(from = %application.status, to = %requested, "application transitioned");
        Ok(updated)
    }

    /// Applications for a job, in submission order. Employer/admin only.
    pub async fn list_for_job(
        &self,
        ctx: &RequestContext,
        job_id: Uuid,
    ) -> EngineResult<Vec<Application>> {
        let job = self.job(job_id).await?;
        authorize(&ctx.principal, Action::List, Resource::JobApplications(&job))?;
        Ok(self.store.applications_for_job(job_id).await?)
    }

    /// Deterministic ranked listing for a job.
    ///
    /// Score = |applicant.skills ∩ job.required_skills|, descending; ties
    /// broken by earliest submission, then by id. A pure function of the
    /// current data, so two calls on unchanged data return the same order.
    pub async fn rank_applications(
        &self,
        ctx: &RequestContext,
        job_id: Uuid,
        criteria: RankCriteria,
    ) -> EngineResult<Vec<Application>> {
        let job = self.job(job_id).await?;
        authorize(&ctx.principal, Action::List, Resource::JobApplications(&job))?;

        let mut applications = self.store.applications_for_job(job_id).await?;
        if let Some(status) = criteria.status {
            applications.retain(|a| a.status == status);
        }

        let mut scores: HashMap<Uuid, u32> = HashMap::new();
        for application in &applications {
            let score = match self.store.applicant_by_id(application.applicant_id).await? {
                Some(applicant) => applicant.skill_overlap(&job.required_skills),
                None => 0,
            };
            scores.insert(application.id, score);
        }

        for application in applications.iter_mut() {
            application.score = Some(scores[&application.id]);
        }
        applications.sort_by(|a, b| {
            scores[&b.id]
                .cmp(&scores[&a.id])
                .then(a.submitted_at.cmp(&b.submitted_at))
                .then(a.id.cmp(&b.id))
        });

        if let Some(limit) = criteria.limit {
            applications.truncate(limit);
        }
        Ok(applications)
    }

    /// Applications submitted by an applicant. Self or admin only.
    pub async fn list_for_applicant(
        &self,
        ctx: &RequestContext,
        applicant_id: Uuid,
    ) -> EngineResult<Vec<Application>> {
        if ctx.principal.is_anonymous() {
            return Err(EngineError::Unauthenticated);
        }
        if !ctx.principal.is_applicant(applicant_id) {
            return Err(EngineError::Unauthorized(
                "cannot list another applicant's applications",
            ));
        }
        Ok(self.store.applications_for_applicant(applicant_id).await?)
    }
}

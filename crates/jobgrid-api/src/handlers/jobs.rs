//! Job posting handlers.

use std::collections::{BTreeSet, HashMap};

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use jobgrid_engine::{authorize, parse_job_filter, parse_page, Action, Resource};
use jobgrid_models::{Job, JobStatus, Page};

use crate::auth::{AuthUser, MaybeAuthUser};
use crate::error::{ApiError, ApiResult};
use crate::handlers::companies::query_config;
use crate::pagination::paginate;
use crate::state::AppState;

fn normalize_skills(skills: &[String]) -> BTreeSet<String> {
    skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn check_salary_band(min: Option<u64>, max: Option<u64>) -> ApiResult<()> {
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(ApiError::Validation(
                "salary_min must not exceed salary_max".to_string(),
            ));
        }
    }
    Ok(())
}

/// List jobs matching the query filters.
///
/// Anonymous and applicant callers see open jobs only; admins see all.
pub async fn list_jobs(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Query(params): Query<HashMap<String, String>>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Json<Page<Job>>> {
    authorize(&user.principal, Action::List, Resource::Jobs)?;

    let mut filter = parse_job_filter(&params);
    filter.open_only = !user.principal.is_admin();

    let jobs = state.store.list_jobs(&filter).await?;
    let page_req = parse_page(&params, query_config(&state));
    Ok(Json(paginate(jobs, page_req, &uri)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct JobCreateRequest {
    pub company_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub salary_min: Option<u64>,
    pub salary_max: Option<u64>,
    #[serde(default)]
    pub required_skills: Vec<String>,
}

/// Post a job under a company the caller administers.
pub async fn create_job(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<JobCreateRequest>,
) -> ApiResult<(StatusCode, Json<Job>)> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    check_salary_band(request.salary_min, request.salary_max)?;

    if state
        .store
        .company_by_id(request.company_id)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found("company"));
    }

    let mut job = Job::new(request.company_id, request.title.trim());
    authorize(&user.principal, Action::Create, Resource::Job(&job))?;

    job.description = request.description;
    job.location = request.location;
    job.salary_min = request.salary_min;
    job.salary_max = request.salary_max;
    job.required_skills = normalize_skills(&request.required_skills);

    let job = state.store.insert_job(job).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// Fetch one job.
///
/// Closed jobs are visible only to the owning company and admins; other
/// callers get a 404 so probing by id leaks nothing.
pub async fn get_job(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Job>> {
    let job = state
        .store
        .job_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("job"))?;
    authorize(&user.principal, Action::Read, Resource::Job(&job))
        .map_err(|e| ApiError::from(e.conceal("job")))?;
    Ok(Json(job))
}

#[derive(Debug, Deserialize, Validate)]
pub struct JobUpdateRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub salary_min: Option<u64>,
    pub salary_max: Option<u64>,
    pub required_skills: Option<Vec<String>>,
    /// "open" or "closed"
    pub status: Option<String>,
}

/// Update a job posting, including opening or closing it.
pub async fn update_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<JobUpdateRequest>,
) -> ApiResult<Json<Job>> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let mut job = state
        .store
        .job_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("job"))?;
    authorize(&user.principal, Action::Update, Resource::Job(&job))
        .map_err(|e| ApiError::from(e.conceal("job")))?;

    if let Some(title) = request.title {
        job.title = title.trim().to_string();
    }
    if let Some(description) = request.description {
        job.description = description;
    }
    if let Some(location) = request.location {
        job.location = location;
    }
    if request.salary_min.is_some() {
        job.salary_min = request.salary_min;
    }
    if request.salary_max.is_some() {
        job.salary_max = request.salary_max;
    }
    check_salary_band(job.salary_min, job.salary_max)?;
    if let Some(skills) = request.required_skills {
        job.required_skills = normalize_skills(&skills);
    }
    if let Some(status) = request.status {
        job.status = match status.as_str() {
            "open" => JobStatus::Open,
            "closed" => JobStatus::Closed,
            _ => {
                return Err(ApiError::Validation(
                    "status must be \"open\" or \"closed\"".to_string(),
                ))
            }
        };
    }
    job.updated_at = Utc::now();

    let job = state.store.update_job(job).await?;
    Ok(Json(job))
}

/// Delete a job posting and its applications.
pub async fn delete_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let job = state
        .store
        .job_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("job"))?;
    authorize(&user.principal, Action::Delete, Resource::Job(&job))
        .map_err(|e| ApiError::from(e.conceal("job")))?;

    state.store.delete_job(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

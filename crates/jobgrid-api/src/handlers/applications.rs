//! Application lifecycle handlers.

use std::collections::HashMap;

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use jobgrid_engine::{authorize, parse_page, Action, RankCriteria, Resource};
use jobgrid_models::{Application, ApplicationStatus, Page};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::companies::query_config;
use crate::metrics;
use crate::pagination::paginate;
use crate::state::AppState;

/// Submit an application for the acting applicant against a job.
pub async fn submit_application(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<Application>)> {
    let applicant_id = user
        .principal
        .applicant_id
        .ok_or_else(|| ApiError::forbidden("account has no applicant profile"))?;

    let application = state
        .pipeline
        .submit(&user.ctx(), applicant_id, job_id)
        .await?;

    metrics::record_application_submitted();
    Ok((StatusCode::CREATED, Json(application)))
}

/// Applications for a job in submission order. Owning employer or admin.
pub async fn list_job_applications(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<Uuid>,
    Query(params): Query<HashMap<String, String>>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Json<Page<Application>>> {
    let applications = state.pipeline.list_for_job(&user.ctx(), job_id).await?;
    let page_req = parse_page(&params, query_config(&state));
    Ok(Json(paginate(applications, page_req, &uri)))
}

/// Ranked applications for a job, best skill match first.
///
/// `status` restricts to one lifecycle state; `limit` caps the results.
pub async fn ranked_job_applications(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<Uuid>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<Application>>> {
    let status = match params.get("status").map(|s| s.trim()).filter(|s| !s.is_empty()) {
        Some(raw) => Some(
            ApplicationStatus::parse(raw)
                .ok_or_else(|| ApiError::Validation(format!("unknown status {raw:?}")))?,
        ),
        None => None,
    };
    let limit = params.get("limit").and_then(|v| v.trim().parse().ok());

    let criteria = RankCriteria { status, limit };
    let ranked = state
        .pipeline
        .rank_applications(&user.ctx(), job_id, criteria)
        .await?;
    Ok(Json(ranked))
}

/// Fetch one application. Its applicant, the job's employer or admin.
pub async fn get_application(
    State(state): State<AppState>,
    user: AuthUser,
    Path((job_id, application_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Application>> {
    let application = state
        .store
        .application_by_id(application_id)
        .await?
        .filter(|a| a.job_id == job_id)
        .ok_or_else(|| ApiError::not_found("application"))?;
    let job = state
        .store
        .job_by_id(application.job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("job"))?;

    authorize(
        &user.principal,
        Action::Read,
        Resource::Application {
            application: &application,
            job: &job,
        },
    )
    .map_err(|e| ApiError::from(e.conceal("application")))?;

    Ok(Json(application))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

/// Move an application through its lifecycle.
pub async fn update_application_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path((job_id, application_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<StatusUpdateRequest>,
) -> ApiResult<Json<Application>> {
    let requested = ApplicationStatus::parse(request.status.trim())
        .ok_or_else(|| ApiError::Validation(format!("unknown status {:?}", request.status)))?;

    // The application must belong to the job in the path.
    match state.store.application_by_id(application_id).await? {
        Some(a) if a.job_id == job_id => {}
        _ => return Err(ApiError::not_found("application")),
    }

    let application = state
        .pipeline
        .transition(&user.ctx(), application_id, requested)
        .await?;

    metrics::record_application_transition(requested.as_str());
    Ok(Json(application))
}

/// Applications submitted by an applicant. Self or admin only.
pub async fn list_applicant_applications(
    State(state): State<AppState>,
    user: AuthUser,
    Path(applicant_id): Path<Uuid>,
    Query(params): Query<HashMap<String, String>>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Json<Page<Application>>> {
    if state.store.applicant_by_id(applicant_id).await?.is_none() {
        return Err(ApiError::not_found("applicant"));
    }

    let applications = state
        .pipeline
        .list_for_applicant(&user.ctx(), applicant_id)
        .await?;

    let page_req = parse_page(&params, query_config(&state));
    Ok(Json(paginate(applications, page_req, &uri)))
}

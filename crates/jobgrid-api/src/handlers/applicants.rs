//! Applicant profile handlers.

use std::collections::HashMap;

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use jobgrid_engine::{authorize, parse_applicant_filter, parse_page, Action, Resource};
use jobgrid_models::{Applicant, Page};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::companies::query_config;
use crate::pagination::paginate;
use crate::state::AppState;

fn normalize_skills(skills: &[String]) -> std::collections::BTreeSet<String> {
    skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// List applicant profiles matching the query filters. Employer or admin.
pub async fn list_applicants(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<HashMap<String, String>>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Json<Page<Applicant>>> {
    authorize(&user.principal, Action::List, Resource::Applicants)?;

    let filter = parse_applicant_filter(&params);
    let applicants = state.store.list_applicants(&filter).await?;
    let page_req = parse_page(&params, query_config(&state));
    Ok(Json(paginate(applicants, page_req, &uri)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ApplicantCreateRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[validate(url)]
    pub resume_url: Option<String>,
}

/// Create an applicant profile for the acting account.
///
/// One profile per account; a second create is a conflict.
pub async fn create_applicant(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ApplicantCreateRequest>,
) -> ApiResult<(StatusCode, Json<Applicant>)> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    if user.principal.applicant_id.is_some() {
        return Err(ApiError::Conflict(
            "account already has an applicant profile".to_string(),
        ));
    }
    if user.principal.role != jobgrid_models::Role::Applicant && !user.principal.is_admin() {
        return Err(ApiError::forbidden("only applicant accounts hold profiles"));
    }

    let mut applicant = Applicant::new(
        user.principal.account_id,
        request.name.trim(),
        request.email.trim().to_lowercase(),
    );
    applicant.contact = request.contact;
    applicant.skills = normalize_skills(&request.skills);
    applicant.resume_url = request.resume_url;

    let applicant = state.store.insert_applicant(applicant).await?;
    Ok((StatusCode::CREATED, Json(applicant)))
}

/// Fetch one applicant profile. Self, any employer, or admin.
pub async fn get_applicant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Applicant>> {
    let applicant = state
        .store
        .applicant_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("applicant"))?;
    authorize(&user.principal, Action::Read, Resource::Applicant(&applicant))
        .map_err(|e| ApiError::from(e.conceal("applicant")))?;
    Ok(Json(applicant))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ApplicantUpdateRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub contact: Option<String>,
    pub skills: Option<Vec<String>>,
    #[validate(url)]
    pub resume_url: Option<String>,
}

/// Update an applicant profile. Self or admin only.
pub async fn update_applicant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ApplicantUpdateRequest>,
) -> ApiResult<Json<Applicant>> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let mut applicant = state
        .store
        .applicant_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("applicant"))?;
    authorize(&user.principal, Action::Update, Resource::Applicant(&applicant))
        .map_err(|e| ApiError::from(e.conceal("applicant")))?;

    if let Some(name) = request.name {
        applicant.name = name.trim().to_string();
    }
    if let Some(contact) = request.contact {
        applicant.contact = contact;
    }
    if let Some(skills) = request.skills {
        applicant.skills = normalize_skills(&skills);
    }
    if request.resume_url.is_some() {
        applicant.resume_url = request.resume_url;
    }

    let applicant = state.store.update_applicant(applicant).await?;
    Ok(Json(applicant))
}

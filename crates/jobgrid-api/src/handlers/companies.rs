//! Company handlers.

use std::collections::HashMap;

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use jobgrid_engine::{authorize, parse_page, Action, QueryConfig, Resource};
use jobgrid_models::{Company, Employee, Job, Page, Role};

use crate::auth::{AuthUser, MaybeAuthUser};
use crate::error::{ApiError, ApiResult};
use crate::pagination::paginate;
use crate::state::AppState;

pub(crate) fn query_config(state: &AppState) -> QueryConfig {
    QueryConfig {
        default_page_size: state.config.default_page_size,
        max_page_size: state.config.max_page_size,
    }
}

/// List companies. Public.
pub async fn list_companies(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Query(params): Query<HashMap<String, String>>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Json<Page<Company>>> {
    authorize(&user.principal, Action::List, Resource::Companies)?;
    let page_req = parse_page(&params, query_config(&state));
    let companies = state.store.list_companies().await?;
    Ok(Json(paginate(companies, page_req, &uri)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CompanyCreateRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(url)]
    pub website: Option<String>,
    #[serde(default)]
    pub location: String,
}

/// Create a company owned by the acting employer account.
pub async fn create_company(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CompanyCreateRequest>,
) -> ApiResult<(StatusCode, Json<Company>)> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    authorize(&user.principal, Action::Create, Resource::Companies)?;

    let mut company = Company::new(request.name.trim(), user.principal.account_id);
    company.description = request.description;
    company.website = request.website;
    company.location = request.location;

    let company = state.store.insert_company(company).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// Fetch one company. Public.
pub async fn get_company(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Company>> {
    let company = state
        .store
        .company_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("company"))?;
    authorize(&user.principal, Action::Read, Resource::Company(&company))?;
    Ok(Json(company))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CompanyUpdateRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    pub location: Option<String>,
}

/// Update a company. Owner or admin only.
pub async fn update_company(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<CompanyUpdateRequest>,
) -> ApiResult<Json<Company>> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let mut company = state
        .store
        .company_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("company"))?;
    authorize(&user.principal, Action::Update, Resource::Company(&company))?;

    if let Some(name) = request.name {
        company.name = name.trim().to_string();
    }
    if let Some(description) = request.description {
        company.description = description;
    }
    if request.website.is_some() {
        company.website = request.website;
    }
    if let Some(location) = request.location {
        company.location = location;
    }
    company.updated_at = Utc::now();

    let company = state.store.update_company(company).await?;
    Ok(Json(company))
}

/// Delete a company. Blocked (409) while open jobs exist.
pub async fn delete_company(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let company = state
        .store
        .company_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("company"))?;
    authorize(&user.principal, Action::Delete, Resource::Company(&company))?;

    state.store.delete_company(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct EmployeeCreateRequest {
    pub account_id: Uuid,
    #[serde(default)]
    pub title: String,
}

/// Associate an employer account with the company as staff.
///
/// The association is what scopes the account's principal over the
/// company's jobs and applications. Owner or admin only.
pub async fn add_employee(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<EmployeeCreateRequest>,
) -> ApiResult<(StatusCode, Json<Employee>)> {
    let company = state
        .store
        .company_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("company"))?;
    authorize(&user.principal, Action::Update, Resource::Company(&company))?;

    let account = state
        .store
        .account_by_id(request.account_id)
        .await?
        .ok_or_else(|| ApiError::not_found("account"))?;
    if account.role != Role::Employer {
        return Err(ApiError::bad_request(
            "only employer accounts can be company staff",
        ));
    }

    let mut employee = Employee::new(account.id, company.id);
    employee.title = request.title;
    let employee = state.store.insert_employee(employee).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

/// List a company's jobs. Public sees open jobs; owners and admins see all.
pub async fn company_jobs(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(id): Path<Uuid>,
    Query(params): Query<HashMap<String, String>>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Json<Page<Job>>> {
    if state.store.company_by_id(id).await?.is_none() {
        return Err(ApiError::not_found("company"));
    }

    let mut jobs = state.store.jobs_for_company(id).await?;
    if !user.principal.covers_company(id) {
        jobs.retain(|j| j.is_open());
    }

    let page_req = parse_page(&params, query_config(&state));
    Ok(Json(paginate(jobs, page_req, &uri)))
}

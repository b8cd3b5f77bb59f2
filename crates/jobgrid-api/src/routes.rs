//! API routes.

use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::applicants::{
    create_applicant, get_applicant, list_applicants, update_applicant,
};
use crate::handlers::applications::{
    get_application, list_applicant_applications, list_job_applications,
    ranked_job_applications, submit_application, update_application_status,
};
use crate::handlers::companies::{
    add_employee, company_jobs, create_company, delete_company, get_company, list_companies,
    update_company,
};
use crate::handlers::health::{health, ready};
use crate::handlers::jobs::{create_job, delete_job, get_job, list_jobs, update_job};
use crate::handlers::tokens::{
    google_login, obtain_token, refresh_token, register, revoke_token, verify_token,
};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let company_routes = Router::new()
        .route("/companies/", get(list_companies).post(create_company))
        .route(
            "/companies/:company_id/",
            get(get_company).put(update_company).delete(delete_company),
        )
        .route("/companies/:company_id/jobs/", get(company_jobs))
        .route("/companies/:company_id/employees/", post(add_employee));

    let job_routes = Router::new()
        .route("/jobs/", get(list_jobs).post(create_job))
        .route(
            "/jobs/:job_id/",
            get(get_job)
                .put(update_job)
                .patch(update_job)
                .delete(delete_job),
        );

    let application_routes = Router::new()
        .route(
            "/jobs/:job_id/applications/",
            get(list_job_applications).post(submit_application),
        )
        .route(
            "/jobs/:job_id/applications/ranked/",
            get(ranked_job_applications),
        )
        .route(
            "/jobs/:job_id/applications/:application_id/",
            get(get_application),
        )
        .route(
            "/jobs/:job_id/applications/:application_id/status/",
            put(update_application_status),
        );

    let applicant_routes = Router::new()
        .route("/applicants/", get(list_applicants).post(create_applicant))
        .route(
            "/applicants/:applicant_id/",
            get(get_applicant).put(update_applicant),
        )
        .route(
            "/applicants/:applicant_id/applications/",
            get(list_applicant_applications),
        );

    let token_routes = Router::new()
        .route("/register/", post(register))
        .route("/token/", post(obtain_token))
        .route("/token/refresh/", post(refresh_token))
        .route("/token/verify/", post(verify_token))
        .route("/token/revoke/", post(revoke_token))
        .route("/auth/google/", post(google_login));

    // IP-keyed rate limiter shared by all /api routes
    let rate_limiter = std::sync::Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    let api_routes = Router::new()
        .merge(company_routes)
        .merge(job_routes)
        .merge(application_routes)
        .merge(applicant_routes)
        .merge(token_routes)
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

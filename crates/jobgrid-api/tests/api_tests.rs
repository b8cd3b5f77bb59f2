//! API integration tests over the in-memory store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use jobgrid_api::{create_router, ApiConfig, AppState};
use jobgrid_store::MemoryStore;

fn test_app() -> Router {
    let config = ApiConfig {
        jwt_secret: "integration-test-secret".to_string(),
        rate_limit_rps: 1000,
        ..ApiConfig::default()
    };
    let state = AppState::with_store(config, Arc::new(MemoryStore::new())).unwrap();
    create_router(state, None)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Register an account and return (access token, body).
async fn register(app: &Router, email: &str, role: &str, skills: &[&str]) -> (String, Value) {
    let (status, body) = send(
        app,
        "POST",
        "/api/register/",
        None,
        Some(json!({
            "email": email,
            "password": "correct-horse",
            "role": role,
            "name": email.split('@').next().unwrap(),
            "skills": skills,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    let access = body["tokens"]["access"].as_str().unwrap().to_string();
    (access, body)
}

async fn create_company(app: &Router, token: &str, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/companies/",
        Some(token),
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create company failed: {body}");
    body["id"].as_str().unwrap().to_string()
}

async fn create_job(app: &Router, token: &str, company_id: &str, skills: &[&str]) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/jobs/",
        Some(token),
        Some(json!({
            "company_id": company_id,
            "title": "Backend Engineer",
            "location": "Berlin",
            "salary_min": 60000,
            "salary_max": 90000,
            "required_skills": skills,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create job failed: {body}");
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_login_refresh_revoke() {
    let app = test_app();
    let (_, body) = register(&app, "ada@example.com", "applicant", &["rust"]).await;
    assert!(body["applicant_id"].is_string());
    let refresh = body["tokens"]["refresh"].as_str().unwrap().to_string();

    // Duplicate email is a conflict
    let (status, _) = send(
        &app,
        "POST",
        "/api/register/",
        None,
        Some(json!({
            "email": "ada@example.com",
            "password": "correct-horse",
            "role": "applicant",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Password login
    let (status, body) = send(
        &app,
        "POST",
        "/api/token/",
        None,
        Some(json!({ "email": "ada@example.com", "password": "correct-horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access"].is_string());

    let (status, _) = send(
        &app,
        "POST",
        "/api/token/",
        None,
        Some(json!({ "email": "ada@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Verify accepts both token uses
    let (status, _) = send(
        &app,
        "POST",
        "/api/token/verify/",
        None,
        Some(json!({ "token": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Refresh works until revoked
    let (status, body) = send(
        &app,
        "POST",
        "/api/token/refresh/",
        None,
        Some(json!({ "refresh": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access"].is_string());

    let (status, _) = send(
        &app,
        "POST",
        "/api/token/revoke/",
        None,
        Some(json!({ "refresh": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "POST",
        "/api/token/refresh/",
        None,
        Some(json!({ "refresh": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_company_creation_requires_employer() {
    let app = test_app();

    // Anonymous
    let (status, _) = send(
        &app,
        "POST",
        "/api/companies/",
        None,
        Some(json!({ "name": "Acme" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Applicant role
    let (token, _) = register(&app, "ada@example.com", "applicant", &[]).await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/companies/",
        Some(&token),
        Some(json!({ "name": "Acme" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Employer role
    let (token, _) = register(&app, "boss@acme.com", "employer", &[]).await;
    let company_id = create_company(&app, &token, "Acme").await;

    // Company profile is publicly readable
    let (status, body) = send(&app, "GET", &format!("/api/companies/{company_id}/"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Acme");
}

#[tokio::test]
async fn test_application_lifecycle() {
    let app = test_app();
    let (employer, _) = register(&app, "boss@acme.com", "employer", &[]).await;
    let company_id = create_company(&app, &employer, "Acme").await;
    let job_id = create_job(&app, &employer, &company_id, &["rust", "sql"]).await;

    let (applicant, _) = register(&app, "ada@example.com", "applicant", &["rust"]).await;

    // Submit
    let (status, application) = send(
        &app,
        "POST",
        &format!("/api/jobs/{job_id}/applications/"),
        Some(&applicant),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(application["status"], "submitted");
    let application_id = application["id"].as_str().unwrap().to_string();

    // One application per (applicant, job)
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/jobs/{job_id}/applications/"),
        Some(&applicant),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Applicant cannot list the job's applications
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/jobs/{job_id}/applications/"),
        Some(&applicant),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Employer sees it
    let (status, page) = send(
        &app,
        "GET",
        &format!("/api/jobs/{job_id}/applications/"),
        Some(&employer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 1);

    let status_uri = format!("/api/jobs/{job_id}/applications/{application_id}/status/");

    // Unknown status value
    let (status, _) = send(
        &app,
        "PUT",
        &status_uri,
        Some(&employer),
        Some(json!({ "status": "pending" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Skipping a stage is a conflict
    let (status, _) = send(
        &app,
        "PUT",
        &status_uri,
        Some(&employer),
        Some(json!({ "status": "shortlisted" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Applicants cannot drive the lifecycle
    let (status, _) = send(
        &app,
        "PUT",
        &status_uri,
        Some(&applicant),
        Some(json!({ "status": "under_review" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Staged transitions succeed and build history
    for next in ["under_review", "shortlisted", "hired"] {
        let (status, body) = send(
            &app,
            "PUT",
            &status_uri,
            Some(&employer),
            Some(json!({ "status": next })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "transition to {next} failed: {body}");
        assert_eq!(body["status"], next);
    }

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/jobs/{job_id}/applications/{application_id}/"),
        Some(&employer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["history"].as_array().unwrap().len(), 3);

    // hired is absorbing
    let (status, _) = send(
        &app,
        "PUT",
        &status_uri,
        Some(&employer),
        Some(json!({ "status": "rejected" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_closed_job_rejects_applications() {
    let app = test_app();
    let (employer, _) = register(&app, "boss@acme.com", "employer", &[]).await;
    let company_id = create_company(&app, &employer, "Acme").await;
    let job_id = create_job(&app, &employer, &company_id, &[]).await;

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/jobs/{job_id}/"),
        Some(&employer),
        Some(json!({ "status": "closed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (applicant, _) = register(&app, "ada@example.com", "applicant", &[]).await;
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/jobs/{job_id}/applications/"),
        Some(&applicant),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Closed jobs drop out of the public listing
    let (status, page) = send(&app, "GET", "/api/jobs/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 0);

    // But the owning employer still sees the posting itself
    let (status, _) = send(&app, "GET", &format!("/api/jobs/{job_id}/"), Some(&employer), None).await;
    assert_eq!(status, StatusCode::OK);

    // An employer outside the company scope cannot, and cannot tell it exists
    let (foreign, _) = register(&app, "boss@other.com", "employer", &[]).await;
    let (status, _) = send(&app, "GET", &format!("/api/jobs/{job_id}/"), Some(&foreign), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ranked_applications_order() {
    let app = test_app();
    let (employer, _) = register(&app, "boss@acme.com", "employer", &[]).await;
    let company_id = create_company(&app, &employer, "Acme").await;
    let job_id = create_job(&app, &employer, &company_id, &["rust", "sql", "go"]).await;

    let (weak, _) = register(&app, "weak@example.com", "applicant", &["rust"]).await;
    let (strong, _) = register(&app, "strong@example.com", "applicant", &["rust", "sql"]).await;

    for token in [&weak, &strong] {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/jobs/{job_id}/applications/"),
            Some(token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, ranked) = send(
        &app,
        "GET",
        &format!("/api/jobs/{job_id}/applications/ranked/"),
        Some(&employer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ranked = ranked.as_array().unwrap();
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0]["score"], 2);
    assert_eq!(ranked[1]["score"], 1);
}

#[tokio::test]
async fn test_job_listing_filters_and_pagination() {
    let app = test_app();
    let (employer, _) = register(&app, "boss@acme.com", "employer", &[]).await;
    let company_id = create_company(&app, &employer, "Acme").await;
    for _ in 0..5 {
        create_job(&app, &employer, &company_id, &["rust"]).await;
    }

    let (status, page) = send(&app, "GET", "/api/jobs/?jobs_per_page=2", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 5);
    assert_eq!(page["results"].as_array().unwrap().len(), 2);
    let next = page["next"].as_str().unwrap();
    assert!(next.contains("page=2"));
    // Links carry the full routed path, so a client can follow them as-is
    assert!(next.starts_with("/api/jobs/"), "next link was {next}");

    let (status, page2) = send(&app, "GET", next, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page2["results"].as_array().unwrap().len(), 2);
    let previous = page2["previous"].as_str().unwrap();
    assert!(previous.starts_with("/api/jobs/"));
    assert!(previous.contains("page=1"));

    // Salary band intersection
    let (status, page) = send(&app, "GET", "/api/jobs/?min_salary=95000", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 0);

    // Unknown parameters never change the result set
    let (status, page) = send(
        &app,
        "GET",
        "/api/jobs/?utm_source=mail&sort=salary",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 5);
}

#[tokio::test]
async fn test_applicant_application_listing_is_scoped() {
    let app = test_app();
    let (employer, _) = register(&app, "boss@acme.com", "employer", &[]).await;
    let company_id = create_company(&app, &employer, "Acme").await;
    let job_id = create_job(&app, &employer, &company_id, &[]).await;

    let (ada, ada_body) = register(&app, "ada@example.com", "applicant", &[]).await;
    let (grace, _) = register(&app, "grace@example.com", "applicant", &[]).await;
    let ada_id = ada_body["applicant_id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/jobs/{job_id}/applications/"),
        Some(&ada),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/applicants/{ada_id}/applications/");

    let (status, page) = send(&app, "GET", &uri, Some(&ada), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 1);

    let (status, _) = send(&app, "GET", &uri, Some(&grace), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_company_delete_blocked_by_open_jobs() {
    let app = test_app();
    let (employer, _) = register(&app, "boss@acme.com", "employer", &[]).await;
    let company_id = create_company(&app, &employer, "Acme").await;
    let job_id = create_job(&app, &employer, &company_id, &[]).await;

    let uri = format!("/api/companies/{company_id}/");
    let (status, _) = send(&app, "DELETE", &uri, Some(&employer), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/jobs/{job_id}/"),
        Some(&employer),
        Some(json!({ "status": "closed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "DELETE", &uri, Some(&employer), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_staff_association_grants_company_scope() {
    let app = test_app();
    let (owner, _) = register(&app, "boss@acme.com", "employer", &[]).await;
    let company_id = create_company(&app, &owner, "Acme").await;

    let (staff, staff_body) = register(&app, "staff@acme.com", "employer", &[]).await;
    let staff_account = staff_body["account_id"].as_str().unwrap().to_string();

    // Before the association the second employer has no scope
    let (status, _) = send(
        &app,
        "POST",
        "/api/jobs/",
        Some(&staff),
        Some(json!({ "company_id": company_id, "title": "Backend Engineer" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let employees_uri = format!("/api/companies/{company_id}/employees/");

    // Only the owner can add staff
    let (status, _) = send(
        &app,
        "POST",
        &employees_uri,
        Some(&staff),
        Some(json!({ "account_id": staff_account })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, employee) = send(
        &app,
        "POST",
        &employees_uri,
        Some(&owner),
        Some(json!({ "account_id": staff_account, "title": "Recruiter" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "add staff failed: {employee}");
    assert_eq!(employee["title"], "Recruiter");

    // The association scopes the staff principal over the company's jobs
    let job_id = create_job(&app, &staff, &company_id, &[]).await;
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/jobs/{job_id}/applications/"),
        Some(&staff),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Applicant accounts cannot be staff
    let (_, applicant_body) = register(&app, "ada@example.com", "applicant", &[]).await;
    let applicant_account = applicant_body["account_id"].as_str().unwrap().to_string();
    let (status, _) = send(
        &app,
        "POST",
        &employees_uri,
        Some(&owner),
        Some(json!({ "account_id": applicant_account })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_resources_are_404() {
    let app = test_app();
    let nil = uuid::Uuid::new_v4();

    let (status, _) = send(&app, "GET", &format!("/api/jobs/{nil}/"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", &format!("/api/companies/{nil}/"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (token, _) = register(&app, "boss@acme.com", "employer", &[]).await;
    let (status, _) = send(&app, "GET", &format!("/api/applicants/{nil}/"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

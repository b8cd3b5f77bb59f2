//! Registration, token and Google sign-in handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use jobgrid_models::{Account, Applicant, Role};
use jobgrid_store::StoreError;

use crate::auth::{generate_salt, hash_password, verify_password, TokenPair};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    /// "applicant" or "employer"
    pub role: String,
    /// Display name; applicant profiles require one
    pub name: Option<String>,
    pub contact: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub account_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant_id: Option<Uuid>,
    pub tokens: TokenPair,
}

/// Create an account with credentials, plus an applicant profile for
/// applicant registrations.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let role = match Role::parse(&request.role) {
        Some(role @ (Role::Applicant | Role::Employer)) => role,
        _ => {
            return Err(ApiError::bad_request(
                "role must be \"applicant\" or \"employer\"",
            ))
        }
    };

    let mut account = Account::new(request.email.trim().to_lowercase(), role);
    account.salt = generate_salt();
    account.password_hash = Some(hash_password(
        &state.config.jwt_secret,
        &account.salt,
        &request.password,
    ));
    let account = state
        .store
        .insert_account(account)
        .await
        .map_err(|e| match e {
            StoreError::Duplicate(_) => ApiError::Conflict("email already registered".to_string()),
            other => other.into(),
        })?;

    let applicant_id = if role == Role::Applicant {
        let name = request
            .name
            .clone()
            .unwrap_or_else(|| account.email.clone());
        let mut applicant = Applicant::new(account.id, name, account.email.clone());
        applicant.contact = request.contact.clone().unwrap_or_default();
        applicant.skills = request
            .skills
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        Some(state.store.insert_applicant(applicant).await?.id)
    } else {
        None
    };

    let tokens = state.tokens.issue_pair(account.id, role.as_str())?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            account_id: account.id,
            applicant_id,
            tokens,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ObtainTokenRequest {
    pub email: String,
    pub password: String,
}

/// Exchange credentials for an access/refresh pair.
pub async fn obtain_token(
    State(state): State<AppState>,
    Json(request): Json<ObtainTokenRequest>,
) -> ApiResult<Json<TokenPair>> {
    let account = state
        .store
        .account_by_email(request.email.trim())
        .await?
        .ok_or_else(|| ApiError::unauthenticated("Invalid credentials"))?;

    let Some(hash) = &account.password_hash else {
        // Federated account: no password login.
        return Err(ApiError::unauthenticated("Invalid credentials"));
    };
    if !verify_password(&state.config.jwt_secret, &account.salt, &request.password, hash) {
        return Err(ApiError::unauthenticated("Invalid credentials"));
    }

    let pair = state.tokens.issue_pair(account.id, account.role.as_str())?;
    Ok(Json(pair))
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// Exchange a live refresh token for a new access token.
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let claims = state.tokens.verify(&request.refresh, "refresh")?;
    if state.store.is_token_revoked(&claims.jti).await? {
        return Err(ApiError::unauthenticated("Refresh token revoked"));
    }
    let account_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::unauthenticated("Malformed subject claim"))?;
    let account = state
        .store
        .account_by_id(account_id)
        .await?
        .ok_or_else(|| ApiError::unauthenticated("Unknown account"))?;

    let access = state.tokens.issue_access(account.id, account.role.as_str())?;
    Ok(Json(RefreshResponse { access }))
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

/// Check a token's signature and expiry. Accepts either token use.
pub async fn verify_token(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    state
        .tokens
        .verify(&request.token, "access")
        .or_else(|_| state.tokens.verify(&request.token, "refresh"))?;
    Ok(Json(serde_json::json!({})))
}

/// Blacklist a refresh token for the rest of its lifetime.
pub async fn revoke_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> ApiResult<StatusCode> {
    let claims = state.tokens.verify(&request.refresh, "refresh")?;
    let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now);
    state.store.revoke_token(&claims.jti, expires_at).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    pub id_token: String,
}

/// Verify a Google ID token, provisioning an applicant account on first
/// sign-in, and issue first-party tokens.
pub async fn google_login(
    State(state): State<AppState>,
    Json(request): Json<GoogleLoginRequest>,
) -> ApiResult<Json<TokenPair>> {
    let verifier = state
        .google
        .as_ref()
        .ok_or_else(|| ApiError::bad_request("Google sign-in is not configured"))?;

    let claims = verifier.verify(&request.id_token).await?;
    let email = claims
        .email
        .as_deref()
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::unauthenticated("Google token carries no email"))?
        .to_lowercase();
    if !claims.email_verified.unwrap_or(false) {
        return Err(ApiError::unauthenticated("Google email is not verified"));
    }

    let account = match state.store.account_by_email(&email).await? {
        Some(account) => account,
        None => {
            // First sign-in: provision an applicant account without a password.
            let mut account = Account::new(email.clone(), Role::Applicant);
            account.salt = generate_salt();
            let account = state.store.insert_account(account).await?;

            let name = claims.name.clone().unwrap_or_else(|| email.clone());
            let applicant = Applicant::new(account.id, name, email);
            state.store.insert_applicant(applicant).await?;
            account
        }
    };

    let pair = state.tokens.issue_pair(account.id, account.role.as_str())?;
    Ok(Json(pair))
}

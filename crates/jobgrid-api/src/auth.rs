//! Token issuing and request authentication.
//!
//! Two token families:
//! - First-party HS256 access/refresh tokens issued by [`TokenIssuer`].
//! - Google ID tokens (RS256), verified against Google's JWKS by
//!   [`GoogleVerifier`] and exchanged for first-party tokens.
//!
//! The [`AuthUser`] extractor resolves a bearer access token to a
//! [`Principal`] with its ownership scope; [`MaybeAuthUser`] additionally
//! admits anonymous requests.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use base64::prelude::*;
use hmac::{Hmac, Mac};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use jobgrid_engine::RequestContext;
use jobgrid_models::Principal;

use crate::error::ApiError;
use crate::state::AppState;

/// Google JWKS URL for ID token verification.
const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

/// Accepted Google token issuers.
const GOOGLE_ISSUERS: [&str; 2] = ["https://accounts.google.com", "accounts.google.com"];

/// JWKS cache TTL.
const JWKS_CACHE_TTL: Duration = Duration::from_secs(3600);

type HmacSha256 = Hmac<Sha256>;

/// First-party token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: String,
    /// Role at issue time (informational; the store is authoritative)
    pub role: String,
    /// "access" or "refresh"
    pub token_use: String,
    /// Token id, used for refresh revocation
    pub jti: String,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
}

/// An access + refresh token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Issues and verifies first-party HS256 tokens.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    fn issue(
        &self,
        account_id: Uuid,
        role: &str,
        token_use: &str,
        ttl: Duration,
    ) -> Result<String, ApiError> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: account_id.to_string(),
            role: role.to_string(),
            token_use: token_use.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + chrono::Duration::from_std(ttl).unwrap_or_default()).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::internal(format!("Token encoding failed: {}", e)))
    }

    /// Issue a fresh access token.
    pub fn issue_access(&self, account_id: Uuid, role: &str) -> Result<String, ApiError> {
        self.issue(account_id, role, "access", self.access_ttl)
    }

    /// Issue an access + refresh pair.
    pub fn issue_pair(&self, account_id: Uuid, role: &str) -> Result<TokenPair, ApiError> {
        Ok(TokenPair {
            access: self.issue(account_id, role, "access", self.access_ttl)?,
            refresh: self.issue(account_id, role, "refresh", self.refresh_ttl)?,
        })
    }

    /// Verify signature, expiry and token use.
    pub fn verify(&self, token: &str, expected_use: &str) -> Result<Claims, ApiError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| ApiError::unauthenticated(format!("Invalid token: {}", e)))?;
        if data.claims.token_use != expected_use {
            return Err(ApiError::unauthenticated(format!(
                "Expected {} token",
                expected_use
            )));
        }
        Ok(data.claims)
    }
}

// ============================================================================
// Password hashing
// ============================================================================

/// Random per-account salt.
pub fn generate_salt() -> String {
    BASE64_STANDARD.encode(Uuid::new_v4().as_bytes())
}

/// Keyed password hash: HMAC-SHA256 over salt || password, keyed with the
/// server secret so a leaked store alone is not crackable offline.
pub fn hash_password(secret: &str, salt: &str, password: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(salt.as_bytes());
    mac.update(password.as_bytes());
    BASE64_STANDARD.encode(mac.finalize().into_bytes())
}

/// Constant-time password check.
pub fn verify_password(secret: &str, salt: &str, password: &str, expected: &str) -> bool {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(salt.as_bytes());
    mac.update(password.as_bytes());
    match BASE64_STANDARD.decode(expected) {
        Ok(bytes) => mac.verify_slice(&bytes).is_ok(),
        Err(_) => false,
    }
}

// ============================================================================
// Google sign-in
// ============================================================================

/// Decoded Google ID token claims.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleClaims {
    /// Google subject id
    pub sub: String,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub name: Option<String>,
    pub iss: String,
    pub aud: String,
    pub exp: i64,
}

/// JWKS response from Google.
#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<JwkKey>,
}

#[derive(Debug, Clone, Deserialize)]
struct JwkKey {
    kid: String,
    n: String,
    e: String,
}

/// Verifies Google ID tokens against a cached JWKS key set.
pub struct GoogleVerifier {
    http: Client,
    keys: RwLock<HashMap<String, DecodingKey>>,
    last_refresh: RwLock<Option<Instant>>,
    client_id: String,
}

impl GoogleVerifier {
    /// Create a verifier for the given OAuth client id. Keys are fetched
    /// lazily on first verification.
    pub fn new(client_id: String) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ApiError::internal(format!("HTTP client init failed: {}", e)))?;
        Ok(Self {
            http,
            keys: RwLock::new(HashMap::new()),
            last_refresh: RwLock::new(None),
            client_id,
        })
    }

    /// Refresh JWKS keys from Google.
    async fn refresh_keys(&self) -> Result<(), ApiError> {
        debug!("Refreshing Google JWKS keys");

        let response = self
            .http
            .get(GOOGLE_JWKS_URL)
            .send()
            .await
            .map_err(|e| ApiError::internal(format!("JWKS fetch failed: {}", e)))?;
        let jwks: JwksResponse = response
            .json()
            .await
            .map_err(|e| ApiError::internal(format!("JWKS parse failed: {}", e)))?;

        let mut keys = HashMap::new();
        for jwk in jwks.keys {
            let key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
                .map_err(|e| ApiError::internal(format!("Bad JWKS key: {}", e)))?;
            keys.insert(jwk.kid, key);
        }

        let key_count = keys.len();
        *self.keys.write().await = keys;
        *self.last_refresh.write().await = Some(Instant::now());

        debug!("Refreshed {} Google JWKS keys", key_count);
        Ok(())
    }

    async fn get_key(&self, kid: &str) -> Option<DecodingKey> {
        let needs_refresh = match *self.last_refresh.read().await {
            Some(last) => last.elapsed() > JWKS_CACHE_TTL,
            None => true,
        };

        if needs_refresh {
            if let Err(e) = self.refresh_keys().await {
                warn!("Failed to refresh Google JWKS keys: {}", e);
            }
        }

        self.keys.read().await.get(kid).cloned()
    }

    /// Verify a Google ID token.
    pub async fn verify(&self, token: &str) -> Result<GoogleClaims, ApiError> {
        let header = decode_header(token)
            .map_err(|e| ApiError::unauthenticated(format!("Invalid token header: {}", e)))?;
        let kid = header
            .kid
            .ok_or_else(|| ApiError::unauthenticated("Token missing key ID"))?;

        let key = self
            .get_key(&kid)
            .await
            .ok_or_else(|| ApiError::unauthenticated("Unknown key ID"))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&GOOGLE_ISSUERS);
        validation.set_audience(&[&self.client_id]);

        let data = decode::<GoogleClaims>(token, &key, &validation)
            .map_err(|e| ApiError::unauthenticated(format!("Token validation failed: {}", e)))?;

        Ok(data.claims)
    }
}

// ============================================================================
// Extractors
// ============================================================================

/// Authenticated principal extracted from the Authorization header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub principal: Principal,
}

impl AuthUser {
    /// Build the per-request engine context.
    pub fn ctx(&self) -> RequestContext {
        RequestContext::new(self.principal.clone())
    }
}

/// Principal extractor that admits anonymous requests: no Authorization
/// header yields the anonymous principal, a present-but-invalid one is
/// still rejected.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser {
    pub principal: Principal,
}

impl MaybeAuthUser {
    pub fn ctx(&self) -> RequestContext {
        RequestContext::new(self.principal.clone())
    }
}

fn bearer_token(parts: &Parts) -> Result<Option<&str>, ApiError> {
    let Some(value) = parts.headers.get("Authorization") else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| ApiError::unauthenticated("Invalid Authorization header"))?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthenticated("Invalid Authorization header format"))?;
    Ok(Some(token))
}

/// Resolve verified claims to a principal with its current ownership scope.
/// The store, not the token, is authoritative for role and scope.
pub async fn resolve_principal(state: &AppState, claims: &Claims) -> Result<Principal, ApiError> {
    let account_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::unauthenticated("Malformed subject claim"))?;
    let account = state
        .store
        .account_by_id(account_id)
        .await?
        .ok_or_else(|| ApiError::unauthenticated("Unknown account"))?;
    let company_ids = state.store.company_ids_for_account(account_id).await?;
    let applicant_id = state
        .store
        .applicant_by_account(account_id)
        .await?
        .map(|a| a.id);

    Ok(Principal {
        account_id,
        role: account.role,
        company_ids,
        applicant_id,
    })
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| ApiError::unauthenticated("Missing Authorization header"))?;
        let claims = state.tokens.verify(token, "access")?;
        let principal = resolve_principal(state, &claims).await?;
        Ok(AuthUser { principal })
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts)? {
            None => Ok(MaybeAuthUser {
                principal: Principal::anonymous(),
            }),
            Some(token) => {
                let claims = state.tokens.verify(token, "access")?;
                let principal = resolve_principal(state, &claims).await?;
                Ok(MaybeAuthUser { principal })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let issuer = TokenIssuer::new(
            "test-secret",
            Duration::from_secs(60),
            Duration::from_secs(3600),
        );
        let account_id = Uuid::new_v4();
        let pair = issuer.issue_pair(account_id, "applicant").unwrap();

        let access = issuer.verify(&pair.access, "access").unwrap();
        assert_eq!(access.sub, account_id.to_string());
        assert_eq!(access.role, "applicant");

        let refresh = issuer.verify(&pair.refresh, "refresh").unwrap();
        assert_ne!(access.jti, refresh.jti);

        // Wrong use is rejected
        assert!(issuer.verify(&pair.refresh, "access").is_err());
        // Wrong key is rejected
        let other = TokenIssuer::new(
            "other-secret",
            Duration::from_secs(60),
            Duration::from_secs(3600),
        );
        assert!(other.verify(&pair.access, "access").is_err());
    }

    #[test]
    fn test_password_hashing() {
        let salt = generate_salt();
        let hash = hash_password("secret", &salt, "hunter2");

        assert!(verify_password("secret", &salt, "hunter2", &hash));
        assert!(!verify_password("secret", &salt, "hunter3", &hash));
        assert!(!verify_password("other", &salt, "hunter2", &hash));
        assert!(!verify_password("secret", "othersalt", "hunter2", &hash));
        assert!(!verify_password("secret", &salt, "hunter2", "not-base64!!"));
    }
}

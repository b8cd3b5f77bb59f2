//! Account credential record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::principal::Role;

/// A login account backing either an applicant or an employer principal.
///
/// The password is stored as a salted keyed hash; the plaintext never
/// leaves the token handlers. Google-federated accounts have no password
/// hash at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier
    pub id: Uuid,
    /// Login email, unique across accounts
    pub email: String,
    /// Keyed password hash (hex); `None` for federated accounts
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Per-account random salt (hex)
    #[serde(skip_serializing)]
    pub salt: String,
    /// Role granted to principals authenticated with this account
    pub role: Role,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account. Hashing is the caller's concern.
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash: None,
            salt: String::new(),
            role,
            created_at: Utc::now(),
        }
    }
}

//! Company profile model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A company that posts jobs.
///
/// Ownership is account-based: every account id in `owner_account_ids`
/// may mutate the company and act on its jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    /// Unique company identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Free-form profile description
    #[serde(default)]
    pub description: String,
    /// Company website, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Headquarters / primary location
    #[serde(default)]
    pub location: String,
    /// Accounts allowed to administer this company
    pub owner_account_ids: Vec<Uuid>,
    /// When the company was created
    pub created_at: DateTime<Utc>,
    /// When the profile was last updated
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Create a new company owned by a single account.
    pub fn new(name: impl Into<String>, owner: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            website: None,
            location: String::new(),
            owner_account_ids: vec![owner],
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether an account administers this company.
    pub fn is_owned_by(&self, account_id: Uuid) -> bool {
        self.owner_account_ids.contains(&account_id)
    }
}

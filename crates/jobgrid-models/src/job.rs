//! Job posting and employee models.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a job is accepting applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Accepting applications
    #[default]
    Open,
    /// No longer accepting applications
    Closed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Open => "open",
            JobStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A job posting owned by a company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier
    pub id: Uuid,
    /// Owning company
    pub company_id: Uuid,
    /// Job title
    pub title: String,
    /// Job description
    #[serde(default)]
    pub description: String,
    /// Location of the role
    #[serde(default)]
    pub location: String,
    /// Lower bound of the advertised salary band
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_min: Option<u64>,
    /// Upper bound of the advertised salary band
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_max: Option<u64>,
    /// Skills the role requires; normalized to lowercase
    #[serde(default)]
    pub required_skills: BTreeSet<String>,
    /// Whether the job accepts applications
    #[serde(default)]
    pub status: JobStatus,
    /// Running count of applications received
    #[serde(default)]
    pub applications_count: u64,
    /// When the job was posted
    pub created_at: DateTime<Utc>,
    /// When the posting was last updated
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a new open job for a company.
    pub fn new(company_id: Uuid, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            company_id,
            title: title.into(),
            description: String::new(),
            location: String::new(),
            salary_min: None,
            salary_max: None,
            required_skills: BTreeSet::new(),
            status: JobStatus::Open,
            applications_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the job currently accepts applications.
    pub fn is_open(&self) -> bool {
        self.status == JobStatus::Open
    }
}

/// An employer-side staff member, associating an account with a company.
///
/// The association is what scopes an employer principal: a principal may
/// only act on jobs and applications of companies it is associated with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    /// Unique employee record identifier
    pub id: Uuid,
    /// Linked identity
    pub account_id: Uuid,
    /// Company the employee belongs to
    pub company_id: Uuid,
    /// Role title within the company
    #[serde(default)]
    pub title: String,
    /// When the association was created
    pub created_at: DateTime<Utc>,
}

impl Employee {
    pub fn new(account_id: Uuid, company_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            company_id,
            title: String::new(),
            created_at: Utc::now(),
        }
    }
}

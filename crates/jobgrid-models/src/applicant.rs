//! Applicant profile model.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A job seeker's profile.
///
/// One applicant may submit many applications, but at most one per job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Applicant {
    /// Unique applicant identifier
    pub id: Uuid,
    /// Linked identity
    pub account_id: Uuid,
    /// Full name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Phone or other contact handle
    #[serde(default)]
    pub contact: String,
    /// Self-reported skills; normalized to lowercase
    #[serde(default)]
    pub skills: BTreeSet<String>,
    /// Link to an externally stored resume
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
    /// When the profile was created
    pub created_at: DateTime<Utc>,
}

impl Applicant {
    /// Create a new applicant profile for an account.
    pub fn new(account_id: Uuid, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            name: name.into(),
            email: email.into(),
            contact: String::new(),
            skills: BTreeSet::new(),
            resume_url: None,
            created_at: Utc::now(),
        }
    }

    /// Number of skills shared with a required-skill set.
    ///
    /// Comparison is case-insensitive; both sides are lowercased.
    pub fn skill_overlap(&self, required: &BTreeSet<String>) -> u32 {
        self.skills
            .iter()
            .filter(|s| required.contains(&s.to_lowercase()))
            .count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_overlap() {
        let mut applicant = Applicant::new(Uuid::new_v4(), "Ada", "ada@example.com");
        applicant.skills = ["python", "rust", "sql"]
            .into_iter()
            .map(String::from)
            .collect();

        let required: BTreeSet<String> = ["rust", "sql", "go"]
            .into_iter()
            .map(String::from)
            .collect();

        assert_eq!(applicant.skill_overlap(&required), 2);
        assert_eq!(applicant.skill_overlap(&BTreeSet::new()), 0);
    }
}

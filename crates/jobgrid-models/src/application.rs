//! Application model and its status state machine.
//!
//! The status lifecycle is the core invariant of the system: transitions
//! only move forward through the table below, `Hired` and `Rejected` are
//! absorbing, and every change is recorded in an append-only history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Just submitted by the applicant
    #[default]
    Submitted,
    /// Employer has started reviewing
    UnderReview,
    /// Candidate selected for the next stage
    Shortlisted,
    /// Candidate rejected (terminal)
    Rejected,
    /// Candidate hired (terminal)
    Hired,
}

impl ApplicationStatus {
    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Hired => "hired",
        }
    }

    /// Parse a status from its wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "submitted" => Some(ApplicationStatus::Submitted),
            "under_review" => Some(ApplicationStatus::UnderReview),
            "shortlisted" => Some(ApplicationStatus::Shortlisted),
            "rejected" => Some(ApplicationStatus::Rejected),
            "hired" => Some(ApplicationStatus::Hired),
            _ => None,
        }
    }

    /// Check if this is a terminal state (no outgoing transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, ApplicationStatus::Hired | ApplicationStatus::Rejected)
    }

    /// Whether moving to `next` is a legal transition.
    ///
    /// The full table:
    /// `submitted → under_review`,
    /// `under_review → shortlisted | rejected`,
    /// `shortlisted → hired | rejected`.
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        matches!(
            (self, next),
            (Submitted, UnderReview)
                | (UnderReview, Shortlisted)
                | (UnderReview, Rejected)
                | (Shortlisted, Hired)
                | (Shortlisted, Rejected)
        )
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One recorded status change. History entries are never rewritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
    /// Status before the change
    pub from: ApplicationStatus,
    /// Status after the change
    pub to: ApplicationStatus,
    /// When the change happened
    pub at: DateTime<Utc>,
    /// Account that triggered the change
    pub actor_id: Uuid,
}

/// An applicant's application against a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    /// Unique application identifier
    pub id: Uuid,
    /// Referenced job
    pub job_id: Uuid,
    /// Submitting applicant
    pub applicant_id: Uuid,
    /// Current lifecycle status
    pub status: ApplicationStatus,
    /// When the application was submitted
    pub submitted_at: DateTime<Utc>,
    /// Append-only status change audit trail
    #[serde(default)]
    pub history: Vec<StatusChange>,
    /// Ranking score, populated by ranked listings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
}

impl Application {
    /// Create a new application in `Submitted`.
    pub fn new(job_id: Uuid, applicant_id: Uuid, submitted_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_id,
            applicant_id,
            status: ApplicationStatus::Submitted,
            submitted_at,
            history: Vec::new(),
            score: None,
        }
    }

    /// Apply a validated transition, appending to the audit history.
    ///
    /// Callers must have validated the transition with
    /// [`ApplicationStatus::can_transition_to`] first.
    pub fn record_transition(
        &mut self,
        to: ApplicationStatus,
        at: DateTime<Utc>,
        actor_id: Uuid,
    ) {
        self.history.push(StatusChange {
            from: self.status,
            to,
            at,
            actor_id,
        });
        self.status = to;
    }
}

//! Filter predicates and pagination requests.
//!
//! These are the structured predicate sets the store evaluates. Parsing
//! of raw query-parameter maps into these types lives in the engine's
//! query module; the store only ever sees the structured form.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::job::Job;
use crate::Applicant;

/// Predicates over job listings. Empty filter matches every job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobFilter {
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    /// Case-insensitive substring of the location
    pub location: Option<String>,
    /// Inclusive lower bound; matches jobs whose band reaches it
    pub min_salary: Option<u64>,
    /// Inclusive upper bound; matches jobs whose band starts under it
    pub max_salary: Option<u64>,
    /// Lowercased skills; match when the intersection is non-empty
    pub skills: BTreeSet<String>,
    /// Restrict to open jobs (anonymous listings force this on)
    pub open_only: bool,
}

impl JobFilter {
    /// Evaluate the predicate set against a job.
    ///
    /// Salary bounds match on band intersection: `min_salary` requires the
    /// job's upper bound (or lower, if no upper is set) to reach it, and
    /// `max_salary` requires the job's lower bound to stay under it.
    pub fn matches(&self, job: &Job) -> bool {
        if self.open_only && !job.is_open() {
            return false;
        }
        if let Some(title) = &self.title {
            if !job.title.to_lowercase().contains(&title.to_lowercase()) {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if !job.location.to_lowercase().contains(&location.to_lowercase()) {
                return false;
            }
        }
        if let Some(min) = self.min_salary {
            let top = job.salary_max.or(job.salary_min);
            match top {
                Some(top) if top >= min => {}
                _ => return false,
            }
        }
        if let Some(max) = self.max_salary {
            let bottom = job.salary_min.or(job.salary_max);
            match bottom {
                Some(bottom) if bottom <= max => {}
                _ => return false,
            }
        }
        if !self.skills.is_empty() {
            let overlap = job
                .required_skills
                .iter()
                .any(|s| self.skills.contains(&s.to_lowercase()));
            if !overlap {
                return false;
            }
        }
        true
    }
}

/// Predicates over applicant listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicantFilter {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    /// Exact email match
    pub email: Option<String>,
    /// Exact contact match
    pub contact: Option<String>,
}

impl ApplicantFilter {
    pub fn matches(&self, applicant: &Applicant) -> bool {
        if let Some(name) = &self.name {
            if !applicant.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        if let Some(email) = &self.email {
            if &applicant.email != email {
                return false;
            }
        }
        if let Some(contact) = &self.contact {
            if &applicant.contact != contact {
                return false;
            }
        }
        true
    }
}

/// A 1-based page request with a bounded page size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number
    pub page: usize,
    /// Items per page
    pub per_page: usize,
}

impl PageRequest {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Index of the first item on this page.
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.per_page
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, per_page: 20 }
    }
}

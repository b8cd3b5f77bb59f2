//! Query-parameter parsing.
//!
//! Translates a raw `name → value` map into the structured predicate sets
//! the store evaluates. The policy is permissive: unknown parameters and
//! unparsable values are ignored, never errors, so adding a query
//! parameter can never change an existing client's result set.

use std::collections::HashMap;

use jobgrid_models::{ApplicantFilter, JobFilter, PageRequest};

/// Pagination limits, sourced from server config.
#[derive(Debug, Clone, Copy)]
pub struct QueryConfig {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

/// Build a job filter from query parameters.
///
/// Recognized: `job_title`, `location`, `min_salary`, `max_salary`,
/// `skills` (comma-separated). Anything else is ignored.
pub fn parse_job_filter(params: &HashMap<String, String>) -> JobFilter {
    let mut filter = JobFilter::default();
    if let Some(title) = non_empty(params.get("job_title")) {
        filter.title = Some(title);
    }
    if let Some(location) = non_empty(params.get("location")) {
        filter.location = Some(location);
    }
    filter.min_salary = params.get("min_salary").and_then(|v| v.trim().parse().ok());
    filter.max_salary = params.get("max_salary").and_then(|v| v.trim().parse().ok());
    if let Some(skills) = params.get("skills") {
        filter.skills = skills
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
    }
    filter
}

/// Build an applicant filter from query parameters.
///
/// Recognized: `name` (substring), `email` (exact), `contact` (exact).
pub fn parse_applicant_filter(params: &HashMap<String, String>) -> ApplicantFilter {
    ApplicantFilter {
        name: non_empty(params.get("name")),
        email: non_empty(params.get("email")),
        contact: non_empty(params.get("contact")),
    }
}

/// Build a page request from `page` and `jobs_per_page`/`page_size`.
///
/// `page` is 1-based and defaults to 1; the page size is clamped to
/// `cfg.max_page_size`. Invalid values fall back to the defaults.
pub fn parse_page(params: &HashMap<String, String>, cfg: QueryConfig) -> PageRequest {
    let page = params
        .get("page")
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1);
    let per_page = params
        .get("jobs_per_page")
        .or_else(|| params.get("page_size"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|s| *s >= 1)
        .unwrap_or(cfg.default_page_size)
        .min(cfg.max_page_size);
    PageRequest::new(page, per_page)
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_job_filter_parsing() {
        let p = params(&[
            ("job_title", "engineer"),
            ("location", "Berlin"),
            ("min_salary", "50000"),
            ("max_salary", "90000"),
            ("skills", "Rust, SQL ,"),
        ]);
        let f = parse_job_filter(&p);
        assert_eq!(f.title.as_deref(), Some("engineer"));
        assert_eq!(f.location.as_deref(), Some("Berlin"));
        assert_eq!(f.min_salary, Some(50_000));
        assert_eq!(f.max_salary, Some(90_000));
        assert_eq!(f.skills.len(), 2);
        assert!(f.skills.contains("rust"));
        assert!(f.skills.contains("sql"));
    }

    #[test]
    fn test_unknown_parameters_are_ignored() {
        let base = params(&[("job_title", "engineer")]);
        let mut extended = base.clone();
        extended.insert("utm_source".to_string(), "newsletter".to_string());
        extended.insert("sort".to_string(), "salary".to_string());

        let a = parse_job_filter(&base);
        let b = parse_job_filter(&extended);
        assert_eq!(a.title, b.title);
        assert_eq!(a.min_salary, b.min_salary);
        assert_eq!(a.skills, b.skills);
    }

    #[test]
    fn test_unparsable_values_fall_back() {
        let p = params(&[("min_salary", "a lot"), ("page", "-3"), ("page_size", "zero")]);
        let f = parse_job_filter(&p);
        assert_eq!(f.min_salary, None);

        let page = parse_page(&p, QueryConfig::default());
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, QueryConfig::default().default_page_size);
    }

    #[test]
    fn test_page_size_clamped_to_max() {
        let p = params(&[("page", "2"), ("jobs_per_page", "500")]);
        let page = parse_page(&p, QueryConfig { default_page_size: 20, max_page_size: 100 });
        assert_eq!(page.page, 2);
        assert_eq!(page.per_page, 100);
    }

    #[test]
    fn test_applicant_filter_parsing() {
        let p = params(&[("name", "ada"), ("email", "ada@example.com"), ("x", "y")]);
        let f = parse_applicant_filter(&p);
        assert_eq!(f.name.as_deref(), Some("ada"));
        assert_eq!(f.email.as_deref(), Some("ada@example.com"));
        assert_eq!(f.contact, None);
    }
}

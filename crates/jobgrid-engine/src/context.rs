//! Explicit per-request context.

use chrono::{DateTime, Utc};
use jobgrid_models::Principal;

/// Everything a pipeline or policy call needs to know about the request:
/// who is acting and when. Built once by the gateway, passed by reference.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub principal: Principal,
    pub now: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            now: Utc::now(),
        }
    }

    /// Context for an unauthenticated request.
    pub fn anonymous() -> Self {
        Self::new(Principal::anonymous())
    }

    /// Fixed-clock constructor for deterministic tests.
    pub fn at(principal: Principal, now: DateTime<Utc>) -> Self {
        Self { principal, now }
    }
}

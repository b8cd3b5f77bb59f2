//! Principal and role types.
//!
//! A principal is the resolved identity of a request: who is acting, with
//! what role, over which companies. It is passed explicitly into every
//! engine call; there is no ambient request state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role carried by a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Unauthenticated request
    #[default]
    Anonymous,
    /// Job seeker
    Applicant,
    /// Employer-side staff
    Employer,
    /// Platform administrator
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Anonymous => "anonymous",
            Role::Applicant => "applicant",
            Role::Employer => "employer",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "anonymous" => Some(Role::Anonymous),
            "applicant" => Some(Role::Applicant),
            "employer" => Some(Role::Employer),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The authenticated (or anonymous) identity acting on a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// Account id; nil for anonymous principals
    pub account_id: Uuid,
    /// Role of the account
    pub role: Role,
    /// Companies the principal administers (employer scope)
    #[serde(default)]
    pub company_ids: Vec<Uuid>,
    /// Applicant profile linked to the account, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant_id: Option<Uuid>,
}

impl Principal {
    /// The anonymous principal.
    pub fn anonymous() -> Self {
        Self {
            account_id: Uuid::nil(),
            role: Role::Anonymous,
            company_ids: Vec::new(),
            applicant_id: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_anonymous(&self) -> bool {
        self.role == Role::Anonymous
    }

    /// Whether the principal's employer scope covers a company.
    /// Admins cover everything.
    pub fn covers_company(&self, company_id: Uuid) -> bool {
        self.is_admin() || (self.role == Role::Employer && self.company_ids.contains(&company_id))
    }

    /// Whether the principal is the given applicant. Admins qualify.
    pub fn is_applicant(&self, applicant_id: Uuid) -> bool {
        self.is_admin() || self.applicant_id == Some(applicant_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_scope() {
        let company = Uuid::new_v4();
        let other = Uuid::new_v4();

        let employer = Principal {
            account_id: Uuid::new_v4(),
            role: Role::Employer,
            company_ids: vec![company],
            applicant_id: None,
        };
        assert!(employer.covers_company(company));
        assert!(!employer.covers_company(other));

        let admin = Principal {
            account_id: Uuid::new_v4(),
            role: Role::Admin,
            company_ids: vec![],
            applicant_id: None,
        };
        assert!(admin.covers_company(other));

        assert!(!Principal::anonymous().covers_company(company));
    }
}

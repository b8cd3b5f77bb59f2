//! Application pipeline engine for the JobGrid backend.
//!
//! Transport-free core: the status lifecycle of applications, the
//! authorization policy and the query-parameter parser. Every operation
//! takes an explicit [`RequestContext`] carrying the acting principal and
//! the request timestamp; there is no ambient state.

pub mod context;
pub mod error;
pub mod pipeline;
pub mod policy;
pub mod query;

pub use context::RequestContext;
pub use error::{EngineError, EngineResult};
pub use pipeline::{Pipeline, RankCriteria};
pub use policy::{authorize, Action, Resource};
pub use query::{parse_applicant_filter, parse_job_filter, parse_page, QueryConfig};

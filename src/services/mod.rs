//! Service layer for the advisor client.
//!
//! - `AdvisorApi`: the remote operations the form depends on
//! - `HttpAdvisor`: its reqwest implementation

mod advisor;
#[cfg(test)]
pub(crate) mod fake;

pub use advisor::{AdvisorApi, HttpAdvisor};

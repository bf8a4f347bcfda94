//! Review decision for a pull request

use crate::checks::CheckResult;
use crate::error::GateError;
use crate::notify::ReviewEvent;

const APPROVAL_MESSAGE: &str = "All Jira Checks Have Passed";

/// What the gate tells the pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Approve,
    RequestChanges(GateError),
}

impl Decision {
    pub fn is_approved(&self) -> bool {
        matches!(self, Decision::Approve)
    }

    pub fn event(&self) -> ReviewEvent {
        match self {
            Decision::Approve => ReviewEvent::Approve,
            Decision::RequestChanges(_) => ReviewEvent::RequestChanges,
        }
    }

    /// Review body posted with the event
    pub fn body(&self) -> String {
        match self {
            Decision::Approve => APPROVAL_MESSAGE.to_string(),
            Decision::RequestChanges(err) => err.to_string(),
        }
    }

    /// Error code of the failure, if any
    pub fn error_code(&self) -> Option<u16> {
        match self {
            Decision::Approve => None,
            Decision::RequestChanges(err) => Some(err.code()),
        }
    }
}

/// Fold check results into a decision; the first failure wins.
pub fn decide(results: &[CheckResult]) -> Decision {
    results
        .iter()
        .fold(Decision::Approve, |decision, result| match decision {
            Decision::Approve if !result.passed => Decision::RequestChanges(result.kind.failure()),
            decided => decided,
        })
}

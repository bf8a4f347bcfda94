//! Approval Checks
//!
//! The three rules a pull request's issue must satisfy. Every rule is always
//! evaluated so the log shows the full picture, even after a failure.

use crate::config::GateConfig;
use crate::error::GateError;
use crate::jira::{Issue, IssueLookup};

/// One approval rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    /// The issue exists under the requested key
    Existence,
    /// The issue is in the release state
    State,
    /// The issue meets SOX approval requirements
    Compliance,
}

impl CheckKind {
    /// Evaluation order
    pub const ALL: [CheckKind; 3] = [CheckKind::Existence, CheckKind::State, CheckKind::Compliance];

    pub fn name(&self) -> &'static str {
        match self {
            CheckKind::Existence => "Existence Test",
            CheckKind::State => "State Test",
            CheckKind::Compliance => "Sox Test",
        }
    }

    /// Error reported when this check fails
    pub fn failure(&self) -> GateError {
        match self {
            CheckKind::Existence => GateError::Existence,
            CheckKind::State => GateError::State,
            CheckKind::Compliance => GateError::Compliance,
        }
    }
}

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckResult {
    pub kind: CheckKind,
    pub passed: bool,
}

impl CheckResult {
    pub fn new(kind: CheckKind, passed: bool) -> Self {
        Self { kind, passed }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn error_code(&self) -> u16 {
        self.kind.failure().code()
    }
}

/// The issue Jira returned is the one that was asked for
pub fn existence_check(issue_key: &str, requested_key: &str) -> bool {
    issue_key == requested_key
}

/// Exact, case-sensitive match against the release state
pub fn state_check(current_state: &str, release_state: &str) -> bool {
    current_state == release_state
}

/// Decides whether an issue satisfies compliance requirements.
///
/// `issue` is `None` when Jira has no issue under the requested key.
pub trait CompliancePolicy: Send + Sync {
    fn approves(&self, issue: Option<&Issue>) -> bool;
}

/// SOX compliance policy.
///
/// No SOX rules are enforced yet, so every input is approved.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoxPolicy;

impl CompliancePolicy for SoxPolicy {
    fn approves(&self, _issue: Option<&Issue>) -> bool {
        true
    }
}

/// Runs the approval checks against a Jira lookup
pub struct Evaluator {
    release_state: String,
    /// `None` disables the compliance check
    compliance: Option<Box<dyn CompliancePolicy>>,
}

impl Evaluator {
    pub fn new(release_state: impl Into<String>) -> Self {
        Self {
            release_state: release_state.into(),
            compliance: None,
        }
    }

    /// Evaluator for a loaded configuration; `sox_check` installs `SoxPolicy`
    pub fn from_config(config: &GateConfig) -> Self {
        let evaluator = Self::new(&config.release_state);
        if config.sox_check {
            evaluator.with_compliance(SoxPolicy)
        } else {
            evaluator
        }
    }

    /// Enable the compliance check with the given policy
    pub fn with_compliance(mut self, policy: impl CompliancePolicy + 'static) -> Self {
        self.compliance = Some(Box::new(policy));
        self
    }

    /// Evaluate every check, in `CheckKind::ALL` order
    pub fn evaluate(&self, lookup: &IssueLookup, requested_key: &str) -> [CheckResult; 3] {
        CheckKind::ALL.map(|kind| CheckResult::new(kind, self.passes(kind, lookup, requested_key)))
    }

    fn passes(&self, kind: CheckKind, lookup: &IssueLookup, requested_key: &str) -> bool {
        let issue = lookup.issue();
        match kind {
            CheckKind::Existence => {
                issue.is_some_and(|issue| existence_check(&issue.key, requested_key))
            }
            CheckKind::State => {
                issue.is_some_and(|issue| state_check(issue.status(), &self.release_state))
            }
            CheckKind::Compliance => self
                .compliance
                .as_ref()
                .map_or(true, |policy| policy.approves(issue)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUE: &str = "PROJ-123";
    const RELEASE_STATE: &str = "Ready to Release";

    struct RejectAll;

    impl CompliancePolicy for RejectAll {
        fn approves(&self, _issue: Option<&Issue>) -> bool {
            false
        }
    }

    fn found(key: &str, state: &str) -> IssueLookup {
        IssueLookup::Found(Issue::new(key, "summary", state))
    }

    fn outcomes(results: &[CheckResult]) -> Vec<bool> {
        results.iter().map(|r| r.passed).collect()
    }

    #[test]
    fn test_issue_equivalence() {
        assert!(existence_check(ISSUE, ISSUE));
        assert!(!existence_check(ISSUE, "test"));
        assert!(!existence_check("test", ISSUE));
    }

    #[test]
    fn test_state_equivalence() {
        assert!(state_check(RELEASE_STATE, RELEASE_STATE));
        assert!(!state_check(RELEASE_STATE, "test"));
        assert!(!state_check("ready to release", RELEASE_STATE));
    }

    #[test]
    fn test_sox_policy_is_placeholder() {
        assert!(SoxPolicy.approves(Some(&Issue::new(ISSUE, "", "Open"))));
        assert!(SoxPolicy.approves(None));
    }

    #[test]
    fn test_all_checks_pass() {
        let evaluator = Evaluator::new(RELEASE_STATE);
        let results = evaluator.evaluate(&found(ISSUE, RELEASE_STATE), ISSUE);

        assert_eq!(
            results.map(|r| r.kind),
            [CheckKind::Existence, CheckKind::State, CheckKind::Compliance]
        );
        assert_eq!(outcomes(&results), vec![true, true, true]);
    }

    #[test]
    fn test_not_found_fails_existence_and_state() {
        let evaluator = Evaluator::new(RELEASE_STATE);
        let results = evaluator.evaluate(&IssueLookup::NotFound, ISSUE);

        assert_eq!(outcomes(&results), vec![false, false, true]);
        assert_eq!(results[0].error_code(), 0);
        assert_eq!(results[1].error_code(), 1);
    }

    #[test]
    fn test_wrong_state_only_fails_state() {
        let evaluator = Evaluator::new(RELEASE_STATE);
        let results = evaluator.evaluate(&found(ISSUE, "In Progress"), ISSUE);

        assert_eq!(outcomes(&results), vec![true, false, true]);
    }

    #[test]
    fn test_compliance_policy_is_consulted() {
        let evaluator = Evaluator::new(RELEASE_STATE).with_compliance(RejectAll);
        let results = evaluator.evaluate(&found(ISSUE, RELEASE_STATE), ISSUE);

        assert_eq!(outcomes(&results), vec![true, true, false]);
        assert_eq!(results[2].error_code(), 2);
        assert_eq!(results[2].name(), "Sox Test");
    }

    #[test]
    fn test_enabled_sox_check_passes_without_issue() {
        let evaluator = Evaluator::new(RELEASE_STATE).with_compliance(SoxPolicy);
        let results = evaluator.evaluate(&IssueLookup::NotFound, ISSUE);

        assert_eq!(outcomes(&results), vec![false, false, true]);
        assert_eq!(crate::decision::decide(&results).error_code(), Some(0));
    }

    #[test]
    fn test_policy_sees_missing_issue() {
        struct RequireIssue;

        impl CompliancePolicy for RequireIssue {
            fn approves(&self, issue: Option<&Issue>) -> bool {
                issue.is_some()
            }
        }

        let evaluator = Evaluator::new(RELEASE_STATE).with_compliance(RequireIssue);
        assert!(!evaluator.evaluate(&IssueLookup::NotFound, ISSUE)[2].passed);
        assert!(evaluator.evaluate(&found(ISSUE, RELEASE_STATE), ISSUE)[2].passed);
    }

    #[test]
    fn test_evaluation_is_repeatable() {
        let evaluator = Evaluator::new(RELEASE_STATE).with_compliance(SoxPolicy);
        let lookup = found(ISSUE, "Done");

        assert_eq!(
            evaluator.evaluate(&lookup, ISSUE),
            evaluator.evaluate(&lookup, ISSUE)
        );
    }
}

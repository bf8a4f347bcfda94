//! Gate Orchestrator
//!
//! Runs one pull request through the gate: extract the project key from the
//! title, look the issue up in Jira, evaluate the approval checks and post the
//! resulting review.

use tracing::{error, info, warn};

use crate::checks::{CheckKind, CheckResult, Evaluator};
use crate::config::GateConfig;
use crate::decision::{decide, Decision};
use crate::error::{GateError, NotifyError};
use crate::jira::IssueTracker;
use crate::key::extract_key;
use crate::notify::{Notifier, ReviewEvent};

/// Evaluates a pull request and reviews it
pub struct Gate<'a> {
    config: &'a GateConfig,
    evaluator: Evaluator,
    tracker: &'a dyn IssueTracker,
    notifier: &'a dyn Notifier,
}

impl<'a> Gate<'a> {
    pub fn new(
        config: &'a GateConfig,
        tracker: &'a dyn IssueTracker,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            config,
            evaluator: Evaluator::from_config(config),
            tracker,
            notifier,
        }
    }

    /// Replace the evaluator built from the configuration
    pub fn with_evaluator(mut self, evaluator: Evaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Gate a pull request by its title.
    ///
    /// Returns the decision that was posted. Only a failure to post that
    /// decision is an error.
    pub async fn run(&self, title: &str) -> Result<Decision, NotifyError> {
        match extract_key(title, &self.config.project_pattern) {
            Some(key) => self.check(key).await,
            None => {
                warn!(title, "No project key found in PR title");
                self.conclude(Decision::RequestChanges(GateError::NoKeyFound))
                    .await
            }
        }
    }

    /// Gate a pull request by its project key
    pub async fn check(&self, key: &str) -> Result<Decision, NotifyError> {
        info!("Project Key: {}", key);

        let lookup = match self.tracker.fetch_issue(key).await {
            Ok(lookup) => lookup,
            Err(err) => {
                error!(stage = %err.stage, status = ?err.status, "{}", err);
                return self.conclude(Decision::RequestChanges(err.into())).await;
            }
        };

        let results = self.evaluator.evaluate(&lookup, key);
        let decision = match self.report_checks(key, &results).await {
            Ok(()) => decide(&results),
            Err(err) => Decision::RequestChanges(err),
        };

        if decision.is_approved() {
            info!("All checks have passed, execution is ending.");
        } else {
            info!("Check(s) failed, execution is ending.");
        }

        self.conclude(decision).await
    }

    /// Log every check and link the issue once it is known to exist
    async fn report_checks(&self, key: &str, results: &[CheckResult]) -> Result<(), GateError> {
        for result in results {
            if !result.passed {
                info!("{}: Failed", result.name());
                continue;
            }

            info!("{}: Passed", result.name());
            if result.kind == CheckKind::Existence {
                let link = self.config.browse_url(key);
                let body = format!("Link to associated Jira: [{}]({})", link, link);
                self.notifier
                    .post_review(&body, ReviewEvent::Comment)
                    .await
                    .map_err(|e| GateError::Internal(e.to_string()))?;
            }
        }
        Ok(())
    }

    async fn conclude(&self, decision: Decision) -> Result<Decision, NotifyError> {
        self.notifier
            .post_review(&decision.body(), decision.event())
            .await?;
        Ok(decision)
    }
}

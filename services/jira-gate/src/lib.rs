//! Jira Gate Library
//!
//! Approves a pull request when the Jira issue named in its title exists and
//! is ready for release, and requests changes otherwise.
//!
//! ## Flow
//!
//! 1. Extract the project key from the PR title (`key`)
//! 2. Look the issue up in Jira (`jira`)
//! 3. Run the existence, state and SOX checks (`checks`)
//! 4. Fold the results into a decision, first failure wins (`decision`)
//! 5. Post the review to the pull request (`notify`, `github`)
//!
//! `gate::Gate` ties the steps together.
//!
//! ## Example
//!
//! ```bash
//! INPUT_JIRA_URL=company.atlassian.net \
//! INPUT_JIRA_AUTH=<PAT> \
//! INPUT_JIRA_RELEASE_STATE="Ready to Release" \
//! INPUT_PROJECT_PATTERN='[A-Za-z]*-\d\d*' \
//! INPUT_GITHUB_TOKEN=<TOKEN> \
//! GITHUB_REPOSITORY=acme/widgets \
//! jira-gate --pr-title "[PROJ-123] Add login page" --pr-number 42
//! ```

pub mod checks;
pub mod config;
pub mod decision;
pub mod error;
pub mod gate;
pub mod github;
pub mod jira;
pub mod key;
pub mod notify;

#[cfg(test)]
mod test_support;

pub use config::{Args, GateConfig};
pub use decision::Decision;
pub use error::{ConfigError, GateError, NotifyError, TrackerError};
pub use gate::Gate;

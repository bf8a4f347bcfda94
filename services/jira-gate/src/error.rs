//! Error types for the Jira gate
//!
//! `GateError` is the taxonomy reported back onto the pull request. The
//! remaining types describe failures of the surrounding plumbing (configuration,
//! the Jira connection, the GitHub review post).

use thiserror::Error;

/// Reasons a pull request is sent back to its author.
///
/// Each variant carries a stable numeric code; the display text is the body of
/// the `REQUEST_CHANGES` review.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// No issue exists for the requested key
    #[error("An existing Jira issue could not be found with the given project key.")]
    Existence,

    /// Issue exists but is not in the release state
    #[error("A Jira issue has been found, however it is not in the correct state for release.")]
    State,

    /// Issue failed the SOX compliance policy
    #[error(
        "A Jira issue has been found, however it does not meet approval \
         requirements for SOX compliancy."
    )]
    Compliance,

    /// The pull request title carries no project key
    #[error("No valid project key found in PR title.")]
    NoKeyFound,

    /// Unexpected failure while evaluating the checks
    #[error("{0}")]
    Internal(String),

    /// Jira could not be queried
    #[error("Jira Error: {0}")]
    Tracker(String),
}

impl GateError {
    /// Numeric code for this failure
    pub fn code(&self) -> u16 {
        match self {
            GateError::Existence => 0,
            GateError::State => 1,
            GateError::Compliance => 2,
            GateError::NoKeyFound => 3,
            GateError::Internal(_) => 99,
            GateError::Tracker(_) => 1000,
        }
    }
}

/// Invalid or incomplete configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid project pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Jira credentials missing: {0}")]
    MissingCredentials(String),

    #[error("Invalid repository format: {0}. Expected: owner/repo")]
    InvalidRepository(String),

    #[error("Pull request context unavailable: {0}")]
    PullRequestContext(String),
}

/// Where a Jira lookup failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerStage {
    /// Building the connection (credentials, HTTP client)
    Connect,
    /// Sending the request or reading its response
    Request,
}

impl std::fmt::Display for TrackerStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackerStage::Connect => write!(f, "connect"),
            TrackerStage::Request => write!(f, "request"),
        }
    }
}

/// Jira lookup failure other than "issue not found"
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Jira Error: {message}")]
pub struct TrackerError {
    pub stage: TrackerStage,
    /// HTTP status, when Jira answered at all
    pub status: Option<u16>,
    /// Error text with line breaks removed
    pub message: String,
}

impl TrackerError {
    pub fn connect(message: impl AsRef<str>) -> Self {
        Self {
            stage: TrackerStage::Connect,
            status: None,
            message: strip_line_breaks(message.as_ref()),
        }
    }

    pub fn request(status: Option<u16>, message: impl AsRef<str>) -> Self {
        Self {
            stage: TrackerStage::Request,
            status,
            message: strip_line_breaks(message.as_ref()),
        }
    }
}

impl From<TrackerError> for GateError {
    fn from(err: TrackerError) -> Self {
        GateError::Tracker(err.message)
    }
}

/// Failure posting a review to the pull request
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("GitHub API error ({status}): {body}")]
    Api { status: u16, body: String },
}

/// Remove CR and LF characters so the message fits on one line
pub fn strip_line_breaks(message: &str) -> String {
    message.chars().filter(|c| !matches!(c, '\r' | '\n')).collect()
}

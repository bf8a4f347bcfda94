//! Jira Issue Lookup
//!
//! Issue types, the `IssueTracker` seam used by the gate, and the REST client
//! that implements it.

pub mod client;
pub mod oauth;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

pub use client::JiraClient;
pub use oauth::{OAuthCredentials, OAuthSigner};

/// A Jira issue, as returned by `GET /rest/api/2/issue/{key}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue key (e.g. PROJ-123)
    pub key: String,
    pub fields: IssueFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: String,
    pub status: IssueStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueStatus {
    pub name: String,
}

impl Issue {
    /// Build an issue from its key, summary and status name
    pub fn new(
        key: impl Into<String>,
        summary: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            fields: IssueFields {
                summary: summary.into(),
                status: IssueStatus {
                    name: status.into(),
                },
            },
        }
    }

    pub fn summary(&self) -> &str {
        &self.fields.summary
    }

    /// Name of the workflow state the issue is in
    pub fn status(&self) -> &str {
        &self.fields.status.name
    }
}

/// Outcome of a lookup that reached Jira
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueLookup {
    Found(Issue),
    /// Jira answered 404
    NotFound,
}

impl IssueLookup {
    pub fn issue(&self) -> Option<&Issue> {
        match self {
            IssueLookup::Found(issue) => Some(issue),
            IssueLookup::NotFound => None,
        }
    }
}

/// How requests to Jira are authenticated
#[derive(Debug, Clone)]
pub enum TrackerAuth {
    /// OAuth 1.0a with an RSA-SHA1 signature
    OAuth(OAuthCredentials),
    /// Personal access token sent as a bearer token
    Bearer(String),
}

/// Looks up issues in the tracker
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetch the issue with the given key.
    ///
    /// A missing issue is `Ok(IssueLookup::NotFound)`; every other failure is
    /// a `TrackerError`.
    async fn fetch_issue(&self, key: &str) -> Result<IssueLookup, TrackerError>;
}

//! GitHub Pull Request Context and Reviews
//!
//! Reads the pull request under evaluation from the Actions event payload and
//! posts reviews to it through the REST API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::{error, info};

use crate::error::{ConfigError, NotifyError};
use crate::notify::{Notifier, ReviewEvent};

/// The pull request that triggered the run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    pull_request: Option<PullRequest>,
}

impl PullRequest {
    /// Read the pull request from a `GITHUB_EVENT_PATH` payload
    pub fn from_event_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::PullRequestContext(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let payload: EventPayload = serde_json::from_str(&raw).map_err(|e| {
            ConfigError::PullRequestContext(format!("Failed to parse event payload: {}", e))
        })?;

        payload.pull_request.ok_or_else(|| {
            ConfigError::PullRequestContext("event payload has no pull_request".to_string())
        })
    }

    /// Use explicit overrides when both are given, otherwise the event payload
    pub fn resolve(
        title: Option<&str>,
        number: Option<u64>,
        event_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        if let (Some(title), Some(number)) = (title, number) {
            return Ok(Self {
                number,
                title: title.to_string(),
            });
        }

        let path = event_path.ok_or_else(|| {
            ConfigError::PullRequestContext(
                "GITHUB_EVENT_PATH not set; pass --pr-title and --pr-number".to_string(),
            )
        })?;
        let mut pull_request = Self::from_event_file(path)?;

        if let Some(title) = title {
            pull_request.title = title.to_string();
        }
        if let Some(number) = number {
            pull_request.number = number;
        }
        Ok(pull_request)
    }
}

/// Repository in `owner/repo` form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl FromStr for Repository {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split('/').collect::<Vec<_>>().as_slice() {
            [owner, name] if !owner.is_empty() && !name.is_empty() => Ok(Self {
                owner: owner.to_string(),
                name: name.to_string(),
            }),
            _ => Err(ConfigError::InvalidRepository(s.to_string())),
        }
    }
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Serialize)]
struct ReviewRequest<'a> {
    event: ReviewEvent,
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct Review {
    id: u64,
}

/// Posts reviews with a GitHub token
pub struct GitHubNotifier {
    client: Client,
    api_url: String,
    token: String,
    repository: Repository,
    pr_number: u64,
}

impl GitHubNotifier {
    pub fn new(
        api_url: impl Into<String>,
        token: impl Into<String>,
        repository: Repository,
        pr_number: u64,
    ) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            repository,
            pr_number,
        }
    }

    pub fn reviews_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/pulls/{}/reviews",
            self.api_url, self.repository.owner, self.repository.name, self.pr_number
        )
    }
}

#[async_trait]
impl Notifier for GitHubNotifier {
    async fn post_review(&self, body: &str, event: ReviewEvent) -> Result<(), NotifyError> {
        let request_body = ReviewRequest { event, body };

        let response = self
            .client
            .post(self.reviews_url())
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "jira-gate")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                pr_number = self.pr_number,
                status = status.as_u16(),
                %event,
                "Failed to post review"
            );
            return Err(NotifyError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let review = response.json::<Review>().await?;
        info!(
            pr_number = self.pr_number,
            review_id = review.id,
            %event,
            "Posted review"
        );
        Ok(())
    }
}

//! Jira REST Client
//!
//! Looks up a single issue through the Jira REST API v2. A new HTTP client is
//! built for every lookup; the gate only ever makes one.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

use super::{Issue, IssueLookup, IssueTracker, OAuthSigner, TrackerAuth};
use crate::config::GateConfig;
use crate::error::TrackerError;

const ISSUE_FIELDS: &str = "summary,status";

/// Jira REST API client
pub struct JiraClient {
    base_url: String,
    auth: TrackerAuth,
    timeout: Duration,
}

/// Error envelope returned by Jira on 4xx/5xx
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraErrorBody {
    #[serde(default)]
    error_messages: Vec<String>,
    #[serde(default)]
    errors: BTreeMap<String, String>,
}

/// Per-lookup HTTP client plus request authorisation
struct Connection {
    http: Client,
    authorizer: Authorizer,
}

enum Authorizer {
    OAuth(OAuthSigner),
    Bearer(String),
}

impl Connection {
    fn authorize(
        &self,
        request: RequestBuilder,
        method: &str,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<RequestBuilder, TrackerError> {
        match &self.authorizer {
            Authorizer::OAuth(signer) => {
                let header = signer.authorization_header(method, url, query)?;
                Ok(request.header("Authorization", header))
            }
            Authorizer::Bearer(token) => Ok(request.bearer_auth(token)),
        }
    }
}

impl JiraClient {
    /// Create a client for the Jira instance at `base_url`
    pub fn new(base_url: impl Into<String>, auth: TrackerAuth, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
            timeout,
        }
    }

    pub fn from_config(config: &GateConfig) -> Self {
        Self::new(&config.jira_url, config.auth.clone(), config.tracker_timeout)
    }

    /// REST endpoint for an issue
    pub fn issue_url(&self, key: &str) -> String {
        format!(
            "{}/rest/api/2/issue/{}",
            self.base_url,
            urlencoding::encode(key)
        )
    }

    fn connect(&self) -> Result<Connection, TrackerError> {
        let authorizer = match &self.auth {
            TrackerAuth::OAuth(credentials) => Authorizer::OAuth(OAuthSigner::new(credentials)?),
            TrackerAuth::Bearer(token) => Authorizer::Bearer(token.clone()),
        };

        let http = Client::builder()
            .user_agent(concat!("jira-gate/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .build()
            .map_err(|e| TrackerError::connect(format!("Failed to create HTTP client: {e}")))?;

        Ok(Connection { http, authorizer })
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn fetch_issue(&self, key: &str) -> Result<IssueLookup, TrackerError> {
        let connection = self.connect().map_err(|err| {
            warn!(error = %err.message, "Failed to initialise Jira connection");
            err
        })?;

        let url = self.issue_url(key);
        let query = [("fields", ISSUE_FIELDS)];
        debug!(%url, "Fetching Jira issue");

        let request = connection
            .http
            .get(&url)
            .query(&query)
            .header("Accept", "application/json");
        let request = connection.authorize(request, "GET", &url, &query)?;

        let response = request
            .send()
            .await
            .map_err(|e| TrackerError::request(None, e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(key, "Jira issue not found");
            return Ok(IssueLookup::NotFound);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Jira request failed");
            return Err(TrackerError::request(
                Some(status.as_u16()),
                error_message(status, &body),
            ));
        }

        let issue = response.json::<Issue>().await.map_err(|e| {
            TrackerError::request(Some(status.as_u16()), format!("Failed to parse issue: {e}"))
        })?;

        Ok(IssueLookup::Found(issue))
    }
}

/// Readable message for a failed Jira response
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<JiraErrorBody>(body) {
        let messages: Vec<String> = envelope
            .error_messages
            .into_iter()
            .chain(
                envelope
                    .errors
                    .into_iter()
                    .map(|(field, message)| format!("{}: {}", field, message)),
            )
            .collect();
        if !messages.is_empty() {
            return messages.join("; ");
        }
    }

    if body.trim().is_empty() {
        status.to_string()
    } else {
        body.to_string()
    }
}

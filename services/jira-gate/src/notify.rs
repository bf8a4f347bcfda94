//! Pull request notifications

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::error::NotifyError;

/// Kind of review posted to the pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewEvent {
    Comment,
    Approve,
    RequestChanges,
}

impl std::fmt::Display for ReviewEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewEvent::Comment => write!(f, "COMMENT"),
            ReviewEvent::Approve => write!(f, "APPROVE"),
            ReviewEvent::RequestChanges => write!(f, "REQUEST_CHANGES"),
        }
    }
}

/// Posts reviews to the pull request under evaluation
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn post_review(&self, body: &str, event: ReviewEvent) -> Result<(), NotifyError>;
}

/// Logs reviews instead of posting them (dry run)
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn post_review(&self, body: &str, event: ReviewEvent) -> Result<(), NotifyError> {
        info!(%event, body, "Dry run, review not posted");
        Ok(())
    }
}

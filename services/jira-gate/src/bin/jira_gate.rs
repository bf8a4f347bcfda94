//! Jira Gate
//!
//! Reviews the pull request that triggered a GitHub Actions run: approves it
//! when the Jira issue named in its title is ready for release, requests
//! changes otherwise.
//!
//! ## Usage
//! ```bash
//! # Inside a workflow (inputs arrive as INPUT_* variables)
//! jira-gate
//!
//! # Locally, without posting anything
//! jira-gate \
//!   --jira-url company.atlassian.net \
//!   --jira-auth <PAT> \
//!   --jira-release-state "Ready to Release" \
//!   --project-pattern '[A-Za-z]*-\d\d*' \
//!   --pr-title "[PROJ-123] Add login page" \
//!   --pr-number 42 \
//!   --dry-run
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use jira_gate::github::{GitHubNotifier, PullRequest, Repository};
use jira_gate::jira::JiraClient;
use jira_gate::notify::{LogNotifier, Notifier, ReviewEvent};
use jira_gate::{Args, Gate, GateConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    info!("🚀 Jira gate starting...");

    let pull_request = PullRequest::resolve(
        args.pr_title.as_deref(),
        args.pr_number,
        args.event_path.as_deref(),
    )?;
    info!(
        pr_number = pull_request.number,
        pr_title = %pull_request.title,
        "Evaluating pull request"
    );

    let notifier = build_notifier(&args, pull_request.number)?;

    let config = match GateConfig::from_args(&args) {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid configuration: {}", err);
            let body = format!("Jira gate configuration error: {}", err);
            if let Err(notify_err) = notifier.post_review(&body, ReviewEvent::Comment).await {
                warn!("Failed to report configuration error: {}", notify_err);
            }
            return Err(err).context("Failed to load configuration");
        }
    };

    let tracker = JiraClient::from_config(&config);
    let gate = Gate::new(&config, &tracker, notifier.as_ref());

    let decision = gate
        .run(&pull_request.title)
        .await
        .context("Failed to post review to pull request")?;

    match decision.error_code() {
        None => info!("✅ PR #{} approved", pull_request.number),
        Some(code) => warn!(code, "❌ PR #{}: changes requested", pull_request.number),
    }

    if args.fail_on_rejection && !decision.is_approved() {
        std::process::exit(1);
    }

    Ok(())
}

fn build_notifier(args: &Args, pr_number: u64) -> Result<Box<dyn Notifier>> {
    if args.dry_run {
        return Ok(Box::new(LogNotifier));
    }

    let token = args
        .github_token
        .as_deref()
        .context("INPUT_GITHUB_TOKEN must be set (or pass --dry-run)")?;
    let repository: Repository = args
        .repo
        .as_deref()
        .context("GITHUB_REPOSITORY must be set")?
        .parse()?;

    Ok(Box::new(GitHubNotifier::new(
        &args.github_api_url,
        token,
        repository,
        pr_number,
    )))
}

fn init_logging(args: &Args) -> Result<()> {
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false);

    match args.log_format.as_str() {
        "json" => tracing::subscriber::set_global_default(builder.json().finish())?,
        _ => tracing::subscriber::set_global_default(builder.finish())?,
    }

    Ok(())
}

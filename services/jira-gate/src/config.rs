//! Configuration
//!
//! Settings arrive as GitHub Actions inputs (`INPUT_*` environment variables)
//! or command line flags. `GateConfig` is the validated, immutable result.

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use regex::{Regex, RegexBuilder};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::jira::{OAuthCredentials, TrackerAuth};

/// Jira Gate - approve pull requests whose Jira issue is ready for release
#[derive(Parser, Debug, Clone)]
#[command(name = "jira-gate")]
#[command(about = "Approve pull requests whose Jira issue is ready for release")]
#[command(version)]
pub struct Args {
    /// Jira base URL (e.g. https://company.atlassian.net)
    #[arg(long, env = "INPUT_JIRA_URL")]
    pub jira_url: String,

    /// OAuth consumer key
    #[arg(long, env = "INPUT_JIRA_CONSUMER_KEY")]
    pub jira_consumer_key: Option<String>,

    /// OAuth RSA private key (PEM or bare base64 body)
    #[arg(long, env = "INPUT_JIRA_PRIVATE_KEY", hide_env_values = true)]
    pub jira_private_key: Option<String>,

    /// OAuth access token
    #[arg(long, env = "INPUT_JIRA_ACCESS_TOKEN", hide_env_values = true)]
    pub jira_access_token: Option<String>,

    /// OAuth token secret
    #[arg(long, env = "INPUT_JIRA_TOKEN_SECRET", hide_env_values = true)]
    pub jira_token_secret: Option<String>,

    /// Personal access token, used when OAuth credentials are not given
    #[arg(long, env = "INPUT_JIRA_AUTH", hide_env_values = true)]
    pub jira_auth: Option<String>,

    /// Jira status an issue must be in for the PR to be approved
    #[arg(long, env = "INPUT_JIRA_RELEASE_STATE")]
    pub jira_release_state: String,

    /// Regular expression matching the project key in the PR title
    #[arg(long, env = "INPUT_PROJECT_PATTERN")]
    pub project_pattern: String,

    /// Enable the SOX compliance check
    #[arg(
        long,
        env = "INPUT_SOX_CHECK",
        default_value = "false",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub sox_check: bool,

    /// Timeout for the Jira request, in seconds
    #[arg(long, env = "INPUT_JIRA_TIMEOUT", default_value = "30")]
    pub jira_timeout: u64,

    /// Exit with status 1 when changes are requested
    #[arg(
        long,
        env = "INPUT_FAIL_ON_REJECTION",
        default_value = "false",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub fail_on_rejection: bool,

    /// GitHub token used to post reviews
    #[arg(long, env = "INPUT_GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Repository in format owner/repo
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repo: Option<String>,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    pub github_api_url: String,

    /// Path to the workflow event payload
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: Option<PathBuf>,

    /// Pull request title (overrides the event payload)
    #[arg(long)]
    pub pr_title: Option<String>,

    /// Pull request number (overrides the event payload)
    #[arg(long)]
    pub pr_number: Option<u64>,

    /// Log reviews instead of posting them
    #[arg(long)]
    pub dry_run: bool,

    /// Log format: text (default), json
    #[arg(long, default_value = "text")]
    pub log_format: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Validated gate configuration
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Jira base URL, with scheme and without trailing slash
    pub jira_url: String,
    pub auth: TrackerAuth,
    /// Status name an issue must have, compared exactly
    pub release_state: String,
    pub sox_check: bool,
    pub project_pattern: Regex,
    pub tracker_timeout: Duration,
}

impl GateConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        Ok(Self {
            jira_url: normalize_base_url(&args.jira_url),
            auth: resolve_auth(args)?,
            release_state: args.jira_release_state.clone(),
            sox_check: args.sox_check,
            project_pattern: compile_pattern(&args.project_pattern)?,
            tracker_timeout: Duration::from_secs(args.jira_timeout),
        })
    }

    /// Jira web link for an issue
    pub fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{}", self.jira_url, key)
    }
}

/// Compile the project key pattern.
///
/// Classes such as `\d` and `\w` are ASCII-only, matching JavaScript
/// `RegExp` semantics. Patterns that only compile with Unicode
/// enabled (`.` or negated classes matching non-ASCII text) fall back to it.
pub fn compile_pattern(pattern: &str) -> Result<Regex, ConfigError> {
    if let Ok(regex) = RegexBuilder::new(pattern).unicode(false).build() {
        return Ok(regex);
    }

    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Prepend `https://` when no scheme is given and drop trailing slashes
pub fn normalize_base_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

fn resolve_auth(args: &Args) -> Result<TrackerAuth, ConfigError> {
    let oauth = (
        args.jira_consumer_key.as_deref(),
        args.jira_private_key.as_deref(),
        args.jira_access_token.as_deref(),
        args.jira_token_secret.as_deref(),
    );

    if let (Some(consumer_key), Some(private_key), Some(access_token), Some(token_secret)) = oauth {
        return Ok(TrackerAuth::OAuth(OAuthCredentials {
            consumer_key: consumer_key.to_string(),
            private_key: private_key.to_string(),
            access_token: access_token.to_string(),
            token_secret: token_secret.to_string(),
        }));
    }

    if let Some(token) = args.jira_auth.as_deref() {
        return Ok(TrackerAuth::Bearer(token.to_string()));
    }

    let missing: Vec<&str> = [
        ("jira_consumer_key", oauth.0),
        ("jira_private_key", oauth.1),
        ("jira_access_token", oauth.2),
        ("jira_token_secret", oauth.3),
    ]
    .iter()
    .filter(|(_, value)| value.is_none())
    .map(|(name, _)| *name)
    .collect();

    Err(ConfigError::MissingCredentials(format!(
        "set {} or jira_auth",
        missing.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_ARGS: [&str; 7] = [
        "jira-gate",
        "--jira-url",
        "test.atlassian.net",
        "--jira-release-state",
        "Ready to Release",
        "--project-pattern",
        r"[A-Za-z]*-\d\d*",
    ];

    fn parse(extra: &[&str]) -> Args {
        Args::try_parse_from(BASE_ARGS.iter().chain(extra.iter()).copied()).unwrap()
    }

    const OAUTH_ARGS: [&str; 8] = [
        "--jira-consumer-key",
        "ck",
        "--jira-private-key",
        "pk",
        "--jira-access-token",
        "at",
        "--jira-token-secret",
        "ts",
    ];

    #[test]
    fn test_config_from_args() {
        let config = GateConfig::from_args(&parse(&OAUTH_ARGS)).unwrap();

        assert_eq!(config.jira_url, "https://test.atlassian.net");
        assert_eq!(config.release_state, "Ready to Release");
        assert!(!config.sox_check);
        assert_eq!(config.tracker_timeout, Duration::from_secs(30));
        assert!(config.project_pattern.is_match("[PROJ-1234] Test PR"));
        match config.auth {
            TrackerAuth::OAuth(credentials) => {
                assert_eq!(credentials.consumer_key, "ck");
                assert_eq!(credentials.token_secret, "ts");
            }
            TrackerAuth::Bearer(_) => panic!("expected OAuth credentials"),
        }
    }

    #[test]
    fn test_boolean_inputs() {
        let args = parse(&["--sox-check", "true", "--fail-on-rejection", "yes"]);
        assert!(args.sox_check);
        assert!(args.fail_on_rejection);

        let args = parse(&["--sox-check", "false"]);
        assert!(!args.sox_check);
        assert!(!args.fail_on_rejection);
    }

    #[test]
    fn test_bearer_fallback() {
        let config = GateConfig::from_args(&parse(&["--jira-auth", "pat-123"])).unwrap();
        assert!(matches!(config.auth, TrackerAuth::Bearer(ref token) if token == "pat-123"));
    }

    #[test]
    fn test_missing_credentials() {
        let err = GateConfig::from_args(&parse(&["--jira-consumer-key", "ck"])).unwrap_err();
        match err {
            ConfigError::MissingCredentials(message) => {
                assert!(message.contains("jira_private_key"));
                assert!(!message.contains("jira_consumer_key"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_pattern() {
        let mut args = parse(&OAUTH_ARGS);
        args.project_pattern = "[A-Z".to_string();

        let err = GateConfig::from_args(&args).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidPattern { ref pattern, .. } if pattern == "[A-Z"
        ));
    }

    #[test]
    fn test_pattern_digits_are_ascii() {
        let pattern = compile_pattern(r"[A-Za-z]*-\d\d*").unwrap();

        assert_eq!(
            pattern.find("[PROJ-1234] Test PR").map(|m| m.as_str()),
            Some("PROJ-1234")
        );
        assert!(pattern.find("PROJ-\u{0663}\u{0664} fix").is_none());
    }

    #[test]
    fn test_pattern_falls_back_to_unicode() {
        let pattern = compile_pattern(r"[A-Z]+-.+").unwrap();

        assert_eq!(
            pattern.find("PROJ-\u{0663}").map(|m| m.as_str()),
            Some("PROJ-\u{0663}")
        );
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("test.atlassian.net"), "https://test.atlassian.net");
        assert_eq!(
            normalize_base_url("http://jira.local:8080/"),
            "http://jira.local:8080"
        );
    }

    #[test]
    fn test_browse_url() {
        let config = GateConfig::from_args(&parse(&["--jira-auth", "pat"])).unwrap();
        assert_eq!(
            config.browse_url("PROJ-123"),
            "https://test.atlassian.net/browse/PROJ-123"
        );
    }
}

//! Configuration for the REST invoker and the command layer.

use crate::errors::{GitHubError, GitHubResult};
use std::time::Duration;

/// Default GitHub API base URL.
pub const DEFAULT_API_HOST: &str = "https://api.github.com";

/// Default GitHub API version (date-based).
pub const DEFAULT_API_VERSION: &str = "2022-11-28";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header.
pub const DEFAULT_USER_AGENT: &str = "integrations-github-rest/0.1.0";

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base retry delay.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Default cap for exponential backoff.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Source of configuration values, read concurrently by every call.
pub trait ConfigProvider: Send + Sync {
    /// API base URL.
    fn api_host(&self) -> String;

    /// Owner used when a command is given none.
    fn default_owner(&self) -> Option<String>;

    /// Repository used when a command is given none.
    fn default_repository(&self) -> Option<String>;

    /// Retries allowed after the first attempt.
    fn max_retries(&self) -> u32;

    /// Base retry delay and minimum rate-limit wait.
    fn retry_delay(&self) -> Duration;

    /// Suppresses telemetry records.
    fn telemetry_disabled(&self) -> bool;

    /// User-Agent header value.
    fn user_agent(&self) -> String {
        DEFAULT_USER_AGENT.to_string()
    }

    /// `X-GitHub-Api-Version` header value.
    fn api_version(&self) -> String {
        DEFAULT_API_VERSION.to_string()
    }

    /// Per-request timeout.
    fn request_timeout(&self) -> Duration {
        DEFAULT_TIMEOUT
    }

    /// Cap for exponential backoff.
    fn max_backoff(&self) -> Duration {
        DEFAULT_MAX_BACKOFF
    }
}

/// Static configuration.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// API base URL.
    pub api_host: String,
    /// API version header.
    pub api_version: String,
    /// Default owner.
    pub default_owner: Option<String>,
    /// Default repository.
    pub default_repository: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
    /// User-Agent header.
    pub user_agent: String,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Base retry delay.
    pub retry_delay: Duration,
    /// Backoff cap.
    pub max_backoff: Duration,
    /// Telemetry switch.
    pub telemetry_disabled: bool,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            default_owner: None,
            default_repository: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            max_backoff: DEFAULT_MAX_BACKOFF,
            telemetry_disabled: false,
        }
    }
}

impl GitHubConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> GitHubConfigBuilder {
        GitHubConfigBuilder::new()
    }

    /// Loads configuration from `GITHUB_*` environment variables.
    pub fn from_env() -> GitHubResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> GitHubResult<Self> {
        let mut builder = Self::builder();

        if let Some(host) = lookup("GITHUB_API_HOST") {
            builder = builder.api_host(host);
        }
        if let Some(owner) = lookup("GITHUB_DEFAULT_OWNER") {
            builder = builder.default_owner(owner);
        }
        if let Some(repo) = lookup("GITHUB_DEFAULT_REPOSITORY") {
            builder = builder.default_repository(repo);
        }
        if let Some(value) = lookup("GITHUB_MAX_RETRIES") {
            let retries = value.trim().parse().map_err(|_| {
                GitHubError::configuration(format!("GITHUB_MAX_RETRIES is not a number: {}", value))
            })?;
            builder = builder.max_retries(retries);
        }
        if let Some(value) = lookup("GITHUB_RETRY_DELAY_SECONDS") {
            let secs = value.trim().parse().map_err(|_| {
                GitHubError::configuration(format!(
                    "GITHUB_RETRY_DELAY_SECONDS is not a number: {}",
                    value
                ))
            })?;
            builder = builder.retry_delay_seconds(secs);
        }
        if let Some(value) = lookup("GITHUB_DISABLE_TELEMETRY") {
            let disabled = matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
            builder = builder.telemetry_disabled(disabled);
        }

        builder.build()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> GitHubResult<()> {
        if self.api_host.is_empty() {
            return Err(GitHubError::configuration("API host cannot be empty"));
        }

        if !self.api_host.starts_with("http://") && !self.api_host.starts_with("https://") {
            return Err(GitHubError::configuration(
                "API host must start with http:// or https://",
            ));
        }

        if url::Url::parse(&self.api_host).is_err() {
            return Err(GitHubError::configuration(format!(
                "API host is not a valid URL: {}",
                self.api_host
            )));
        }

        if self.user_agent.is_empty() {
            return Err(GitHubError::configuration("User-Agent is required by GitHub API"));
        }

        Ok(())
    }
}

impl ConfigProvider for GitHubConfig {
    fn api_host(&self) -> String {
        self.api_host.clone()
    }

    fn default_owner(&self) -> Option<String> {
        self.default_owner.clone()
    }

    fn default_repository(&self) -> Option<String> {
        self.default_repository.clone()
    }

    fn max_retries(&self) -> u32 {
        self.max_retries
    }

    fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    fn telemetry_disabled(&self) -> bool {
        self.telemetry_disabled
    }

    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }

    fn api_version(&self) -> String {
        self.api_version.clone()
    }

    fn request_timeout(&self) -> Duration {
        self.timeout
    }

    fn max_backoff(&self) -> Duration {
        self.max_backoff
    }
}

/// Builder for GitHubConfig.
#[derive(Debug, Default)]
pub struct GitHubConfigBuilder {
    api_host: Option<String>,
    api_version: Option<String>,
    default_owner: Option<String>,
    default_repository: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    max_retries: Option<u32>,
    retry_delay: Option<Duration>,
    max_backoff: Option<Duration>,
    telemetry_disabled: bool,
}

impl GitHubConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API host.
    pub fn api_host(mut self, url: impl Into<String>) -> Self {
        self.api_host = Some(url.into());
        self
    }

    /// Sets the API version.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Sets the default owner.
    pub fn default_owner(mut self, owner: impl Into<String>) -> Self {
        self.default_owner = Some(owner.into());
        self
    }

    /// Sets the default repository.
    pub fn default_repository(mut self, repo: impl Into<String>) -> Self {
        self.default_repository = Some(repo.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the retry budget.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Sets the base retry delay.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    /// Sets the base retry delay in whole seconds.
    pub fn retry_delay_seconds(self, secs: u64) -> Self {
        self.retry_delay(Duration::from_secs(secs))
    }

    /// Sets the backoff cap.
    pub fn max_backoff(mut self, cap: Duration) -> Self {
        self.max_backoff = Some(cap);
        self
    }

    /// Disables retries.
    pub fn no_retry(self) -> Self {
        self.max_retries(0)
    }

    /// Toggles telemetry.
    pub fn telemetry_disabled(mut self, disabled: bool) -> Self {
        self.telemetry_disabled = disabled;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> GitHubResult<GitHubConfig> {
        let config = GitHubConfig {
            api_host: self
                .api_host
                .map(|h| h.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_HOST.to_string()),
            api_version: self.api_version.unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            default_owner: self.default_owner.filter(|o| !o.is_empty()),
            default_repository: self.default_repository.filter(|r| !r.is_empty()),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            user_agent: self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            retry_delay: self.retry_delay.unwrap_or(DEFAULT_RETRY_DELAY),
            max_backoff: self.max_backoff.unwrap_or(DEFAULT_MAX_BACKOFF),
            telemetry_disabled: self.telemetry_disabled,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = GitHubConfig::default();
        assert_eq!(config.api_host, DEFAULT_API_HOST);
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
        assert!(config.default_owner.is_none());
        assert!(!config.telemetry_disabled);
    }

    #[test]
    fn test_config_builder() {
        let config = GitHubConfig::builder()
            .api_host("https://github.example.com/api/v3/")
            .user_agent("test-client/1.0")
            .default_owner("octocat")
            .default_repository("")
            .retry_delay_seconds(5)
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap();

        assert_eq!(config.api_host, "https://github.example.com/api/v3");
        assert_eq!(config.user_agent, "test-client/1.0");
        assert_eq!(config.default_owner(), Some("octocat".to_string()));
        assert_eq!(config.default_repository(), None);
        assert_eq!(config.retry_delay(), Duration::from_secs(5));
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_api_host() {
        assert!(GitHubConfig::builder().api_host("invalid-url").build().is_err());
        assert!(GitHubConfig::builder().user_agent("").build().is_err());
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("GITHUB_DEFAULT_OWNER", "octocat"),
            ("GITHUB_DEFAULT_REPOSITORY", "hello-world"),
            ("GITHUB_MAX_RETRIES", "0"),
            ("GITHUB_RETRY_DELAY_SECONDS", "2"),
            ("GITHUB_DISABLE_TELEMETRY", "true"),
        ]
        .into_iter()
        .collect();

        let config = GitHubConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.api_host, DEFAULT_API_HOST);
        assert_eq!(config.default_owner.as_deref(), Some("octocat"));
        assert_eq!(config.default_repository.as_deref(), Some("hello-world"));
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.retry_delay, Duration::from_secs(2));
        assert!(config.telemetry_disabled);
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let result = GitHubConfig::from_lookup(|k| {
            (k == "GITHUB_MAX_RETRIES").then(|| "many".to_string())
        });
        assert!(result.is_err());
    }
}

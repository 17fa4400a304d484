//! Credentials for GitHub API calls.

use crate::errors::GitHubResult;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use secrecy::{ExposeSecret, SecretString};

/// Authentication method for GitHub API.
#[derive(Debug, Clone)]
pub enum AuthMethod {
    /// No `Authorization` header.
    Anonymous,
    /// Bearer token (PAT classic or fine-grained, OAuth, Actions token).
    Token(SecretString),
    /// Basic authentication.
    Basic {
        /// User name.
        username: String,
        /// Password or token.
        password: SecretString,
    },
}

impl AuthMethod {
    /// Creates a bearer token method.
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token(SecretString::new(token.into()))
    }

    /// Creates a basic authentication method.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: SecretString::new(password.into()),
        }
    }

    /// Builds the `Authorization` header value, `None` for anonymous access.
    pub fn header_value(&self) -> Option<SecretString> {
        match self {
            Self::Anonymous => None,
            Self::Token(token) => Some(SecretString::new(format!(
                "Bearer {}",
                token.expose_secret()
            ))),
            Self::Basic { username, password } => {
                let encoded = STANDARD.encode(format!("{}:{}", username, password.expose_secret()));
                Some(SecretString::new(format!("Basic {}", encoded)))
            }
        }
    }

    /// Gets the token prefix for logging.
    pub fn token_prefix(&self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Token(t) => {
                let exposed = t.expose_secret();
                if exposed.starts_with("ghp_") {
                    "ghp_***"
                } else if exposed.starts_with("github_pat_") {
                    "github_pat_***"
                } else if exposed.starts_with("gho_") {
                    "gho_***"
                } else if exposed.starts_with("ghs_") {
                    "ghs_***"
                } else {
                    "***"
                }
            }
            Self::Basic { .. } => "basic",
        }
    }
}

/// Credential provider for dynamic credential resolution.
///
/// Implementations are shared by every concurrent call and must tolerate
/// concurrent reads.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Returns the `Authorization` header value, or `None` to run unauthenticated.
    async fn auth_header_value(&self) -> GitHubResult<Option<SecretString>>;
}

/// Static credential provider using a fixed method.
pub struct StaticCredentialProvider {
    method: AuthMethod,
}

impl StaticCredentialProvider {
    /// Creates a new static credential provider.
    pub fn new(method: AuthMethod) -> Self {
        Self { method }
    }

    /// Provider that never authenticates.
    pub fn anonymous() -> Self {
        Self::new(AuthMethod::Anonymous)
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn auth_header_value(&self) -> GitHubResult<Option<SecretString>> {
        Ok(self.method.header_value())
    }
}

/// Environment variable credential provider.
///
/// Variables are re-read on every call so a rotated token is picked up.
pub struct EnvCredentialProvider {
    token_vars: Vec<String>,
}

impl EnvCredentialProvider {
    /// Reads `GITHUB_TOKEN`, then `GH_TOKEN`.
    pub fn from_github_token() -> Self {
        Self {
            token_vars: vec!["GITHUB_TOKEN".to_string(), "GH_TOKEN".to_string()],
        }
    }

    /// Reads a custom environment variable.
    pub fn from_env_var(var_name: impl Into<String>) -> Self {
        Self {
            token_vars: vec![var_name.into()],
        }
    }

    fn resolve(&self, lookup: impl Fn(&str) -> Option<String>) -> AuthMethod {
        self.token_vars
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty())
            .map(|token| AuthMethod::token(token.trim()))
            .unwrap_or(AuthMethod::Anonymous)
    }
}

#[async_trait]
impl CredentialProvider for EnvCredentialProvider {
    async fn auth_header_value(&self) -> GitHubResult<Option<SecretString>> {
        let method = self.resolve(|name| std::env::var(name).ok());
        tracing::trace!(credential = method.token_prefix(), "Resolved credential from environment");
        Ok(method.header_value())
    }
}

//! Error types for the GitHub REST command layer.

use crate::resilience::RateLimitState;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Result type alias for GitHub operations.
pub type GitHubResult<T> = Result<T, GitHubError>;

/// Error kinds for categorizing GitHub errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GitHubErrorKind {
    /// Bad or missing credential (401).
    Authentication,
    /// The caller lacks permission (403 that is not a rate limit).
    Authorization,
    /// Resource absent (404).
    NotFound,
    /// Request rejected with structured field-level messages (422).
    Validation,
    /// Still rate limited after the retry budget was spent.
    RateLimitExceeded,
    /// Server or network failure after the retry budget was spent.
    Transient,
    /// Unexpected status or unparsable body.
    UnknownApi,

    /// Client configuration is unusable.
    InvalidConfiguration,
    /// A command parameter failed validation before any request was sent.
    InvalidParameter,
}

impl GitHubErrorKind {
    /// Short snake_case name, also used as the telemetry outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::Authorization => "authorization",
            Self::NotFound => "not_found",
            Self::Validation => "validation",
            Self::RateLimitExceeded => "rate_limit_exceeded",
            Self::Transient => "transient",
            Self::UnknownApi => "unknown_api",
            Self::InvalidConfiguration => "invalid_configuration",
            Self::InvalidParameter => "invalid_parameter",
        }
    }
}

impl fmt::Display for GitHubErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the `errors` array GitHub attaches to a 422 response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldError {
    /// Resource the error applies to (e.g. `Issue`).
    #[serde(default)]
    pub resource: Option<String>,
    /// Offending field.
    #[serde(default)]
    pub field: Option<String>,
    /// Machine readable code (`missing_field`, `invalid`, `already_exists`, `custom`).
    #[serde(default)]
    pub code: Option<String>,
    /// Human readable message, only present for `custom` codes.
    #[serde(default)]
    pub message: Option<String>,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resource = self.resource.as_deref().unwrap_or("?");
        let field = self.field.as_deref().unwrap_or("?");
        let code = self.code.as_deref().unwrap_or("invalid");
        write!(f, "{}.{}: {}", resource, field, code)?;
        if let Some(ref message) = self.message {
            write!(f, " ({})", message)?;
        }
        Ok(())
    }
}

/// GitHub error response body.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorResponseBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub documentation_url: Option<String>,
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

impl ErrorResponseBody {
    /// Parses an error body, tolerating non-JSON payloads.
    pub(crate) fn parse(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_default()
    }

    /// Field errors; GitHub sometimes sends plain strings instead of objects.
    pub(crate) fn field_errors(&self) -> Vec<FieldError> {
        self.errors
            .iter()
            .map(|value| match value {
                serde_json::Value::String(message) => FieldError {
                    resource: None,
                    field: None,
                    code: Some("custom".to_string()),
                    message: Some(message.clone()),
                },
                other => serde_json::from_value(other.clone()).unwrap_or(FieldError {
                    resource: None,
                    field: None,
                    code: None,
                    message: Some(other.to_string()),
                }),
            })
            .collect()
    }
}

/// GitHub API error with detailed information.
#[derive(Error, Debug)]
pub struct GitHubError {
    kind: GitHubErrorKind,
    message: String,
    status_code: Option<u16>,
    request_id: Option<String>,
    documentation_url: Option<String>,
    rate_limit: Option<RateLimitState>,
    field_errors: Vec<FieldError>,
    #[source]
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for GitHubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(code) = self.status_code {
            write!(f, " (HTTP {})", code)?;
        }
        if !self.field_errors.is_empty() {
            let fields: Vec<String> = self.field_errors.iter().map(ToString::to_string).collect();
            write!(f, ": {}", fields.join("; "))?;
        }
        if let Some(ref id) = self.request_id {
            write!(f, " [request_id: {}]", id)?;
        }
        Ok(())
    }
}

impl GitHubError {
    /// Creates a new GitHub error.
    pub fn new(kind: GitHubErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            request_id: None,
            documentation_url: None,
            rate_limit: None,
            field_errors: Vec::new(),
            cause: None,
        }
    }

    /// Sets the HTTP status code.
    pub fn with_status(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    /// Sets the GitHub request ID.
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Sets the documentation URL.
    pub fn with_documentation_url(mut self, url: impl Into<String>) -> Self {
        self.documentation_url = Some(url.into());
        self
    }

    /// Sets the rate limit snapshot taken from the failing response.
    pub fn with_rate_limit(mut self, state: RateLimitState) -> Self {
        self.rate_limit = Some(state);
        self
    }

    /// Attaches structured field errors.
    pub fn with_field_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.field_errors = errors;
        self
    }

    /// Sets the underlying cause.
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Gets the error kind.
    pub fn kind(&self) -> GitHubErrorKind {
        self.kind
    }

    /// Gets the message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Gets the HTTP status code.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Gets the request ID.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Gets the documentation URL.
    pub fn documentation_url(&self) -> Option<&str> {
        self.documentation_url.as_deref()
    }

    /// Gets the rate limit snapshot.
    pub fn rate_limit(&self) -> Option<&RateLimitState> {
        self.rate_limit.as_ref()
    }

    /// Gets the structured validation messages of a 422 response.
    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    /// Builds the permanent error for a non-retryable status.
    pub(crate) fn from_status(status: u16, body: &ErrorResponseBody) -> Self {
        let kind = Self::kind_from_status(status);
        let message = body
            .message
            .clone()
            .unwrap_or_else(|| format!("HTTP {} error", status));
        let mut error = Self::new(kind, message).with_status(status);
        if let Some(ref url) = body.documentation_url {
            error = error.with_documentation_url(url.clone());
        }
        if kind == GitHubErrorKind::Validation {
            error = error.with_field_errors(body.field_errors());
        }
        error
    }

    /// Maps a permanent HTTP status code to an error kind.
    pub(crate) fn kind_from_status(status: u16) -> GitHubErrorKind {
        match status {
            401 => GitHubErrorKind::Authentication,
            403 => GitHubErrorKind::Authorization,
            404 => GitHubErrorKind::NotFound,
            422 => GitHubErrorKind::Validation,
            429 => GitHubErrorKind::RateLimitExceeded,
            500..=599 => GitHubErrorKind::Transient,
            _ => GitHubErrorKind::UnknownApi,
        }
    }

    // Convenience constructors

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::InvalidConfiguration, message)
    }

    /// Creates a parameter validation error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::InvalidParameter, message)
    }

    /// Creates an unknown API error.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::UnknownApi, message)
    }

    /// Creates a transient error.
    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::Transient, message)
    }

    /// Creates a rate limit exhaustion error.
    pub fn rate_limit_exceeded(state: Option<RateLimitState>) -> Self {
        let error = Self::new(
            GitHubErrorKind::RateLimitExceeded,
            "Rate limit exceeded and retry budget exhausted",
        );
        match state {
            Some(state) => error.with_rate_limit(state),
            None => error,
        }
    }

    /// Returns true when the failure is a "not found" outcome.
    pub fn is_not_found(&self) -> bool {
        self.kind == GitHubErrorKind::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn test_error_display() {
        let error = GitHubError::new(GitHubErrorKind::NotFound, "Repository not found")
            .with_status(404)
            .with_request_id("abc123");

        let display = format!("{}", error);
        assert!(display.contains("not_found"));
        assert!(display.contains("Repository not found"));
        assert!(display.contains("404"));
        assert!(display.contains("abc123"));
    }

    #[test_case(401, GitHubErrorKind::Authentication)]
    #[test_case(403, GitHubErrorKind::Authorization)]
    #[test_case(404, GitHubErrorKind::NotFound)]
    #[test_case(422, GitHubErrorKind::Validation)]
    #[test_case(409, GitHubErrorKind::UnknownApi)]
    #[test_case(400, GitHubErrorKind::UnknownApi)]
    #[test_case(503, GitHubErrorKind::Transient)]
    fn test_kind_from_status(status: u16, expected: GitHubErrorKind) {
        assert_eq!(GitHubError::kind_from_status(status), expected);
    }

    #[test]
    fn test_validation_body_carries_field_errors() {
        let body = ErrorResponseBody::parse(
            br#"{
                "message": "Validation Failed",
                "errors": [
                    {"resource": "Label", "field": "name", "code": "already_exists"},
                    "title is too long"
                ],
                "documentation_url": "https://docs.github.com/rest"
            }"#,
        );

        let error = GitHubError::from_status(422, &body);

        assert_eq!(error.kind(), GitHubErrorKind::Validation);
        assert_eq!(error.message(), "Validation Failed");
        assert_eq!(error.field_errors().len(), 2);
        assert_eq!(error.field_errors()[0].field.as_deref(), Some("name"));
        assert_eq!(error.field_errors()[0].code.as_deref(), Some("already_exists"));
        assert_eq!(error.field_errors()[1].message.as_deref(), Some("title is too long"));
        assert_eq!(error.documentation_url(), Some("https://docs.github.com/rest"));
    }

    #[test]
    fn test_non_json_error_body() {
        let body = ErrorResponseBody::parse(b"<html>bad gateway</html>");
        let error = GitHubError::from_status(418, &body);

        assert_eq!(error.kind(), GitHubErrorKind::UnknownApi);
        assert_eq!(error.message(), "HTTP 418 error");
        assert!(error.field_errors().is_empty());
    }
}

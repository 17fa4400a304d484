//! Immutable description of one logical REST call.

use crate::auth::AuthMethod;
use crate::errors::{GitHubError, GitHubResult};
use bytes::Bytes;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// Default `Accept` header for the REST API.
pub const DEFAULT_ACCEPT: &str = "application/vnd.github+json";

/// One logical REST operation before execution.
///
/// Built once through [`CallDescriptor::builder`]; unset retry and credential
/// fields fall back to the invoker's providers when the call runs.
#[derive(Debug, Clone)]
pub struct CallDescriptor {
    method: Method,
    uri_fragment: String,
    query: Vec<(String, String)>,
    body: Option<Bytes>,
    content_type: Option<String>,
    accept: String,
    extra_headers: Vec<(HeaderName, HeaderValue)>,
    credential: Option<AuthMethod>,
    max_retries: Option<u32>,
    retry_delay: Option<Duration>,
    telemetry_event: Option<String>,
    telemetry_properties: HashMap<String, String>,
}

impl CallDescriptor {
    /// Starts a descriptor for `method` on a path relative to the API host.
    pub fn builder(method: Method, uri_fragment: impl Into<String>) -> CallDescriptorBuilder {
        CallDescriptorBuilder::new(method, uri_fragment.into())
    }

    /// Shorthand for a GET builder.
    pub fn get(uri_fragment: impl Into<String>) -> CallDescriptorBuilder {
        Self::builder(Method::GET, uri_fragment)
    }

    /// Shorthand for a POST builder.
    pub fn post(uri_fragment: impl Into<String>) -> CallDescriptorBuilder {
        Self::builder(Method::POST, uri_fragment)
    }

    /// Shorthand for a PATCH builder.
    pub fn patch(uri_fragment: impl Into<String>) -> CallDescriptorBuilder {
        Self::builder(Method::PATCH, uri_fragment)
    }

    /// Shorthand for a PUT builder.
    pub fn put(uri_fragment: impl Into<String>) -> CallDescriptorBuilder {
        Self::builder(Method::PUT, uri_fragment)
    }

    /// Shorthand for a DELETE builder.
    pub fn delete(uri_fragment: impl Into<String>) -> CallDescriptorBuilder {
        Self::builder(Method::DELETE, uri_fragment)
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path relative to the API host, without leading slash.
    pub fn uri_fragment(&self) -> &str {
        &self.uri_fragment
    }

    /// Query parameters for the first request.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Serialized body.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Content type of the body.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// `Accept` header.
    pub fn accept(&self) -> &str {
        &self.accept
    }

    /// True when the response is expected to be JSON.
    pub fn expects_json(&self) -> bool {
        self.accept.contains("json")
    }

    /// Additional headers.
    pub fn extra_headers(&self) -> &[(HeaderName, HeaderValue)] {
        &self.extra_headers
    }

    /// Credential override.
    pub fn credential(&self) -> Option<&AuthMethod> {
        self.credential.as_ref()
    }

    /// Retry budget override.
    pub fn max_retries(&self) -> Option<u32> {
        self.max_retries
    }

    /// Retry delay override.
    pub fn retry_delay(&self) -> Option<Duration> {
        self.retry_delay
    }

    /// Telemetry event name, defaulting to `"{METHOD} request"`.
    pub fn telemetry_event(&self) -> String {
        self.telemetry_event
            .clone()
            .unwrap_or_else(|| format!("{} request", self.method))
    }

    /// Extra telemetry properties.
    pub fn telemetry_properties(&self) -> &HashMap<String, String> {
        &self.telemetry_properties
    }
}

/// Builder for [`CallDescriptor`].
///
/// The first failing step is remembered and reported by [`build`](Self::build),
/// so calls can be chained without intermediate `?`.
#[derive(Debug)]
pub struct CallDescriptorBuilder {
    descriptor: CallDescriptor,
    error: Option<GitHubError>,
}

impl CallDescriptorBuilder {
    fn new(method: Method, uri_fragment: String) -> Self {
        Self {
            descriptor: CallDescriptor {
                method,
                uri_fragment,
                query: Vec::new(),
                body: None,
                content_type: None,
                accept: DEFAULT_ACCEPT.to_string(),
                extra_headers: Vec::new(),
                credential: None,
                max_retries: None,
                retry_delay: None,
                telemetry_event: None,
                telemetry_properties: HashMap::new(),
            },
            error: None,
        }
    }

    fn fail(&mut self, error: GitHubError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Adds one query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.descriptor.query.push((key.into(), value.to_string()));
        self
    }

    /// Adds query parameters from a serializable struct; `None` fields are skipped.
    pub fn query_params<P: Serialize>(mut self, params: &P) -> Self {
        match serde_urlencoded::to_string(params) {
            Ok(encoded) => {
                let pairs = url::form_urlencoded::parse(encoded.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()));
                self.descriptor.query.extend(pairs);
            }
            Err(e) => self.fail(GitHubError::invalid_parameter(format!(
                "Failed to serialize query parameters: {}",
                e
            ))),
        }
        self
    }

    /// Serializes `body` as JSON.
    pub fn json_body<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        match serde_json::to_vec(body) {
            Ok(bytes) => {
                self.descriptor.body = Some(Bytes::from(bytes));
                self.descriptor.content_type = Some("application/json".to_string());
            }
            Err(e) => self.fail(GitHubError::invalid_parameter(format!(
                "Failed to serialize request body: {}",
                e
            ))),
        }
        self
    }

    /// Uses an already serialized body.
    pub fn raw_body(mut self, body: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        self.descriptor.body = Some(body.into());
        self.descriptor.content_type = Some(content_type.into());
        self
    }

    /// Sends an explicit empty body (`Content-Length: 0`), as some PUT endpoints require.
    pub fn empty_body(mut self) -> Self {
        self.descriptor.body = Some(Bytes::new());
        self.descriptor.content_type = None;
        self
    }

    /// Sets the `Accept` header.
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.descriptor.accept = accept.into();
        self
    }

    /// Adds a header.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => self.descriptor.extra_headers.push((name, value)),
            _ => self.fail(GitHubError::invalid_parameter(format!("Invalid header: {}", name))),
        }
        self
    }

    /// Overrides the credential for this call.
    pub fn credential(mut self, credential: AuthMethod) -> Self {
        self.descriptor.credential = Some(credential);
        self
    }

    /// Overrides the retry budget for this call.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.descriptor.max_retries = Some(retries);
        self
    }

    /// Overrides the base retry delay for this call.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.descriptor.retry_delay = Some(delay);
        self
    }

    /// Names the telemetry event.
    pub fn telemetry_event(mut self, event: impl Into<String>) -> Self {
        self.descriptor.telemetry_event = Some(event.into());
        self
    }

    /// Adds a telemetry property.
    pub fn telemetry_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.descriptor
            .telemetry_properties
            .insert(key.into(), value.into());
        self
    }

    /// Validates and returns the descriptor.
    pub fn build(mut self) -> GitHubResult<CallDescriptor> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let allowed = [
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::PUT,
            Method::DELETE,
        ];
        if !allowed.contains(&self.descriptor.method) {
            return Err(GitHubError::invalid_parameter(format!(
                "Unsupported method: {}",
                self.descriptor.method
            )));
        }

        let fragment = self.descriptor.uri_fragment.trim();
        if fragment.contains("://") || fragment.starts_with("//") {
            return Err(GitHubError::invalid_parameter(format!(
                "URI fragment must be relative: {}",
                fragment
            )));
        }
        let fragment = fragment.trim_start_matches('/');
        if fragment.is_empty() || fragment.chars().any(char::is_whitespace) {
            return Err(GitHubError::invalid_parameter(format!(
                "Invalid URI fragment: {:?}",
                self.descriptor.uri_fragment
            )));
        }
        self.descriptor.uri_fragment = fragment.to_string();

        Ok(self.descriptor)
    }
}

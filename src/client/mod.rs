//! REST invoker and GitHub client.

mod descriptor;

pub use descriptor::{CallDescriptor, CallDescriptorBuilder, DEFAULT_ACCEPT};

use crate::auth::{AuthMethod, CredentialProvider, StaticCredentialProvider};
use crate::config::{ConfigProvider, GitHubConfig};
use crate::errors::{ErrorResponseBody, GitHubError, GitHubResult};
use crate::pagination::{page_items, AggregatedResult, PageCursor};
use crate::resilience::{classify, Disposition, RateLimitState, RetryPolicy};
use crate::services::*;
use crate::telemetry::{keys, redact_header, NoopTelemetry, TelemetrySink, TracingHooks};
use crate::types::RepositoryRef;
use bytes::Bytes;
use chrono::Utc;
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Method};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::sleep;
use url::Url;
use uuid::Uuid;

/// Outcome of one successful HTTP round-trip.
#[derive(Debug, Clone)]
pub struct InvocationResult {
    status: u16,
    headers: HeaderMap,
    body: Option<Value>,
    raw: Bytes,
    rate_limit: Option<RateLimitState>,
}

impl InvocationResult {
    /// HTTP status code (always 2xx).
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Parsed JSON body; `None` for an empty body or a non-JSON accept type.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Consumes the result and returns the parsed body.
    pub fn into_body(self) -> Option<Value> {
        self.body
    }

    /// Raw body bytes.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// Body as UTF-8 text.
    pub fn text(&self) -> GitHubResult<&str> {
        std::str::from_utf8(&self.raw)
            .map_err(|e| GitHubError::unknown(format!("Response body is not UTF-8: {}", e)).with_cause(e))
    }

    /// Rate-limit standing reported with this response.
    pub fn rate_limit(&self) -> Option<&RateLimitState> {
        self.rate_limit.as_ref()
    }

    /// Next page, if the response advertises one.
    pub fn next_cursor(&self) -> Option<PageCursor> {
        PageCursor::from_headers(&self.headers)
    }

    /// Deserializes the body into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> GitHubResult<T> {
        let body = self.body.clone().unwrap_or(Value::Null);
        serde_json::from_value(body).map_err(|e| {
            GitHubError::unknown(format!("Failed to deserialize response: {}", e)).with_cause(e)
        })
    }
}

/// Per-call values resolved once before the first request.
struct CallContext {
    call_id: String,
    policy: RetryPolicy,
    auth_header: Option<SecretString>,
    user_agent: String,
    api_version: String,
    started: Instant,
}

/// Counters reported to telemetry when the call ends.
#[derive(Debug, Default)]
struct CallStats {
    attempts: u32,
    retries: u32,
    rate_limit_waits: u32,
    pages: u32,
    last_status: Option<u16>,
}

/// Response read to completion.
struct RawResponse {
    status: u16,
    headers: HeaderMap,
    body: Bytes,
}

/// Executes logical REST calls: authentication, pagination, rate-limit waits
/// and bounded retries.
///
/// Cheap to clone; clones share the connection pool and providers. No state
/// is shared between calls, so one invoker can serve any number of concurrent
/// callers. Dropping a call's future abandons it, including pending waits.
#[derive(Clone)]
pub struct RestInvoker {
    http: Client,
    api_base: Url,
    config: Arc<dyn ConfigProvider>,
    credentials: Arc<dyn CredentialProvider>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl std::fmt::Debug for RestInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestInvoker")
            .field("api_base", &self.api_base.as_str())
            .finish_non_exhaustive()
    }
}

impl RestInvoker {
    /// Creates an invoker from explicit providers.
    pub fn new(
        config: Arc<dyn ConfigProvider>,
        credentials: Arc<dyn CredentialProvider>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> GitHubResult<Self> {
        let host = config.api_host();
        let api_base = Url::parse(host.trim_end_matches('/')).map_err(|e| {
            GitHubError::configuration(format!("Invalid API host {}: {}", host, e)).with_cause(e)
        })?;
        if !matches!(api_base.scheme(), "http" | "https") {
            return Err(GitHubError::configuration(
                "API host must start with http:// or https://",
            ));
        }

        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| {
                GitHubError::configuration(format!("Failed to create HTTP client: {}", e)).with_cause(e)
            })?;

        Ok(Self {
            http,
            api_base,
            config,
            credentials,
            telemetry,
        })
    }

    /// Creates a new invoker builder.
    pub fn builder() -> RestInvokerBuilder {
        RestInvokerBuilder::new()
    }

    /// Configuration provider.
    pub fn config(&self) -> &dyn ConfigProvider {
        self.config.as_ref()
    }

    /// Performs one logical call and returns its single response.
    pub async fn invoke_single(&self, descriptor: &CallDescriptor) -> GitHubResult<InvocationResult> {
        let ctx = self.prepare(descriptor).await?;
        let mut stats = CallStats::default();

        let result = match self.build_url(descriptor) {
            Ok(url) => self.execute(&ctx, descriptor, &url, &mut stats).await,
            Err(e) => Err(e),
        };
        if result.is_ok() {
            stats.pages = 1;
        }

        self.emit(&ctx, descriptor, &stats, result.as_ref().err());
        result
    }

    /// Follows `rel="next"` links and returns every item in page order.
    ///
    /// Pages are fetched strictly one after another. Any page failing after
    /// its retries aborts the whole call; no partial result is returned.
    pub async fn invoke_multi_page(&self, descriptor: &CallDescriptor) -> GitHubResult<AggregatedResult> {
        if descriptor.method() != Method::GET {
            return Err(GitHubError::invalid_parameter(format!(
                "Multi-page invocation requires GET, got {}",
                descriptor.method()
            )));
        }

        let ctx = self.prepare(descriptor).await?;
        let mut stats = CallStats::default();
        let result = self.collect_pages(&ctx, descriptor, &mut stats).await;

        self.emit(&ctx, descriptor, &stats, result.as_ref().err());
        result
    }

    async fn collect_pages(
        &self,
        ctx: &CallContext,
        descriptor: &CallDescriptor,
        stats: &mut CallStats,
    ) -> GitHubResult<AggregatedResult> {
        let mut aggregated = AggregatedResult::new();
        let mut visited = HashSet::new();
        let mut url = self.build_url(descriptor)?;

        loop {
            visited.insert(url.to_string());
            let page = self.execute(ctx, descriptor, &url, stats).await?;
            stats.pages += 1;

            let cursor = page.next_cursor();
            aggregated.push_page(page_items(page.into_body()));

            let Some(cursor) = cursor else {
                break;
            };
            let next = self.validate_cursor(&cursor)?;
            if visited.contains(next.as_str()) {
                return Err(GitHubError::unknown(format!(
                    "Pagination cycle detected at {}",
                    next
                )));
            }
            tracing::debug!(call_id = %ctx.call_id, next = %next, "Following next page link");
            url = next;
        }

        Ok(aggregated)
    }

    /// The retry loop for one request.
    async fn execute(
        &self,
        ctx: &CallContext,
        descriptor: &CallDescriptor,
        url: &Url,
        stats: &mut CallStats,
    ) -> GitHubResult<InvocationResult> {
        let method = descriptor.method().as_str();
        let mut retries_used = 0u32;

        loop {
            stats.attempts += 1;
            TracingHooks::on_request_start(&ctx.call_id, method, url.as_str(), retries_used + 1);
            let sent_at = Instant::now();

            let response = match self.send(ctx, descriptor, url).await {
                Ok(response) => response,
                Err(e) if is_transient_transport(&e) => {
                    if !ctx.policy.can_retry(retries_used) || !is_replayable(&e, descriptor.method()) {
                        return Err(GitHubError::transient(format!(
                            "Request failed after {} attempt(s): {}",
                            retries_used + 1,
                            e
                        ))
                        .with_cause(e));
                    }
                    let delay = ctx.policy.backoff(retries_used);
                    TracingHooks::on_retry(&ctx.call_id, method, url.as_str(), retries_used + 1, delay, "transport");
                    retries_used += 1;
                    stats.retries += 1;
                    sleep(delay).await;
                    continue;
                }
                Err(e) => {
                    return Err(GitHubError::unknown(format!("Request failed: {}", e)).with_cause(e));
                }
            };

            let status = response.status;
            stats.last_status = Some(status);
            TracingHooks::on_request_complete(&ctx.call_id, method, url.as_str(), status, sent_at.elapsed());

            let rate_limit = RateLimitState::from_headers(&response.headers);
            let request_id = response
                .headers
                .get("x-github-request-id")
                .and_then(|v| v.to_str().ok())
                .map(String::from);

            if (200..300).contains(&status) {
                return Self::success(descriptor, response, rate_limit);
            }

            let error_body = ErrorResponseBody::parse(&response.body);
            match classify(status, rate_limit.as_ref(), error_body.message.as_deref()) {
                Disposition::Success => return Self::success(descriptor, response, rate_limit),
                Disposition::RateLimited => {
                    if !ctx.policy.can_retry(retries_used) {
                        let mut error = GitHubError::rate_limit_exceeded(rate_limit).with_status(status);
                        if let Some(id) = request_id {
                            error = error.with_request_id(id);
                        }
                        return Err(error);
                    }
                    let wait = ctx.policy.rate_limit_wait(rate_limit.as_ref(), Utc::now());
                    TracingHooks::on_rate_limited(&ctx.call_id, rate_limit.as_ref(), wait);
                    stats.rate_limit_waits += 1;
                    retries_used += 1;
                    stats.retries += 1;
                    sleep(wait).await;
                }
                Disposition::Transient => {
                    if !ctx.policy.can_retry(retries_used) {
                        let mut error = GitHubError::from_status(status, &error_body);
                        if let Some(id) = request_id {
                            error = error.with_request_id(id);
                        }
                        return Err(error);
                    }
                    let delay = ctx.policy.backoff(retries_used);
                    TracingHooks::on_retry(&ctx.call_id, method, url.as_str(), retries_used + 1, delay, "server error");
                    retries_used += 1;
                    stats.retries += 1;
                    sleep(delay).await;
                }
                Disposition::Permanent => {
                    let mut error = GitHubError::from_status(status, &error_body);
                    if let Some(id) = request_id {
                        error = error.with_request_id(id);
                    }
                    if let Some(state) = rate_limit {
                        error = error.with_rate_limit(state);
                    }
                    return Err(error);
                }
            }
        }
    }

    async fn send(
        &self,
        ctx: &CallContext,
        descriptor: &CallDescriptor,
        url: &Url,
    ) -> Result<RawResponse, reqwest::Error> {
        let mut request = self
            .http
            .request(descriptor.method().clone(), url.clone())
            .header(ACCEPT, descriptor.accept())
            .header(USER_AGENT, &ctx.user_agent)
            .header("X-GitHub-Api-Version", &ctx.api_version);

        if let Some(ref auth) = ctx.auth_header {
            request = request.header(AUTHORIZATION, auth.expose_secret().as_str());
        }

        for (name, value) in descriptor.extra_headers() {
            tracing::trace!(
                call_id = %ctx.call_id,
                header = %name,
                value = %redact_header(name.as_str(), value.to_str().unwrap_or("<binary>")),
                "Extra request header"
            );
            request = request.header(name.clone(), value.clone());
        }

        if let Some(body) = descriptor.body() {
            if let Some(content_type) = descriptor.content_type() {
                request = request.header(CONTENT_TYPE, content_type);
            }
            request = request.body(body.clone());
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    fn success(
        descriptor: &CallDescriptor,
        response: RawResponse,
        rate_limit: Option<RateLimitState>,
    ) -> GitHubResult<InvocationResult> {
        let is_blank = response.body.iter().all(u8::is_ascii_whitespace);
        let body = if is_blank || !descriptor.expects_json() {
            None
        } else {
            let value: Value = serde_json::from_slice(&response.body).map_err(|e| {
                GitHubError::unknown(format!("Failed to parse response body as JSON: {}", e))
                    .with_status(response.status)
                    .with_cause(e)
            })?;
            Some(value)
        };

        Ok(InvocationResult {
            status: response.status,
            headers: response.headers,
            body,
            raw: response.body,
            rate_limit,
        })
    }

    async fn prepare(&self, descriptor: &CallDescriptor) -> GitHubResult<CallContext> {
        let auth_header = match descriptor.credential() {
            Some(method) => method.header_value(),
            None => self.credentials.auth_header_value().await?,
        };

        let policy = RetryPolicy::new(
            descriptor
                .max_retries()
                .unwrap_or_else(|| self.config.max_retries()),
            descriptor
                .retry_delay()
                .unwrap_or_else(|| self.config.retry_delay()),
            self.config.max_backoff(),
        );

        Ok(CallContext {
            call_id: Uuid::new_v4().to_string(),
            policy,
            auth_header,
            user_agent: self.config.user_agent(),
            api_version: self.config.api_version(),
            started: Instant::now(),
        })
    }

    fn build_url(&self, descriptor: &CallDescriptor) -> GitHubResult<Url> {
        let base = self.api_base.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/{}", base, descriptor.uri_fragment())).map_err(|e| {
            GitHubError::invalid_parameter(format!(
                "Invalid URI fragment {}: {}",
                descriptor.uri_fragment(),
                e
            ))
        })?;

        if !descriptor.query().is_empty() {
            url.query_pairs_mut().extend_pairs(descriptor.query());
        }

        Ok(url)
    }

    /// Next-page links must stay on the API host; credentials are attached to them.
    fn validate_cursor(&self, cursor: &PageCursor) -> GitHubResult<Url> {
        let next = Url::parse(cursor.as_str()).map_err(|e| {
            GitHubError::unknown(format!("Invalid next page link {}: {}", cursor.as_str(), e))
        })?;

        let same_origin = next.scheme() == self.api_base.scheme()
            && next.host_str() == self.api_base.host_str()
            && next.port_or_known_default() == self.api_base.port_or_known_default();
        if !same_origin {
            return Err(GitHubError::unknown(format!(
                "Next page link points outside the API host: {}",
                next
            )));
        }

        Ok(next)
    }

    fn emit(
        &self,
        ctx: &CallContext,
        descriptor: &CallDescriptor,
        stats: &CallStats,
        error: Option<&GitHubError>,
    ) {
        if self.config.telemetry_disabled() {
            return;
        }

        let mut properties: HashMap<String, String> = descriptor.telemetry_properties().clone();
        properties.insert(keys::CALL_ID.to_string(), ctx.call_id.clone());
        properties.insert(keys::METHOD.to_string(), descriptor.method().to_string());
        properties.insert(keys::ATTEMPTS.to_string(), stats.attempts.to_string());
        properties.insert(keys::RETRIES.to_string(), stats.retries.to_string());
        properties.insert(keys::RATE_LIMIT_WAITS.to_string(), stats.rate_limit_waits.to_string());
        properties.insert(keys::PAGES.to_string(), stats.pages.to_string());
        properties.insert(
            keys::DURATION_MS.to_string(),
            ctx.started.elapsed().as_millis().to_string(),
        );
        if let Some(status) = stats.last_status {
            properties.insert(keys::STATUS.to_string(), status.to_string());
        }
        let outcome = error.map(|e| e.kind().as_str()).unwrap_or("success");
        properties.insert(keys::OUTCOME.to_string(), outcome.to_string());

        self.telemetry.record(&descriptor.telemetry_event(), &properties);
    }
}

fn is_transient_transport(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request() || error.is_body() || error.is_decode()
}

/// A response body lost mid-read may only be re-requested when the method is
/// idempotent; the server already acted on a POST or PATCH.
fn is_replayable(error: &reqwest::Error, method: &Method) -> bool {
    let body_lost = error.is_body() || error.is_decode();
    !body_lost || [Method::GET, Method::PUT, Method::DELETE].contains(method)
}

/// Builder for [`RestInvoker`].
pub struct RestInvokerBuilder {
    config: Option<Arc<dyn ConfigProvider>>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    telemetry: Option<Arc<dyn TelemetrySink>>,
}

impl RestInvokerBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config: None,
            credentials: None,
            telemetry: None,
        }
    }

    /// Uses a static configuration.
    pub fn config(self, config: GitHubConfig) -> Self {
        self.config_provider(Arc::new(config))
    }

    /// Uses a custom configuration provider.
    pub fn config_provider(mut self, provider: Arc<dyn ConfigProvider>) -> Self {
        self.config = Some(provider);
        self
    }

    /// Uses fixed credentials.
    pub fn auth(self, auth: AuthMethod) -> Self {
        self.credential_provider(Arc::new(StaticCredentialProvider::new(auth)))
    }

    /// Uses a bearer token.
    pub fn token(self, token: impl Into<String>) -> Self {
        self.auth(AuthMethod::token(token))
    }

    /// Uses a custom credential provider.
    pub fn credential_provider(mut self, provider: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(provider);
        self
    }

    /// Sets the telemetry sink.
    pub fn telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = Some(sink);
        self
    }

    /// Builds the invoker. Defaults: stock configuration, anonymous access, no telemetry.
    pub fn build(self) -> GitHubResult<RestInvoker> {
        RestInvoker::new(
            self.config
                .unwrap_or_else(|| Arc::new(GitHubConfig::default())),
            self.credentials
                .unwrap_or_else(|| Arc::new(StaticCredentialProvider::anonymous())),
            self.telemetry.unwrap_or_else(|| Arc::new(NoopTelemetry)),
        )
    }
}

impl Default for RestInvokerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// GitHub REST command layer.
#[derive(Clone, Debug)]
pub struct GitHubClient {
    invoker: RestInvoker,
}

impl GitHubClient {
    /// Wraps an invoker.
    pub fn new(invoker: RestInvoker) -> Self {
        Self { invoker }
    }

    /// Creates a new client builder.
    pub fn builder() -> GitHubClientBuilder {
        GitHubClientBuilder::new()
    }

    /// The underlying invoker, for calls no command covers.
    pub fn invoker(&self) -> &RestInvoker {
        &self.invoker
    }

    /// Resolves a repository from explicit parts or the configured defaults.
    pub fn repository(&self, owner: Option<&str>, name: Option<&str>) -> GitHubResult<RepositoryRef> {
        RepositoryRef::resolve(owner, name, self.invoker.config())
    }

    // Service accessors

    /// Gets the repositories service.
    pub fn repositories(&self) -> RepositoriesService<'_> {
        RepositoriesService::new(self)
    }

    /// Gets the issues service.
    pub fn issues(&self) -> IssuesService<'_> {
        IssuesService::new(self)
    }

    /// Gets the issue comments service.
    pub fn comments(&self) -> CommentsService<'_> {
        CommentsService::new(self)
    }

    /// Gets the labels service.
    pub fn labels(&self) -> LabelsService<'_> {
        LabelsService::new(self)
    }

    /// Gets the milestones service.
    pub fn milestones(&self) -> MilestonesService<'_> {
        MilestonesService::new(self)
    }

    /// Gets the teams service.
    pub fn teams(&self) -> TeamsService<'_> {
        TeamsService::new(self)
    }

    /// Gets the classic projects service.
    pub fn projects(&self) -> ProjectsService<'_> {
        ProjectsService::new(self)
    }

    /// Gets the codespaces service.
    pub fn codespaces(&self) -> CodespacesService<'_> {
        CodespacesService::new(self)
    }

    /// Gets the traffic service.
    pub fn traffic(&self) -> TrafficService<'_> {
        TrafficService::new(self)
    }

    /// Gets the gists service.
    pub fn gists(&self) -> GistsService<'_> {
        GistsService::new(self)
    }

    /// Gets the events service.
    pub fn events(&self) -> EventsService<'_> {
        EventsService::new(self)
    }
}

/// Builder for GitHubClient.
pub struct GitHubClientBuilder {
    invoker_builder: RestInvokerBuilder,
}

impl GitHubClientBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            invoker_builder: RestInvoker::builder(),
        }
    }

    /// Uses a static configuration.
    pub fn config(mut self, config: GitHubConfig) -> Self {
        self.invoker_builder = self.invoker_builder.config(config);
        self
    }

    /// Uses a custom configuration provider.
    pub fn config_provider(mut self, provider: Arc<dyn ConfigProvider>) -> Self {
        self.invoker_builder = self.invoker_builder.config_provider(provider);
        self
    }

    /// Sets the authentication method.
    pub fn auth(mut self, auth: AuthMethod) -> Self {
        self.invoker_builder = self.invoker_builder.auth(auth);
        self
    }

    /// Sets a bearer token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.invoker_builder = self.invoker_builder.token(token);
        self
    }

    /// Uses a custom credential provider.
    pub fn credential_provider(mut self, provider: Arc<dyn CredentialProvider>) -> Self {
        self.invoker_builder = self.invoker_builder.credential_provider(provider);
        self
    }

    /// Sets the telemetry sink.
    pub fn telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.invoker_builder = self.invoker_builder.telemetry(sink);
        self
    }

    /// Builds the client.
    pub fn build(self) -> GitHubResult<GitHubClient> {
        Ok(GitHubClient::new(self.invoker_builder.build()?))
    }
}

impl Default for GitHubClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GitHubErrorKind;
    use crate::telemetry::MockTelemetrySink;

    fn invoker_with(config: GitHubConfig, telemetry: Arc<dyn TelemetrySink>) -> RestInvoker {
        RestInvoker::builder()
            .config(config)
            .token("ghp_test")
            .telemetry(telemetry)
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_url() {
        let invoker = RestInvoker::builder().build().unwrap();

        let descriptor = CallDescriptor::get("/repos/owner/repo/issues")
            .query("state", "all")
            .query("labels", "bug,help wanted")
            .build()
            .unwrap();

        assert_eq!(
            invoker.build_url(&descriptor).unwrap().as_str(),
            "https://api.github.com/repos/owner/repo/issues?state=all&labels=bug%2Chelp+wanted"
        );
    }

    #[test]
    fn test_build_url_keeps_enterprise_prefix() {
        let config = GitHubConfig::builder()
            .api_host("https://ghe.example.com/api/v3")
            .build()
            .unwrap();
        let invoker = invoker_with(config, Arc::new(NoopTelemetry));
        let descriptor = CallDescriptor::get("user").build().unwrap();

        assert_eq!(
            invoker.build_url(&descriptor).unwrap().as_str(),
            "https://ghe.example.com/api/v3/user"
        );
    }

    #[test]
    fn test_cursor_must_stay_on_api_host() {
        let invoker = RestInvoker::builder().build().unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            "link",
            r#"<https://attacker.example.com/page2>; rel="next""#.parse().unwrap(),
        );
        let cursor = PageCursor::from_headers(&headers).unwrap();
        let error = invoker.validate_cursor(&cursor).unwrap_err();
        assert_eq!(error.kind(), GitHubErrorKind::UnknownApi);

        headers.insert(
            "link",
            r#"<https://api.github.com/repositories/1/issues?page=2>; rel="next""#.parse().unwrap(),
        );
        let cursor = PageCursor::from_headers(&headers).unwrap();
        assert!(invoker.validate_cursor(&cursor).is_ok());
    }

    #[tokio::test]
    async fn test_multi_page_requires_get() {
        let mut telemetry = MockTelemetrySink::new();
        telemetry.expect_record().never();
        let invoker = invoker_with(GitHubConfig::default(), Arc::new(telemetry));

        let descriptor = CallDescriptor::post("user/repos").build().unwrap();
        let error = invoker.invoke_multi_page(&descriptor).await.unwrap_err();

        assert_eq!(error.kind(), GitHubErrorKind::InvalidParameter);
    }

    #[tokio::test]
    async fn test_transport_failure_without_retries_is_transient() {
        // Nothing listens on port 9 of localhost, so the connect fails at once.
        let config = GitHubConfig::builder()
            .api_host("http://127.0.0.1:9")
            .max_retries(0)
            .build()
            .unwrap();

        let mut telemetry = MockTelemetrySink::new();
        telemetry
            .expect_record()
            .withf(|event, properties| {
                event == "GET request"
                    && properties.get(keys::OUTCOME).map(String::as_str) == Some("transient")
                    && properties.get(keys::ATTEMPTS).map(String::as_str) == Some("1")
                    && !properties.contains_key(keys::STATUS)
            })
            .times(1)
            .return_const(());
        let invoker = invoker_with(config, Arc::new(telemetry));

        let descriptor = CallDescriptor::get("user").build().unwrap();
        let error = invoker.invoke_single(&descriptor).await.unwrap_err();

        assert_eq!(error.kind(), GitHubErrorKind::Transient);
    }

    #[tokio::test]
    async fn test_descriptor_credential_overrides_provider() {
        let invoker = RestInvoker::builder().token("ghp_provider").build().unwrap();

        let descriptor = CallDescriptor::get("user")
            .credential(AuthMethod::Anonymous)
            .max_retries(7)
            .build()
            .unwrap();
        let ctx = invoker.prepare(&descriptor).await.unwrap();
        assert!(ctx.auth_header.is_none());
        assert_eq!(ctx.policy.max_retries, 7);

        let descriptor = CallDescriptor::get("user").build().unwrap();
        let ctx = invoker.prepare(&descriptor).await.unwrap();
        assert_eq!(
            ctx.auth_header.unwrap().expose_secret().as_str(),
            "Bearer ghp_provider"
        );
        assert_eq!(ctx.policy.max_retries, crate::config::DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_client_builder() {
        let result = GitHubClient::builder()
            .token("ghp_xxxx")
            .config(
                GitHubConfig::builder()
                    .user_agent("test-client/1.0")
                    .build()
                    .unwrap(),
            )
            .build();

        assert!(result.is_ok());
    }
}

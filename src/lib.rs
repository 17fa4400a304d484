//! # GitHub REST Integration Library
//!
//! An authenticated, rate-limit-aware GitHub REST client with:
//! - A single invocation engine ([`RestInvoker`]) for every call
//! - Transparent `Link` header pagination
//! - Primary and secondary rate-limit waits with bounded retries
//! - Exponential backoff for transient failures
//! - Pluggable configuration, credential and telemetry providers
//! - A command layer covering repositories, issues, labels, gists and more
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use integrations_github_rest::{GitHubClient, IssueStateFilter, ListIssuesParams, RepositoryRef};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GitHubClient::builder()
//!         .token("ghp_xxxxxxxxxxxx")
//!         .build()?;
//!
//!     let repo = RepositoryRef::parse("octocat/Hello-World")?;
//!     let params = ListIssuesParams {
//!         state: Some(IssueStateFilter::Open),
//!         ..Default::default()
//!     };
//!
//!     for issue in client.issues().list(&repo, &params).await? {
//!         println!("#{} {}", issue.resource_id().unwrap_or("?"), issue.get("title").unwrap_or(&serde_json::Value::Null));
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Raw calls
//!
//! ```rust,no_run
//! use integrations_github_rest::{CallDescriptor, RestInvoker};
//!
//! # async fn run() -> integrations_github_rest::GitHubResult<()> {
//! let invoker = RestInvoker::builder().build()?;
//! let descriptor = CallDescriptor::get("repos/rust-lang/rust/releases").build()?;
//! let releases = invoker.invoke_multi_page(&descriptor).await?;
//! println!("{} releases over {} pages", releases.len(), releases.pages());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;
pub mod types;

// Authentication
pub mod auth;

// Invocation engine and command client
pub mod client;

// Pagination handling
pub mod pagination;

// Command services
pub mod services;

// Rate limits and retries
pub mod resilience;

// Telemetry
pub mod telemetry;

// Re-exports for convenience
pub use auth::{AuthMethod, CredentialProvider, EnvCredentialProvider, StaticCredentialProvider};
pub use client::{
    CallDescriptor, CallDescriptorBuilder, GitHubClient, GitHubClientBuilder, InvocationResult,
    RestInvoker, RestInvokerBuilder,
};
pub use config::{ConfigProvider, GitHubConfig, GitHubConfigBuilder};
pub use errors::{FieldError, GitHubError, GitHubErrorKind, GitHubResult};
pub use pagination::{AggregatedResult, PageCursor, PaginationLinks};
pub use resilience::{RateLimitState, RetryPolicy};
pub use services::*;
pub use telemetry::{Metrics, MetricsSnapshot, NoopTelemetry, TelemetrySink, TracingTelemetry};
pub use types::{GitHubObject, ObjectType, RepositoryRef};

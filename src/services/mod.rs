//! GitHub REST command services.
//!
//! Each service borrows the [`GitHubClient`] and maps validated parameters to
//! a [`CallDescriptor`]. Listing commands go through the multi-page path,
//! everything else through a single invocation.

mod codespaces;
mod comments;
mod events;
mod gists;
mod issues;
mod labels;
mod milestones;
mod projects;
mod repositories;
mod teams;
mod traffic;

pub use codespaces::*;
pub use comments::*;
pub use events::*;
pub use gists::*;
pub use issues::*;
pub use labels::*;
pub use milestones::*;
pub use projects::*;
pub use repositories::*;
pub use teams::*;
pub use traffic::*;

use crate::client::{CallDescriptor, CallDescriptorBuilder, GitHubClient};
use crate::errors::{GitHubError, GitHubResult};
use crate::types::{GitHubObject, ObjectType};
use serde_json::Value;
use url::Url;

/// Page size requested by every listing command.
pub const LIST_PAGE_SIZE: u32 = 100;

/// Runs a single call and decorates its body.
pub(crate) async fn fetch_one(
    client: &GitHubClient,
    builder: CallDescriptorBuilder,
    object_type: ObjectType,
) -> GitHubResult<GitHubObject> {
    let descriptor = builder.build()?;
    let result = client.invoker().invoke_single(&descriptor).await?;
    Ok(GitHubObject::new(
        result.into_body().unwrap_or(Value::Null),
        object_type,
    ))
}

/// Runs a paged listing and decorates every item.
pub(crate) async fn fetch_all(
    client: &GitHubClient,
    builder: CallDescriptorBuilder,
    object_type: ObjectType,
) -> GitHubResult<Vec<GitHubObject>> {
    let descriptor = builder.query("per_page", LIST_PAGE_SIZE).build()?;
    let aggregated = client.invoker().invoke_multi_page(&descriptor).await?;
    Ok(aggregated
        .into_iter()
        .map(|item| GitHubObject::new(item, object_type))
        .collect())
}

/// Runs a call whose response carries no content.
pub(crate) async fn send_no_content(
    client: &GitHubClient,
    builder: CallDescriptorBuilder,
) -> GitHubResult<()> {
    let descriptor = builder.build()?;
    client.invoker().invoke_single(&descriptor).await?;
    Ok(())
}

/// Runs a call answering yes with 204 and no with 404.
pub(crate) async fn probe(client: &GitHubClient, builder: CallDescriptorBuilder) -> GitHubResult<bool> {
    let descriptor: CallDescriptor = builder.build()?;
    match client.invoker().invoke_single(&descriptor).await {
        Ok(_) => Ok(true),
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(e),
    }
}

/// Rejects a value outside `allowed`.
pub(crate) fn require_one_of(what: &str, value: &str, allowed: &[&str]) -> GitHubResult<()> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(GitHubError::invalid_parameter(format!(
            "Invalid {} {:?}, expected one of: {}",
            what,
            value,
            allowed.join(", ")
        )))
    }
}

/// Percent-encodes a slash separated path, one segment at a time.
pub(crate) fn encode_path(path: &str) -> GitHubResult<String> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.iter().any(|s| *s == "." || *s == "..") {
        return Err(GitHubError::invalid_parameter(format!(
            "Path may not contain relative segments: {}",
            path
        )));
    }

    let mut url = Url::parse("http://localhost/").map_err(|e| GitHubError::unknown(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| GitHubError::unknown("Cannot encode path"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.path().trim_start_matches('/').to_string())
}

/// Percent-encodes one path segment; a `/` inside it is escaped too.
pub(crate) fn encode_segment(what: &str, value: &str) -> GitHubResult<String> {
    require_non_empty(what, value)?;
    if value == "." || value == ".." {
        return Err(GitHubError::invalid_parameter(format!(
            "{} may not be a relative segment: {}",
            what, value
        )));
    }
    let mut url = Url::parse("http://localhost/").map_err(|e| GitHubError::unknown(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| GitHubError::unknown("Cannot encode path"))?
        .pop_if_empty()
        .push(value);
    Ok(url.path().trim_start_matches('/').to_string())
}

/// Rejects an empty or blank value.
pub(crate) fn require_non_empty(what: &str, value: &str) -> GitHubResult<()> {
    if value.trim().is_empty() {
        Err(GitHubError::invalid_parameter(format!("{} cannot be empty", what)))
    } else {
        Ok(())
    }
}

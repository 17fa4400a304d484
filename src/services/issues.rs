//! Issue operations.

use super::{fetch_all, fetch_one, require_non_empty, send_no_content};
use crate::client::{CallDescriptor, GitHubClient};
use crate::errors::{GitHubError, GitHubResult};
use crate::types::{GitHubObject, ObjectType, RepositoryRef};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::str::FromStr;

/// Service for issue operations.
pub struct IssuesService<'a> {
    client: &'a GitHubClient,
}

impl<'a> IssuesService<'a> {
    /// Creates a new issues service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Lists issues (pull requests included, as the API does).
    pub async fn list(
        &self,
        repo: &RepositoryRef,
        params: &ListIssuesParams,
    ) -> GitHubResult<Vec<GitHubObject>> {
        fetch_all(
            self.client,
            CallDescriptor::get(repo.path("/issues")).query_params(params),
            ObjectType::Issue,
        )
        .await
    }

    /// Gets an issue.
    pub async fn get(&self, repo: &RepositoryRef, issue_number: u64) -> GitHubResult<GitHubObject> {
        fetch_one(
            self.client,
            CallDescriptor::get(repo.path(&format!("/issues/{}", issue_number))),
            ObjectType::Issue,
        )
        .await
    }

    /// Creates an issue.
    pub async fn create(
        &self,
        repo: &RepositoryRef,
        request: &CreateIssueRequest,
    ) -> GitHubResult<GitHubObject> {
        require_non_empty("title", &request.title)?;
        fetch_one(
            self.client,
            CallDescriptor::post(repo.path("/issues")).json_body(request),
            ObjectType::Issue,
        )
        .await
    }

    /// Updates an issue.
    pub async fn update(
        &self,
        repo: &RepositoryRef,
        issue_number: u64,
        request: &UpdateIssueRequest,
    ) -> GitHubResult<GitHubObject> {
        if let Some(ref title) = request.title {
            require_non_empty("title", title)?;
        }
        if request.state_reason.is_some() && request.state.is_none() {
            return Err(GitHubError::invalid_parameter(
                "state_reason requires state to be set",
            ));
        }
        fetch_one(
            self.client,
            CallDescriptor::patch(repo.path(&format!("/issues/{}", issue_number))).json_body(request),
            ObjectType::Issue,
        )
        .await
    }

    /// Locks an issue's conversation.
    pub async fn lock(
        &self,
        repo: &RepositoryRef,
        issue_number: u64,
        lock_reason: Option<LockReason>,
    ) -> GitHubResult<()> {
        let path = repo.path(&format!("/issues/{}/lock", issue_number));
        let builder = match lock_reason {
            Some(reason) => CallDescriptor::put(path).json_body(&LockRequest { lock_reason: reason }),
            None => CallDescriptor::put(path).empty_body(),
        };
        send_no_content(self.client, builder).await
    }

    /// Unlocks an issue's conversation.
    pub async fn unlock(&self, repo: &RepositoryRef, issue_number: u64) -> GitHubResult<()> {
        send_no_content(
            self.client,
            CallDescriptor::delete(repo.path(&format!("/issues/{}/lock", issue_number))),
        )
        .await
    }
}

/// Issue state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

/// State filter for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStateFilter {
    Open,
    Closed,
    All,
}

/// Why an issue was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateReason {
    Completed,
    NotPlanned,
    Reopened,
}

/// Issue sort field.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSort {
    Created,
    Updated,
    Comments,
}

/// Reason for locking a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LockReason {
    #[serde(rename = "off-topic")]
    OffTopic,
    #[serde(rename = "too heated")]
    TooHeated,
    #[serde(rename = "resolved")]
    Resolved,
    #[serde(rename = "spam")]
    Spam,
}

impl FromStr for LockReason {
    type Err = GitHubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off-topic" | "off_topic" => Ok(Self::OffTopic),
            "too heated" | "too_heated" => Ok(Self::TooHeated),
            "resolved" => Ok(Self::Resolved),
            "spam" => Ok(Self::Spam),
            _ => Err(GitHubError::invalid_parameter(format!(
                "Invalid lock reason {:?}, expected one of: off-topic, too heated, resolved, spam",
                s
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
struct LockRequest {
    lock_reason: LockReason,
}

/// Filters for issue listings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListIssuesParams {
    /// Milestone number, `*` or `none`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<String>,
    /// State filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<IssueStateFilter>,
    /// Assignee login, `*` or `none`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Creator login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    /// Mentioned login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentioned: Option<String>,
    /// Comma separated label names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<String>,
    /// Sort field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<IssueSort>,
    /// Sort direction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<super::SortDirection>,
    /// Only issues updated at or after this time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<DateTime<Utc>>,
}

impl ListIssuesParams {
    /// Sets the label filter from individual names.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined: Vec<String> = labels.into_iter().map(|l| l.as_ref().to_string()).collect();
        self.labels = Some(joined.join(","));
        self
    }
}

/// Request to create an issue.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateIssueRequest {
    /// Issue title.
    pub title: String,
    /// Issue body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Assignee logins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
    /// Milestone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<u64>,
    /// Label names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

/// Request to update an issue.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateIssueRequest {
    /// Issue title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Issue body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Issue state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<IssueState>,
    /// Close or reopen reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_reason: Option<StateReason>,
    /// Assignee logins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
    /// Milestone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<u64>,
    /// Label names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GitHubErrorKind;
    use test_case::test_case;

    #[test_case("off-topic", LockReason::OffTopic ; "off topic")]
    #[test_case("too heated", LockReason::TooHeated ; "too heated")]
    #[test_case("Resolved", LockReason::Resolved ; "case insensitive")]
    #[test_case("spam", LockReason::Spam ; "spam")]
    fn test_lock_reason_parse(input: &str, expected: LockReason) {
        assert_eq!(input.parse::<LockReason>().unwrap(), expected);
    }

    #[test]
    fn test_lock_reason_rejects_unknown() {
        let error = "boring".parse::<LockReason>().unwrap_err();
        assert_eq!(error.kind(), GitHubErrorKind::InvalidParameter);
    }

    #[test]
    fn test_lock_request_body() {
        let body = serde_json::to_value(LockRequest {
            lock_reason: LockReason::TooHeated,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"lock_reason": "too heated"}));
    }

    #[test]
    fn test_list_params_labels_joined() {
        let params = ListIssuesParams {
            state: Some(IssueStateFilter::All),
            ..Default::default()
        }
        .with_labels(["bug", "help wanted"]);

        assert_eq!(
            serde_urlencoded::to_string(&params).unwrap(),
            "state=all&labels=bug%2Chelp+wanted"
        );
    }
}

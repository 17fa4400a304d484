//! Issue comment operations.

use super::{fetch_all, fetch_one, require_non_empty, send_no_content, SortDirection};
use crate::client::{CallDescriptor, GitHubClient};
use crate::errors::GitHubResult;
use crate::types::{GitHubObject, ObjectType, RepositoryRef};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Service for issue and pull request comments.
pub struct CommentsService<'a> {
    client: &'a GitHubClient,
}

impl<'a> CommentsService<'a> {
    /// Creates a new comments service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Lists comments on one issue.
    pub async fn list_for_issue(
        &self,
        repo: &RepositoryRef,
        issue_number: u64,
        since: Option<DateTime<Utc>>,
    ) -> GitHubResult<Vec<GitHubObject>> {
        let params = ListCommentsParams {
            since,
            ..Default::default()
        };
        fetch_all(
            self.client,
            CallDescriptor::get(repo.path(&format!("/issues/{}/comments", issue_number)))
                .query_params(&params),
            ObjectType::Comment,
        )
        .await
    }

    /// Lists comments across every issue of a repository.
    pub async fn list_for_repo(
        &self,
        repo: &RepositoryRef,
        params: &ListCommentsParams,
    ) -> GitHubResult<Vec<GitHubObject>> {
        fetch_all(
            self.client,
            CallDescriptor::get(repo.path("/issues/comments")).query_params(params),
            ObjectType::Comment,
        )
        .await
    }

    /// Gets a comment.
    pub async fn get(&self, repo: &RepositoryRef, comment_id: u64) -> GitHubResult<GitHubObject> {
        fetch_one(
            self.client,
            CallDescriptor::get(repo.path(&format!("/issues/comments/{}", comment_id))),
            ObjectType::Comment,
        )
        .await
    }

    /// Creates a comment.
    pub async fn create(
        &self,
        repo: &RepositoryRef,
        issue_number: u64,
        body: &str,
    ) -> GitHubResult<GitHubObject> {
        require_non_empty("comment body", body)?;
        fetch_one(
            self.client,
            CallDescriptor::post(repo.path(&format!("/issues/{}/comments", issue_number)))
                .json_body(&CommentRequest { body }),
            ObjectType::Comment,
        )
        .await
    }

    /// Replaces a comment's body.
    pub async fn update(
        &self,
        repo: &RepositoryRef,
        comment_id: u64,
        body: &str,
    ) -> GitHubResult<GitHubObject> {
        require_non_empty("comment body", body)?;
        fetch_one(
            self.client,
            CallDescriptor::patch(repo.path(&format!("/issues/comments/{}", comment_id)))
                .json_body(&CommentRequest { body }),
            ObjectType::Comment,
        )
        .await
    }

    /// Deletes a comment.
    pub async fn delete(&self, repo: &RepositoryRef, comment_id: u64) -> GitHubResult<()> {
        send_no_content(
            self.client,
            CallDescriptor::delete(repo.path(&format!("/issues/comments/{}", comment_id))),
        )
        .await
    }
}

#[derive(Debug, Serialize)]
struct CommentRequest<'b> {
    body: &'b str,
}

/// Comment sort field.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentSort {
    Created,
    Updated,
}

/// Filters for comment listings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListCommentsParams {
    /// Sort field (repository listings only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<CommentSort>,
    /// Sort direction (repository listings only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
    /// Only comments updated at or after this time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<DateTime<Utc>>,
}

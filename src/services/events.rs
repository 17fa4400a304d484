//! Activity, issue and timeline events.

use super::{fetch_all, fetch_one};
use crate::client::{CallDescriptor, GitHubClient};
use crate::errors::GitHubResult;
use crate::types::{require_segment, GitHubObject, ObjectType, RepositoryRef};

/// Service for event listings.
pub struct EventsService<'a> {
    client: &'a GitHubClient,
}

impl<'a> EventsService<'a> {
    /// Creates a new events service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Activity events of a repository (last 90 days).
    pub async fn list_for_repo(&self, repo: &RepositoryRef) -> GitHubResult<Vec<GitHubObject>> {
        fetch_all(self.client, CallDescriptor::get(repo.path("/events")), ObjectType::Event).await
    }

    /// Issue events across every issue of a repository.
    pub async fn list_issue_events_for_repo(&self, repo: &RepositoryRef) -> GitHubResult<Vec<GitHubObject>> {
        fetch_all(
            self.client,
            CallDescriptor::get(repo.path("/issues/events")),
            ObjectType::Event,
        )
        .await
    }

    /// One issue event.
    pub async fn get_issue_event(&self, repo: &RepositoryRef, event_id: u64) -> GitHubResult<GitHubObject> {
        fetch_one(
            self.client,
            CallDescriptor::get(repo.path(&format!("/issues/events/{}", event_id))),
            ObjectType::Event,
        )
        .await
    }

    /// Issue events of one issue.
    pub async fn list_for_issue(
        &self,
        repo: &RepositoryRef,
        issue_number: u64,
    ) -> GitHubResult<Vec<GitHubObject>> {
        fetch_all(
            self.client,
            CallDescriptor::get(repo.path(&format!("/issues/{}/events", issue_number))),
            ObjectType::Event,
        )
        .await
    }

    /// Timeline of one issue, comments and cross references included.
    pub async fn timeline(&self, repo: &RepositoryRef, issue_number: u64) -> GitHubResult<Vec<GitHubObject>> {
        fetch_all(
            self.client,
            CallDescriptor::get(repo.path(&format!("/issues/{}/timeline", issue_number))),
            ObjectType::Event,
        )
        .await
    }

    /// Public events performed by a user.
    pub async fn list_public_for_user(&self, username: &str) -> GitHubResult<Vec<GitHubObject>> {
        require_segment("user", username)?;
        fetch_all(
            self.client,
            CallDescriptor::get(format!("users/{}/events/public", username)),
            ObjectType::Event,
        )
        .await
    }
}

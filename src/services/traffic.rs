//! Repository traffic statistics.

use super::{fetch_all, fetch_one, require_one_of};
use crate::client::{CallDescriptor, GitHubClient};
use crate::errors::GitHubResult;
use crate::types::{GitHubObject, ObjectType, RepositoryRef};

/// Service for traffic statistics (push access required).
pub struct TrafficService<'a> {
    client: &'a GitHubClient,
}

impl<'a> TrafficService<'a> {
    /// Creates a new traffic service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Top referral sources over the last 14 days.
    pub async fn referrers(&self, repo: &RepositoryRef) -> GitHubResult<Vec<GitHubObject>> {
        self.list(repo, "/traffic/popular/referrers").await
    }

    /// Most visited paths over the last 14 days.
    pub async fn paths(&self, repo: &RepositoryRef) -> GitHubResult<Vec<GitHubObject>> {
        self.list(repo, "/traffic/popular/paths").await
    }

    /// View counts; `per` is `day` or `week`.
    pub async fn views(&self, repo: &RepositoryRef, per: Option<&str>) -> GitHubResult<GitHubObject> {
        self.summary(repo, "/traffic/views", per).await
    }

    /// Clone counts; `per` is `day` or `week`.
    pub async fn clones(&self, repo: &RepositoryRef, per: Option<&str>) -> GitHubResult<GitHubObject> {
        self.summary(repo, "/traffic/clones", per).await
    }

    async fn list(&self, repo: &RepositoryRef, suffix: &str) -> GitHubResult<Vec<GitHubObject>> {
        fetch_all(self.client, CallDescriptor::get(repo.path(suffix)), ObjectType::Traffic).await
    }

    async fn summary(
        &self,
        repo: &RepositoryRef,
        suffix: &str,
        per: Option<&str>,
    ) -> GitHubResult<GitHubObject> {
        let mut builder = CallDescriptor::get(repo.path(suffix));
        if let Some(per) = per {
            require_one_of("interval", per, &["day", "week"])?;
            builder = builder.query("per", per);
        }
        fetch_one(self.client, builder, ObjectType::Traffic).await
    }
}

//! Codespace operations.

use super::{fetch_all, fetch_one, send_no_content};
use crate::client::{CallDescriptor, GitHubClient};
use crate::errors::GitHubResult;
use crate::types::{require_segment, GitHubObject, ObjectType, RepositoryRef};
use serde::Serialize;

/// Service for codespaces of the authenticated user.
pub struct CodespacesService<'a> {
    client: &'a GitHubClient,
}

impl<'a> CodespacesService<'a> {
    /// Creates a new codespaces service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Lists the authenticated user's codespaces.
    pub async fn list(&self) -> GitHubResult<Vec<GitHubObject>> {
        fetch_all(
            self.client,
            CallDescriptor::get("user/codespaces"),
            ObjectType::Codespace,
        )
        .await
    }

    /// Lists the authenticated user's codespaces for one repository.
    pub async fn list_for_repo(&self, repo: &RepositoryRef) -> GitHubResult<Vec<GitHubObject>> {
        fetch_all(
            self.client,
            CallDescriptor::get(repo.path("/codespaces")),
            ObjectType::Codespace,
        )
        .await
    }

    /// Gets a codespace by name.
    pub async fn get(&self, name: &str) -> GitHubResult<GitHubObject> {
        require_segment("codespace", name)?;
        fetch_one(
            self.client,
            CallDescriptor::get(format!("user/codespaces/{}", name)),
            ObjectType::Codespace,
        )
        .await
    }

    /// Creates a codespace in a repository.
    pub async fn create_for_repo(
        &self,
        repo: &RepositoryRef,
        request: &CreateCodespaceRequest,
    ) -> GitHubResult<GitHubObject> {
        fetch_one(
            self.client,
            CallDescriptor::post(repo.path("/codespaces")).json_body(request),
            ObjectType::Codespace,
        )
        .await
    }

    /// Starts a stopped codespace.
    pub async fn start(&self, name: &str) -> GitHubResult<GitHubObject> {
        require_segment("codespace", name)?;
        fetch_one(
            self.client,
            CallDescriptor::post(format!("user/codespaces/{}/start", name)).empty_body(),
            ObjectType::Codespace,
        )
        .await
    }

    /// Stops a running codespace.
    pub async fn stop(&self, name: &str) -> GitHubResult<GitHubObject> {
        require_segment("codespace", name)?;
        fetch_one(
            self.client,
            CallDescriptor::post(format!("user/codespaces/{}/stop", name)).empty_body(),
            ObjectType::Codespace,
        )
        .await
    }

    /// Deletes a codespace.
    pub async fn delete(&self, name: &str) -> GitHubResult<()> {
        require_segment("codespace", name)?;
        send_no_content(
            self.client,
            CallDescriptor::delete(format!("user/codespaces/{}", name)),
        )
        .await
    }
}

/// Request to create a codespace. Every field is optional.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateCodespaceRequest {
    /// Git ref to check out.
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    /// Requested geographic location (`EuropeWest`, `WestUs2`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Machine type name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine: Option<String>,
    /// Path to a devcontainer.json.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devcontainer_path: Option<String>,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Minutes of inactivity before shutdown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_timeout_minutes: Option<u32>,
    /// Minutes a stopped codespace is kept.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_period_minutes: Option<u32>,
}

//! Classic project operations.

use super::{fetch_all, fetch_one, require_non_empty, require_one_of, send_no_content};
use crate::client::{CallDescriptor, CallDescriptorBuilder, GitHubClient};
use crate::errors::GitHubResult;
use crate::types::{require_segment, GitHubObject, ObjectType, RepositoryRef};
use serde::Serialize;

/// Preview media type required by the classic projects API.
pub const PROJECTS_ACCEPT: &str = "application/vnd.github.inertia-preview+json";

/// Service for classic projects.
pub struct ProjectsService<'a> {
    client: &'a GitHubClient,
}

impl<'a> ProjectsService<'a> {
    /// Creates a new projects service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Lists projects of a repository; `state` is `open`, `closed` or `all`.
    pub async fn list_for_repo(
        &self,
        repo: &RepositoryRef,
        state: Option<&str>,
    ) -> GitHubResult<Vec<GitHubObject>> {
        self.list(repo.path("/projects"), state).await
    }

    /// Lists projects of an organization.
    pub async fn list_for_org(&self, org: &str, state: Option<&str>) -> GitHubResult<Vec<GitHubObject>> {
        require_segment("organization", org)?;
        self.list(format!("orgs/{}/projects", org), state).await
    }

    /// Lists projects of a user.
    pub async fn list_for_user(&self, username: &str, state: Option<&str>) -> GitHubResult<Vec<GitHubObject>> {
        require_segment("user", username)?;
        self.list(format!("users/{}/projects", username), state).await
    }

    /// Gets a project.
    pub async fn get(&self, project_id: u64) -> GitHubResult<GitHubObject> {
        fetch_one(
            self.client,
            preview(CallDescriptor::get(format!("projects/{}", project_id))),
            ObjectType::Project,
        )
        .await
    }

    /// Creates a repository project.
    pub async fn create_for_repo(
        &self,
        repo: &RepositoryRef,
        name: &str,
        body: Option<&str>,
    ) -> GitHubResult<GitHubObject> {
        self.create(repo.path("/projects"), name, body).await
    }

    /// Creates an organization project.
    pub async fn create_for_org(&self, org: &str, name: &str, body: Option<&str>) -> GitHubResult<GitHubObject> {
        require_segment("organization", org)?;
        self.create(format!("orgs/{}/projects", org), name, body).await
    }

    /// Updates a project.
    pub async fn update(&self, project_id: u64, request: &UpdateProjectRequest) -> GitHubResult<GitHubObject> {
        if let Some(ref name) = request.name {
            require_non_empty("project name", name)?;
        }
        if let Some(ref state) = request.state {
            require_one_of("project state", state, &["open", "closed"])?;
        }
        fetch_one(
            self.client,
            preview(CallDescriptor::patch(format!("projects/{}", project_id)).json_body(request)),
            ObjectType::Project,
        )
        .await
    }

    /// Deletes a project.
    pub async fn delete(&self, project_id: u64) -> GitHubResult<()> {
        send_no_content(
            self.client,
            preview(CallDescriptor::delete(format!("projects/{}", project_id))),
        )
        .await
    }

    async fn list(&self, path: String, state: Option<&str>) -> GitHubResult<Vec<GitHubObject>> {
        let mut builder = preview(CallDescriptor::get(path));
        if let Some(state) = state {
            require_one_of("project state", state, &["open", "closed", "all"])?;
            builder = builder.query("state", state);
        }
        fetch_all(self.client, builder, ObjectType::Project).await
    }

    async fn create(&self, path: String, name: &str, body: Option<&str>) -> GitHubResult<GitHubObject> {
        require_non_empty("project name", name)?;
        fetch_one(
            self.client,
            preview(CallDescriptor::post(path).json_body(&CreateProjectRequest { name, body })),
            ObjectType::Project,
        )
        .await
    }
}

fn preview(builder: CallDescriptorBuilder) -> CallDescriptorBuilder {
    builder.accept(PROJECTS_ACCEPT)
}

#[derive(Debug, Serialize)]
struct CreateProjectRequest<'b> {
    name: &'b str,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'b str>,
}

/// Request to update a project.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateProjectRequest {
    /// Project name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Project description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// `open` or `closed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Default permission for organization members.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_permission: Option<String>,
    /// Whether the project is private.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
}

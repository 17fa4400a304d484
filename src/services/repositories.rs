//! Repository operations.

use super::{encode_path, fetch_all, fetch_one, require_non_empty, send_no_content};
use crate::client::{CallDescriptor, GitHubClient};
use crate::errors::{GitHubError, GitHubResult};
use crate::types::{require_segment, GitHubObject, ObjectType, RepositoryRef};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Accept header returning file contents unwrapped.
const RAW_ACCEPT: &str = "application/vnd.github.raw";

/// Service for repository operations.
pub struct RepositoriesService<'a> {
    client: &'a GitHubClient,
}

impl<'a> RepositoriesService<'a> {
    /// Creates a new repositories service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Gets a repository.
    pub async fn get(&self, repo: &RepositoryRef) -> GitHubResult<GitHubObject> {
        fetch_one(self.client, CallDescriptor::get(repo.path("")), ObjectType::Repository).await
    }

    /// Lists repositories for the authenticated user.
    pub async fn list_for_authenticated_user(
        &self,
        params: &ListReposParams,
    ) -> GitHubResult<Vec<GitHubObject>> {
        fetch_all(
            self.client,
            CallDescriptor::get("user/repos").query_params(params),
            ObjectType::Repository,
        )
        .await
    }

    /// Lists public repositories for a user.
    pub async fn list_for_user(
        &self,
        username: &str,
        params: &ListReposParams,
    ) -> GitHubResult<Vec<GitHubObject>> {
        require_segment("user", username)?;
        fetch_all(
            self.client,
            CallDescriptor::get(format!("users/{}/repos", username)).query_params(params),
            ObjectType::Repository,
        )
        .await
    }

    /// Lists repositories for an organization.
    pub async fn list_for_org(
        &self,
        org: &str,
        params: &ListReposParams,
    ) -> GitHubResult<Vec<GitHubObject>> {
        require_segment("organization", org)?;
        fetch_all(
            self.client,
            CallDescriptor::get(format!("orgs/{}/repos", org)).query_params(params),
            ObjectType::Repository,
        )
        .await
    }

    /// Creates a repository for the authenticated user.
    pub async fn create(&self, request: &CreateRepoRequest) -> GitHubResult<GitHubObject> {
        require_segment("repository", &request.name)?;
        fetch_one(
            self.client,
            CallDescriptor::post("user/repos").json_body(request),
            ObjectType::Repository,
        )
        .await
    }

    /// Creates a repository in an organization.
    pub async fn create_for_org(
        &self,
        org: &str,
        request: &CreateRepoRequest,
    ) -> GitHubResult<GitHubObject> {
        require_segment("organization", org)?;
        require_segment("repository", &request.name)?;
        fetch_one(
            self.client,
            CallDescriptor::post(format!("orgs/{}/repos", org)).json_body(request),
            ObjectType::Repository,
        )
        .await
    }

    /// Updates a repository.
    pub async fn update(
        &self,
        repo: &RepositoryRef,
        request: &UpdateRepoRequest,
    ) -> GitHubResult<GitHubObject> {
        if let Some(ref name) = request.name {
            require_segment("repository", name)?;
        }
        fetch_one(
            self.client,
            CallDescriptor::patch(repo.path("")).json_body(request),
            ObjectType::Repository,
        )
        .await
    }

    /// Deletes a repository.
    pub async fn delete(&self, repo: &RepositoryRef) -> GitHubResult<()> {
        send_no_content(self.client, CallDescriptor::delete(repo.path(""))).await
    }

    // Branches

    /// Lists branches.
    pub async fn list_branches(
        &self,
        repo: &RepositoryRef,
        protected: Option<bool>,
    ) -> GitHubResult<Vec<GitHubObject>> {
        let mut builder = CallDescriptor::get(repo.path("/branches"));
        if let Some(protected) = protected {
            builder = builder.query("protected", protected);
        }
        fetch_all(self.client, builder, ObjectType::Branch).await
    }

    /// Gets a branch.
    pub async fn get_branch(&self, repo: &RepositoryRef, branch: &str) -> GitHubResult<GitHubObject> {
        require_non_empty("branch", branch)?;
        let path = repo.path(&format!("/branches/{}", encode_path(branch)?));
        fetch_one(self.client, CallDescriptor::get(path), ObjectType::Branch).await
    }

    // Topics

    /// Lists repository topics.
    pub async fn list_topics(&self, repo: &RepositoryRef) -> GitHubResult<Vec<String>> {
        let topics: Topics = fetch_one(
            self.client,
            CallDescriptor::get(repo.path("/topics")),
            ObjectType::Generic,
        )
        .await?
        .deserialize()?;
        Ok(topics.names)
    }

    /// Replaces every topic of a repository. An empty list clears them.
    pub async fn replace_topics(
        &self,
        repo: &RepositoryRef,
        names: &[&str],
    ) -> GitHubResult<Vec<String>> {
        for name in names {
            validate_topic(name)?;
        }
        let request = Topics {
            names: names.iter().map(|n| n.to_string()).collect(),
        };
        let topics: Topics = fetch_one(
            self.client,
            CallDescriptor::put(repo.path("/topics")).json_body(&request),
            ObjectType::Generic,
        )
        .await?
        .deserialize()?;
        Ok(topics.names)
    }

    // Contributors

    /// Lists contributors; `anonymous` includes commits without a linked account.
    pub async fn list_contributors(
        &self,
        repo: &RepositoryRef,
        anonymous: bool,
    ) -> GitHubResult<Vec<GitHubObject>> {
        let mut builder = CallDescriptor::get(repo.path("/contributors"));
        if anonymous {
            builder = builder.query("anon", "1");
        }
        fetch_all(self.client, builder, ObjectType::User).await
    }

    // Contents

    /// Gets a file or directory listing. An empty path returns the root.
    pub async fn get_contents(
        &self,
        repo: &RepositoryRef,
        path: &str,
        reference: Option<&str>,
    ) -> GitHubResult<GitHubObject> {
        let mut builder = CallDescriptor::get(repo.path(&format!("/contents/{}", encode_path(path)?)));
        if let Some(reference) = reference {
            builder = builder.query("ref", reference);
        }
        fetch_one(self.client, builder, ObjectType::Content).await
    }

    /// Gets the raw bytes of a file.
    pub async fn get_raw_contents(
        &self,
        repo: &RepositoryRef,
        path: &str,
        reference: Option<&str>,
    ) -> GitHubResult<Bytes> {
        require_non_empty("path", path)?;
        let mut builder = CallDescriptor::get(repo.path(&format!("/contents/{}", encode_path(path)?)))
            .accept(RAW_ACCEPT);
        if let Some(reference) = reference {
            builder = builder.query("ref", reference);
        }
        let result = self.client.invoker().invoke_single(&builder.build()?).await?;
        Ok(result.raw().clone())
    }
}

fn validate_topic(name: &str) -> GitHubResult<()> {
    let valid = !name.is_empty()
        && name.len() <= 50
        && !name.starts_with('-')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(GitHubError::invalid_parameter(format!(
            "Invalid topic {:?}: lowercase letters, digits and hyphens only, at most 50 characters",
            name
        )))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Topics {
    #[serde(default)]
    names: Vec<String>,
}

/// Filters for repository listings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListReposParams {
    /// Type filter.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub repo_type: Option<RepoType>,
    /// Sort field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<RepoSort>,
    /// Sort direction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
}

/// Repository type filter.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoType {
    All,
    Owner,
    Public,
    Private,
    Member,
    Forks,
    Sources,
}

/// Repository sort field.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoSort {
    Created,
    Updated,
    Pushed,
    FullName,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Request to create a repository.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateRepoRequest {
    /// Repository name.
    pub name: String,
    /// Repository description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Homepage URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    /// Whether the repository is private.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    /// Whether issues are enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_issues: Option<bool>,
    /// Whether projects are enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_projects: Option<bool>,
    /// Whether wiki is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_wiki: Option<bool>,
    /// Auto-initialize with README.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_init: Option<bool>,
    /// Gitignore template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gitignore_template: Option<String>,
    /// License template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_template: Option<String>,
}

impl CreateRepoRequest {
    /// Request with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Request to update a repository.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateRepoRequest {
    /// New repository name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Repository description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Homepage URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    /// Whether the repository is private.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    /// Default branch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    /// Whether the repository is archived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

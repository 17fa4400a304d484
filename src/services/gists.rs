//! Gist operations.

use super::{fetch_all, fetch_one, probe, require_non_empty, send_no_content};
use crate::client::{CallDescriptor, CallDescriptorBuilder, GitHubClient};
use crate::errors::{GitHubError, GitHubResult};
use crate::types::{require_segment, GitHubObject, ObjectType};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Service for gist operations.
pub struct GistsService<'a> {
    client: &'a GitHubClient,
}

impl<'a> GistsService<'a> {
    /// Creates a new gists service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Lists gists of the authenticated user (public ones when anonymous).
    pub async fn list(&self, since: Option<DateTime<Utc>>) -> GitHubResult<Vec<GitHubObject>> {
        self.list_at(CallDescriptor::get("gists"), since).await
    }

    /// Lists public gists of a user.
    pub async fn list_for_user(
        &self,
        username: &str,
        since: Option<DateTime<Utc>>,
    ) -> GitHubResult<Vec<GitHubObject>> {
        require_segment("user", username)?;
        self.list_at(CallDescriptor::get(format!("users/{}/gists", username)), since)
            .await
    }

    /// Lists public gists of everyone, most recent first.
    pub async fn list_public(&self, since: Option<DateTime<Utc>>) -> GitHubResult<Vec<GitHubObject>> {
        self.list_at(CallDescriptor::get("gists/public"), since).await
    }

    /// Lists gists starred by the authenticated user.
    pub async fn list_starred(&self, since: Option<DateTime<Utc>>) -> GitHubResult<Vec<GitHubObject>> {
        self.list_at(CallDescriptor::get("gists/starred"), since).await
    }

    /// Gets a gist.
    pub async fn get(&self, gist_id: &str) -> GitHubResult<GitHubObject> {
        fetch_one(
            self.client,
            CallDescriptor::get(gist_path(gist_id, "")?),
            ObjectType::Gist,
        )
        .await
    }

    /// Creates a gist.
    pub async fn create(&self, request: &CreateGistRequest) -> GitHubResult<GitHubObject> {
        if request.files.is_empty() {
            return Err(GitHubError::invalid_parameter("A gist needs at least one file"));
        }
        for (name, file) in &request.files {
            require_non_empty("gist file name", name)?;
            require_non_empty("gist file content", &file.content)?;
        }
        fetch_one(
            self.client,
            CallDescriptor::post("gists").json_body(request),
            ObjectType::Gist,
        )
        .await
    }

    /// Updates a gist's description or files.
    pub async fn update(&self, gist_id: &str, request: &UpdateGistRequest) -> GitHubResult<GitHubObject> {
        if request.description.is_none() && request.files.is_empty() {
            return Err(GitHubError::invalid_parameter(
                "Nothing to update: set a description or at least one file",
            ));
        }
        fetch_one(
            self.client,
            CallDescriptor::patch(gist_path(gist_id, "")?).json_body(request),
            ObjectType::Gist,
        )
        .await
    }

    /// Deletes a gist.
    pub async fn delete(&self, gist_id: &str) -> GitHubResult<()> {
        send_no_content(self.client, CallDescriptor::delete(gist_path(gist_id, "")?)).await
    }

    // Stars

    /// Stars a gist.
    pub async fn star(&self, gist_id: &str) -> GitHubResult<()> {
        send_no_content(
            self.client,
            CallDescriptor::put(gist_path(gist_id, "/star")?).empty_body(),
        )
        .await
    }

    /// Unstars a gist.
    pub async fn unstar(&self, gist_id: &str) -> GitHubResult<()> {
        send_no_content(self.client, CallDescriptor::delete(gist_path(gist_id, "/star")?)).await
    }

    /// Returns true if the authenticated user starred the gist.
    pub async fn is_starred(&self, gist_id: &str) -> GitHubResult<bool> {
        probe(self.client, CallDescriptor::get(gist_path(gist_id, "/star")?)).await
    }

    // Forks

    /// Forks a gist.
    pub async fn fork(&self, gist_id: &str) -> GitHubResult<GitHubObject> {
        fetch_one(
            self.client,
            CallDescriptor::post(gist_path(gist_id, "/forks")?).empty_body(),
            ObjectType::Gist,
        )
        .await
    }

    /// Lists forks of a gist.
    pub async fn list_forks(&self, gist_id: &str) -> GitHubResult<Vec<GitHubObject>> {
        fetch_all(
            self.client,
            CallDescriptor::get(gist_path(gist_id, "/forks")?),
            ObjectType::Gist,
        )
        .await
    }

    async fn list_at(
        &self,
        builder: CallDescriptorBuilder,
        since: Option<DateTime<Utc>>,
    ) -> GitHubResult<Vec<GitHubObject>> {
        let builder = match since {
            Some(since) => builder.query("since", since.to_rfc3339()),
            None => builder,
        };
        fetch_all(self.client, builder, ObjectType::Gist).await
    }
}

fn gist_path(gist_id: &str, suffix: &str) -> GitHubResult<String> {
    if gist_id.is_empty() || !gist_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(GitHubError::invalid_parameter(format!(
            "Invalid gist id: {:?}",
            gist_id
        )));
    }
    Ok(format!("gists/{}{}", gist_id, suffix))
}

/// File content for a new gist.
#[derive(Debug, Clone, Serialize)]
pub struct GistFile {
    /// File content.
    pub content: String,
}

/// Request to create a gist.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateGistRequest {
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the gist is public.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    /// Files keyed by name.
    pub files: BTreeMap<String, GistFile>,
}

impl CreateGistRequest {
    /// Adds a file.
    pub fn file(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(
            name.into(),
            GistFile {
                content: content.into(),
            },
        );
        self
    }
}

/// Change to one file of an existing gist.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GistFileUpdate {
    /// New content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// New file name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// Request to update a gist. A `None` file entry deletes that file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateGistRequest {
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Files keyed by current name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub files: BTreeMap<String, Option<GistFileUpdate>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_gist_path() {
        assert_eq!(gist_path("aa5a315d61ae9438b18d", "/star").unwrap(), "gists/aa5a315d61ae9438b18d/star");
        assert!(gist_path("../users", "").is_err());
        assert!(gist_path("", "").is_err());
    }

    #[test]
    fn test_create_request_body() {
        let request = CreateGistRequest {
            description: Some("Example".to_string()),
            public: Some(false),
            ..Default::default()
        }
        .file("hello.rs", "fn main() {}");

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "description": "Example",
                "public": false,
                "files": {"hello.rs": {"content": "fn main() {}"}}
            })
        );
    }

    #[test]
    fn test_update_request_deletes_with_null() {
        let mut request = UpdateGistRequest::default();
        request.files.insert("old.txt".to_string(), None);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"files": {"old.txt": null}})
        );
    }
}

//! Label operations.

use super::{encode_segment, fetch_all, fetch_one, require_non_empty, send_no_content};
use crate::client::{CallDescriptor, CallDescriptorBuilder, GitHubClient};
use crate::errors::{GitHubError, GitHubResult};
use crate::pagination::page_items;
use crate::types::{GitHubObject, ObjectType, RepositoryRef};
use serde::Serialize;

/// Service for repository and issue labels.
pub struct LabelsService<'a> {
    client: &'a GitHubClient,
}

impl<'a> LabelsService<'a> {
    /// Creates a new labels service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Lists repository labels.
    pub async fn list(&self, repo: &RepositoryRef) -> GitHubResult<Vec<GitHubObject>> {
        fetch_all(self.client, CallDescriptor::get(repo.path("/labels")), ObjectType::Label).await
    }

    /// Gets a label by name.
    pub async fn get(&self, repo: &RepositoryRef, name: &str) -> GitHubResult<GitHubObject> {
        let path = repo.path(&format!("/labels/{}", encode_segment("label name", name)?));
        fetch_one(self.client, CallDescriptor::get(path), ObjectType::Label).await
    }

    /// Creates a label.
    pub async fn create(
        &self,
        repo: &RepositoryRef,
        name: &str,
        color: &str,
        description: Option<&str>,
    ) -> GitHubResult<GitHubObject> {
        require_non_empty("label name", name)?;
        let request = LabelRequest {
            new_name: None,
            name: Some(name),
            color: Some(normalize_color(color)?),
            description,
        };
        fetch_one(
            self.client,
            CallDescriptor::post(repo.path("/labels")).json_body(&request),
            ObjectType::Label,
        )
        .await
    }

    /// Updates a label; `None` leaves a field unchanged.
    pub async fn update(
        &self,
        repo: &RepositoryRef,
        name: &str,
        new_name: Option<&str>,
        color: Option<&str>,
        description: Option<&str>,
    ) -> GitHubResult<GitHubObject> {
        if let Some(new_name) = new_name {
            require_non_empty("new label name", new_name)?;
        }
        let request = LabelRequest {
            name: None,
            new_name,
            color: color.map(normalize_color).transpose()?,
            description,
        };
        let path = repo.path(&format!("/labels/{}", encode_segment("label name", name)?));
        fetch_one(
            self.client,
            CallDescriptor::patch(path).json_body(&request),
            ObjectType::Label,
        )
        .await
    }

    /// Deletes a label.
    pub async fn delete(&self, repo: &RepositoryRef, name: &str) -> GitHubResult<()> {
        let path = repo.path(&format!("/labels/{}", encode_segment("label name", name)?));
        send_no_content(self.client, CallDescriptor::delete(path)).await
    }

    // Issue labels

    /// Lists labels on an issue.
    pub async fn list_for_issue(
        &self,
        repo: &RepositoryRef,
        issue_number: u64,
    ) -> GitHubResult<Vec<GitHubObject>> {
        fetch_all(
            self.client,
            CallDescriptor::get(repo.path(&format!("/issues/{}/labels", issue_number))),
            ObjectType::Label,
        )
        .await
    }

    /// Adds labels to an issue and returns the issue's labels.
    pub async fn add_to_issue(
        &self,
        repo: &RepositoryRef,
        issue_number: u64,
        labels: &[&str],
    ) -> GitHubResult<Vec<GitHubObject>> {
        if labels.is_empty() {
            return Err(GitHubError::invalid_parameter("At least one label is required"));
        }
        self.set_issue_labels(
            CallDescriptor::post(repo.path(&format!("/issues/{}/labels", issue_number))),
            labels,
        )
        .await
    }

    /// Replaces every label on an issue. An empty list clears them.
    pub async fn replace_for_issue(
        &self,
        repo: &RepositoryRef,
        issue_number: u64,
        labels: &[&str],
    ) -> GitHubResult<Vec<GitHubObject>> {
        self.set_issue_labels(
            CallDescriptor::put(repo.path(&format!("/issues/{}/labels", issue_number))),
            labels,
        )
        .await
    }

    /// Removes one label from an issue.
    pub async fn remove_from_issue(
        &self,
        repo: &RepositoryRef,
        issue_number: u64,
        name: &str,
    ) -> GitHubResult<()> {
        let path = repo.path(&format!(
            "/issues/{}/labels/{}",
            issue_number,
            encode_segment("label name", name)?
        ));
        send_no_content(self.client, CallDescriptor::delete(path)).await
    }

    async fn set_issue_labels(
        &self,
        builder: CallDescriptorBuilder,
        labels: &[&str],
    ) -> GitHubResult<Vec<GitHubObject>> {
        for label in labels {
            require_non_empty("label name", label)?;
        }
        let descriptor = builder.json_body(&IssueLabelsRequest { labels }).build()?;
        let result = self.client.invoker().invoke_single(&descriptor).await?;
        Ok(page_items(result.into_body())
            .into_iter()
            .map(|item| GitHubObject::new(item, ObjectType::Label))
            .collect())
    }
}

/// Validates a six digit hex color, dropping a leading `#`.
pub fn normalize_color(color: &str) -> GitHubResult<String> {
    let trimmed = color.trim().trim_start_matches('#');
    if trimmed.len() == 6 && trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(trimmed.to_ascii_lowercase())
    } else {
        Err(GitHubError::invalid_parameter(format!(
            "Invalid label color {:?}, expected six hex digits",
            color
        )))
    }
}

#[derive(Debug, Serialize)]
struct LabelRequest<'b> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'b str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    new_name: Option<&'b str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'b str>,
}

#[derive(Debug, Serialize)]
struct IssueLabelsRequest<'b> {
    labels: &'b [&'b str],
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("d73a4a", "d73a4a" ; "plain")]
    #[test_case("#D73A4A", "d73a4a" ; "hash and uppercase")]
    #[test_case(" 00ff00 ", "00ff00" ; "padded")]
    fn test_normalize_color(input: &str, expected: &str) {
        assert_eq!(normalize_color(input).unwrap(), expected);
    }

    #[test_case("red" ; "name")]
    #[test_case("#fff" ; "short form")]
    #[test_case("12345g" ; "non hex")]
    #[test_case("" ; "empty")]
    fn test_normalize_color_rejects(input: &str) {
        assert!(normalize_color(input).is_err());
    }

    #[test]
    fn test_update_body_omits_unset_fields() {
        let body = serde_json::to_value(LabelRequest {
            name: None,
            new_name: Some("defect"),
            color: None,
            description: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"new_name": "defect"}));
    }
}

//! Milestone operations.

use super::{fetch_all, fetch_one, require_non_empty, require_one_of, send_no_content, SortDirection};
use crate::client::{CallDescriptor, GitHubClient};
use crate::errors::{GitHubError, GitHubResult};
use crate::types::{GitHubObject, ObjectType, RepositoryRef};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// Service for milestone operations.
pub struct MilestonesService<'a> {
    client: &'a GitHubClient,
}

impl<'a> MilestonesService<'a> {
    /// Creates a new milestones service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Lists milestones; `state` is `open`, `closed` or `all`.
    pub async fn list(
        &self,
        repo: &RepositoryRef,
        state: Option<&str>,
        sort: Option<MilestoneSort>,
        direction: Option<SortDirection>,
    ) -> GitHubResult<Vec<GitHubObject>> {
        if let Some(state) = state {
            require_one_of("milestone state", state, &["open", "closed", "all"])?;
        }
        let params = ListMilestonesParams {
            state,
            sort,
            direction,
        };
        fetch_all(
            self.client,
            CallDescriptor::get(repo.path("/milestones")).query_params(&params),
            ObjectType::Milestone,
        )
        .await
    }

    /// Gets a milestone.
    pub async fn get(&self, repo: &RepositoryRef, number: u64) -> GitHubResult<GitHubObject> {
        fetch_one(
            self.client,
            CallDescriptor::get(repo.path(&format!("/milestones/{}", number))),
            ObjectType::Milestone,
        )
        .await
    }

    /// Creates a milestone.
    pub async fn create(
        &self,
        repo: &RepositoryRef,
        request: &MilestoneRequest,
    ) -> GitHubResult<GitHubObject> {
        let title = request
            .title
            .as_deref()
            .ok_or_else(|| GitHubError::invalid_parameter("Milestone title is required"))?;
        require_non_empty("milestone title", title)?;
        request.validate()?;
        fetch_one(
            self.client,
            CallDescriptor::post(repo.path("/milestones")).json_body(request),
            ObjectType::Milestone,
        )
        .await
    }

    /// Updates a milestone.
    pub async fn update(
        &self,
        repo: &RepositoryRef,
        number: u64,
        request: &MilestoneRequest,
    ) -> GitHubResult<GitHubObject> {
        if let Some(ref title) = request.title {
            require_non_empty("milestone title", title)?;
        }
        request.validate()?;
        fetch_one(
            self.client,
            CallDescriptor::patch(repo.path(&format!("/milestones/{}", number))).json_body(request),
            ObjectType::Milestone,
        )
        .await
    }

    /// Deletes a milestone.
    pub async fn delete(&self, repo: &RepositoryRef, number: u64) -> GitHubResult<()> {
        send_no_content(
            self.client,
            CallDescriptor::delete(repo.path(&format!("/milestones/{}", number))),
        )
        .await
    }
}

/// Milestone sort field.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneSort {
    DueOn,
    Completeness,
}

#[derive(Debug, Serialize)]
struct ListMilestonesParams<'b> {
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'b str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<MilestoneSort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    direction: Option<SortDirection>,
}

/// Milestone fields for create and update.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MilestoneRequest {
    /// Title; required on create.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// `open` or `closed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Due date, sent as an RFC 3339 timestamp.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_due_on"
    )]
    pub due_on: Option<DateTime<Utc>>,
}

impl MilestoneRequest {
    /// Request with only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    fn validate(&self) -> GitHubResult<()> {
        if let Some(ref state) = self.state {
            require_one_of("milestone state", state, &["open", "closed"])?;
        }
        Ok(())
    }
}

fn serialize_due_on<S: Serializer>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(due) => serializer.serialize_str(&due.to_rfc3339_opts(SecondsFormat::Secs, true)),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_due_on_serialized_as_rfc3339() {
        let request = MilestoneRequest {
            due_on: Some(Utc.with_ymd_and_hms(2024, 3, 31, 8, 0, 0).unwrap()),
            ..MilestoneRequest::titled("v1.0")
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"title": "v1.0", "due_on": "2024-03-31T08:00:00Z"})
        );
    }

    #[test]
    fn test_state_validation() {
        let mut request = MilestoneRequest::titled("v1.0");
        request.state = Some("closed".to_string());
        assert!(request.validate().is_ok());

        request.state = Some("all".to_string());
        assert!(request.validate().is_err());
    }
}

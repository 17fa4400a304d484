//! Organization team operations.

use super::{fetch_all, fetch_one, require_non_empty, require_one_of, send_no_content};
use crate::client::{CallDescriptor, GitHubClient};
use crate::errors::GitHubResult;
use crate::types::{require_segment, GitHubObject, ObjectType};
use serde::Serialize;

/// Service for team operations.
pub struct TeamsService<'a> {
    client: &'a GitHubClient,
}

impl<'a> TeamsService<'a> {
    /// Creates a new teams service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Lists teams in an organization.
    pub async fn list(&self, org: &str) -> GitHubResult<Vec<GitHubObject>> {
        require_segment("organization", org)?;
        fetch_all(
            self.client,
            CallDescriptor::get(format!("orgs/{}/teams", org)),
            ObjectType::Team,
        )
        .await
    }

    /// Gets a team by slug.
    pub async fn get(&self, org: &str, team_slug: &str) -> GitHubResult<GitHubObject> {
        fetch_one(
            self.client,
            CallDescriptor::get(team_path(org, team_slug, "")?),
            ObjectType::Team,
        )
        .await
    }

    /// Creates a team.
    pub async fn create(&self, org: &str, request: &TeamRequest) -> GitHubResult<GitHubObject> {
        require_segment("organization", org)?;
        require_non_empty("team name", request.name.as_deref().unwrap_or_default())?;
        request.validate()?;
        fetch_one(
            self.client,
            CallDescriptor::post(format!("orgs/{}/teams", org)).json_body(request),
            ObjectType::Team,
        )
        .await
    }

    /// Updates a team.
    pub async fn update(
        &self,
        org: &str,
        team_slug: &str,
        request: &TeamRequest,
    ) -> GitHubResult<GitHubObject> {
        if let Some(ref name) = request.name {
            require_non_empty("team name", name)?;
        }
        request.validate()?;
        fetch_one(
            self.client,
            CallDescriptor::patch(team_path(org, team_slug, "")?).json_body(request),
            ObjectType::Team,
        )
        .await
    }

    /// Deletes a team.
    pub async fn delete(&self, org: &str, team_slug: &str) -> GitHubResult<()> {
        send_no_content(self.client, CallDescriptor::delete(team_path(org, team_slug, "")?)).await
    }

    /// Lists team members; `role` is `member`, `maintainer` or `all`.
    pub async fn list_members(
        &self,
        org: &str,
        team_slug: &str,
        role: Option<&str>,
    ) -> GitHubResult<Vec<GitHubObject>> {
        let mut builder = CallDescriptor::get(team_path(org, team_slug, "/members")?);
        if let Some(role) = role {
            require_one_of("team role", role, &["member", "maintainer", "all"])?;
            builder = builder.query("role", role);
        }
        fetch_all(self.client, builder, ObjectType::User).await
    }

    /// Lists repositories the team can access.
    pub async fn list_repositories(&self, org: &str, team_slug: &str) -> GitHubResult<Vec<GitHubObject>> {
        fetch_all(
            self.client,
            CallDescriptor::get(team_path(org, team_slug, "/repos")?),
            ObjectType::Repository,
        )
        .await
    }
}

fn team_path(org: &str, team_slug: &str, suffix: &str) -> GitHubResult<String> {
    require_segment("organization", org)?;
    require_segment("team slug", team_slug)?;
    Ok(format!("orgs/{}/teams/{}{}", org, team_slug, suffix))
}

/// Team fields for create and update.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TeamRequest {
    /// Team name; required on create.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `secret` or `closed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy: Option<String>,
    /// `notifications_enabled` or `notifications_disabled`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_setting: Option<String>,
    /// Parent team id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_team_id: Option<u64>,
    /// Maintainer logins (create only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintainers: Option<Vec<String>>,
}

impl TeamRequest {
    /// Request with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    fn validate(&self) -> GitHubResult<()> {
        if let Some(ref privacy) = self.privacy {
            require_one_of("team privacy", privacy, &["secret", "closed"])?;
        }
        if let Some(ref setting) = self.notification_setting {
            require_one_of(
                "notification setting",
                setting,
                &["notifications_enabled", "notifications_disabled"],
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_path() {
        assert_eq!(
            team_path("github", "justice-league", "/members").unwrap(),
            "orgs/github/teams/justice-league/members"
        );
        assert!(team_path("github", "bad/slug", "").is_err());
    }

    #[test]
    fn test_privacy_validation() {
        let mut request = TeamRequest::named("Justice League");
        request.privacy = Some("closed".to_string());
        assert!(request.validate().is_ok());

        request.privacy = Some("public".to_string());
        assert!(request.validate().is_err());
    }
}

//! Decorated API objects and repository references.

use crate::config::ConfigProvider;
use crate::errors::{GitHubError, GitHubResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Kind of resource a [`GitHubObject`] was returned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    /// Repository.
    Repository,
    /// Branch.
    Branch,
    /// Issue.
    Issue,
    /// Issue comment.
    Comment,
    /// Label.
    Label,
    /// Milestone.
    Milestone,
    /// Team.
    Team,
    /// Classic project.
    Project,
    /// Codespace.
    Codespace,
    /// Traffic data point or summary.
    Traffic,
    /// Gist.
    Gist,
    /// Activity, issue or timeline event.
    Event,
    /// User or organization account.
    User,
    /// Repository file or directory content.
    Content,
    /// Anything else.
    Generic,
}

impl ObjectType {
    /// Gets the type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Repository => "repository",
            Self::Branch => "branch",
            Self::Issue => "issue",
            Self::Comment => "comment",
            Self::Label => "label",
            Self::Milestone => "milestone",
            Self::Team => "team",
            Self::Project => "project",
            Self::Codespace => "codespace",
            Self::Traffic => "traffic",
            Self::Gist => "gist",
            Self::Event => "event",
            Self::User => "user",
            Self::Content => "content",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payload returned by the API plus the identifiers derived from it.
///
/// The payload itself is kept untouched; derived fields are computed once on
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct GitHubObject {
    raw: Value,
    object_type: ObjectType,
    repository_url: Option<String>,
    owner: Option<String>,
    repository: Option<String>,
    resource_id: Option<String>,
    html_url: Option<String>,
}

impl GitHubObject {
    /// Decorates a raw payload.
    pub fn new(raw: Value, object_type: ObjectType) -> Self {
        let repository_url = str_field(&raw, "repository_url")
            .or_else(|| {
                (object_type == ObjectType::Repository)
                    .then(|| str_field(&raw, "url"))
                    .flatten()
            })
            .or_else(|| raw.get("repository").and_then(|r| str_field(r, "url")));

        let repo_ref = repository_url
            .as_deref()
            .and_then(|url| RepositoryRef::from_url(url).ok())
            .or_else(|| {
                let full_name = if object_type == ObjectType::Repository {
                    str_field(&raw, "full_name")
                } else {
                    raw.get("repository").and_then(|r| str_field(r, "full_name"))
                };
                full_name.and_then(|name| RepositoryRef::parse(&name).ok())
            });

        let resource_id = ["number", "id", "slug", "name", "path"]
            .iter()
            .find_map(|key| match raw.get(*key) {
                Some(Value::Number(n)) => Some(n.to_string()),
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                _ => None,
            });

        let html_url = str_field(&raw, "html_url");

        Self {
            owner: repo_ref.as_ref().map(|r| r.owner.clone()),
            repository: repo_ref.map(|r| r.name),
            raw,
            object_type,
            repository_url,
            resource_id,
            html_url,
        }
    }

    /// Untouched payload.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Consumes the object and returns the payload.
    pub fn into_raw(self) -> Value {
        self.raw
    }

    /// Top-level payload field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.raw.get(field)
    }

    /// Resource kind.
    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }

    /// API URL of the owning repository.
    pub fn repository_url(&self) -> Option<&str> {
        self.repository_url.as_deref()
    }

    /// Owning repository's owner login.
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Owning repository's name.
    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref()
    }

    /// Issue number, numeric id, slug, name or path, whichever comes first.
    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    /// Browser URL.
    pub fn html_url(&self) -> Option<&str> {
        self.html_url.as_deref()
    }

    /// Owning repository, when it could be derived.
    pub fn repository_ref(&self) -> Option<RepositoryRef> {
        match (&self.owner, &self.repository) {
            (Some(owner), Some(name)) => Some(RepositoryRef {
                owner: owner.clone(),
                name: name.clone(),
            }),
            _ => None,
        }
    }

    /// Deserializes the payload into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> GitHubResult<T> {
        serde_json::from_value(self.raw.clone()).map_err(|e| {
            GitHubError::unknown(format!("Failed to deserialize {}: {}", self.object_type, e))
                .with_cause(e)
        })
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Owner and name of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryRef {
    owner: String,
    name: String,
}

impl RepositoryRef {
    /// Creates a reference, validating both segments.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> GitHubResult<Self> {
        let owner = owner.into();
        let name = name.into();
        require_segment("owner", &owner)?;
        require_segment("repository", &name)?;
        Ok(Self { owner, name })
    }

    /// Parses `owner/name`.
    pub fn parse(value: &str) -> GitHubResult<Self> {
        let value = value.trim();
        match value.split_once('/') {
            Some((owner, name)) => Self::new(owner, name.trim_end_matches(".git")),
            None => Err(GitHubError::invalid_parameter(format!(
                "Expected owner/name, got {:?}",
                value
            ))),
        }
    }

    /// Parses a web (`https://github.com/o/r`) or API (`.../repos/o/r`) repository URL.
    pub fn from_url(value: &str) -> GitHubResult<Self> {
        let url = Url::parse(value).map_err(|e| {
            GitHubError::invalid_parameter(format!("Invalid repository URL {}: {}", value, e))
        })?;
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        let pair = match segments.iter().position(|s| *s == "repos") {
            Some(index) => segments.get(index + 1).zip(segments.get(index + 2)),
            None => segments.first().zip(segments.get(1)),
        };

        match pair {
            Some((owner, name)) => Self::new(*owner, name.trim_end_matches(".git")),
            None => Err(GitHubError::invalid_parameter(format!(
                "No repository in URL {}",
                value
            ))),
        }
    }

    /// Repository an object belongs to.
    pub fn from_object(object: &GitHubObject) -> GitHubResult<Self> {
        object.repository_ref().ok_or_else(|| {
            GitHubError::invalid_parameter(format!(
                "Cannot derive a repository from this {}",
                object.object_type()
            ))
        })
    }

    /// Uses explicit parts, falling back to the configured defaults.
    pub fn resolve(
        owner: Option<&str>,
        name: Option<&str>,
        config: &dyn ConfigProvider,
    ) -> GitHubResult<Self> {
        let owner = owner
            .map(String::from)
            .or_else(|| config.default_owner())
            .ok_or_else(|| {
                GitHubError::invalid_parameter("Repository owner not given and no default owner configured")
            })?;
        let name = name
            .map(String::from)
            .or_else(|| config.default_repository())
            .ok_or_else(|| {
                GitHubError::invalid_parameter(
                    "Repository name not given and no default repository configured",
                )
            })?;
        Self::new(owner, name)
    }

    /// Owner login.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `repos/{owner}/{name}` followed by `suffix`.
    pub(crate) fn path(&self, suffix: &str) -> String {
        format!("repos/{}/{}{}", self.owner, self.name, suffix)
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryRef {
    type Err = GitHubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Checks a path segment supplied by a caller (login, slug, gist id, ...).
pub(crate) fn require_segment(what: &str, value: &str) -> GitHubResult<()> {
    let valid = !value.is_empty()
        && value != "."
        && value != ".."
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(GitHubError::invalid_parameter(format!(
            "Invalid {} name: {:?}",
            what, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GitHubConfig;
    use crate::errors::GitHubErrorKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("octocat/hello-world" ; "plain")]
    #[test_case("https://github.com/octocat/hello-world" ; "web url")]
    #[test_case("https://github.com/octocat/hello-world.git" ; "clone url")]
    #[test_case("https://api.github.com/repos/octocat/hello-world" ; "api url")]
    #[test_case("https://ghe.example.com/api/v3/repos/octocat/hello-world/issues/1" ; "enterprise api url")]
    fn test_repository_ref_forms(input: &str) {
        let parsed = if input.contains("://") {
            RepositoryRef::from_url(input).unwrap()
        } else {
            RepositoryRef::parse(input).unwrap()
        };
        assert_eq!(parsed.owner(), "octocat");
        assert_eq!(parsed.name(), "hello-world");
        assert_eq!(parsed.to_string(), "octocat/hello-world");
    }

    #[test_case("octocat" ; "missing name")]
    #[test_case("octo cat/repo" ; "whitespace")]
    #[test_case("octocat/../etc" ; "traversal")]
    #[test_case("/repo" ; "empty owner")]
    fn test_repository_ref_rejects(input: &str) {
        let error = RepositoryRef::parse(input).unwrap_err();
        assert_eq!(error.kind(), GitHubErrorKind::InvalidParameter);
    }

    #[test]
    fn test_resolve_uses_defaults() {
        let config = GitHubConfig::builder()
            .default_owner("octocat")
            .default_repository("hello-world")
            .build()
            .unwrap();

        let resolved = RepositoryRef::resolve(None, None, &config).unwrap();
        assert_eq!(resolved.to_string(), "octocat/hello-world");

        let resolved = RepositoryRef::resolve(Some("rust-lang"), Some("rust"), &config).unwrap();
        assert_eq!(resolved.to_string(), "rust-lang/rust");

        let error = RepositoryRef::resolve(None, None, &GitHubConfig::default()).unwrap_err();
        assert_eq!(error.kind(), GitHubErrorKind::InvalidParameter);
    }

    #[test]
    fn test_issue_decoration() {
        let issue = GitHubObject::new(
            json!({
                "id": 1,
                "number": 1347,
                "title": "Found a bug",
                "repository_url": "https://api.github.com/repos/octocat/Hello-World",
                "html_url": "https://github.com/octocat/Hello-World/issues/1347"
            }),
            ObjectType::Issue,
        );

        assert_eq!(issue.object_type(), ObjectType::Issue);
        assert_eq!(issue.owner(), Some("octocat"));
        assert_eq!(issue.repository(), Some("Hello-World"));
        assert_eq!(issue.resource_id(), Some("1347"));
        assert_eq!(issue.html_url(), Some("https://github.com/octocat/Hello-World/issues/1347"));
        assert_eq!(issue.get("title"), Some(&json!("Found a bug")));

        let repo = RepositoryRef::from_object(&issue).unwrap();
        assert_eq!(repo.path("/labels"), "repos/octocat/Hello-World/labels");
    }

    #[test]
    fn test_repository_decoration() {
        let repo = GitHubObject::new(
            json!({
                "id": 1296269,
                "name": "Hello-World",
                "full_name": "octocat/Hello-World",
                "url": "https://api.github.com/repos/octocat/Hello-World"
            }),
            ObjectType::Repository,
        );

        assert_eq!(repo.owner(), Some("octocat"));
        assert_eq!(repo.repository(), Some("Hello-World"));
        assert_eq!(repo.resource_id(), Some("1296269"));
    }

    #[test]
    fn test_generic_object_keeps_raw_payload() {
        let raw = json!({"login": "octocat", "weird": [1, "two", null]});
        let object = GitHubObject::new(raw.clone(), ObjectType::User);

        assert!(object.repository_ref().is_none());
        assert!(RepositoryRef::from_object(&object).is_err());
        assert_eq!(object.into_raw(), raw);
    }
}

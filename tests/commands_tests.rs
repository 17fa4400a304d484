//! Integration tests for the command services.

mod common;

use common::*;
use integrations_github_rest::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn hello_world() -> RepositoryRef {
    RepositoryRef::parse("octocat/Hello-World").unwrap()
}

#[tokio::test]
async fn test_issue_list_is_paged_and_decorated() -> anyhow::Result<()> {
    let server = setup_mock_server().await;
    let list_path = "/repos/octocat/Hello-World/issues";

    Mock::given(method("GET"))
        .and(path(list_path))
        .and(query_param("page", "2"))
        .respond_with(success_response(json!([{
            "number": 3,
            "repository_url": "https://api.github.com/repos/octocat/Hello-World",
            "html_url": "https://github.com/octocat/Hello-World/issues/3"
        }])))
        .mount(&server)
        .await;
    mock_with_auth("GET", list_path)
        .and(query_param("state", "all"))
        .and(query_param("labels", "bug,help wanted"))
        .and(query_param("per_page", "100"))
        .respond_with(
            success_response(json!([
                {"number": 1, "repository_url": "https://api.github.com/repos/octocat/Hello-World"},
                {"number": 2, "repository_url": "https://api.github.com/repos/octocat/Hello-World"}
            ]))
            .insert_header("link", next_link(&server, list_path, 2).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let params = ListIssuesParams {
        state: Some(IssueStateFilter::All),
        ..Default::default()
    }
    .with_labels(["bug", "help wanted"]);

    let issues = client.issues().list(&hello_world(), &params).await?;

    let numbers: Vec<&str> = issues.iter().filter_map(|i| i.resource_id()).collect();
    assert_eq!(numbers, vec!["1", "2", "3"]);
    assert!(issues.iter().all(|i| i.object_type() == ObjectType::Issue));
    assert_eq!(issues[2].owner(), Some("octocat"));
    assert_eq!(issues[2].repository(), Some("Hello-World"));
    assert_eq!(
        issues[2].html_url(),
        Some("https://github.com/octocat/Hello-World/issues/3")
    );
    Ok(())
}

#[tokio::test]
async fn test_chaining_through_repository_ref() -> anyhow::Result<()> {
    let server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/issues/1347"))
        .respond_with(success_response(json!({
            "number": 1347,
            "repository_url": format!("{}/repos/octocat/Hello-World", server.uri())
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/octocat/Hello-World/issues/1347/comments"))
        .and(body_json(json!({"body": "Me too"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 1,
            "body": "Me too",
            "html_url": "https://github.com/octocat/Hello-World/issues/1347#issuecomment-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let issue = client.issues().get(&hello_world(), 1347).await?;

    let repo = RepositoryRef::from_object(&issue)?;
    let number: u64 = issue.resource_id().unwrap().parse()?;
    let comment = client.comments().create(&repo, number, "Me too").await?;

    assert_eq!(comment.object_type(), ObjectType::Comment);
    assert_eq!(comment.get("body"), Some(&json!("Me too")));
    Ok(())
}

#[tokio::test]
async fn test_repository_resolves_configured_defaults() {
    let server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World"))
        .respond_with(success_response(json!({
            "id": 1296269,
            "full_name": "octocat/Hello-World",
            "url": "https://api.github.com/repos/octocat/Hello-World"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = GitHubConfig::builder()
        .api_host(server.uri())
        .default_owner("octocat")
        .default_repository("Hello-World")
        .build()
        .unwrap();
    let client = GitHubClient::builder().config(config).build().unwrap();

    let repo = client.repository(None, None).unwrap();
    let object = client.repositories().get(&repo).await.unwrap();

    assert_eq!(object.object_type(), ObjectType::Repository);
    assert_eq!(object.resource_id(), Some("1296269"));
    assert_eq!(object.repository_ref(), Some(repo));

    let error = test_client(&server).repository(None, None).unwrap_err();
    assert_eq!(error.kind(), GitHubErrorKind::InvalidParameter);
}

#[tokio::test]
async fn test_label_color_normalized_before_sending() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/repos/octocat/Hello-World/labels"))
        .and(body_json(json!({
            "name": "bug",
            "color": "d73a4a",
            "description": "Something isn't working"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 208045946, "name": "bug"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let label = client
        .labels()
        .create(&hello_world(), "bug", "#D73A4A", Some("Something isn't working"))
        .await
        .unwrap();
    assert_eq!(label.object_type(), ObjectType::Label);
}

#[tokio::test]
async fn test_invalid_parameters_never_reach_the_network() {
    let server = setup_mock_server().await;

    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let repo = hello_world();

    let errors = vec![
        client.labels().create(&repo, "bug", "red", None).await.unwrap_err(),
        client.milestones().list(&repo, Some("merged"), None, None).await.unwrap_err(),
        client.traffic().views(&repo, Some("month")).await.unwrap_err(),
        client.gists().create(&CreateGistRequest::default()).await.unwrap_err(),
        client.teams().list_members("github", "justice-league", Some("owner")).await.unwrap_err(),
        client.projects().list_for_org("github", Some("archived")).await.unwrap_err(),
        client.repositories().replace_topics(&repo, &["Not Valid"]).await.unwrap_err(),
        client.issues().create(&repo, &CreateIssueRequest::default()).await.unwrap_err(),
        client.comments().create(&repo, 1, "  ").await.unwrap_err(),
        client.codespaces().get("../user").await.unwrap_err(),
        client.labels().delete(&repo, "..").await.unwrap_err(),
        client.labels().get(&repo, ".").await.unwrap_err(),
        client.labels().remove_from_issue(&repo, 1347, "..").await.unwrap_err(),
    ];

    for error in errors {
        assert_eq!(error.kind(), GitHubErrorKind::InvalidParameter, "{}", error);
    }
}

#[tokio::test]
async fn test_gist_star_probe() {
    let server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/gists/aa5a315d61ae9438b18d/star"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gists/bb5a315d61ae9438b18d/star"))
        .respond_with(error_response(404, "Not Found"))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/gists/bb5a315d61ae9438b18d/star"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let gists = client.gists();

    assert!(gists.is_starred("aa5a315d61ae9438b18d").await.unwrap());
    assert!(!gists.is_starred("bb5a315d61ae9438b18d").await.unwrap());
    gists.star("bb5a315d61ae9438b18d").await.unwrap();
}

#[tokio::test]
async fn test_projects_send_preview_accept_header() {
    let server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/orgs/github/projects"))
        .and(header("Accept", PROJECTS_ACCEPT))
        .and(query_param("state", "open"))
        .respond_with(success_response(json!([{"id": 1002604, "name": "Projects Documentation"}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let projects = client.projects().list_for_org("github", Some("open")).await.unwrap();

    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].resource_id(), Some("1002604"));
}

#[tokio::test]
async fn test_lock_sends_reason_and_unlock_deletes() {
    let server = setup_mock_server().await;

    Mock::given(method("PUT"))
        .and(path("/repos/octocat/Hello-World/issues/42/lock"))
        .and(body_json(json!({"lock_reason": "too heated"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/repos/octocat/Hello-World/issues/42/lock"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let reason: LockReason = "too heated".parse().unwrap();

    client.issues().lock(&hello_world(), 42, Some(reason)).await.unwrap();
    client.issues().unlock(&hello_world(), 42).await.unwrap();
}

#[tokio::test]
async fn test_topics_round_trip() {
    let server = setup_mock_server().await;

    Mock::given(method("PUT"))
        .and(path("/repos/octocat/Hello-World/topics"))
        .and(body_json(json!({"names": ["octocat", "api"]})))
        .respond_with(success_response(json!({"names": ["octocat", "api"]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let topics = client
        .repositories()
        .replace_topics(&hello_world(), &["octocat", "api"])
        .await
        .unwrap();

    assert_eq!(topics, vec!["octocat".to_string(), "api".to_string()]);
}

#[tokio::test]
async fn test_raw_contents_skip_json_parsing() {
    let server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/contents/docs/My%20Notes.md"))
        .and(header("Accept", "application/vnd.github.raw"))
        .and(query_param("ref", "main"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# Notes\n"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let bytes = client
        .repositories()
        .get_raw_contents(&hello_world(), "docs/My Notes.md", Some("main"))
        .await
        .unwrap();

    assert_eq!(&bytes[..], b"# Notes\n");
}

#[tokio::test]
async fn test_milestone_due_date_and_traffic_interval() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/repos/octocat/Hello-World/milestones"))
        .and(body_json(json!({"title": "v1.0", "due_on": "2030-01-01T00:00:00Z"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"number": 1, "title": "v1.0"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/traffic/views"))
        .and(query_param("per", "week"))
        .respond_with(success_response(json!({"count": 14850, "uniques": 3782, "views": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let due = chrono::DateTime::parse_from_rfc3339("2030-01-01T00:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let request = MilestoneRequest {
        due_on: Some(due),
        ..MilestoneRequest::titled("v1.0")
    };

    let milestone = client.milestones().create(&hello_world(), &request).await.unwrap();
    assert_eq!(milestone.resource_id(), Some("1"));

    let views = client.traffic().views(&hello_world(), Some("week")).await.unwrap();
    assert_eq!(views.object_type(), ObjectType::Traffic);
    assert_eq!(views.get("count"), Some(&json!(14850)));
}

#[tokio::test]
async fn test_timeline_events_are_paged() {
    let server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/issues/7/timeline"))
        .and(query_param("per_page", "100"))
        .respond_with(success_response(json!([
            {"id": 6430295168_u64, "event": "locked"},
            {"event": "commented", "body": "no id on purpose"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let events = client.events().timeline(&hello_world(), 7).await.unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].resource_id(), Some("6430295168"));
    assert_eq!(events[1].resource_id(), None);
}

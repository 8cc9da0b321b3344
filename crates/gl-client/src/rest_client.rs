//! REST (v4) GitLab API client
//!
//! Direct implementation of the `GitLabClient` trait using reqwest.
//! This client makes real API calls without any caching.

use crate::client::GitLabClient;
use crate::error::{ClientError, Result};
use crate::types::{Board, BoardList, Issue, IssueQuery, IssueUpdate, Project, User};
use async_trait::async_trait;
use gl_board_config::Settings;
use log::debug;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use url::form_urlencoded;

/// Header carrying the personal access token
pub const PRIVATE_TOKEN_HEADER: &str = "PRIVATE-TOKEN";

const DEFAULT_PROJECTS_PER_PAGE: u32 = 100;

/// Direct GitLab API client
///
/// Composes `<base_url>/api/v4<endpoint>` and authenticates with the
/// `PRIVATE-TOKEN` header when a token is configured. It can be wrapped by
/// `CachedGitLabClient` to add caching behavior.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    projects_per_page: u32,
}

impl RestClient {
    /// Create a client for the configured instance
    pub fn new(settings: &Settings) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("gl-board/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http(http, settings))
    }

    /// Create a client reusing an existing reqwest client
    pub fn with_http(http: Client, settings: &Settings) -> Self {
        Self {
            http,
            base_url: settings.gitlab_url().to_string(),
            token: settings.access_token().map(str::to_string),
            projects_per_page: DEFAULT_PROJECTS_PER_PAGE,
        }
    }

    pub fn with_projects_per_page(mut self, per_page: u32) -> Self {
        self.projects_per_page = per_page.max(1);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of an API endpoint, e.g. `/projects` -> `<base>/api/v4/projects`
    pub fn api_url(&self, endpoint: &str) -> String {
        format!("{}/api/v4{}", self.base_url, endpoint)
    }

    /// Start an authenticated request
    pub fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.api_url(endpoint));
        match &self.token {
            Some(token) => builder.header(PRIVATE_TOKEN_HEADER, token),
            None => builder,
        }
    }

    fn projects_request(&self) -> RequestBuilder {
        self.request(Method::GET, "/projects").query(&[
            ("membership", "true".to_string()),
            ("per_page", self.projects_per_page.to_string()),
        ])
    }

    fn issues_request(&self, project_id: &str, query: &IssueQuery) -> RequestBuilder {
        self.request(
            Method::GET,
            &format!("/projects/{}/issues", encode_project_id(project_id)),
        )
        .query(&query.to_params())
    }

    fn update_issue_request(
        &self,
        project_id: &str,
        issue_iid: u64,
        update: &IssueUpdate,
    ) -> RequestBuilder {
        self.request(
            Method::PUT,
            &format!(
                "/projects/{}/issues/{}",
                encode_project_id(project_id),
                issue_iid
            ),
        )
        .json(update)
    }

    /// Send a request and decode a JSON body, mapping HTTP failures
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().to_string();

        if !status.is_success() {
            debug!("GitLab request to {} failed: {}", url, status);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Permission {
                    status: status.as_u16(),
                    url,
                },
                StatusCode::NOT_FOUND => ClientError::NotFound(url),
                _ => ClientError::Status {
                    status: status.as_u16(),
                    url,
                },
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Encode a project path (`group/project`) for use in a URL path segment
///
/// Numeric ids pass through unchanged.
pub fn encode_project_id(project_id: &str) -> String {
    form_urlencoded::byte_serialize(project_id.as_bytes()).collect()
}

#[async_trait]
impl GitLabClient for RestClient {
    async fn fetch_projects(&self) -> Result<Vec<Project>> {
        debug!("Fetching projects from {}", self.base_url);
        let projects: Vec<Project> = self.send(self.projects_request()).await?;
        debug!("Fetched {} projects", projects.len());
        Ok(projects)
    }

    async fn fetch_boards(&self, project_id: &str) -> Result<Vec<Board>> {
        debug!("Fetching boards for project {}", project_id);
        let endpoint = format!("/projects/{}/boards", encode_project_id(project_id));
        self.send(self.request(Method::GET, &endpoint)).await
    }

    async fn fetch_board_lists(&self, project_id: &str, board_id: u64) -> Result<Vec<BoardList>> {
        debug!("Fetching lists of board {} in {}", board_id, project_id);
        let endpoint = format!(
            "/projects/{}/boards/{}/lists",
            encode_project_id(project_id),
            board_id
        );
        self.send(self.request(Method::GET, &endpoint)).await
    }

    async fn fetch_issues(&self, project_id: &str, query: &IssueQuery) -> Result<Vec<Issue>> {
        debug!(
            "Fetching issues for project {} ({})",
            project_id,
            query.to_query_string()
        );
        let issues: Vec<Issue> = self.send(self.issues_request(project_id, query)).await?;
        debug!("Fetched {} issues for project {}", issues.len(), project_id);
        Ok(issues)
    }

    async fn update_issue(
        &self,
        project_id: &str,
        issue_iid: u64,
        update: &IssueUpdate,
    ) -> Result<Issue> {
        if update.is_empty() {
            return Err(ClientError::Validation(
                "issue update has no fields set".to_string(),
            ));
        }
        debug!("Updating issue #{} in project {}", issue_iid, project_id);
        self.send(self.update_issue_request(project_id, issue_iid, update))
            .await
    }

    async fn fetch_current_user(&self) -> Result<User> {
        if self.token.is_none() {
            return Err(ClientError::NotConfigured(
                "an access token is required to identify the current user".to_string(),
            ));
        }
        self.send(self.request(Method::GET, "/user")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Match;

    fn client(token: Option<&str>) -> RestClient {
        let settings = Settings::new("https://gitlab.example.com/", token).unwrap();
        RestClient::new(&settings).unwrap()
    }

    #[test]
    fn test_api_url_composition() {
        let client = client(None);
        assert_eq!(client.base_url(), "https://gitlab.example.com");
        assert_eq!(
            client.api_url("/projects/1/boards"),
            "https://gitlab.example.com/api/v4/projects/1/boards"
        );
    }

    #[test]
    fn test_private_token_header() {
        let request = client(Some("glpat-abc"))
            .request(Method::GET, "/user")
            .build()
            .unwrap();
        assert_eq!(request.headers()[PRIVATE_TOKEN_HEADER], "glpat-abc");
    }

    #[test]
    fn test_no_token_no_header() {
        let request = client(None).request(Method::GET, "/user").build().unwrap();
        assert!(request.headers().get(PRIVATE_TOKEN_HEADER).is_none());
    }

    #[test]
    fn test_projects_request() {
        let request = client(Some("t"))
            .with_projects_per_page(20)
            .projects_request()
            .build()
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://gitlab.example.com/api/v4/projects?membership=true&per_page=20"
        );
    }

    #[test]
    fn test_encode_project_id() {
        assert_eq!(encode_project_id("42"), "42");
        assert_eq!(encode_project_id("group/sub/proj"), "group%2Fsub%2Fproj");
    }

    #[test]
    fn test_issues_request_carries_filters() {
        let query = IssueQuery {
            assignee: Some(Match::Value("alice".to_string())),
            milestone: Some(Match::None),
            ..IssueQuery::opened()
        };
        let request = client(Some("t"))
            .issues_request("group/proj", &query)
            .build()
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://gitlab.example.com/api/v4/projects/group%2Fproj/issues?state=opened&assignee_username=alice&milestone=None"
        );
    }

    #[test]
    fn test_update_issue_request_is_put_with_json() {
        let update = IssueUpdate::move_between_labels(Some("todo"), Some("doing"));
        let request = client(Some("t"))
            .update_issue_request("42", 7, &update)
            .build()
            .unwrap();

        assert_eq!(request.method(), &Method::PUT);
        assert_eq!(
            request.url().as_str(),
            "https://gitlab.example.com/api/v4/projects/42/issues/7"
        );
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(json["add_labels"], "doing");
    }

    #[tokio::test]
    async fn test_empty_update_is_rejected_without_request() {
        let result = client(Some("t"))
            .update_issue("42", 7, &IssueUpdate::default())
            .await;
        assert!(matches!(result, Err(ClientError::Validation(_))));
    }

    #[tokio::test]
    async fn test_current_user_requires_token() {
        let result = client(None).fetch_current_user().await;
        assert!(matches!(result, Err(ClientError::NotConfigured(_))));
    }
}

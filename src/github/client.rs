use crate::display;
use crate::error::{DashboardError, Result};
use crate::github::graphql::{org_activity_request, GraphQlResponse, OrgActivityData};
use crate::model::Repository;
use chrono::{DateTime, Utc};
use octocrab::service::middleware::retry::RetryConfig;
use octocrab::Octocrab;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Page size for the REST organization listing. A shorter page ends the listing.
pub const REST_PAGE_SIZE: u8 = 100;

pub struct GithubClient {
    octocrab: Octocrab,
    timeout: Duration,
    verbose: bool,
}

#[derive(Debug, Deserialize)]
pub struct RateLimit {
    pub resources: RateLimitResources,
}

#[derive(Debug, Deserialize)]
pub struct RateLimitResources {
    pub core: RateLimitResource,
    pub graphql: Option<RateLimitResource>,
}

#[derive(Debug, Deserialize)]
pub struct RateLimitResource {
    pub limit: u64,
    pub remaining: u64,
    pub reset: i64,
}

#[derive(Debug, Deserialize)]
struct WorkflowRuns {
    #[serde(default)]
    workflow_runs: Vec<WorkflowRunStamp>,
}

#[derive(Debug, Deserialize)]
struct WorkflowRunStamp {
    created_at: DateTime<Utc>,
}

fn format_reset(reset: i64) -> String {
    DateTime::from_timestamp(reset, 0)
        .map(|dt| dt.format("%H:%M:%S UTC").to_string())
        .unwrap_or_else(|| reset.to_string())
}

impl GithubClient {
    /// `api_url` points at a GitHub Enterprise (or mock) API root instead of api.github.com.
    pub fn new(
        token: &str,
        api_url: Option<&str>,
        timeout: Duration,
        verbose: bool,
    ) -> Result<Self> {
        let mut builder = Octocrab::builder().add_retry_config(RetryConfig::None);
        if let Some(url) = api_url {
            builder = builder
                .base_uri(url)
                .map_err(|e| DashboardError::Client(format!("invalid API URL {url}: {e}")))?;
        }
        let octocrab = builder
            .personal_token(token.to_string())
            .build()
            .map_err(|e| DashboardError::Client(e.to_string()))?;
        Ok(Self {
            octocrab,
            timeout,
            verbose,
        })
    }

    async fn bounded<T>(&self, what: &str, request: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(DashboardError::Transport(format!(
                "{what}: no response within {}s",
                self.timeout.as_secs()
            ))),
        }
    }

    pub async fn get_rate_limit(&self) -> Result<RateLimit> {
        self.bounded("rate limit", async {
            self.octocrab
                .get("/rate_limit", None::<&()>)
                .await
                .map_err(DashboardError::from)
        })
        .await
    }

    pub async fn check_rate_limit_if_verbose(&self) {
        if !self.verbose {
            return;
        }
        match self.get_rate_limit().await {
            Ok(rl) => {
                let core = &rl.resources.core;
                info!(
                    remaining = core.remaining,
                    limit = core.limit,
                    resets_at = %format_reset(core.reset),
                    "REST rate limit"
                );
                if let Some(graphql) = &rl.resources.graphql {
                    info!(
                        remaining = graphql.remaining,
                        limit = graphql.limit,
                        resets_at = %format_reset(graphql.reset),
                        "GraphQL rate limit"
                    );
                }
            }
            Err(e) => debug!(error = %e, "Could not check rate limit"),
        }
    }

    pub async fn warn_if_rate_limited(&self) -> Result<()> {
        let rl = self.get_rate_limit().await?;
        let core = &rl.resources.core;
        if core.remaining < 100 {
            display::warn(&format!(
                "Only {} API calls remaining (resets at {})",
                core.remaining,
                format_reset(core.reset)
            ));
        }
        Ok(())
    }

    /// Non-archived repositories of `org` with their open issues and pull
    /// requests, following the repository cursor until the last page.
    ///
    /// A GraphQL error payload fails the whole organization.
    pub async fn fetch_org_activity(&self, org: &str) -> Result<Vec<Repository>> {
        let mut repositories = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let request = org_activity_request(org, cursor.as_deref());
            let response: GraphQlResponse<OrgActivityData> = self
                .bounded(org, async {
                    self.octocrab
                        .graphql(&request)
                        .await
                        .map_err(DashboardError::from)
                })
                .await?;

            if !response.errors.is_empty() {
                return Err(DashboardError::GraphQl {
                    org: org.to_string(),
                    messages: response.errors.into_iter().map(|e| e.message).collect(),
                });
            }

            let connection = response
                .data
                .and_then(|d| d.organization)
                .ok_or_else(|| DashboardError::OrgNotFound(org.to_string()))?
                .repositories;

            repositories.extend(
                connection
                    .nodes
                    .into_iter()
                    .filter(|node| !node.is_archived)
                    .map(Repository::from),
            );

            match connection.page_info.end_cursor {
                Some(next) if connection.page_info.has_next_page => cursor = Some(next),
                _ => break,
            }
        }

        debug!(org, count = repositories.len(), "Fetched organization activity");
        Ok(repositories)
    }

    /// Every non-archived repository of `org` from the REST listing. A failed
    /// page fails the whole listing.
    pub async fn list_org_repos(&self, org: &str) -> Result<Vec<Repository>> {
        let mut all_repos = Vec::new();
        let mut page = 1u32;
        loop {
            let page_result = self
                .bounded(org, async {
                    self.octocrab
                        .orgs(org)
                        .list_repos()
                        .repo_type(octocrab::params::repos::Type::All)
                        .per_page(REST_PAGE_SIZE)
                        .page(page)
                        .send()
                        .await
                        .map_err(DashboardError::from)
                })
                .await?;

            let items = page_result.items;
            let received = items.len();
            all_repos.extend(
                items
                    .iter()
                    .map(|repo| Repository::from_rest(org, repo))
                    .filter(|repo| !repo.archived),
            );
            if received < REST_PAGE_SIZE as usize {
                break;
            }
            page += 1;
        }

        debug!(org, pages = page, count = all_repos.len(), "Listed repositories");
        Ok(all_repos)
    }

    /// Creation time of the most recent workflow run, `None` if the
    /// repository has never run one.
    pub async fn latest_workflow_run(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Option<DateTime<Utc>>> {
        let route = format!("/repos/{owner}/{repo}/actions/runs");
        let runs: WorkflowRuns = self
            .bounded(repo, async {
                self.octocrab
                    .get(&route, Some(&[("per_page", "1")]))
                    .await
                    .map_err(DashboardError::from)
            })
            .await?;
        Ok(runs.workflow_runs.first().map(|run| run.created_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GithubClient {
        GithubClient::new("ghp_test", Some(&server.uri()), Duration::from_secs(5), false).unwrap()
    }

    fn rest_repo(id: u64, name: &str, archived: bool) -> Value {
        json!({
            "id": id,
            "name": name,
            "url": format!("https://api.github.com/repos/acme/{name}"),
            "html_url": format!("https://github.com/acme/{name}"),
            "archived": archived,
            "open_issues_count": 1,
            "updated_at": "2026-10-01T00:00:00Z"
        })
    }

    fn repo_node(name: &str, issues: u32, archived: bool) -> Value {
        json!({
            "name": name,
            "url": format!("https://github.com/acme/{name}"),
            "updatedAt": "2026-10-01T00:00:00Z",
            "isArchived": archived,
            "issues": { "totalCount": issues, "nodes": [] },
            "pullRequests": { "totalCount": 0, "nodes": [] }
        })
    }

    #[tokio::test]
    async fn listing_stops_at_short_page() {
        let server = MockServer::start().await;
        let full: Vec<Value> = (0..100)
            .map(|i| rest_repo(i, &format!("repo-{i:03}"), i == 7))
            .collect();
        let short = vec![rest_repo(200, "last", false)];

        Mock::given(method("GET"))
            .and(path("/orgs/acme/repos"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(full))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/orgs/acme/repos"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(short))
            .expect(1)
            .mount(&server)
            .await;

        let repos = client(&server).list_org_repos("acme").await.unwrap();

        assert_eq!(repos.len(), 100);
        assert!(repos.iter().all(|r| r.name != "repo-007"));
        assert_eq!(repos.last().unwrap().name, "last");
        assert_eq!(repos[0].url, "https://github.com/acme/repo-000");
    }

    #[tokio::test]
    async fn listing_page_failure_fails_the_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orgs/acme/repos"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Not Found",
                "documentation_url": "https://docs.github.com/rest"
            })))
            .mount(&server)
            .await;

        let err = client(&server).list_org_repos("acme").await.unwrap_err();
        assert!(matches!(err, DashboardError::Transport(_)));
        let message = err.to_string();
        assert!(message.contains("404"), "{message}");
        assert!(message.contains("Not Found"), "{message}");
    }

    #[tokio::test]
    async fn server_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/flaky/actions/runs"))
            .respond_with(ResponseTemplate::new(502).set_body_json(json!({
                "message": "Bad Gateway"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .latest_workflow_run("acme", "flaky")
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Transport(_)));
        assert!(err.to_string().contains("502"), "{err}");
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn activity_follows_cursor_and_skips_archived() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(wiremock::matchers::body_partial_json(
                json!({ "variables": { "cursor": null } }),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "organization": { "repositories": {
                    "pageInfo": { "hasNextPage": true, "endCursor": "page2" },
                    "nodes": [repo_node("alpha", 3, false), repo_node("old", 1, true)]
                } } }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(wiremock::matchers::body_partial_json(
                json!({ "variables": { "cursor": "page2" } }),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "organization": { "repositories": {
                    "pageInfo": { "hasNextPage": false, "endCursor": null },
                    "nodes": [repo_node("beta", 0, false)]
                } } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let repos = client(&server).fetch_org_activity("acme").await.unwrap();

        let names: Vec<&str> = repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
        assert_eq!(repos[0].open_issues, 3);
    }

    #[tokio::test]
    async fn graphql_error_payload_fails_the_org() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "organization": null },
                "errors": [{ "type": "NOT_FOUND", "message": "Could not resolve to an Organization with the login of 'ghost'." }]
            })))
            .mount(&server)
            .await;

        let err = client(&server).fetch_org_activity("ghost").await.unwrap_err();
        match err {
            DashboardError::GraphQl { org, messages } => {
                assert_eq!(org, "ghost");
                assert!(messages[0].contains("Could not resolve"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn latest_run_reads_first_entry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widget/actions/runs"))
            .and(query_param("per_page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": 42,
                "workflow_runs": [{ "id": 1, "created_at": "2026-10-02T03:04:05Z" }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/idle/actions/runs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": 0,
                "workflow_runs": []
            })))
            .mount(&server)
            .await;

        let client = client(&server);
        let latest = client.latest_workflow_run("acme", "widget").await.unwrap();
        assert_eq!(
            latest.map(|at| at.to_rfc3339()),
            Some("2026-10-02T03:04:05+00:00".to_string())
        );
        assert_eq!(client.latest_workflow_run("acme", "idle").await.unwrap(), None);
    }

    #[tokio::test]
    async fn slow_response_times_out_as_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/hung/actions/runs"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "total_count": 0, "workflow_runs": [] }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = GithubClient::new(
            "ghp_test",
            Some(&server.uri()),
            Duration::from_millis(200),
            false,
        )
        .unwrap();
        let err = client.latest_workflow_run("acme", "hung").await.unwrap_err();
        assert!(err.to_string().contains("no response within"));
    }
}

//! Wire shapes for the organization activity query.

use crate::model::{ActivityItem, Label, Repository};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

/// Repositories per page. Each repository pulls up to 200 nested items, so
/// this stays well below GitHub's node limit.
pub const REPOS_PER_PAGE: u32 = 25;
pub const ITEMS_PER_REPO: u32 = 100;
pub const LABELS_PER_ITEM: u32 = 5;

pub const ORG_ACTIVITY_QUERY: &str = r#"
query OrgActivity($org: String!, $cursor: String, $repos: Int!, $items: Int!, $labels: Int!) {
  organization(login: $org) {
    repositories(first: $repos, after: $cursor, isArchived: false, orderBy: {field: NAME, direction: ASC}) {
      pageInfo { hasNextPage endCursor }
      nodes {
        name
        url
        updatedAt
        isArchived
        issues(first: $items, states: OPEN, orderBy: {field: UPDATED_AT, direction: DESC}) {
          totalCount
          nodes {
            title url createdAt updatedAt
            labels(first: $labels) { nodes { name color } }
          }
        }
        pullRequests(first: $items, states: OPEN, orderBy: {field: UPDATED_AT, direction: DESC}) {
          totalCount
          nodes {
            title url createdAt updatedAt
            labels(first: $labels) { nodes { name color } }
          }
        }
      }
    }
  }
}
"#;

pub fn org_activity_request(org: &str, cursor: Option<&str>) -> Value {
    json!({
        "query": ORG_ACTIVITY_QUERY,
        "variables": {
            "org": org,
            "cursor": cursor,
            "repos": REPOS_PER_PAGE,
            "items": ITEMS_PER_REPO,
            "labels": LABELS_PER_ITEM,
        }
    })
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct OrgActivityData {
    pub organization: Option<OrgNode>,
}

#[derive(Debug, Deserialize)]
pub struct OrgNode {
    pub repositories: RepositoryConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryConnection {
    pub page_info: PageInfo,
    pub nodes: Vec<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryNode {
    pub name: String,
    pub url: String,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_archived: bool,
    pub issues: ItemConnection,
    pub pull_requests: ItemConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemConnection {
    pub total_count: u32,
    #[serde(default)]
    pub nodes: Vec<ItemNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemNode {
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub labels: Option<LabelConnection>,
}

#[derive(Debug, Deserialize)]
pub struct LabelConnection {
    #[serde(default)]
    pub nodes: Vec<LabelNode>,
}

#[derive(Debug, Deserialize)]
pub struct LabelNode {
    pub name: String,
    pub color: String,
}

impl From<ItemNode> for ActivityItem {
    fn from(node: ItemNode) -> Self {
        let labels = node
            .labels
            .map(|c| c.nodes)
            .unwrap_or_default()
            .into_iter()
            .take(LABELS_PER_ITEM as usize)
            .map(|l| Label {
                name: l.name,
                color: l.color,
            })
            .collect();

        Self {
            title: node.title,
            url: node.url,
            created_at: node.created_at,
            updated_at: node.updated_at,
            labels,
        }
    }
}

impl From<RepositoryNode> for Repository {
    fn from(node: RepositoryNode) -> Self {
        Self {
            name: node.name,
            url: node.url,
            updated_at: node.updated_at,
            archived: node.is_archived,
            open_issues: node.issues.total_count,
            open_pull_requests: node.pull_requests.total_count,
            issues: node.issues.nodes.into_iter().map(Into::into).collect(),
            pull_requests: node.pull_requests.nodes.into_iter().map(Into::into).collect(),
        }
    }
}

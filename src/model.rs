use chrono::{DateTime, Utc};
use serde::Serialize;

/// A repository as seen by one run, normalized from either the GraphQL
/// activity query or the REST organization listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Repository {
    pub name: String,
    pub url: String,
    pub updated_at: Option<DateTime<Utc>>,
    pub archived: bool,
    pub open_issues: u32,
    pub open_pull_requests: u32,
    /// Most recently updated first. Empty for REST-sourced records.
    pub issues: Vec<ActivityItem>,
    pub pull_requests: Vec<ActivityItem>,
}

impl Repository {
    /// Builds a REST-sourced record. The listing endpoint has no pull request
    /// count, so it is reported as zero.
    pub fn from_rest(org: &str, repo: &octocrab::models::Repository) -> Self {
        let url = repo
            .html_url
            .as_ref()
            .map(|u| u.to_string())
            .unwrap_or_else(|| format!("https://github.com/{org}/{}", repo.name));

        Self {
            name: repo.name.clone(),
            url,
            updated_at: repo.updated_at,
            archived: repo.archived.unwrap_or(false),
            open_issues: repo.open_issues_count.unwrap_or(0),
            open_pull_requests: 0,
            issues: Vec::new(),
            pull_requests: Vec::new(),
        }
    }

    pub fn has_activity(&self) -> bool {
        self.open_issues > 0 || self.open_pull_requests > 0
    }
}

/// An open issue or pull request. Display only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityItem {
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub labels: Vec<Label>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub name: String,
    /// Hex color without the leading `#`, as GitHub reports it.
    pub color: String,
}

/// Activity fetched for one organization.
#[derive(Debug, Clone, Serialize)]
pub struct OrgActivity {
    pub org: String,
    pub repositories: Vec<Repository>,
}

impl OrgActivity {
    pub fn open_issues(&self) -> u32 {
        self.repositories.iter().map(|r| r.open_issues).sum()
    }

    pub fn open_pull_requests(&self) -> u32 {
        self.repositories.iter().map(|r| r.open_pull_requests).sum()
    }
}

/// Rendered wherever a workflow run could not be determined.
pub const UNKNOWN_RUN: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastRun {
    Known(DateTime<Utc>),
    Unknown,
}

impl LastRun {
    pub fn display(&self) -> String {
        match self {
            LastRun::Known(at) => format_timestamp(at),
            LastRun::Unknown => UNKNOWN_RUN.to_string(),
        }
    }
}

impl Serialize for LastRun {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LastRun::Known(at) => at.serialize(serializer),
            LastRun::Unknown => serializer.serialize_str(UNKNOWN_RUN),
        }
    }
}

/// Most recent workflow run for one repository.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Freshness {
    pub repository: String,
    pub url: String,
    pub last_run: LastRun,
}

pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

pub fn format_date(at: Option<&DateTime<Utc>>) -> String {
    at.map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

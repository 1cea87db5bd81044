//! Assembles fetched data into the ordered dashboard document.

use crate::model::{
    format_date, format_timestamp, ActivityItem, Freshness, OrgActivity, Repository,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const ALL_MIRRORED_MESSAGE: &str = "All upstream repositories are mirrored.";

#[derive(Debug, Serialize)]
pub struct Report {
    pub generated_at: String,
    pub sections: Vec<Section>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Section {
    Organization(OrgSection),
    Unmirrored(UnmirroredSection),
    Freshness(FreshnessSection),
}

#[derive(Debug, Serialize)]
pub struct OrgSection {
    pub org: String,
    pub open_issues: u32,
    pub open_pull_requests: u32,
    pub repository_count: usize,
    pub repositories: Vec<RepoCard>,
}

#[derive(Debug, Serialize)]
pub struct RepoCard {
    pub name: String,
    pub url: String,
    pub updated: String,
    pub open_issues: u32,
    pub open_pull_requests: u32,
    /// Sub-tables follow the open counts, even when no rows came back.
    pub show_issues: bool,
    pub show_pull_requests: bool,
    pub issues: Vec<ItemRow>,
    pub pull_requests: Vec<ItemRow>,
}

#[derive(Debug, Serialize)]
pub struct ItemRow {
    pub title: String,
    pub url: String,
    pub created: String,
    pub updated: String,
    pub labels: Vec<LabelTag>,
}

#[derive(Debug, Serialize)]
pub struct LabelTag {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Serialize)]
pub struct UnmirroredSection {
    pub upstream_org: String,
    pub mirror_org: String,
    pub repositories: Vec<UnmirroredRow>,
    /// Shown instead of the table when nothing is missing.
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UnmirroredRow {
    pub name: String,
    pub url: String,
    pub updated: String,
}

#[derive(Debug, Serialize)]
pub struct FreshnessSection {
    pub org: String,
    pub rows: Vec<FreshnessRow>,
}

#[derive(Debug, Serialize)]
pub struct FreshnessRow {
    pub name: String,
    pub url: String,
    pub last_run: String,
}

/// Everything the assembler consumes. `activity` holds only the organizations
/// that were fetched successfully, in configured order; `freshness` covers the
/// primary organization.
pub struct ReportInputs<'a> {
    pub activity: &'a [OrgActivity],
    pub unmirrored: &'a [Repository],
    pub freshness: &'a [Freshness],
    pub primary_org: &'a str,
    pub mirror_org: &'a str,
    pub generated_at: DateTime<Utc>,
}

/// Section order: organizations, then unmirrored repositories, then workflow
/// freshness. Organizations without activity and an empty freshness table
/// are left out; the unmirrored section is always present.
pub fn assemble(inputs: &ReportInputs<'_>) -> Report {
    let mut sections: Vec<Section> = inputs
        .activity
        .iter()
        .filter_map(org_section)
        .map(Section::Organization)
        .collect();

    sections.push(Section::Unmirrored(unmirrored_section(inputs)));

    if let Some(freshness) = freshness_section(inputs.primary_org, inputs.freshness) {
        sections.push(Section::Freshness(freshness));
    }

    Report {
        generated_at: format_timestamp(&inputs.generated_at),
        sections,
    }
}

fn org_section(activity: &OrgActivity) -> Option<OrgSection> {
    let repositories: Vec<RepoCard> = activity
        .repositories
        .iter()
        .filter(|r| r.has_activity())
        .map(repo_card)
        .collect();

    if repositories.is_empty() {
        return None;
    }

    Some(OrgSection {
        org: activity.org.clone(),
        open_issues: activity.open_issues(),
        open_pull_requests: activity.open_pull_requests(),
        repository_count: repositories.len(),
        repositories,
    })
}

fn repo_card(repo: &Repository) -> RepoCard {
    RepoCard {
        name: repo.name.clone(),
        url: repo.url.clone(),
        updated: format_date(repo.updated_at.as_ref()),
        open_issues: repo.open_issues,
        open_pull_requests: repo.open_pull_requests,
        show_issues: repo.open_issues > 0,
        show_pull_requests: repo.open_pull_requests > 0,
        issues: item_rows(&repo.issues),
        pull_requests: item_rows(&repo.pull_requests),
    }
}

fn item_rows(items: &[ActivityItem]) -> Vec<ItemRow> {
    items
        .iter()
        .map(|item| ItemRow {
            title: item.title.clone(),
            url: item.url.clone(),
            created: format_date(Some(&item.created_at)),
            updated: format_date(Some(&item.updated_at)),
            labels: item
                .labels
                .iter()
                .map(|l| LabelTag {
                    name: l.name.clone(),
                    color: l.color.clone(),
                })
                .collect(),
        })
        .collect()
}

fn unmirrored_section(inputs: &ReportInputs<'_>) -> UnmirroredSection {
    let mut repositories: Vec<UnmirroredRow> = inputs
        .unmirrored
        .iter()
        .map(|r| UnmirroredRow {
            name: r.name.clone(),
            url: r.url.clone(),
            updated: format_date(r.updated_at.as_ref()),
        })
        .collect();
    repositories.sort_by(|a, b| a.name.cmp(&b.name));

    let message = repositories
        .is_empty()
        .then(|| ALL_MIRRORED_MESSAGE.to_string());

    UnmirroredSection {
        upstream_org: inputs.primary_org.to_string(),
        mirror_org: inputs.mirror_org.to_string(),
        repositories,
        message,
    }
}

fn freshness_section(org: &str, freshness: &[Freshness]) -> Option<FreshnessSection> {
    if freshness.is_empty() {
        return None;
    }

    let mut rows: Vec<FreshnessRow> = freshness
        .iter()
        .map(|f| FreshnessRow {
            name: f.repository.clone(),
            url: f.url.clone(),
            last_run: f.last_run.display(),
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));

    Some(FreshnessSection {
        org: org.to_string(),
        rows,
    })
}

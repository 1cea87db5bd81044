use crate::commands::{fetch_activity, Session};
use crate::display;
use crate::error::{DashboardError, Result};
use crate::model::{format_date, OrgActivity};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ActivityRow {
    pub org: String,
    pub repo: String,
    pub open_issues: u32,
    pub open_pull_requests: u32,
    pub updated: String,
}

/// Repositories with at least one open issue or pull request, busiest first.
pub fn activity_rows(activity: &[OrgActivity]) -> Vec<ActivityRow> {
    let mut rows: Vec<ActivityRow> = activity
        .iter()
        .flat_map(|org| {
            org.repositories
                .iter()
                .filter(|r| r.has_activity())
                .map(move |r| ActivityRow {
                    org: org.org.clone(),
                    repo: r.name.clone(),
                    open_issues: r.open_issues,
                    open_pull_requests: r.open_pull_requests,
                    updated: format_date(r.updated_at.as_ref()),
                })
        })
        .collect();

    rows.sort_by(|a, b| {
        let load_a = a.open_issues + a.open_pull_requests;
        let load_b = b.open_issues + b.open_pull_requests;
        load_b.cmp(&load_a).then_with(|| a.repo.cmp(&b.repo))
    });
    rows
}

pub async fn run(session: &Session, org: &Option<String>) -> Result<()> {
    let orgs = match org {
        Some(org) => vec![org.clone()],
        None => session.config.dashboard.orgs.clone(),
    };

    let activity = fetch_activity(&session.client, &orgs).await;
    if activity.is_empty() {
        return Err(DashboardError::NoOrganizationData);
    }

    let rows = activity_rows(&activity);
    display::output(session.json, &rows, |data| render_activity(data));

    session.client.check_rate_limit_if_verbose().await;

    Ok(())
}

fn render_activity(rows: &[ActivityRow]) {
    if rows.is_empty() {
        display::success("No open issues or pull requests found.");
        return;
    }

    display::section_header("Open Activity");

    let mut table = display::new_table(&["Org", "Repo", "Issues", "PRs", "Updated"]);
    for r in rows {
        table.add_row(vec![
            &r.org,
            &r.repo,
            &r.open_issues.to_string(),
            &r.open_pull_requests.to_string(),
            &r.updated,
        ]);
    }

    display::table_with_count(&table, rows.len(), "active repository");
}

use crate::commands::{fetch_activity, fetch_freshness, fetch_unmirrored, Session};
use crate::display;
use crate::error::{DashboardError, Result};
use crate::render::{write_report, Renderer};
use crate::report::{assemble, ReportInputs, Section};
use chrono::Utc;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct BuildSummary {
    pub output: PathBuf,
    pub organizations: Vec<String>,
    pub skipped_organizations: Vec<String>,
    pub active_repositories: usize,
    pub unmirrored: usize,
    pub workflow_rows: usize,
}

pub async fn run(session: &Session, output: &Option<PathBuf>, open_after: bool) -> Result<()> {
    let client = &session.client;
    let dashboard = &session.config.dashboard;

    client.warn_if_rate_limited().await.ok();

    let activity = fetch_activity(client, &dashboard.orgs).await;
    if activity.is_empty() {
        return Err(DashboardError::NoOrganizationData);
    }

    let primary_org = dashboard.primary_org()?;
    let mirror_org = dashboard.mirror_org()?;
    let unmirrored = fetch_unmirrored(client, &session.config).await?;
    let freshness = fetch_freshness(client, primary_org, dashboard.concurrency).await?;

    let report = assemble(&ReportInputs {
        activity: &activity,
        unmirrored: &unmirrored,
        freshness: &freshness,
        primary_org,
        mirror_org,
        generated_at: Utc::now(),
    });
    let html = Renderer::new()?.render(&report)?;

    let path = output.clone().unwrap_or_else(|| dashboard.output.clone());
    write_report(&path, &html)?;
    info!(path = %path.display(), sections = report.sections.len(), "Dashboard written");

    let summary = BuildSummary {
        output: path.clone(),
        organizations: activity.iter().map(|a| a.org.clone()).collect(),
        skipped_organizations: dashboard
            .orgs
            .iter()
            .filter(|org| !activity.iter().any(|a| &a.org == *org))
            .cloned()
            .collect(),
        active_repositories: report
            .sections
            .iter()
            .map(|s| match s {
                Section::Organization(org) => org.repository_count,
                _ => 0,
            })
            .sum(),
        unmirrored: unmirrored.len(),
        workflow_rows: freshness.len(),
    };

    display::output(session.json, &summary, render_summary);

    if open_after {
        open::that(&path)?;
    }

    client.check_rate_limit_if_verbose().await;

    Ok(())
}

fn render_summary(summary: &BuildSummary) {
    display::success(&format!("Dashboard written to {}", summary.output.display()));
    println!(
        "  {} {}   {} {}   {} {}",
        "Organizations:".bold(),
        summary.organizations.len(),
        "Active repos:".bold(),
        summary.active_repositories,
        "Unmirrored:".bold(),
        summary.unmirrored,
    );
    if !summary.skipped_organizations.is_empty() {
        display::warn(&format!(
            "Skipped: {}",
            summary.skipped_organizations.join(", ")
        ));
    }
}

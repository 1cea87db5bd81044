use crate::commands::{fetch_freshness, resolve_org, Session};
use crate::display;
use crate::error::Result;
use crate::model::{Freshness, LastRun};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct FreshnessReport {
    pub org: String,
    pub repositories: Vec<Freshness>,
}

pub async fn run(session: &Session, org: &Option<String>) -> Result<()> {
    let org = resolve_org(org, &session.config)?;
    let mut repositories = fetch_freshness(
        &session.client,
        &org,
        session.config.dashboard.concurrency,
    )
    .await?;
    sort_by_name(&mut repositories);

    let report = FreshnessReport { org, repositories };
    display::output(session.json, &report, render_freshness);

    session.client.check_rate_limit_if_verbose().await;

    Ok(())
}

fn sort_by_name(rows: &mut [Freshness]) {
    rows.sort_by(|a, b| a.repository.cmp(&b.repository));
}

fn render_freshness(report: &FreshnessReport) {
    if report.repositories.is_empty() {
        display::warn(&format!("No repositories found in {}.", report.org));
        return;
    }

    display::section_header(&format!("Latest workflow runs in {}", report.org));

    let mut table = display::new_table(&["Repository", "Last Run"]);
    for f in &report.repositories {
        table.add_row(vec![f.repository.clone(), f.last_run.display()]);
    }

    let unknown = report
        .repositories
        .iter()
        .filter(|f| f.last_run == LastRun::Unknown)
        .count();
    display::table_with_count(&table, unknown, "unknown last run");
}

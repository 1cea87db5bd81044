use crate::commands::{fetch_unmirrored, Session};
use crate::display;
use crate::error::Result;
use crate::model::{format_date, Repository};
use crate::report::ALL_MIRRORED_MESSAGE;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UnmirroredEntry {
    pub name: String,
    pub url: String,
    pub updated: String,
}

impl From<&Repository> for UnmirroredEntry {
    fn from(repo: &Repository) -> Self {
        Self {
            name: repo.name.clone(),
            url: repo.url.clone(),
            updated: format_date(repo.updated_at.as_ref()),
        }
    }
}

pub async fn run(session: &Session) -> Result<()> {
    let dashboard = &session.config.dashboard;
    let upstream_org = dashboard.primary_org()?;
    let mirror_org = dashboard.mirror_org()?;

    let unmirrored = fetch_unmirrored(&session.client, &session.config).await?;
    let entries: Vec<UnmirroredEntry> = unmirrored.iter().map(UnmirroredEntry::from).collect();

    display::output(session.json, &entries, |data| {
        render_unmirrored(data, upstream_org, mirror_org);
    });

    session.client.check_rate_limit_if_verbose().await;

    Ok(())
}

fn render_unmirrored(entries: &[UnmirroredEntry], upstream_org: &str, mirror_org: &str) {
    if entries.is_empty() {
        display::success(ALL_MIRRORED_MESSAGE);
        return;
    }

    display::section_header(&format!(
        "Repositories in {upstream_org} without a mirror in {mirror_org}"
    ));

    let mut table = display::new_table(&["Name", "Last Updated", "URL"]);
    for e in entries {
        table.add_row(vec![&e.name, &e.updated, &e.url]);
    }

    display::table_with_count(&table, entries.len(), "unmirrored repository");
}

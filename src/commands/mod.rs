pub mod activity;
pub mod build;
pub mod freshness;
pub mod unmirrored;

use crate::config::{load_config, Config};
use crate::display;
use crate::error::Result;
use crate::freshness::resolve_freshness;
use crate::github::GithubClient;
use crate::model::{Freshness, OrgActivity, Repository};
use crate::reconcile::find_unmirrored;
use std::path::Path;
use tracing::{info, warn};

/// Options shared by every subcommand.
pub struct GlobalOpts<'a> {
    pub config: Option<&'a Path>,
    pub token: Option<&'a str>,
    pub json: bool,
    pub verbose: bool,
}

/// Validated configuration plus an authenticated client.
pub struct Session {
    pub config: Config,
    pub client: GithubClient,
    pub json: bool,
}

impl Session {
    pub fn open(opts: &GlobalOpts<'_>) -> Result<Self> {
        let config = load_config(opts.config)?;
        let token = config.token(opts.token)?.to_string();
        config.validate()?;
        let client = GithubClient::new(
            &token,
            config.dashboard.api_url.as_deref(),
            config.dashboard.timeout(),
            opts.verbose,
        )?;
        Ok(Self {
            config,
            client,
            json: opts.json,
        })
    }
}

/// `org_flag` if given, otherwise the configured primary organization.
pub fn resolve_org(org_flag: &Option<String>, config: &Config) -> Result<String> {
    match org_flag {
        Some(org) => Ok(org.clone()),
        None => Ok(config.dashboard.primary_org()?.to_string()),
    }
}

/// Fetches activity for each organization in order. An organization that
/// fails is reported and skipped.
pub async fn fetch_activity(client: &GithubClient, orgs: &[String]) -> Vec<OrgActivity> {
    let mut fetched = Vec::with_capacity(orgs.len());
    for org in orgs {
        match client.fetch_org_activity(org).await {
            Ok(repositories) => {
                info!(org = %org, repositories = repositories.len(), "Fetched activity");
                fetched.push(OrgActivity {
                    org: org.clone(),
                    repositories,
                });
            }
            Err(e) => {
                warn!(org = %org, error = %e, "Skipping organization");
                display::warn(&format!("Failed to fetch activity for {org}: {e}"));
            }
        }
    }
    fetched
}

pub async fn fetch_unmirrored(client: &GithubClient, config: &Config) -> Result<Vec<Repository>> {
    let dashboard = &config.dashboard;
    let upstream_org = dashboard.primary_org()?;
    let mirror_org = dashboard.mirror_org()?;

    let upstream = client.list_org_repos(upstream_org).await?;
    let mirrors = client.list_org_repos(mirror_org).await?;
    let unmirrored = find_unmirrored(&upstream, &mirrors, &dashboard.ignore_set());

    info!(
        upstream = upstream.len(),
        mirrors = mirrors.len(),
        unmirrored = unmirrored.len(),
        "Reconciled mirrors"
    );
    Ok(unmirrored)
}

/// Latest workflow run for every non-archived repository of `org`.
pub async fn fetch_freshness(
    client: &GithubClient,
    org: &str,
    concurrency: usize,
) -> Result<Vec<Freshness>> {
    let repos = client.list_org_repos(org).await?;
    let freshness = resolve_freshness(&repos, concurrency, |repo| {
        client.latest_workflow_run(org, &repo.name)
    })
    .await;
    Ok(freshness)
}

//! Latest workflow run per repository, fetched with bounded concurrency.

use crate::error::Result;
use crate::model::{Freshness, LastRun, Repository};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::future::Future;
use tracing::{debug, warn};

/// Runs `lookup` for every repository with at most `concurrency` lookups in
/// flight and returns one entry per input, in input order.
///
/// A failed lookup is logged and recorded as [`LastRun::Unknown`]; it never
/// fails the batch. Repositories without any run are also `Unknown`.
pub async fn resolve_freshness<'a, F, Fut>(
    repos: &'a [Repository],
    concurrency: usize,
    lookup: F,
) -> Vec<Freshness>
where
    F: Fn(&'a Repository) -> Fut,
    Fut: Future<Output = Result<Option<DateTime<Utc>>>>,
{
    stream::iter(repos)
        .map(|repo| {
            let pending = lookup(repo);
            async move {
                let last_run = match pending.await {
                    Ok(Some(at)) => LastRun::Known(at),
                    Ok(None) => {
                        debug!(repo = %repo.name, "No workflow runs");
                        LastRun::Unknown
                    }
                    Err(e) => {
                        warn!(repo = %repo.name, error = %e, "Workflow run lookup failed");
                        LastRun::Unknown
                    }
                };
                Freshness {
                    repository: repo.name.clone(),
                    url: repo.url.clone(),
                    last_run,
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use crate::model::fixtures::{at, repo};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn output_order_matches_input_despite_completion_order() {
        let repos: Vec<Repository> = ["slow", "medium", "fast"].iter().map(|n| repo(n)).collect();

        let result = resolve_freshness(&repos, 3, |r| async move {
            let delay = match r.name.as_str() {
                "slow" => 60,
                "medium" => 30,
                _ => 0,
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(Some(at(delay as u32 / 10 + 1)))
        })
        .await;

        let names: Vec<&str> = result.iter().map(|f| f.repository.as_str()).collect();
        assert_eq!(names, vec!["slow", "medium", "fast"]);
        assert_eq!(result[0].last_run, LastRun::Known(at(7)));
        assert_eq!(result[2].last_run, LastRun::Known(at(1)));
    }

    #[tokio::test]
    async fn failed_lookup_degrades_to_unknown_only_for_that_repo() {
        let repos: Vec<Repository> = ["ok", "R", "also-ok"].iter().map(|n| repo(n)).collect();

        let result = resolve_freshness(&repos, 2, |r| async move {
            if r.name == "R" {
                Err(DashboardError::Transport("502 Bad Gateway".into()))
            } else {
                Ok(Some(at(9)))
            }
        })
        .await;

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].last_run, LastRun::Known(at(9)));
        assert_eq!(result[1].last_run, LastRun::Unknown);
        assert_eq!(result[1].last_run.display(), "unknown");
        assert_eq!(result[2].last_run, LastRun::Known(at(9)));
    }

    #[tokio::test]
    async fn repository_without_runs_is_unknown() {
        let repos = vec![repo("never-ran")];
        let result = resolve_freshness(&repos, 1, |_| async { Ok(None) }).await;
        assert_eq!(result[0].last_run, LastRun::Unknown);
        assert_eq!(result[0].url, "https://github.com/acme/never-ran");
    }

    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let result = resolve_freshness(&[], 4, |_| async { Ok(None) }).await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn in_flight_lookups_never_exceed_limit() {
        let repos: Vec<Repository> = (0..12).map(|i| repo(&format!("repo-{i}"))).collect();
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let result = resolve_freshness(&repos, 3, |_| {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(None)
            }
        })
        .await;

        assert_eq!(result.len(), 12);
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert!(peak.load(Ordering::SeqCst) >= 2);
    }
}

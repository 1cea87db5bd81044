use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_OUTPUT: &str = "dist/index.html";
const DEFAULT_CONCURRENCY: usize = 8;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    pub token: Option<String>,
}

/// What the dashboard covers and where it is written.
#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Organizations whose open issues and pull requests are shown, in display order.
    #[serde(default)]
    pub orgs: Vec<String>,
    /// Upstream organization for mirror coverage and workflow freshness.
    /// Falls back to the first entry of `orgs`.
    pub primary_org: Option<String>,
    /// Organization holding the `mirror-<name>` repositories.
    pub mirror_org: Option<String>,
    /// Upstream repositories excluded from mirror coverage.
    #[serde(default)]
    pub ignore: Vec<String>,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Maximum workflow-run lookups in flight at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per-request timeout against the GitHub API.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// API root for GitHub Enterprise; api.github.com when unset.
    pub api_url: Option<String>,
}

fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT)
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            orgs: Vec::new(),
            primary_org: None,
            mirror_org: None,
            ignore: Vec::new(),
            output: default_output(),
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
            api_url: None,
        }
    }
}

impl Config {
    /// Token from the command line / environment wins over the config file.
    pub fn token<'a>(&'a self, flag: Option<&'a str>) -> Result<&'a str> {
        flag.filter(|t| !t.trim().is_empty())
            .or(self.auth.token.as_deref())
            .map(str::trim)
            .ok_or(DashboardError::NotAuthenticated)
    }

    pub fn validate(&self) -> Result<()> {
        let dashboard = &self.dashboard;
        if dashboard.orgs.is_empty() {
            return Err(DashboardError::Config(
                "no organizations configured; set `orgs` under [dashboard]".into(),
            ));
        }
        if dashboard.concurrency == 0 {
            return Err(DashboardError::Config(
                "`concurrency` must be at least 1".into(),
            ));
        }
        if dashboard.timeout_secs == 0 {
            return Err(DashboardError::Config(
                "`timeout_secs` must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl DashboardConfig {
    pub fn primary_org(&self) -> Result<&str> {
        self.primary_org
            .as_deref()
            .or_else(|| self.orgs.first().map(String::as_str))
            .ok_or_else(|| DashboardError::Config("no primary organization configured".into()))
    }

    pub fn mirror_org(&self) -> Result<&str> {
        self.mirror_org.as_deref().ok_or_else(|| {
            DashboardError::Config("no mirror organization configured; set `mirror_org`".into())
        })
    }

    pub fn ignore_set(&self) -> BTreeSet<String> {
        self.ignore.iter().cloned().collect()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg).join("orgdash").join("config.toml");
        return Ok(path);
    }

    let home = dirs::home_dir()
        .ok_or_else(|| DashboardError::Config("Cannot find home directory".into()))?;
    Ok(home.join(".config").join("orgdash").join("config.toml"))
}

/// Loads `explicit` if given, otherwise the default location. Only the
/// default location may be absent.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(DashboardError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => {
            let path = config_path()?;
            if !path.exists() {
                return Ok(Config::default());
            }
            path
        }
    };

    let contents = fs::read_to_string(&path)?;
    let config: Config = toml::from_str(&contents)?;
    Ok(config)
}

mod commands;
mod config;
mod display;
mod error;
mod freshness;
mod github;
mod model;
mod reconcile;
mod render;
mod report;

use clap::{Parser, Subcommand};
use commands::{GlobalOpts, Session};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "orgdash",
    version,
    about = "Static dashboard of open issues, pull requests, mirrors and CI activity across GitHub organizations"
)]
pub struct Cli {
    /// Output results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Show verbose output (rate limits, per-organization progress)
    #[arg(long, global = true)]
    verbose: bool,

    /// Path to the config file (defaults to ~/.config/orgdash/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// GitHub token
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch everything and write the HTML dashboard
    Build {
        /// Where to write the dashboard (overrides `output` in the config)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Open the dashboard in a browser once written
        #[arg(long)]
        open: bool,
    },
    /// List upstream repositories that have no mirror
    Unmirrored,
    /// Show the latest workflow run of every repository in an organization
    Freshness {
        /// Organization to inspect (defaults to the primary organization)
        #[arg(long)]
        org: Option<String>,
    },
    /// Show repositories with open issues or pull requests
    Activity {
        /// Filter to a specific organization
        #[arg(long)]
        org: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let opts = GlobalOpts {
        config: cli.config.as_deref(),
        token: cli.token.as_deref(),
        json: cli.json,
        verbose: cli.verbose,
    };

    let result = match Session::open(&opts) {
        Ok(session) => match &cli.command {
            Commands::Build { output, open } => commands::build::run(&session, output, *open).await,
            Commands::Unmirrored => commands::unmirrored::run(&session).await,
            Commands::Freshness { org } => commands::freshness::run(&session, org).await,
            Commands::Activity { org } => commands::activity::run(&session, org).await,
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        display::error(&e.to_string());
        std::process::exit(1);
    }
}

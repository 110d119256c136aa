//! Envsync - keep local assets in sync with remote environments
//!
//! Usage:
//!   envsync deploy                 # Push the default environment
//!   envsync -e 'prod-*' deploy     # Push every matching environment
//!   envsync -a download            # Pull every environment
//!   envsync -e staging open        # Show one environment's endpoint

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use envsync_core::commands::{
    DeployCommand, DeployOptions, DeployReport, DownloadCommand, DownloadOptions, ListCommand,
    OpenCommand, RemoveCommand, RemoveOptions,
};
use envsync_core::config::CONFIG_FILE_NAME;
use envsync_core::prelude::*;

#[derive(Parser)]
#[command(name = "envsync")]
#[command(about = "Sync local assets with remote environments", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Path to the config file
    #[arg(short, long, global = true, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    /// Environment name or glob pattern (repeatable)
    #[arg(short, long = "env", global = true)]
    env: Vec<String>,

    /// Run against every environment in the config file
    #[arg(short, long = "allenvs", global = true)]
    allenvs: bool,

    /// Print per-file progress
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Override remote changes that have not been downloaded
    #[arg(short, long, global = true)]
    force: bool,

    /// Ignore every ignore pattern and ignore file
    #[arg(long, global = true)]
    no_ignore: bool,

    /// Extra glob pattern to ignore (repeatable)
    #[arg(long = "ignored-file", global = true)]
    ignored_files: Vec<String>,

    /// Extra file of ignore patterns (repeatable)
    #[arg(long, global = true)]
    ignores: Vec<PathBuf>,

    /// File to touch after a successful sync
    #[arg(long, global = true)]
    notify: Option<PathBuf>,
}

impl GlobalArgs {
    fn arbiter_options(&self) -> ArbiterOptions {
        let mut options = ArbiterOptions::new(&self.config)
            .with_verbose(self.verbose)
            .with_force(self.force)
            .with_all_environments(self.allenvs)
            .with_environments(self.env.iter().cloned())
            .with_disable_ignore(self.no_ignore);
        for pattern in &self.ignored_files {
            options = options.with_ignored_file(pattern);
        }
        for path in &self.ignores {
            options = options.with_ignores(path);
        }
        if let Some(path) = &self.notify {
            options = options.with_notify_file(path);
        }
        options
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Push local files to the selected environments
    Deploy {
        /// Files or directories to push (default: everything)
        files: Vec<String>,

        /// Keep remote files that do not exist locally
        #[arg(long)]
        no_delete: bool,
    },

    /// Pull remote files into each environment's directory
    Download {
        /// Files to pull (default: everything)
        files: Vec<String>,
    },

    /// Delete files from the selected environments
    #[command(alias = "rm")]
    Remove {
        /// Files to delete
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// List remote files per environment
    #[command(alias = "ls")]
    List,

    /// Show the endpoint of a single environment
    Open,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.global.verbose {
        "envsync=debug,info"
    } else {
        "envsync=info,warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(cli).await {
        eprintln!("{} {:#}", style("error:").red().bold(), err);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let options = cli.global.arbiter_options();
    let mut arbiter = Arbiter::resolve(options, &HttpClient::new).await?;
    tracing::debug!("Resolved {} environment(s)", arbiter.clients().len());

    match cli.command {
        Commands::Deploy { files, no_delete } => {
            let options = DeployOptions::new()
                .with_files(files)
                .with_no_delete(no_delete);
            let report = DeployCommand::execute(&mut arbiter, &options).await?;
            print_deploy_report(&report);
        }
        Commands::Download { files } => {
            let options = DownloadOptions::new().with_files(files);
            let report = DownloadCommand::execute(&mut arbiter, &options).await?;
            for (environment, keys) in &report.environments {
                println!(
                    "{} Downloaded {} file(s)",
                    env_label(environment),
                    keys.len()
                );
            }
        }
        Commands::Remove { files } => {
            let report = RemoveCommand::execute(&mut arbiter, &RemoveOptions::new(files)).await?;
            for (environment, keys) in &report.environments {
                for key in keys {
                    println!("{} Removed {}", env_label(environment), key);
                }
            }
        }
        Commands::List => {
            let report = ListCommand::execute(&arbiter).await?;
            for (environment, assets) in &report.environments {
                println!("{} {} file(s)", env_label(environment), assets.len());
                for asset in assets {
                    println!("  {}", asset.key);
                }
            }
        }
        Commands::Open => {
            let (environment, endpoint) = OpenCommand::execute(&arbiter).await?;
            println!("{} {}", env_label(&environment), style(endpoint).underlined());
        }
    }

    Ok(())
}

fn env_label(environment: &str) -> String {
    style(format!("[{}]", environment)).green().to_string()
}

fn print_deploy_report(report: &DeployReport) {
    for deployed in &report.environments {
        if deployed.change_count() == 0 {
            println!("{} {}", env_label(&deployed.environment), style("Up to date").dim());
            continue;
        }
        for (key, _) in &deployed.updated {
            println!("{} {} {}", env_label(&deployed.environment), style("Updated").cyan(), key);
        }
        for key in &deployed.removed {
            println!("{} {} {}", env_label(&deployed.environment), style("Removed").red(), key);
        }
    }
}

mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use addonctl_lib::config::Settings;

use crate::cmd::{OverridePolicyArg, cmd_deploy, cmd_info, cmd_locate, cmd_resolve};
use crate::output::{OutputFormat, print_error};

/// addonctl - Resolve and deploy catalog addons with their dependencies
#[derive(Parser)]
#[command(name = "addonctl")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,

  /// Catalog API base URL (overrides settings and environment)
  #[arg(long, global = true)]
  catalog_url: Option<String>,

  /// Projects API base URL (overrides settings and environment)
  #[arg(long, global = true)]
  projects_url: Option<String>,

  /// Request timeout in seconds (overrides settings and environment)
  #[arg(long, global = true)]
  timeout_secs: Option<u64>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Resolve a version constraint to a version locator
  Locate {
    /// Catalog containing the offering
    #[arg(long)]
    catalog: String,

    /// Offering id
    #[arg(long)]
    offering: String,

    /// Version constraint (e.g. "^8.18.0", ">=1.2, <2", "latest")
    #[arg(long = "version", default_value = "latest")]
    constraint: String,

    /// Offering flavor
    #[arg(long)]
    flavor: String,
  },

  /// Expand an addon's dependency tree and list what would be deployed
  Resolve {
    /// Path to the addon JSON file
    file: PathBuf,

    /// How to treat required dependencies that the addon disables
    #[arg(long, value_enum, default_value_t = OverridePolicyArg::Preserve)]
    required_override: OverridePolicyArg,
  },

  /// Deploy an addon and its dependencies to a project
  Deploy {
    /// Path to the addon JSON file
    file: PathBuf,

    /// Target project id
    #[arg(long)]
    project: String,

    /// How to treat required dependencies that the addon disables
    #[arg(long, value_enum, default_value_t = OverridePolicyArg::Preserve)]
    required_override: OverridePolicyArg,

    /// Write the deployed addon tree back to this file
    #[arg(long)]
    save: Option<PathBuf>,
  },

  /// Show effective settings
  Info,
}

fn main() {
  let cli = Cli::parse();

  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "addonctl=debug,addonctl_lib=debug" } else { "warn" }));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  if let Err(e) = run(cli) {
    print_error(&format!("{:#}", e));
    std::process::exit(1);
  }
}

fn run(cli: Cli) -> Result<()> {
  let mut settings = Settings::load()?;
  if let Some(url) = cli.catalog_url {
    settings.catalog_url = url;
  }
  if let Some(url) = cli.projects_url {
    settings.projects_url = url;
  }
  if let Some(secs) = cli.timeout_secs {
    settings.timeout_secs = secs;
  }

  match cli.command {
    Commands::Locate {
      catalog,
      offering,
      constraint,
      flavor,
    } => cmd_locate(&settings, &catalog, &offering, &constraint, &flavor, cli.output),
    Commands::Resolve {
      file,
      required_override,
    } => cmd_resolve(&settings, &file, required_override, cli.verbose, cli.output),
    Commands::Deploy {
      file,
      project,
      required_override,
      save,
    } => cmd_deploy(&settings, &file, &project, required_override, save.as_deref(), cli.output),
    Commands::Info => cmd_info(&settings, cli.output),
  }
}

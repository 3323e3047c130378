use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use console::{Term, style};
use dialoguer::{Confirm, theme::ColorfulTheme};
use tracing_subscriber::filter::LevelFilter;

use crate::{
    application::commands::{DeployDumpsCommand, FailurePolicy, PreviewDumpsCommand},
    domain::namespace::Namespace,
    error::DeployError,
    infrastructure::dump_discovery::discover_dump_files,
};

const DEFAULT_DUMP_DIR: &str = "dbs/sql";
const DEFAULT_PATTERN: &str = "datamart_*.db.sql";
const DEFAULT_PREVIEW_DIR: &str = "deploy_preview";

#[derive(Debug, Parser)]
#[command(
    name = "dump-deployer",
    version,
    about = "Replay SQLite datamart dumps into PostgreSQL, one schema per dump file"
)]
struct CliArgs {
    #[arg(
        long,
        env = "DATABASE_URL",
        hide_env_values = true,
        help = "PostgreSQL connection string"
    )]
    database_url: Option<String>,
    #[arg(long, short = 'd', default_value = DEFAULT_DUMP_DIR)]
    dump_dir: PathBuf,
    #[arg(long, short = 'p', default_value = DEFAULT_PATTERN, help = "Glob for dump file names")]
    pattern: String,
    #[arg(long, value_enum, default_value_t = CliFailurePolicy::Abort)]
    on_error: CliFailurePolicy,
    #[arg(long, help = "Write the scripts to --output-dir instead of deploying")]
    dry_run: bool,
    #[arg(long, short = 'o', default_value = DEFAULT_PREVIEW_DIR)]
    output_dir: PathBuf,
    #[arg(long, short = 'y', help = "Skip the confirmation prompt")]
    yes: bool,
    #[arg(long, short = 'v', value_enum, default_value_t = CliVerbosity::Info)]
    verbosity: CliVerbosity,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFailurePolicy {
    Abort,
    Continue,
}

impl From<CliFailurePolicy> for FailurePolicy {
    fn from(value: CliFailurePolicy) -> Self {
        match value {
            CliFailurePolicy::Abort => FailurePolicy::Abort,
            CliFailurePolicy::Continue => FailurePolicy::Continue,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliVerbosity {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<CliVerbosity> for LevelFilter {
    fn from(value: CliVerbosity) -> Self {
        match value {
            CliVerbosity::Debug => LevelFilter::DEBUG,
            CliVerbosity::Info => LevelFilter::INFO,
            CliVerbosity::Warn => LevelFilter::WARN,
            CliVerbosity::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug)]
pub enum CliAction {
    Deploy {
        database_url: String,
        command: DeployDumpsCommand,
        confirm: bool,
    },
    Preview(PreviewDumpsCommand),
}

#[derive(Debug)]
pub struct CliInvocation {
    pub verbosity: LevelFilter,
    pub action: CliAction,
}

pub fn collect_invocation() -> Result<CliInvocation> {
    collect_invocation_from_args(CliArgs::parse())
}

/// Validates configuration before anything touches the database: the
/// connection string first, then the dump files.
fn collect_invocation_from_args(args: CliArgs) -> Result<CliInvocation> {
    let action = if args.dry_run {
        let dump_paths = discover_dump_files(&args.dump_dir, &args.pattern)?;
        CliAction::Preview(PreviewDumpsCommand {
            dump_paths,
            output_dir: args.output_dir,
        })
    } else {
        let database_url = require_database_url(args.database_url)?;
        let dump_paths = discover_dump_files(&args.dump_dir, &args.pattern)?;
        CliAction::Deploy {
            database_url,
            command: DeployDumpsCommand {
                dump_paths,
                failure_policy: args.on_error.into(),
            },
            confirm: !args.yes && Term::stdout().is_term(),
        }
    };

    Ok(CliInvocation {
        verbosity: args.verbosity.into(),
        action,
    })
}

fn require_database_url(database_url: Option<String>) -> Result<String, DeployError> {
    match database_url {
        Some(url) if !url.trim().is_empty() => Ok(url),
        _ => Err(DeployError::configuration(
            "DATABASE_URL is not set; export it or pass --database-url",
        )),
    }
}

/// Shows which schema each dump lands in and asks before deploying.
pub fn confirm_deployment(command: &DeployDumpsCommand) -> Result<bool> {
    println!();
    println!(
        "{}",
        style(" DUMP DEPLOYER ")
            .black()
            .on_cyan()
            .bold()
            .underlined()
    );
    for dump_path in &command.dump_paths {
        println!(
            "  {} {} {}",
            style(dump_path.display()).dim(),
            style("->").dim(),
            style(Namespace::from_dump_path(dump_path)).bold()
        );
    }
    println!(
        "{}",
        style(format!("On error: {}", command.failure_policy)).dim()
    );
    println!();

    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Deploy {} dump files?", command.dump_paths.len()))
        .default(false)
        .interact()?;
    Ok(confirmed)
}

mod application;
mod domain;
mod error;
mod infrastructure;
mod interfaces;

use std::process::ExitCode;

use anyhow::Result;
use console::style;

use crate::application::commands::DeploymentReport;
use crate::application::use_cases::{
    deploy_dumps::DeployDumpsUseCase, preview_dumps::PreviewDumpsUseCase,
};
use crate::error::DeployError;
use crate::infrastructure::postgres_executor::PostgresExecutor;
use crate::interfaces::cli::{CliAction, collect_invocation, confirm_deployment};
use crate::interfaces::logging::init_logging;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{} {error:#}", style("Error:").red().bold());
            let exit_code = error
                .downcast_ref::<DeployError>()
                .map(DeployError::exit_code)
                .unwrap_or(1);
            if exit_code == 2 {
                eprintln!("{}", style("Aborting.").red());
            }
            ExitCode::from(exit_code)
        }
    }
}

fn run() -> Result<()> {
    let invocation = collect_invocation()?;
    init_logging(invocation.verbosity);

    match invocation.action {
        CliAction::Preview(command) => {
            println!("{}", style("Rendering deployment scripts...").cyan());
            let result = PreviewDumpsUseCase.execute(command)?;
            for written_path in &result.written_paths {
                println!("  {}", style(written_path.display()).bold());
            }
            println!(
                "{} ({} files)",
                style("Dry run finished, nothing was deployed").green(),
                result.written_paths.len()
            );
        }
        CliAction::Deploy {
            database_url,
            command,
            confirm,
        } => {
            if confirm && !confirm_deployment(&command)? {
                println!("{}", style("Deployment cancelled").yellow());
                return Ok(());
            }

            println!("{}", style("Connecting to target database...").cyan());
            let mut executor = PostgresExecutor::connect(&database_url)?;
            let report = DeployDumpsUseCase.execute(command, &mut executor);
            print_report(&report);

            if let Some(halted) = report.halted {
                return Err(halted.into());
            }
            if !report.failed.is_empty() {
                return Err(DeployError::Incomplete {
                    failed: report.failed.len(),
                    total: report.total(),
                }
                .into());
            }
            println!(
                "{}",
                style("All dump files were applied successfully.").green()
            );
        }
    }
    Ok(())
}

fn print_report(report: &DeploymentReport) {
    for outcome in &report.applied {
        println!(
            "{} {} {} [{}] ({} boolean values rewritten)",
            style("OK:").green(),
            outcome.path.display(),
            style(format!("-> {}", outcome.namespace)).dim(),
            outcome.stage,
            outcome.values_rewritten
        );
    }
    for outcome in &report.failed {
        println!(
            "{} {} [{}] {}",
            style("FAILED:").red(),
            outcome.path.display(),
            outcome.stage,
            style(outcome.error.as_deref().unwrap_or_default()).dim()
        );
    }
}

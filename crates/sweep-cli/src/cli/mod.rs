mod commands;
mod helpers;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use commands::{IdentifyArgs, PlanArgs, RunArgs};
use std::ffi::OsString;
use sweep_core::domain::SweepError;
use thiserror::Error;

pub fn run_from_env() -> i32 {
    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    match run(args) {
        Ok(exit_code) => exit_code,
        Err(error) => {
            let sweep_error = error.as_sweep_error();
            eprintln!("{}", sweep_error.diagnostic_line());
            if let Some(line) = sweep_error.fatal_exit_line() {
                eprintln!("{}", line);
            }
            sweep_error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut full_args: Vec<OsString> = vec![OsString::from("apsq-sweep")];
    full_args.extend(args.into_iter().map(Into::into));
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<OsString>) -> Result<i32, CliError> {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            return match error.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    print!("{}", error);
                    Ok(0)
                }
                _ => Err(CliError::Usage(error.to_string())),
            };
        }
    };

    match cli.command {
        CliCommand::Run(args) => commands::run_sweep_command(args),
        CliCommand::Plan(args) => commands::run_plan_command(args),
        CliCommand::Identify(args) => commands::run_identify_command(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "apsq-sweep",
    version,
    about = "Allpix Squared simulation sweep driver"
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Materialize run configurations and execute the full sweep
    Run(RunArgs),
    /// Materialize run configurations without executing anything
    Plan(PlanArgs),
    /// Recover grid coordinates from an output data file name
    Identify(IdentifyArgs),
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Sweep(SweepError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_sweep_error(&self) -> SweepError {
        match self {
            Self::Usage(message) => {
                SweepError::input_validation("INPUT.CLI_USAGE", message.clone())
            }
            Self::Sweep(error) => error.clone(),
            Self::Internal(error) => SweepError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}

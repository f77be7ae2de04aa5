//! Command-line entry point.
//!
//! # Responsibility
//! - Stand in for the tool-invocation layer: parse arguments, load config,
//!   call the core, print its outcome.
//! - Map outcomes to exit codes: 0 completed, 1 rejected, 2 configuration.

use clap::{Parser, Subcommand};
use execsys_core::{
    default_log_level, init_logging, CompletionOutcome, CompletionService, ExecConfig, Rejection,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "execsys", version, about = "Execution-system project lifecycle tools")]
struct Cli {
    /// Config file; defaults to ~/.config/execution-system-mcp/config.json.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the outcome as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Absolute directory for rolling log files.
    #[arg(long, global = true)]
    log_dir: Option<String>,

    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Move an active project to completed once nothing open references it.
    Complete {
        /// Project title (exact match, case-sensitive).
        title: String,
    },
    /// List open items that would block completing a project.
    Blockers { title: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => ExecConfig::load(path),
        None => ExecConfig::load_default(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::from(2);
        }
    };

    let log_dir = cli.log_dir.as_deref().or(config.log_dir());
    if let Some(log_dir) = log_dir {
        let level = cli
            .log_level
            .as_deref()
            .or(config.log_level())
            .unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    let service = CompletionService::new(config.layout());
    let outcome = match &cli.command {
        Command::Complete { title } => service.complete(title),
        Command::Blockers { title } => return print_blockers(&service, title, cli.json),
    };
    print_outcome(&outcome, cli.json);
    if outcome.is_completed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn print_outcome(outcome: &CompletionOutcome, json: bool) {
    if json {
        match serde_json::to_string_pretty(outcome) {
            Ok(text) => println!("{text}"),
            Err(err) => eprintln!("Error: failed to encode outcome: {err}"),
        }
    } else {
        println!("{outcome}");
    }
}

fn print_blockers(service: &CompletionService, title: &str, json: bool) -> ExitCode {
    match service.preview_blockers(title) {
        Ok(report) => {
            if json {
                match serde_json::to_string_pretty(&report) {
                    Ok(text) => println!("{text}"),
                    Err(err) => eprintln!("Error: failed to encode report: {err}"),
                }
            } else if report.is_blocking() {
                print!("{report}");
            } else {
                println!("No open items reference '{title}'.");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            print_outcome(&CompletionOutcome::Rejected(Rejection::from(err)), json);
            ExitCode::from(1)
        }
    }
}

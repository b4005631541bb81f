//! CLI command definitions and handlers

mod analyze;
mod init;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// STS architectural audit
#[derive(Parser, Debug)]
#[command(name = "sts-audit")]
#[command(
    version,
    about = "Architectural quality gate for Python code: complexity, maintainability, drift, lag and churn",
    long_about = "Audits a Python file or source tree, scores every file on cyclomatic \
complexity, maintainability index, Halstead effort, architecture drift, technical lag \
and git churn, and applies a file-level and a project-level pass/fail policy.\n\n\
The exit status is 1 when the verdict is FAIL or a file could not be audited, \
so the audit can gate CI pipelines.",
    after_help = "\
Examples:
  sts-audit analyze app.py                   Audit a single file
  sts-audit analyze src/                     Audit a source tree
  sts-audit analyze src/ -f json             Structured report on stdout
  sts-audit analyze src/ -o audit.json       Also write the structured report
  sts-audit analyze src/ --no-git            Skip churn lookups
  sts-audit init                             Write a default .sts.toml"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel workers (1-64, default: available cores)
    #[arg(long, global = true, value_parser = parse_workers)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Audit a Python file or directory tree
    Analyze {
        /// Python file or directory to audit
        target: PathBuf,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Also write the structured (JSON) report to this path
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Skip git history lookups (churn is reported as 0)
        #[arg(long)]
        no_git: bool,
    },

    /// Write a .sts.toml with the default policy
    Init {
        /// Directory to write the config into
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing .sts.toml
        #[arg(long)]
        force: bool,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Analyze {
            target,
            format,
            output,
            no_git,
        } => analyze::run(&target, &format, output.as_deref(), no_git, cli.workers),

        Commands::Init { path, force } => {
            init::run(&path, force)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

//! Analyze command - audit a file or tree and report the verdict

use crate::config::load_config;
use crate::git::{ChurnSource, GitLogChurn, NoHistory};
use crate::models::AuditRun;
use crate::reporters::{self, build_report, write_report, OutputFormat};
use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Run the analyze command
pub fn run(
    target: &Path,
    format: &str,
    output: Option<&Path>,
    no_git: bool,
    workers: Option<usize>,
) -> Result<ExitCode> {
    let format = OutputFormat::from_str(format)?;
    let config = load_config(target)?;
    if let Some(source) = &config.source {
        info!("Using configuration {}", source.display());
    }

    let churn: Box<dyn ChurnSource> = if no_git {
        debug!("Churn lookups disabled");
        Box::new(NoHistory)
    } else {
        Box::new(GitLogChurn::new(
            config.churn_window_days,
            config.churn_timeout,
        ))
    };

    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(n) = workers {
        pool = pool.num_threads(n);
    }
    let pool = pool.build().context("Failed to start worker pool")?;

    let spinner = if target.is_dir() {
        Some(create_spinner(target)?)
    } else {
        None
    };

    let result = pool.install(|| crate::audit::audit_target(target, &config, churn.as_ref()));

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let run = result?;

    let structured = build_report(&run);
    if let Some(path) = output {
        write_report(path, &structured)?;
    }

    match format {
        OutputFormat::Text => {
            print!("{}", reporters::text::render(&run, &config));
            if let Some(path) = output {
                println!(
                    "\n{} JSON written to {}",
                    style("✓").green(),
                    style(path.display()).cyan()
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", reporters::json::render(&structured)?);
        }
    }

    Ok(exit_code(&run))
}

fn exit_code(run: &AuditRun) -> ExitCode {
    if run.is_failed() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

/// Spinner on stderr while a tree is scanned; hidden when not a terminal
fn create_spinner(target: &Path) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.green} {msg}")?,
    );
    spinner.set_message(format!("Auditing {}...", target.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

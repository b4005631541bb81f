//! Text (terminal) reporter
//!
//! Single-file runs get a detailed block, directory runs a table with one
//! row per file followed by the project summary. Styling goes through
//! `console`, which drops colors when stdout is not a terminal.

use crate::config::AuditConfig;
use crate::models::{AuditRun, FileError, FileReport, ProjectReport, Verdict};
use crate::reporters::REPORT_VERSION;
use console::style;

const FILE_RULE_WIDTH: usize = 50;
const PROJECT_RULE_WIDTH: usize = 70;
/// Paths longer than this are shown with a leading `...`
const MAX_PATH_WIDTH: usize = 38;

fn rule(ch: char, width: usize) -> String {
    ch.to_string().repeat(width)
}

fn verdict_label(verdict: Verdict) -> String {
    match verdict {
        Verdict::Pass => style(format!("[{}]", verdict)).green().bold().to_string(),
        Verdict::Fail => style(format!("[{}]", verdict)).red().bold().to_string(),
    }
}

fn lag_label(tl: bool) -> &'static str {
    if tl {
        "HIGH"
    } else {
        "LOW"
    }
}

fn percent(ratio: f64, places: usize) -> String {
    format!("{:.*}%", places, ratio * 100.0)
}

/// Keep the tail of long paths so the file name stays visible
fn truncate_path(path: &str) -> String {
    let chars: Vec<char> = path.chars().collect();
    if chars.len() <= MAX_PATH_WIDTH {
        return path.to_string();
    }
    let tail: String = chars[chars.len() - (MAX_PATH_WIDTH - 3)..].iter().collect();
    format!("...{}", tail)
}

/// Render an audit run as terminal output
pub fn render(run: &AuditRun, config: &AuditConfig) -> String {
    let mut out = String::new();

    match &run.project {
        Some(project) => render_project(&mut out, &run.files, project, config),
        None => {
            for report in &run.files {
                render_file(&mut out, report, config);
            }
        }
    }

    if !run.errors.is_empty() {
        render_errors(&mut out, &run.errors);
    }

    out
}

fn render_file(out: &mut String, r: &FileReport, config: &AuditConfig) {
    let heavy = rule('=', FILE_RULE_WIDTH);
    let light = rule('-', FILE_RULE_WIDTH);

    out.push_str(&format!("{heavy}\n"));
    out.push_str(&format!(
        "        {}\n",
        style(format!("STS ARCHITECTURAL AUDIT v{REPORT_VERSION}")).bold()
    ));
    out.push_str(&format!("{heavy}\n"));
    out.push_str(&format!("Target: {}\n", r.path.display()));
    out.push_str(&format!("Verdict: {}\n", verdict_label(r.verdict)));
    out.push_str(&format!("{light}\n"));

    out.push_str(&format!("{}\n", style("[Core Metrics]").bold()));
    out.push_str(&format!(
        "  Max Cyclomatic Complexity : {} (Limit: {})\n",
        r.max_cc, config.cc_threshold
    ));
    out.push_str(&format!("  Maintainability Index     : {:.2}\n", r.mi_score));
    out.push_str(&format!("  Halstead Difficulty       : {:.2}\n", r.h_difficulty));
    out.push_str(&format!("  Halstead Effort           : {:.2}\n", r.h_effort));
    out.push_str(&format!("{light}\n"));

    out.push_str(&format!("{}\n", style("[Consensus Audit]").bold()));
    out.push_str(&format!(
        "  Code Churn Rate (CCR)     : {} (Limit: {})\n",
        percent(r.ccr, 2),
        percent(config.ccr_threshold, 0)
    ));
    out.push_str(&format!(
        "  Architecture Drift (ADF)  : {:.4} (Limit: {})\n",
        r.adf, config.adf_threshold
    ));
    out.push_str(&format!("  Technical Lag (TL)        : {}\n", lag_label(r.tl)));
    for inst in &r.tl_instances {
        out.push_str(&format!("    -> {}\n", style(inst).dim()));
    }
    out.push_str(&format!("{light}\n"));

    if r.verdict.is_fail() {
        out.push_str(&format!(
            "{}\n",
            style("FINDING : Architectural integrity compromised.").red()
        ));
        out.push_str(&format!(
            "{}\n",
            style("ACTION  : REJECT DELIVERY / MANDATORY REFACTORING.").red()
        ));
    } else {
        out.push_str(&format!(
            "{}\n",
            style("FINDING : Architecture is healthy and scalable.").green()
        ));
    }
    out.push_str(&format!("{heavy}\n"));
}

fn render_project(
    out: &mut String,
    files: &[FileReport],
    project: &ProjectReport,
    config: &AuditConfig,
) {
    let heavy = rule('=', PROJECT_RULE_WIDTH);
    let light = rule('-', PROJECT_RULE_WIDTH);

    out.push_str(&format!("{heavy}\n"));
    out.push_str(&format!(
        "        {}\n",
        style(format!("STS PROJECT AUDIT v{REPORT_VERSION}")).bold()
    ));
    out.push_str(&format!("{heavy}\n"));
    out.push_str(&format!("  Files scanned: {}\n", project.total_files));
    out.push_str(&format!("{light}\n"));

    out.push_str(&format!(
        "{}\n",
        style(format!(
            "{:<40} {:>4} {:>7} {:<5} {}",
            "File", "CC", "ADF", "TL", "Verdict"
        ))
        .dim()
    ));
    out.push_str(&format!("{light}\n"));
    for r in files {
        let name = truncate_path(&r.path.display().to_string());
        out.push_str(&format!(
            "{:<40} {:>4} {:>7.4} {:<5} {}\n",
            name,
            r.max_cc,
            r.adf,
            lag_label(r.tl),
            verdict_label(r.verdict)
        ));
    }
    out.push_str(&format!("{light}\n"));

    out.push_str(&format!("{}\n", style("[Project Summary]").bold()));
    out.push_str(&format!("  Max CC (across all files) : {}\n", project.max_cc));
    out.push_str(&format!("  Mean CC                   : {:.1}\n", project.mean_cc));
    out.push_str(&format!("  Max ADF                   : {:.4}\n", project.max_adf));
    if !project.polluted_files.is_empty() {
        out.push_str(&format!(
            "  Polluted files ({}):\n",
            project.polluted_files.len()
        ));
        for p in &project.polluted_files {
            out.push_str(&format!("    -> {}\n", style(p.display()).yellow()));
        }
    }
    out.push_str(&format!("  Mean CCR                  : {}\n", percent(project.mean_ccr, 2)));
    out.push_str(&format!("  Max CCR                   : {}\n", percent(project.max_ccr, 2)));
    out.push_str(&format!(
        "  Global TL                 : {}\n",
        lag_label(project.global_tl)
    ));
    for inst in &project.tl_instances {
        out.push_str(&format!("    -> {}\n", style(inst).dim()));
    }
    out.push_str(&format!("{light}\n"));

    out.push_str(&format!("  Project Verdict: {}\n", verdict_label(project.verdict)));
    if project.verdict.is_fail() {
        out.push_str(&format!(
            "  PASS requires: max_cc < {}, max_adf < {}, global_tl == LOW, max_ccr <= {}\n",
            config.project_cc_threshold,
            config.adf_threshold,
            percent(config.ccr_threshold, 0)
        ));
    }
    out.push_str(&format!("{heavy}\n"));
}

fn render_errors(out: &mut String, errors: &[FileError]) {
    out.push_str(&format!(
        "{}\n",
        style(format!("[Errors] {} file(s) could not be audited", errors.len()))
            .red()
            .bold()
    ));
    for e in errors {
        out.push_str(&format!("  {} {}\n", style("x").red(), e.message));
    }
}

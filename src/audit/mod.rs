//! Audit engine
//!
//! Turns one file, or every Python file below a directory, into
//! `FileReport`s. Each file is audited independently; directory scans
//! fan out over the current rayon pool and are re-sorted by path so the
//! output order never depends on scheduling.

use crate::config::AuditConfig;
use crate::error::{AuditError, AuditResult};
use crate::git::{churn_rate, ChurnSource};
use crate::metrics::{architecture_drift, count_loc, maintainability_index, technical_lag};
use crate::models::{AuditRun, FileError, FileOutcome, FileReport, Verdict};
use crate::parsers::python::scan_source;
use crate::scoring::aggregate;
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Package marker files never audited in directory mode
const PACKAGE_INIT: &str = "__init__.py";

/// File-level policy: any single breach fails the file
pub fn file_verdict(max_cc: u32, adf: f64, ccr: f64, config: &AuditConfig) -> Verdict {
    Verdict::from_failed(
        max_cc > config.cc_threshold || adf > config.adf_threshold || ccr > config.ccr_threshold,
    )
}

/// Build the report for already-loaded source text
pub fn audit_source(
    path: &Path,
    content: &str,
    config: &AuditConfig,
    churn: &dyn ChurnSource,
) -> AuditResult<FileReport> {
    let scan = scan_source(content).map_err(|e| AuditError::Parse {
        path: path.to_path_buf(),
        reason: format!("{e:#}"),
    })?;

    let max_cc = scan.max_complexity();
    let volume = scan.tokens.volume();
    let mi_score = maintainability_index(volume, max_cc, count_loc(content));
    let ccr = churn_rate(churn, path);
    let adf = architecture_drift(content, &config.illegal_patterns);
    let tl_instances = technical_lag(path, content, &config.deprecated_markers);

    Ok(FileReport {
        path: path.to_path_buf(),
        max_cc,
        mi_score,
        h_difficulty: scan.tokens.difficulty(),
        h_effort: scan.tokens.effort(),
        ccr,
        adf,
        tl: !tl_instances.is_empty(),
        tl_instances,
        verdict: file_verdict(max_cc, adf, ccr, config),
    })
}

/// Read and audit a single file
pub fn audit_file(
    path: &Path,
    config: &AuditConfig,
    churn: &dyn ChurnSource,
) -> AuditResult<FileReport> {
    let bytes = std::fs::read(path).map_err(|source| AuditError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    // Undecodable bytes are replaced rather than rejected
    let content = String::from_utf8_lossy(&bytes);
    audit_source(path, &content, config, churn)
}

/// Sort key giving plain lexicographic path order
fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Recursively collect `*.py` files below `directory`, sorted by path.
///
/// Directories named in `skip.dirs` are pruned and package `__init__.py`
/// files are left out. Hidden files and ignore files get no special
/// treatment.
pub fn collect_files(directory: &Path, config: &AuditConfig) -> Vec<PathBuf> {
    let skip_dirs = config.skip_dirs.clone();

    let mut builder = WalkBuilder::new(directory);
    builder
        .hidden(false)
        .ignore(false)
        .parents(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            if !is_dir || entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            !skip_dirs.contains(&*name)
        });

    let mut files: Vec<PathBuf> = builder
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        // Follows symlinked files; symlinked directories are not descended
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension().is_some_and(|ext| ext == "py")
                && path.file_name().is_some_and(|name| name != PACKAGE_INIT)
        })
        .collect();

    files.sort_by_cached_key(|p| path_key(p));
    debug!("Collected {} Python files under {}", files.len(), directory.display());
    files
}

/// Audit every file in parallel; outcomes come back sorted by path
pub fn audit_files(
    files: &[PathBuf],
    config: &AuditConfig,
    churn: &dyn ChurnSource,
) -> Vec<FileOutcome> {
    let mut outcomes: Vec<FileOutcome> = files
        .par_iter()
        .map(|path| match audit_file(path, config, churn) {
            Ok(report) => FileOutcome::Report(report),
            Err(e) => {
                warn!("{}", e);
                FileOutcome::Error(FileError {
                    path: path.clone(),
                    message: e.to_string(),
                })
            }
        })
        .collect();

    outcomes.sort_by_cached_key(|o| path_key(o.path()));
    outcomes
}

/// Split outcomes into reports and error records, keeping their order
fn partition(outcomes: Vec<FileOutcome>) -> (Vec<FileReport>, Vec<FileError>) {
    let mut reports = Vec::with_capacity(outcomes.len());
    let mut errors = Vec::new();
    for outcome in outcomes {
        match outcome {
            FileOutcome::Report(r) => reports.push(r),
            FileOutcome::Error(e) => errors.push(e),
        }
    }
    (reports, errors)
}

/// Audit a file or a directory tree.
///
/// Fatal conditions (missing target, unsupported kind, directory with no
/// Python files) are returned as errors before anything is analyzed.
/// Per-file read or scan failures are carried in `AuditRun::errors`.
pub fn audit_target(
    target: &Path,
    config: &AuditConfig,
    churn: &dyn ChurnSource,
) -> AuditResult<AuditRun> {
    if !target.exists() {
        return Err(AuditError::TargetMissing(target.to_path_buf()));
    }

    if target.is_file() {
        let (files, errors) = partition(audit_files(&[target.to_path_buf()], config, churn));
        return Ok(AuditRun {
            target: target.to_path_buf(),
            files,
            errors,
            project: None,
        });
    }

    if !target.is_dir() {
        return Err(AuditError::TargetKind(target.to_path_buf()));
    }

    let paths = collect_files(target, config);
    if paths.is_empty() {
        return Err(AuditError::EmptyTree(target.to_path_buf()));
    }

    let (files, errors) = partition(audit_files(&paths, config, churn));
    let project = aggregate(&files, config);
    info!(
        "Audited {} files ({} errors): project {}",
        files.len(),
        errors.len(),
        project.verdict
    );

    Ok(AuditRun {
        target: target.to_path_buf(),
        files,
        errors,
        project: Some(project),
    })
}

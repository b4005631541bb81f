//! JSON reporter
//!
//! Builds the structured report consumed by downstream tooling. Metrics
//! are rounded to a fixed number of places so that reports of an
//! unchanged tree are byte-identical.

use crate::error::{AuditError, AuditResult};
use crate::models::{AuditRun, FileError, FileReport, ProjectReport, Verdict};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Report format version
pub const REPORT_VERSION: &str = "2.2";

/// Places kept for MI, Halstead and mean CC
const SCORE_PLACES: i32 = 2;
/// Places kept for churn and drift ratios
const RATIO_PLACES: i32 = 4;

/// Top-level structured report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredReport {
    pub version: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectEntry>,
    pub files: Vec<FileEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub max_cc: u32,
    pub mi_score: f64,
    pub h_difficulty: f64,
    pub h_effort: f64,
    pub ccr: f64,
    pub adf: f64,
    pub tl: bool,
    pub tl_instances: Vec<String>,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub total_files: usize,
    pub max_cc: u32,
    pub mean_cc: f64,
    pub max_adf: f64,
    pub polluted_files: Vec<String>,
    pub mean_ccr: f64,
    pub max_ccr: f64,
    pub global_tl: bool,
    pub tl_instances: Vec<String>,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub path: String,
    pub error: String,
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn path_string(path: &Path) -> String {
    path.display().to_string()
}

impl From<&FileReport> for FileEntry {
    fn from(r: &FileReport) -> Self {
        Self {
            path: path_string(&r.path),
            max_cc: r.max_cc,
            mi_score: round_to(r.mi_score, SCORE_PLACES),
            h_difficulty: round_to(r.h_difficulty, SCORE_PLACES),
            h_effort: round_to(r.h_effort, SCORE_PLACES),
            ccr: round_to(r.ccr, RATIO_PLACES),
            adf: round_to(r.adf, RATIO_PLACES),
            tl: r.tl,
            tl_instances: r.tl_instances.clone(),
            verdict: r.verdict,
        }
    }
}

impl From<&ProjectReport> for ProjectEntry {
    fn from(p: &ProjectReport) -> Self {
        Self {
            total_files: p.total_files,
            max_cc: p.max_cc,
            mean_cc: round_to(p.mean_cc, SCORE_PLACES),
            max_adf: round_to(p.max_adf, RATIO_PLACES),
            polluted_files: p.polluted_files.iter().map(|f| path_string(f)).collect(),
            mean_ccr: round_to(p.mean_ccr, RATIO_PLACES),
            max_ccr: round_to(p.max_ccr, RATIO_PLACES),
            global_tl: p.global_tl,
            tl_instances: p.tl_instances.clone(),
            verdict: p.verdict,
        }
    }
}

impl From<&FileError> for ErrorEntry {
    fn from(e: &FileError) -> Self {
        Self {
            path: path_string(&e.path),
            error: e.message.clone(),
        }
    }
}

/// Build the structured view of an audit run
pub fn build_report(run: &AuditRun) -> StructuredReport {
    StructuredReport {
        version: REPORT_VERSION.to_string(),
        target: path_string(&run.target),
        project: run.project.as_ref().map(ProjectEntry::from),
        files: run.files.iter().map(FileEntry::from).collect(),
        errors: run.errors.iter().map(ErrorEntry::from).collect(),
    }
}

/// Render report as pretty-printed JSON
pub fn render(report: &StructuredReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Write the report to `path` without ever leaving a partial file.
///
/// The document is serialized in memory, written to a hidden sibling
/// file and renamed over the destination.
pub fn write_report(path: &Path, report: &StructuredReport) -> AuditResult<()> {
    let write_err = |source: io::Error| AuditError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut body = serde_json::to_vec_pretty(report).map_err(|e| write_err(e.into()))?;
    body.push(b'\n');

    let tmp_file = temp_sibling(path).ok_or_else(|| {
        write_err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "destination has no file name",
        ))
    })?;

    fs::write(&tmp_file, &body).map_err(|e| {
        let _ = fs::remove_file(&tmp_file);
        write_err(e)
    })?;

    // Atomic rename
    fs::rename(&tmp_file, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_file);
        write_err(e)
    })?;

    debug!("Wrote structured report to {}", path.display());
    Ok(())
}

fn temp_sibling(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?;
    Some(path.with_file_name(format!(".{}.tmp", name.to_string_lossy())))
}

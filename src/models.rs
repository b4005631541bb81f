//! Core data models for the audit engine
//!
//! Reports are built once and never mutated afterwards. `FileReport` is
//! produced by the metric extractor, `ProjectReport` is a pure reduction
//! over a set of file reports.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Pass/fail decision at file or project granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn from_failed(failed: bool) -> Self {
        if failed {
            Verdict::Fail
        } else {
            Verdict::Pass
        }
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Verdict::Fail)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Fail => write!(f, "FAIL"),
        }
    }
}

/// Metrics and verdict for one analyzed file
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub path: PathBuf,
    /// Worst cyclomatic complexity over all functions in the file
    pub max_cc: u32,
    pub mi_score: f64,
    pub h_difficulty: f64,
    pub h_effort: f64,
    /// Code churn rate in [0.0, 1.0]
    pub ccr: f64,
    /// Architecture drift fraction in [0.0, 1.0]
    pub adf: f64,
    /// Technical lag flag
    pub tl: bool,
    /// `path:line` for every deprecated-marker hit, in file order
    pub tl_instances: Vec<String>,
    pub verdict: Verdict,
}

/// Aggregate over every file of a directory scan
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectReport {
    pub total_files: usize,
    pub max_cc: u32,
    pub mean_cc: f64,
    pub max_adf: f64,
    /// Files whose ADF is strictly positive, in report order
    pub polluted_files: Vec<PathBuf>,
    pub mean_ccr: f64,
    pub max_ccr: f64,
    pub global_tl: bool,
    pub tl_instances: Vec<String>,
    pub verdict: Verdict,
}

/// A file that could not be audited (unreadable or unscannable)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of auditing a single file during a tree scan
#[derive(Debug, Clone)]
pub enum FileOutcome {
    Report(FileReport),
    Error(FileError),
}

impl FileOutcome {
    pub fn path(&self) -> &PathBuf {
        match self {
            FileOutcome::Report(r) => &r.path,
            FileOutcome::Error(e) => &e.path,
        }
    }
}

/// Everything produced by one invocation of the engine
#[derive(Debug, Clone)]
pub struct AuditRun {
    /// The target as requested by the caller
    pub target: PathBuf,
    /// Successful file reports, sorted by path
    pub files: Vec<FileReport>,
    /// Per-file failures, sorted by path
    pub errors: Vec<FileError>,
    /// Present only for directory targets
    pub project: Option<ProjectReport>,
}

impl AuditRun {
    /// The verdict that gates the exit status: project verdict for a
    /// directory, the file verdict for a single file.
    pub fn governing_verdict(&self) -> Verdict {
        match &self.project {
            Some(project) => project.verdict,
            None => Verdict::from_failed(self.files.iter().any(|f| f.verdict.is_fail())),
        }
    }

    /// Whether calling tooling should treat the run as failed
    pub fn is_failed(&self) -> bool {
        self.governing_verdict().is_fail() || !self.errors.is_empty()
    }
}

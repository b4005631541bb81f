//! Error taxonomy for the audit engine
//!
//! Configuration and target errors are fatal for the whole invocation.
//! `Read` and `Parse` are per-file and end up as error records in the
//! report instead of aborting a tree scan.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the audit engine
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("failed to read configuration {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration value `{field}`: {reason}")]
    InvalidThreshold { field: &'static str, reason: String },

    #[error("target does not exist: {0}")]
    TargetMissing(PathBuf),

    #[error("target is neither a file nor a directory: {0}")]
    TargetKind(PathBuf),

    #[error("no Python files found in {0}")]
    EmptyTree(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to scan {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("failed to write report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AuditError {
    /// True for errors that only concern one file of a tree scan.
    pub fn is_per_file(&self) -> bool {
        matches!(self, AuditError::Read { .. } | AuditError::Parse { .. })
    }
}

pub type AuditResult<T> = Result<T, AuditError>;

//! Project-level configuration support
//!
//! Loads the audit policy from the nearest `.sts.toml`, searching the
//! target directory (or the parent of a file target) and then every
//! ancestor directory.
//!
//! # Configuration Format
//!
//! ```toml
//! # .sts.toml
//!
//! [thresholds]
//! max_cc = 20           # per-file CC ceiling
//! adf = 0.05            # per-file ADF ceiling (density)
//! ccr = 0.3             # per-file / project churn ceiling
//! project_max_cc = 10   # project-level CC ceiling
//!
//! [patterns]
//! illegal = ["import tkinter", "from bookstore_ui", "print("]
//! deprecated = ["os.path"]
//!
//! [skip]
//! dirs = ["__pycache__", ".venv", "venv", ".git"]
//!
//! [churn]
//! window_days = 14
//! timeout_secs = 5
//! ```
//!
//! Every field is optional. Missing fields fall back to the built-in
//! default one by one; a document that fails to parse aborts the run.

use crate::error::{AuditError, AuditResult};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// File name searched for during discovery
pub const CONFIG_FILE_NAME: &str = ".sts.toml";

/// Forbidden import/print markers used when no patterns are configured
pub const DEFAULT_ILLEGAL_PATTERNS: &[&str] = &["import tkinter", "from bookstore_ui", "print("];

/// Deprecated-API markers that raise the technical-lag flag
pub const DEFAULT_DEPRECATED_MARKERS: &[&str] = &["os.path"];

/// Directory names pruned from tree walks
pub const DEFAULT_SKIP_DIRS: &[&str] = &["__pycache__", ".venv", "venv", ".git"];

pub const DEFAULT_CC_THRESHOLD: u32 = 20;
pub const DEFAULT_ADF_THRESHOLD: f64 = 0.05;
pub const DEFAULT_CCR_THRESHOLD: f64 = 0.3;
pub const DEFAULT_PROJECT_CC_THRESHOLD: u32 = 10;
pub const DEFAULT_CHURN_WINDOW_DAYS: u32 = 14;
pub const DEFAULT_CHURN_TIMEOUT_SECS: u64 = 5;

/// Resolved audit policy, built once per invocation
#[derive(Debug, Clone, PartialEq)]
pub struct AuditConfig {
    /// Substrings whose presence on a line counts as architecture drift
    pub illegal_patterns: Vec<String>,
    /// Substrings whose presence on a line counts as technical lag
    pub deprecated_markers: Vec<String>,
    /// Per-file CC ceiling (file fails when max CC is above it)
    pub cc_threshold: u32,
    /// Per-file ADF ceiling, reused by the project policy
    pub adf_threshold: f64,
    /// Per-file and project churn ceiling
    pub ccr_threshold: f64,
    /// Project CC ceiling (project passes only when max CC is below it)
    pub project_cc_threshold: u32,
    pub skip_dirs: BTreeSet<String>,
    pub churn_window_days: u32,
    pub churn_timeout: Duration,
    /// Document the values were read from, if any
    pub source: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            illegal_patterns: to_strings(DEFAULT_ILLEGAL_PATTERNS),
            deprecated_markers: to_strings(DEFAULT_DEPRECATED_MARKERS),
            cc_threshold: DEFAULT_CC_THRESHOLD,
            adf_threshold: DEFAULT_ADF_THRESHOLD,
            ccr_threshold: DEFAULT_CCR_THRESHOLD,
            project_cc_threshold: DEFAULT_PROJECT_CC_THRESHOLD,
            skip_dirs: DEFAULT_SKIP_DIRS.iter().map(|s| s.to_string()).collect(),
            churn_window_days: DEFAULT_CHURN_WINDOW_DAYS,
            churn_timeout: Duration::from_secs(DEFAULT_CHURN_TIMEOUT_SECS),
            source: None,
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Raw `.sts.toml` document; unknown keys are ignored
#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    thresholds: ThresholdsSection,
    #[serde(default)]
    patterns: PatternsSection,
    #[serde(default)]
    skip: SkipSection,
    #[serde(default)]
    churn: ChurnSection,
}

#[derive(Debug, Default, Deserialize)]
struct ThresholdsSection {
    max_cc: Option<u32>,
    adf: Option<f64>,
    ccr: Option<f64>,
    project_max_cc: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct PatternsSection {
    illegal: Option<Vec<String>>,
    deprecated: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct SkipSection {
    dirs: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct ChurnSection {
    window_days: Option<u32>,
    timeout_secs: Option<u64>,
}

impl AuditConfig {
    /// Parse a configuration document and merge it over the defaults.
    ///
    /// `origin` is only used for error messages and `source`.
    pub fn from_toml_str(content: &str, origin: &Path) -> AuditResult<Self> {
        let doc: ConfigDocument = toml::from_str(content).map_err(|source| AuditError::Config {
            path: origin.to_path_buf(),
            source,
        })?;

        let defaults = AuditConfig::default();
        let config = AuditConfig {
            illegal_patterns: doc.patterns.illegal.unwrap_or(defaults.illegal_patterns),
            deprecated_markers: doc
                .patterns
                .deprecated
                .unwrap_or(defaults.deprecated_markers),
            cc_threshold: doc.thresholds.max_cc.unwrap_or(defaults.cc_threshold),
            adf_threshold: doc.thresholds.adf.unwrap_or(defaults.adf_threshold),
            ccr_threshold: doc.thresholds.ccr.unwrap_or(defaults.ccr_threshold),
            project_cc_threshold: doc
                .thresholds
                .project_max_cc
                .unwrap_or(defaults.project_cc_threshold),
            skip_dirs: doc
                .skip
                .dirs
                .map(|dirs| dirs.into_iter().collect())
                .unwrap_or(defaults.skip_dirs),
            churn_window_days: doc
                .churn
                .window_days
                .unwrap_or(defaults.churn_window_days),
            churn_timeout: doc
                .churn
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.churn_timeout),
            source: Some(origin.to_path_buf()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the policy meaningless
    fn validate(&self) -> AuditResult<()> {
        check_ratio("thresholds.adf", self.adf_threshold)?;
        check_ratio("thresholds.ccr", self.ccr_threshold)?;
        if self.churn_window_days == 0 {
            return Err(AuditError::InvalidThreshold {
                field: "churn.window_days",
                reason: "must be at least 1".into(),
            });
        }
        if self.churn_timeout.is_zero() {
            return Err(AuditError::InvalidThreshold {
                field: "churn.timeout_secs",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Whether a directory with this name is pruned from tree walks
    pub fn is_skipped_dir(&self, name: &str) -> bool {
        self.skip_dirs.contains(name)
    }
}

fn check_ratio(field: &'static str, value: f64) -> AuditResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(AuditError::InvalidThreshold {
            field,
            reason: format!("expected a non-negative number, got {value}"),
        });
    }
    Ok(())
}

/// Walk up from `target` looking for `.sts.toml`.
///
/// A directory target is searched first, a file target starts at its
/// parent directory.
pub fn find_config(target: &Path) -> Option<PathBuf> {
    let start = if target.is_dir() {
        target.to_path_buf()
    } else {
        match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    };
    // Relative paths have no useful ancestors; resolve them first
    let start = start.canonicalize().unwrap_or(start);

    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Load the configuration governing `target`.
///
/// Returns the built-in defaults if no document is found.
pub fn load_config(target: &Path) -> AuditResult<AuditConfig> {
    let Some(path) = find_config(target) else {
        debug!("No {} found, using defaults", CONFIG_FILE_NAME);
        return Ok(AuditConfig::default());
    };

    let content = std::fs::read_to_string(&path).map_err(|source| AuditError::ConfigRead {
        path: path.clone(),
        source,
    })?;
    let config = AuditConfig::from_toml_str(&content, &path)?;
    debug!("Loaded audit config from {}", path.display());
    Ok(config)
}

/// Commented `.sts.toml` carrying the built-in defaults
pub fn default_config_template() -> String {
    let defaults = AuditConfig::default();
    let list = |items: &[String]| {
        items
            .iter()
            .map(|s| format!("{:?}", s))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let skip: Vec<String> = defaults.skip_dirs.iter().cloned().collect();

    format!(
        r#"# Architectural audit policy
# Every field is optional; missing fields use the built-in default.

[thresholds]
# A file fails when its worst function exceeds this complexity
max_cc = {max_cc}
# A file fails when more than this fraction of its lines match an illegal pattern
adf = {adf}
# A file fails when its churn rate exceeds this value (0.0 - 1.0)
ccr = {ccr}
# A project passes only when every file stays below this complexity
project_max_cc = {project_max_cc}

[patterns]
# Plain, case-sensitive substrings (not regular expressions)
illegal = [{illegal}]
# Markers of deprecated APIs (technical lag)
deprecated = [{deprecated}]

[skip]
dirs = [{skip}]

[churn]
window_days = {window}
timeout_secs = {timeout}
"#,
        max_cc = defaults.cc_threshold,
        adf = defaults.adf_threshold,
        ccr = defaults.ccr_threshold,
        project_max_cc = defaults.project_cc_threshold,
        illegal = list(&defaults.illegal_patterns),
        deprecated = list(&defaults.deprecated_markers),
        skip = list(&skip),
        window = defaults.churn_window_days,
        timeout = defaults.churn_timeout.as_secs(),
    )
}

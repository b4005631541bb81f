//! Project-level aggregation
//!
//! Reduces the per-file reports of a directory scan into one
//! `ProjectReport` under its own verdict policy.
//!
//! # Project Policy
//!
//! ```text
//! PASS  <=>  max_cc  <  project_max_cc
//!       and  max_adf <  adf
//!       and  no technical-lag evidence in any file
//!       and  max_ccr <= ccr
//! ```
//!
//! The CC ceiling here is the project one, which is usually lower than the
//! per-file ceiling, so a project can fail while every file passes. The
//! comparisons are strict for CC and ADF and inclusive for churn.
//!
//! An empty report list aggregates to zeros and a PASS verdict.

use crate::config::AuditConfig;
use crate::models::{FileReport, ProjectReport, Verdict};
use tracing::debug;

/// Fold file reports into the project summary
pub fn aggregate(reports: &[FileReport], config: &AuditConfig) -> ProjectReport {
    let total_files = reports.len();

    let max_cc = reports.iter().map(|r| r.max_cc).max().unwrap_or(0);
    let max_adf = reports.iter().map(|r| r.adf).fold(0.0, f64::max);
    let max_ccr = reports.iter().map(|r| r.ccr).fold(0.0, f64::max);
    let mean_cc = mean(reports.iter().map(|r| f64::from(r.max_cc)), total_files);
    let mean_ccr = mean(reports.iter().map(|r| r.ccr), total_files);

    let polluted_files = reports
        .iter()
        .filter(|r| r.adf > 0.0)
        .map(|r| r.path.clone())
        .collect();
    let tl_instances: Vec<String> = reports
        .iter()
        .flat_map(|r| r.tl_instances.iter().cloned())
        .collect();
    let global_tl = reports.iter().any(|r| r.tl);

    let passed = max_cc < config.project_cc_threshold
        && max_adf < config.adf_threshold
        && !global_tl
        && max_ccr <= config.ccr_threshold;
    let verdict = Verdict::from_failed(!passed);

    debug!(
        "Project: {} files, max CC {}, max ADF {:.4}, max CCR {:.4}, TL {} -> {}",
        total_files, max_cc, max_adf, max_ccr, global_tl, verdict
    );

    ProjectReport {
        total_files,
        max_cc,
        mean_cc,
        max_adf,
        polluted_files,
        mean_ccr,
        max_ccr,
        global_tl,
        tl_instances,
        verdict,
    }
}

fn mean(values: impl Iterator<Item = f64>, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    values.sum::<f64>() / count as f64
}

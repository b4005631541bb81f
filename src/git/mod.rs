//! Version-control history queries
//!
//! Churn is read from `git log` through the [`ChurnSource`] capability so
//! that the audit engine never talks to git directly and tests can swap
//! in a fixed count.
//!
//! # Example
//!
//! ```no_run
//! use sts_audit::git::{churn_rate, GitLogChurn};
//! use std::path::Path;
//! use std::time::Duration;
//!
//! let source = GitLogChurn::new(14, Duration::from_secs(5));
//! let ccr = churn_rate(&source, Path::new("src/app.py"));
//! assert!((0.0..=1.0).contains(&ccr));
//! ```

pub mod churn;

pub use churn::{
    churn_rate, normalize_churn, ChurnError, ChurnSource, FixedChurn, GitLogChurn, NoHistory,
    SATURATION_CHANGES,
};

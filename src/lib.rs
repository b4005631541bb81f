//! STS audit - architectural quality gate for Python code
//!
//! Computes cyclomatic complexity, maintainability index, Halstead
//! difficulty/effort, architecture drift, technical lag and git churn for
//! every audited file, applies a per-file and a project-level verdict
//! policy, and renders text or structured JSON reports.

pub mod audit;
pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod metrics;
pub mod models;
pub mod parsers;
pub mod reporters;
pub mod scoring;

//! Source code scanners using tree-sitter
//!
//! Only Python is audited. The scanner extracts function boundaries,
//! decision points and Halstead tokens; it does no semantic analysis.

pub mod python;

pub use python::{scan_source, FunctionComplexity, SourceScan};

//! Configuration module
//!
//! This module handles:
//! - Discovery of `.sts.toml` (target directory, then ancestors)
//! - Field-level merge with the built-in defaults
//! - The `init` template

mod project_config;

pub use project_config::{
    default_config_template, find_config, load_config, AuditConfig, CONFIG_FILE_NAME,
    DEFAULT_DEPRECATED_MARKERS, DEFAULT_ILLEGAL_PATTERNS, DEFAULT_SKIP_DIRS,
};

//! Per-file quality metrics
//!
//! - `halstead`: operator/operand counts and the derived volume, difficulty, effort
//! - `maintainability`: maintainability index and line counting
//! - `drift`: lexical scans for architecture drift and technical lag

pub mod drift;
pub mod halstead;
pub mod maintainability;

pub use drift::{architecture_drift, physical_lines, technical_lag};
pub use halstead::HalsteadCounts;
pub use maintainability::{count_loc, maintainability_index};

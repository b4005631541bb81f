//! Lexical line scans: architecture drift and technical lag
//!
//! Both scans are plain case-sensitive substring searches over physical
//! lines. Comments and string literals are not excluded.

use std::path::Path;

/// Physical lines of `content`, split on `\n`, `\r\n` and lone `\r`.
///
/// A trailing terminator does not start an extra empty line.
pub fn physical_lines(content: &str) -> impl Iterator<Item = &str> {
    let mut rest = content;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let line = match rest.find(['\r', '\n']) {
            Some(idx) => {
                let width = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
                let line = &rest[..idx];
                rest = &rest[idx + width..];
                line
            }
            None => std::mem::take(&mut rest),
        };
        Some(line)
    })
}

/// Fraction of lines containing at least one illegal pattern.
///
/// A line matching several patterns counts once. Returns 0.0 for a file
/// without lines.
pub fn architecture_drift(content: &str, patterns: &[String]) -> f64 {
    let mut total = 0usize;
    let mut drifted = 0usize;
    for line in physical_lines(content) {
        total += 1;
        if patterns.iter().any(|p| line.contains(p.as_str())) {
            drifted += 1;
        }
    }

    if total == 0 {
        return 0.0;
    }
    drifted as f64 / total as f64
}

/// `path:line` for every line using a deprecated marker, in file order
pub fn technical_lag(path: &Path, content: &str, markers: &[String]) -> Vec<String> {
    physical_lines(content)
        .enumerate()
        .filter(|(_, line)| markers.iter().any(|m| line.contains(m.as_str())))
        .map(|(idx, _)| format!("{}:{}", path.display(), idx + 1))
        .collect()
}

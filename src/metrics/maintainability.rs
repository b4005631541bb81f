//! Maintainability Index
//!
//! Formula: `MI = 171 - 5.2 * ln(V) - 0.23 * CC - 16.2 * ln(LOC)`
//!
//! Where V is the Halstead volume of the file, CC the worst function
//! complexity and LOC the number of non-blank lines. The raw value is
//! reported, it is not rescaled to 0..100.

use super::drift::physical_lines;

/// MI reported for a file without code lines
pub const EMPTY_FILE_MI: f64 = 100.0;

/// Count non-blank physical lines
pub fn count_loc(source: &str) -> usize {
    physical_lines(source).filter(|line| !line.trim().is_empty()).count()
}

/// Calculate the maintainability index
pub fn maintainability_index(halstead_volume: f64, max_cc: u32, loc: usize) -> f64 {
    if loc == 0 {
        return EMPTY_FILE_MI;
    }
    let volume = halstead_volume.max(1.0); // Avoid ln(0)
    171.0 - 5.2 * volume.ln() - 0.23 * f64::from(max_cc) - 16.2 * (loc as f64).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_loc_skips_blank_lines() {
        assert_eq!(count_loc(""), 0);
        assert_eq!(count_loc("\n\n   \n"), 0);
        assert_eq!(count_loc("a = 1\n\n# note\nb = 2\n"), 3);
    }

    #[test]
    fn test_count_loc_cr_only_line_endings() {
        assert_eq!(count_loc("a = 1\r\rb = 2\rc = 3\r"), 3);
        assert_eq!(count_loc("a = 1\r\nb = 2\r\n"), 2);
    }

    #[test]
    fn test_empty_file_is_fully_maintainable() {
        assert_eq!(maintainability_index(0.0, 1, 0), 100.0);
    }

    #[test]
    fn test_single_line() {
        // ln(1) terms vanish: 171 - 0.23 * 1
        let mi = maintainability_index(1.0, 1, 1);
        assert!((mi - 170.77).abs() < 1e-9);
    }

    #[test]
    fn test_zero_volume_is_clamped() {
        assert_eq!(
            maintainability_index(0.0, 3, 10),
            maintainability_index(1.0, 3, 10)
        );
    }

    #[test]
    fn test_mi_decreases_with_complexity_and_size() {
        let simple = maintainability_index(50.0, 1, 10);
        let complex = maintainability_index(5000.0, 25, 400);
        assert!(simple > complex);
        assert!(maintainability_index(50.0, 10, 10) < simple);
    }

    #[test]
    fn test_known_value() {
        let expected = 171.0 - 5.2 * 100f64.ln() - 0.23 * 4.0 - 16.2 * 20f64.ln();
        assert!((maintainability_index(100.0, 4, 20) - expected).abs() < 1e-9);
    }
}

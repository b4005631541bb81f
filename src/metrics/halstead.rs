//! Halstead software science metrics
//!
//! Token classification happens in the scanner; this module only holds
//! the counts and the published formulas derived from them.

/// Distinct and total operator/operand counts for one file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HalsteadCounts {
    /// n1
    pub distinct_operators: usize,
    /// n2
    pub distinct_operands: usize,
    /// N1
    pub total_operators: usize,
    /// N2
    pub total_operands: usize,
}

impl HalsteadCounts {
    /// n = n1 + n2
    pub fn vocabulary(&self) -> usize {
        self.distinct_operators + self.distinct_operands
    }

    /// N = N1 + N2
    pub fn length(&self) -> usize {
        self.total_operators + self.total_operands
    }

    /// V = N * log2(n)
    pub fn volume(&self) -> f64 {
        let vocabulary = self.vocabulary();
        if vocabulary == 0 {
            return 0.0;
        }
        self.length() as f64 * (vocabulary as f64).log2()
    }

    /// D = (n1 / 2) * (N2 / n2)
    pub fn difficulty(&self) -> f64 {
        if self.distinct_operands == 0 {
            return 0.0;
        }
        (self.distinct_operators as f64 / 2.0)
            * (self.total_operands as f64 / self.distinct_operands as f64)
    }

    /// E = D * V
    pub fn effort(&self) -> f64 {
        self.difficulty() * self.volume()
    }
}

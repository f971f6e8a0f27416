use serde::Serialize;
use std::fmt;

/// Size reduction in percent, rounded to two decimals.
///
/// Negative when the output grew; the value is diagnostic and never clamped.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct CompressionRatio(f64);

impl CompressionRatio {
    pub fn compute(original_size: u64, compressed_size: u64) -> Self {
        if original_size == 0 {
            return Self(0.0);
        }
        let original = original_size as f64;
        let saved = original - compressed_size as f64;
        Self::from_percentage(saved / original * 100.0)
    }

    /// Wraps an already computed percentage, e.g. one reported by a remote service.
    pub fn from_percentage(percentage: f64) -> Self {
        let rounded = (percentage * 100.0).round() / 100.0;
        // -0.0 would render as "-0.00"
        Self(if rounded == 0.0 { 0.0 } else { rounded })
    }

    pub fn percentage(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for CompressionRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduction_is_positive() {
        let ratio = CompressionRatio::compute(1000, 400);
        assert_eq!(ratio.percentage(), 60.0);
        assert_eq!(ratio.to_string(), "60.00");
    }

    #[test]
    fn growth_is_reported_unclamped() {
        let ratio = CompressionRatio::compute(1000, 1200);
        assert_eq!(ratio.percentage(), -20.0);
        assert_eq!(ratio.to_string(), "-20.00");
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(CompressionRatio::compute(3, 2).to_string(), "33.33");
        assert_eq!(CompressionRatio::compute(3, 1).to_string(), "66.67");
    }

    #[test]
    fn unchanged_size_renders_as_zero() {
        assert_eq!(CompressionRatio::compute(500, 500).to_string(), "0.00");
        assert_eq!(CompressionRatio::compute(0, 10).to_string(), "0.00");
    }
}

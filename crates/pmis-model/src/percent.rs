//! Bounded percentage values
//!
//! Every percentage that enters an average goes through [`Percent`], which
//! clamps to `[0, 100]` and maps non-finite input to `0`. Stored scores are
//! kept raw on the records and read through `Percent` at use sites.

use serde::{Deserialize, Serialize};

/// Percentage in `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Percent(f64);

impl Percent {
    /// 0%
    pub const ZERO: Percent = Percent(0.0);
    /// 100%
    pub const FULL: Percent = Percent(100.0);

    /// Clamp a raw value into range; NaN reads as 0
    #[inline]
    #[must_use]
    pub fn new(raw: f64) -> Self {
        if raw.is_nan() {
            Self::ZERO
        } else {
            Self(raw.clamp(0.0, 100.0))
        }
    }

    /// `numerator / denominator * 100`, or 0 when the denominator is not positive
    #[inline]
    #[must_use]
    pub fn ratio(numerator: f64, denominator: f64) -> Self {
        if denominator > 0.0 && denominator.is_finite() {
            Self::new(numerator / denominator * 100.0)
        } else {
            Self::ZERO
        }
    }

    /// Arithmetic mean, or 0 for an empty set
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Percent>,
    {
        let (sum, count) = values
            .into_iter()
            .fold((0.0, 0usize), |(sum, count), value| (sum + value.0, count + 1));
        if count == 0 {
            Self::ZERO
        } else {
            Self::new(sum / count as f64)
        }
    }

    /// Underlying value
    #[inline]
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Whether this is exactly 0
    #[inline]
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 <= 0.0
    }
}

impl From<f64> for Percent {
    fn from(raw: f64) -> Self {
        Self::new(raw)
    }
}

impl From<Percent> for f64 {
    fn from(percent: Percent) -> Self {
        percent.0
    }
}

impl std::fmt::Display for Percent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range() {
        assert_eq!(Percent::new(115.0), Percent::FULL);
        assert_eq!(Percent::new(-4.0), Percent::ZERO);
        assert_eq!(Percent::new(f64::NAN), Percent::ZERO);
        assert_eq!(Percent::new(f64::INFINITY), Percent::FULL);
    }

    #[test]
    fn mean_of_nothing_is_zero() {
        assert_eq!(Percent::mean(Vec::new()), Percent::ZERO);
    }

    #[test]
    fn mean_of_values() {
        let mean = Percent::mean([Percent::new(80.0), Percent::new(40.0)]);
        assert!((mean.value() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn ratio_guards_denominator() {
        assert_eq!(Percent::ratio(5.0, 0.0), Percent::ZERO);
        assert_eq!(Percent::ratio(50.0, 200.0), Percent::new(25.0));
    }

    #[test]
    fn deserialization_clamps() {
        let percent: Percent = serde_json::from_str("150.0").unwrap();
        assert_eq!(percent, Percent::FULL);
    }
}

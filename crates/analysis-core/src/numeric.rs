//! Numeric guards shared by every engine.
//!
//! Nothing that leaves the engines may be NaN or infinite; these helpers fold
//! such values into 0 (or a caller-chosen sentinel) and keep divisions by zero
//! from producing them in the first place.

/// Returns `value` when finite, otherwise 0.
pub fn finite_or_zero(value: f64) -> f64 {
    finite_or(value, 0.0)
}

/// Returns `value` when finite, otherwise `fallback`.
pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Clamp a chart coordinate into `[min, max]`; non-finite input lands on the midpoint.
pub fn clamp_position(value: f64, min: f64, max: f64) -> f64 {
    finite_or(value, (min + max) / 2.0).clamp(min, max)
}

/// Percent change from `from` to `to`, `None` when `from` is zero or either side is non-finite.
pub fn pct_change(from: f64, to: f64) -> Option<f64> {
    if !from.is_finite() || !to.is_finite() || from == 0.0 {
        return None;
    }
    let change = (to - from) / from.abs() * 100.0;
    change.is_finite().then_some(change)
}

/// Ratio `numerator / denominator`, `None` when the denominator is not strictly positive.
pub fn positive_ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if !denominator.is_finite() || denominator <= 0.0 || !numerator.is_finite() {
        return None;
    }
    Some(numerator / denominator)
}

/// Compute the mean of a data slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Largest value in the slice, `None` if empty.
pub fn max_of(data: &[f64]) -> Option<f64> {
    data.iter().copied().reduce(f64::max)
}

/// Smallest value in the slice, `None` if empty.
pub fn min_of(data: &[f64]) -> Option<f64> {
    data.iter().copied().reduce(f64::min)
}

/// Format a signed percentage with one decimal, e.g. `+3.4%`.
pub fn format_signed_pct(value: f64) -> String {
    format!("{:+.1}%", finite_or_zero(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_guards() {
        assert_eq!(finite_or_zero(f64::NAN), 0.0);
        assert_eq!(finite_or_zero(f64::NEG_INFINITY), 0.0);
        assert_eq!(finite_or(f64::INFINITY, -1.0), -1.0);
        assert_eq!(finite_or_zero(2.5), 2.5);
    }

    #[test]
    fn test_clamp_position() {
        assert_eq!(clamp_position(120.0, 10.0, 90.0), 90.0);
        assert_eq!(clamp_position(-3.0, 10.0, 90.0), 10.0);
        assert_eq!(clamp_position(f64::NAN, 10.0, 90.0), 50.0);
    }

    #[test]
    fn test_pct_change_guards_zero_base() {
        assert_eq!(pct_change(0.0, 10.0), None);
        assert!((pct_change(100.0, 110.0).unwrap() - 10.0).abs() < 1e-9);
        // Negative base measures the move against its magnitude
        assert!((pct_change(-100.0, -50.0).unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_positive_ratio() {
        assert_eq!(positive_ratio(1.0, 0.0), None);
        assert_eq!(positive_ratio(1.0, -2.0), None);
        assert_eq!(positive_ratio(1.0, 4.0), Some(0.25));
    }

    #[test]
    fn test_extrema_and_format() {
        let data = [3.0, 1.0, 2.0];
        assert_eq!(max_of(&data), Some(3.0));
        assert_eq!(min_of(&data), Some(1.0));
        assert_eq!(max_of(&[]), None);
        assert_eq!(format_signed_pct(3.44), "+3.4%");
        assert_eq!(format_signed_pct(-0.06), "-0.1%");
    }
}

//! Momentum classification from MACD histogram behaviour and EMA slopes.

use analysis_core::numeric::{mean, pct_change};
use analysis_core::{ChartPosition, Signal, SignalStatus, SubSignal};

use crate::indicators::{last, lookback, IndicatorSeries};

/// Bars over which histogram trend and EMA slopes are measured
pub const SLOPE_BARS: usize = 5;
/// Short EMA slope (%) beyond which short-term direction is not flat
pub const SHORT_SLOPE_THRESHOLD: f64 = 0.5;
/// Long EMA slope (%) beyond which long-term direction is not flat
pub const LONG_SLOPE_THRESHOLD: f64 = 0.3;
/// Chart units per percent of slope
pub const POSITION_SCALE: f64 = 10.0;
pub const POSITION_MIN: f64 = 10.0;
pub const POSITION_MAX: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MomentumState {
    Aligned,
    Pullback,
    EarlyRecovery,
    PressureBuilding,
    Transitioning,
}

impl MomentumState {
    pub fn classify(readings: &MomentumReadings) -> Self {
        let rising = readings.histogram > readings.previous_histogram;

        if readings.histogram > 0.0 && rising && readings.hist_trend > 0.0 {
            MomentumState::Aligned
        } else if readings.histogram > 0.0 && !rising {
            MomentumState::Pullback
        } else if readings.histogram <= 0.0 && rising {
            MomentumState::EarlyRecovery
        } else if readings.histogram <= 0.0 && readings.hist_average < 0.0 && readings.hist_trend < 0.0 {
            MomentumState::PressureBuilding
        } else {
            MomentumState::Transitioning
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MomentumState::Aligned => "Aligned",
            MomentumState::Pullback => "Pullback",
            MomentumState::EarlyRecovery => "Early Recovery",
            MomentumState::PressureBuilding => "Pressure Building",
            MomentumState::Transitioning => "Transitioning",
        }
    }

    pub fn status(&self) -> SignalStatus {
        match self {
            MomentumState::Aligned => SignalStatus::Supportive,
            MomentumState::PressureBuilding => SignalStatus::Unsupportive,
            _ => SignalStatus::Neutral,
        }
    }

    pub fn score(&self) -> f64 {
        match self {
            MomentumState::Aligned => 0.7,
            MomentumState::Pullback => 0.3,
            MomentumState::EarlyRecovery => 0.1,
            MomentumState::PressureBuilding => -0.7,
            MomentumState::Transitioning => -0.2,
        }
    }

    fn interpretation(&self) -> &'static str {
        match self {
            MomentumState::Aligned => "Short and long momentum point the same way and are still building.",
            MomentumState::Pullback => "Momentum is positive but cooling off its recent peak.",
            MomentumState::EarlyRecovery => "Momentum is still negative but has started to turn up.",
            MomentumState::PressureBuilding => "Downside momentum is persistent and getting heavier.",
            MomentumState::Transitioning => "Momentum is changing hands without a clear leader.",
        }
    }
}

/// Derived momentum measurements
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentumReadings {
    pub histogram: f64,
    pub previous_histogram: f64,
    /// Histogram change over the last `SLOPE_BARS` bars
    pub hist_trend: f64,
    /// Mean of the last `SLOPE_BARS` histogram values
    pub hist_average: f64,
    /// Percent change of the short EMA over `SLOPE_BARS`
    pub short_slope: f64,
    /// Percent change of the long EMA over `SLOPE_BARS`
    pub long_slope: f64,
}

impl MomentumReadings {
    pub fn from_series(histogram: &[f64], ema_short: &[f64], ema_long: &[f64]) -> Option<Self> {
        let current = last(histogram)?;
        let previous = lookback(histogram, 1)?;
        let hist_trend = current - lookback(histogram, SLOPE_BARS)?;
        let hist_average = mean(&histogram[histogram.len().saturating_sub(SLOPE_BARS)..]);

        let short_slope = pct_change(lookback(ema_short, SLOPE_BARS)?, last(ema_short)?).unwrap_or(0.0);
        let long_slope = pct_change(lookback(ema_long, SLOPE_BARS)?, last(ema_long)?).unwrap_or(0.0);

        Some(Self {
            histogram: current,
            previous_histogram: previous,
            hist_trend,
            hist_average,
            short_slope,
            long_slope,
        })
    }

    pub fn from_indicators(series: &IndicatorSeries) -> Option<Self> {
        Self::from_series(&series.macd_histogram, &series.ema12, &series.ema26)
    }
}

fn slope_direction(slope: f64, threshold: f64) -> &'static str {
    if slope > threshold {
        "Improving"
    } else if slope < -threshold {
        "Weakening"
    } else {
        "Flat"
    }
}

/// Classify momentum from precomputed readings
pub fn classify_momentum(readings: Option<MomentumReadings>) -> Signal {
    let readings = match readings {
        Some(r) if r.histogram.is_finite() && r.previous_histogram.is_finite() => r,
        _ => return Signal::neutral_fallback("Not enough price history to read momentum."),
    };

    let state = MomentumState::classify(&readings);

    let position = ChartPosition::clamped(
        50.0 + readings.short_slope * POSITION_SCALE,
        50.0 + readings.long_slope * POSITION_SCALE,
        POSITION_MIN,
        POSITION_MAX,
    );

    let gap = if readings.histogram.abs() > readings.previous_histogram.abs() {
        "Widening"
    } else {
        "Narrowing"
    };

    let sub_signals = vec![
        SubSignal::new(
            "Short-term",
            slope_direction(readings.short_slope, SHORT_SLOPE_THRESHOLD),
        ),
        SubSignal::new(
            "Long-term",
            slope_direction(readings.long_slope, LONG_SLOPE_THRESHOLD),
        ),
        SubSignal::new("Gap", gap),
    ];

    Signal {
        status: state.status(),
        color: state.status().tone(),
        label: state.label().to_string(),
        interpretation: state.interpretation().to_string(),
        score: state.score(),
        position,
        sub_signals,
    }
    .sanitized()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings(histogram: f64, previous: f64, trend: f64, average: f64) -> MomentumReadings {
        MomentumReadings {
            histogram,
            previous_histogram: previous,
            hist_trend: trend,
            hist_average: average,
            short_slope: 0.0,
            long_slope: 0.0,
        }
    }

    #[test]
    fn test_classification_branches() {
        assert_eq!(MomentumState::classify(&readings(1.0, 0.5, 0.8, 0.6)), MomentumState::Aligned);
        assert_eq!(MomentumState::classify(&readings(1.0, 1.2, 0.8, 0.6)), MomentumState::Pullback);
        assert_eq!(MomentumState::classify(&readings(-1.0, -1.2, -0.1, -1.0)), MomentumState::EarlyRecovery);
        assert_eq!(MomentumState::classify(&readings(-1.0, -0.8, -0.5, -0.7)), MomentumState::PressureBuilding);
        // Positive and rising but lower than five bars ago
        assert_eq!(MomentumState::classify(&readings(1.0, 0.5, -0.2, 0.6)), MomentumState::Transitioning);
        // Negative, falling, but average still positive
        assert_eq!(MomentumState::classify(&readings(-0.1, 0.0, -0.4, 0.2)), MomentumState::Transitioning);
    }

    #[test]
    fn test_readings_from_series() {
        let histogram = vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        let short: Vec<f64> = (0..7).map(|i| 100.0 + i as f64).collect();
        let long = vec![100.0; 7];
        let r = MomentumReadings::from_series(&histogram, &short, &long).unwrap();

        assert!((r.hist_trend - 0.5).abs() < 1e-12);
        assert!((r.hist_average - 0.4).abs() < 1e-12);
        assert!((r.short_slope - (106.0 - 101.0) / 101.0 * 100.0).abs() < 1e-9);
        assert_eq!(r.long_slope, 0.0);
        assert!(MomentumReadings::from_series(&[], &short, &long).is_none());
    }

    #[test]
    fn test_aligned_signal_and_sub_signals() {
        let mut r = readings(1.0, 0.5, 0.8, 0.6);
        r.short_slope = 0.6;
        r.long_slope = -0.4;
        let signal = classify_momentum(Some(r));

        assert_eq!(signal.label, "Aligned");
        assert_eq!(signal.status, SignalStatus::Supportive);
        assert_eq!(signal.score, 0.7);
        assert_eq!(signal.sub_signals[0].value, "Improving");
        assert_eq!(signal.sub_signals[1].value, "Weakening");
        assert_eq!(signal.sub_signals[2].value, "Widening");
        assert!((signal.position.x - 56.0).abs() < 1e-9);
        assert!((signal.position.y - 46.0).abs() < 1e-9);
    }

    #[test]
    fn test_flat_thresholds() {
        let mut r = readings(-1.0, -0.8, -0.5, -0.7);
        r.short_slope = 0.5;
        r.long_slope = -0.3;
        let signal = classify_momentum(Some(r));

        assert_eq!(signal.label, "Pressure Building");
        assert_eq!(signal.status, SignalStatus::Unsupportive);
        assert_eq!(signal.sub_signals[0].value, "Flat");
        assert_eq!(signal.sub_signals[1].value, "Flat");
    }

    #[test]
    fn test_position_clamped() {
        let mut r = readings(1.0, 0.5, 0.8, 0.6);
        r.short_slope = 12.0;
        r.long_slope = -9.0;
        let signal = classify_momentum(Some(r));

        assert_eq!(signal.position.x, POSITION_MAX);
        assert_eq!(signal.position.y, POSITION_MIN);
    }

    #[test]
    fn test_missing_readings_fall_back() {
        let signal = classify_momentum(None);
        assert_eq!(signal.status, SignalStatus::Neutral);
        assert_eq!(signal.score, 0.0);
    }
}

//! Overbought / oversold classification from RSI and distance to the 20-day EMA.
//!
//! Each branch places the signal inside its own chart region so nearby states
//! cluster visually. The regions are intentionally not one continuous mapping
//! and some overlap (cooling drift and easing share x in [25, 45]).

use analysis_core::numeric::{format_signed_pct, pct_change};
use analysis_core::{ChartPosition, Signal, SignalStatus, SubSignal};

use crate::indicators::{last, IndicatorSeries};

/// RSI readings considered when judging direction
pub const RSI_HISTORY: usize = 5;
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_WARM: f64 = 60.0;
pub const RSI_COOL: f64 = 40.0;
pub const RSI_BALANCE: f64 = 50.0;
/// Distance from the 20-day EMA (%) that counts as extreme
pub const DIST_EXTREME: f64 = 8.0;
/// Distance from the 20-day EMA (%) that counts as drifting
pub const DIST_DRIFT: f64 = 4.0;
/// Distance above the 20-day EMA (%) beyond which a return to balance is still "easing"
pub const DIST_EASING: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StretchState {
    /// x, y in [70, 90]
    Overheated,
    /// x, y in [10, 30]
    Oversold,
    /// x, y in [55, 75]
    DriftingHot,
    /// x, y in [25, 45]
    DriftingCold,
    /// x in [25, 45], y in [55, 75]
    Easing,
    /// x, y in [40, 60]
    Calm,
}

impl StretchState {
    pub fn classify(readings: &StretchReadings) -> Self {
        let rsi = readings.rsi;
        let dist = readings.distance_pct;
        let returning = readings.returning_to_balance();

        if rsi > RSI_OVERBOUGHT || dist > DIST_EXTREME {
            StretchState::Overheated
        } else if rsi < RSI_OVERSOLD || dist < -DIST_EXTREME {
            StretchState::Oversold
        } else if (rsi > RSI_WARM || dist > DIST_DRIFT) && !returning {
            StretchState::DriftingHot
        } else if (rsi < RSI_COOL || dist < -DIST_DRIFT) && !returning {
            StretchState::DriftingCold
        } else if returning && dist > DIST_EASING {
            StretchState::Easing
        } else {
            StretchState::Calm
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StretchState::Overheated | StretchState::Oversold => "Tension Rising",
            StretchState::DriftingHot | StretchState::DriftingCold => "Drifting",
            StretchState::Easing => "Tension Easing",
            StretchState::Calm => "Calm",
        }
    }

    pub fn status(&self) -> SignalStatus {
        match self {
            StretchState::Overheated | StretchState::Oversold => SignalStatus::Unsupportive,
            StretchState::Calm => SignalStatus::Supportive,
            _ => SignalStatus::Neutral,
        }
    }

    pub fn score(&self) -> f64 {
        match self {
            StretchState::Overheated => -0.6,
            StretchState::Oversold => -0.4,
            StretchState::DriftingHot | StretchState::DriftingCold => 0.1,
            StretchState::Easing => 0.3,
            StretchState::Calm => 0.5,
        }
    }

    fn interpretation(&self) -> &'static str {
        match self {
            StretchState::Overheated => "Price has run well ahead of its short-term average and buyers look stretched.",
            StretchState::Oversold => "Price has been pushed far below its short-term average and selling looks stretched.",
            StretchState::DriftingHot => "Price is heating up and moving further above its short-term balance point.",
            StretchState::DriftingCold => "Price is cooling and slipping further below its short-term balance point.",
            StretchState::Easing => "Price is still away from its short-term average but is heading back toward it.",
            StretchState::Calm => "Price is trading close to its short-term average without strain.",
        }
    }

    /// Branch-specific chart placement
    pub fn position(&self, readings: &StretchReadings) -> ChartPosition {
        let d = readings.distance_pct.abs();
        let heat = (readings.rsi - RSI_BALANCE).max(0.0);
        let chill = (RSI_BALANCE - readings.rsi).max(0.0);

        let (x, y) = match self {
            StretchState::Overheated => (70.0 + (d * 2.0).min(20.0), 70.0 + (heat / 2.0).min(20.0)),
            StretchState::Oversold => (30.0 - (d * 2.0).min(20.0), 30.0 - (chill / 2.0).min(20.0)),
            StretchState::DriftingHot => (55.0 + (d * 3.0).min(20.0), 55.0 + heat.min(20.0)),
            StretchState::DriftingCold => (45.0 - (d * 3.0).min(20.0), 45.0 - chill.min(20.0)),
            StretchState::Easing => (
                25.0 + (d * 3.0).min(20.0),
                55.0 + (readings.rsi - RSI_BALANCE).abs().min(20.0),
            ),
            StretchState::Calm => (
                50.0 + (readings.distance_pct * 2.0).clamp(-10.0, 10.0),
                50.0 + ((readings.rsi - RSI_BALANCE) / 2.0).clamp(-10.0, 10.0),
            ),
        };

        ChartPosition::clamped(x, y, 10.0, 90.0)
    }
}

/// Latest RSI / price readings the stretch classifier works from
#[derive(Debug, Clone, PartialEq)]
pub struct StretchReadings {
    pub rsi: f64,
    /// RSI at the start of the direction window
    pub prior_rsi: f64,
    /// `(price - ema20) / ema20 * 100`
    pub distance_pct: f64,
}

impl StretchReadings {
    pub fn new(rsi: f64, price: f64, ema20: f64, rsi_history: &[f64]) -> Self {
        let window = &rsi_history[rsi_history.len().saturating_sub(RSI_HISTORY)..];
        let prior_rsi = window.first().copied().unwrap_or(rsi);
        Self {
            rsi,
            prior_rsi,
            distance_pct: pct_change(ema20, price).unwrap_or(0.0),
        }
    }

    pub fn from_indicators(closes: &[f64], series: &IndicatorSeries) -> Option<Self> {
        Some(Self::new(
            last(&series.rsi14)?,
            last(closes)?,
            last(&series.ema20)?,
            &series.rsi14,
        ))
    }

    pub fn rsi_rising(&self) -> bool {
        self.rsi > self.prior_rsi
    }

    pub fn rsi_falling(&self) -> bool {
        self.rsi < self.prior_rsi
    }

    /// RSI above balance and falling, or below balance and rising
    pub fn returning_to_balance(&self) -> bool {
        (self.rsi > RSI_BALANCE && self.rsi_falling()) || (self.rsi < RSI_BALANCE && self.rsi_rising())
    }
}

/// Classify price stretch from precomputed readings
pub fn classify_stretch(readings: Option<StretchReadings>) -> Signal {
    let readings = match readings {
        Some(r) if r.rsi.is_finite() && r.prior_rsi.is_finite() => r,
        _ => return Signal::neutral_fallback("Not enough price history to read price stretch."),
    };

    let state = StretchState::classify(&readings);

    let direction = if readings.returning_to_balance() {
        "Returning to balance"
    } else {
        "Moving away"
    };
    let heat = if readings.rsi_rising() {
        "Heating"
    } else if readings.rsi_falling() {
        "Cooling"
    } else {
        "Steady"
    };

    let sub_signals = vec![
        SubSignal::new("RSI", format!("{:.1}", readings.rsi)),
        SubSignal::new("Distance from 20-day average", format_signed_pct(readings.distance_pct)),
        SubSignal::new("Direction", direction),
        SubSignal::new("Heat", heat),
    ];

    Signal {
        status: state.status(),
        color: state.status().tone(),
        label: state.label().to_string(),
        interpretation: state.interpretation().to_string(),
        score: state.score(),
        position: state.position(&readings),
        sub_signals,
    }
    .sanitized()
}

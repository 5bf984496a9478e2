//! Trend classification from moving-average stacking and swing structure.

use analysis_core::numeric::{max_of, min_of, pct_change};
use analysis_core::{ChartPosition, Signal, SignalStatus, SubSignal};

use crate::indicators::{last, IndicatorSeries};

/// Closes per swing window (recent / mid / older)
pub const SWING_WINDOW: usize = 20;
/// Closes inspected for swing structure
pub const SWING_LOOKBACK: usize = SWING_WINDOW * 3;
/// Improving swings: the mid-window extreme must hold within 2% below the older one
pub const HOLD_TOLERANCE: f64 = 0.98;
/// Weakening swings: the mid-window extreme must stay within 2% above the older one
pub const SLIP_TOLERANCE: f64 = 1.02;
/// Chart units per percent of swing change
pub const POSITION_SCALE: f64 = 5.0;
pub const POSITION_MIN: f64 = 10.0;
pub const POSITION_MAX: f64 = 90.0;

/// Extremes of the three trailing swing windows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingStructure {
    pub recent_high: f64,
    pub mid_high: f64,
    pub older_high: f64,
    pub recent_low: f64,
    pub mid_low: f64,
    pub older_low: f64,
}

impl SwingStructure {
    /// Splits the last `SWING_LOOKBACK` closes into three windows counted from
    /// the newest close. With short history the older windows shrink; an empty
    /// window borrows the extremes of the next newer one.
    pub fn from_closes(closes: &[f64]) -> Option<Self> {
        let tail = &closes[closes.len().saturating_sub(SWING_LOOKBACK)..];
        let n = tail.len();
        let recent = &tail[n.saturating_sub(SWING_WINDOW)..];
        let mid = &tail[n.saturating_sub(SWING_WINDOW * 2)..n.saturating_sub(SWING_WINDOW)];
        let older = &tail[..n.saturating_sub(SWING_WINDOW * 2)];

        let recent_high = max_of(recent)?;
        let recent_low = min_of(recent)?;
        let mid_high = max_of(mid).unwrap_or(recent_high);
        let mid_low = min_of(mid).unwrap_or(recent_low);
        let older_high = max_of(older).unwrap_or(mid_high);
        let older_low = min_of(older).unwrap_or(mid_low);

        Some(Self {
            recent_high,
            mid_high,
            older_high,
            recent_low,
            mid_low,
            older_low,
        })
    }

    pub fn highs_improving(&self) -> bool {
        self.recent_high > self.mid_high && self.mid_high > self.older_high * HOLD_TOLERANCE
    }

    pub fn highs_weakening(&self) -> bool {
        self.recent_high < self.mid_high && self.mid_high < self.older_high * SLIP_TOLERANCE
    }

    pub fn lows_improving(&self) -> bool {
        self.recent_low > self.mid_low && self.mid_low > self.older_low * HOLD_TOLERANCE
    }

    pub fn lows_weakening(&self) -> bool {
        self.recent_low < self.mid_low && self.mid_low < self.older_low * SLIP_TOLERANCE
    }

    /// Percent change of the recent high against the mid-window high
    pub fn highs_ratio(&self) -> f64 {
        pct_change(self.mid_high, self.recent_high).unwrap_or(0.0)
    }

    /// Percent change of the recent low against the mid-window low
    pub fn lows_ratio(&self) -> f64 {
        pct_change(self.mid_low, self.recent_low).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendState {
    Strengthening,
    Constructive,
    Mixed,
    Weakening,
    Declining,
}

impl TrendState {
    /// First match wins; a full bullish stack without a new swing high is
    /// only constructive.
    pub fn classify(bullish_count: usize, swings: &SwingStructure) -> Self {
        if bullish_count >= 4 && swings.recent_high > swings.mid_high {
            TrendState::Strengthening
        } else if bullish_count >= 3 {
            TrendState::Constructive
        } else if bullish_count >= 2 {
            TrendState::Mixed
        } else if bullish_count == 1 {
            TrendState::Weakening
        } else {
            TrendState::Declining
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrendState::Strengthening => "Strengthening",
            TrendState::Constructive => "Constructive",
            TrendState::Mixed => "Mixed",
            TrendState::Weakening => "Weakening",
            TrendState::Declining => "Declining",
        }
    }

    pub fn status(&self) -> SignalStatus {
        match self {
            TrendState::Strengthening | TrendState::Constructive => SignalStatus::Supportive,
            TrendState::Mixed | TrendState::Weakening => SignalStatus::Neutral,
            TrendState::Declining => SignalStatus::Unsupportive,
        }
    }

    pub fn score(&self) -> f64 {
        match self {
            TrendState::Strengthening => 0.8,
            TrendState::Constructive => 0.5,
            TrendState::Mixed => 0.0,
            TrendState::Weakening => -0.3,
            TrendState::Declining => -0.7,
        }
    }

    fn interpretation(&self) -> &'static str {
        match self {
            TrendState::Strengthening => {
                "Price rides above its key averages and keeps printing higher highs."
            }
            TrendState::Constructive => {
                "Price holds above most of its averages and the uptrend structure is intact."
            }
            TrendState::Mixed => "Price sits between its averages without a settled direction.",
            TrendState::Weakening => "Price has slipped below most of the averages that supported it.",
            TrendState::Declining => {
                "Price trades below every key average and the averages are stacked downward."
            }
        }
    }
}

/// Latest readings the trend classifier works from
#[derive(Debug, Clone, Copy)]
pub struct TrendInputs<'a> {
    pub price: f64,
    pub ema20: f64,
    pub ema50: f64,
    pub ema200: f64,
    pub closes: &'a [f64],
}

impl<'a> TrendInputs<'a> {
    pub fn from_series(closes: &'a [f64], series: &IndicatorSeries) -> Option<Self> {
        Some(Self {
            price: last(closes)?,
            ema20: last(&series.ema20)?,
            ema50: last(&series.ema50)?,
            ema200: last(&series.ema200)?,
            closes,
        })
    }

    /// Number of bullish conditions among the five average comparisons (0-5)
    pub fn bullish_count(&self) -> usize {
        [
            self.price > self.ema20,
            self.price > self.ema50,
            self.price > self.ema200,
            self.ema20 > self.ema50,
            self.ema50 > self.ema200,
        ]
        .iter()
        .filter(|&&b| b)
        .count()
    }
}

fn direction_label(improving: bool, weakening: bool) -> &'static str {
    if improving {
        "Improving"
    } else if weakening {
        "Weakening"
    } else {
        "Mixed"
    }
}

/// Classify the trend of a price series
pub fn classify_trend(inputs: &TrendInputs) -> Signal {
    let swings = match SwingStructure::from_closes(inputs.closes) {
        Some(s) if inputs.price.is_finite() => s,
        _ => return Signal::neutral_fallback("Not enough price history to read the trend."),
    };

    let bullish = inputs.bullish_count();
    let state = TrendState::classify(bullish, &swings);

    let position = ChartPosition::clamped(
        50.0 + swings.highs_ratio() * POSITION_SCALE,
        50.0 + swings.lows_ratio() * POSITION_SCALE,
        POSITION_MIN,
        POSITION_MAX,
    );

    let sub_signals = vec![
        SubSignal::new(
            "Highs",
            direction_label(swings.highs_improving(), swings.highs_weakening()),
        ),
        SubSignal::new(
            "Lows",
            direction_label(swings.lows_improving(), swings.lows_weakening()),
        ),
        SubSignal::new("Averages aligned", format!("{} of 5", bullish)),
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

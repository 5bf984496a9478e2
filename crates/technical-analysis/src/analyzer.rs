use analysis_core::numeric::finite_or_zero;
use analysis_core::{AnalysisError, ChartRange, PriceHistory, Signal, SignalStatus, Trajectory};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::charts::{momentum_series, stretch_series, trend_series, ChartSeries};
use crate::deep_dive::{deep_dive, SignalKind};
use crate::indicators::IndicatorSeries;
use crate::momentum::{classify_momentum, MomentumReadings};
use crate::stretch::{classify_stretch, StretchReadings};
use crate::trajectory::classify_trajectory;
use crate::trend::{classify_trend, TrendInputs};

/// Fewest daily closes the engine accepts
pub const MIN_PRICE_POINTS: usize = 50;

/// Signal plus everything the presentation layer draws next to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalAnalysis {
    pub signal: Signal,
    pub series: Vec<ChartSeries>,
    pub deep_dive: String,
}

impl SignalAnalysis {
    fn new(kind: SignalKind, signal: Signal, series: Vec<ChartSeries>) -> Self {
        let deep_dive = deep_dive(kind, signal.status).to_string();
        Self {
            signal,
            series,
            deep_dive,
        }
    }
}

/// Aggregate of the trend, momentum and stretch scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    pub score: f64,
    pub label: String,
    pub supportive_count: usize,
}

impl Alignment {
    pub fn from_signals(signals: &[&Signal]) -> Self {
        if signals.is_empty() {
            return Self {
                score: 0.0,
                label: "Mixed".to_string(),
                supportive_count: 0,
            };
        }

        let score = finite_or_zero(signals.iter().map(|s| s.score).sum::<f64>() / signals.len() as f64);
        let label = if score >= 0.4 {
            "Aligned"
        } else if score >= 0.1 {
            "Leaning Supportive"
        } else if score > -0.1 {
            "Mixed"
        } else {
            "Leaning Unsupportive"
        };

        Self {
            score,
            label: label.to_string(),
            supportive_count: signals
                .iter()
                .filter(|s| s.status == SignalStatus::Supportive)
                .count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalReport {
    pub symbol: String,
    /// Date of the last bar the report was computed from
    pub as_of: NaiveDate,
    pub price: f64,
    pub range: ChartRange,
    pub trend: SignalAnalysis,
    pub momentum: SignalAnalysis,
    pub stretch: SignalAnalysis,
    pub alignment: Alignment,
    pub trajectory: Trajectory,
}

pub struct TechnicalAnalysisEngine {
    min_points: usize,
}

impl Default for TechnicalAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TechnicalAnalysisEngine {
    pub fn new() -> Self {
        Self {
            min_points: MIN_PRICE_POINTS,
        }
    }

    /// Raises the minimum; values below `MIN_PRICE_POINTS` are ignored
    pub fn with_min_points(min_points: usize) -> Self {
        Self {
            min_points: min_points.max(MIN_PRICE_POINTS),
        }
    }

    pub fn min_points(&self) -> usize {
        self.min_points
    }

    pub fn analyze(
        &self,
        symbol: &str,
        history: &PriceHistory,
        range: ChartRange,
    ) -> Result<TechnicalReport, AnalysisError> {
        if history.len() < self.min_points {
            return Err(AnalysisError::too_few_points(symbol, history.len(), self.min_points));
        }
        let (as_of, price) = match history.last() {
            Some(p) => (p.date, p.close),
            None => {
                return Err(AnalysisError::InsufficientData(
                    "Price history is empty".to_string(),
                ))
            }
        };

        let closes = history.closes();
        let lows = history.lows();
        let dates = history.dates();
        let series = IndicatorSeries::compute(&closes);

        let trend = match TrendInputs::from_series(&closes, &series) {
            Some(inputs) => classify_trend(&inputs),
            None => Signal::neutral_fallback("Not enough price history to read the trend."),
        };
        let momentum = classify_momentum(MomentumReadings::from_indicators(&series));
        let stretch = classify_stretch(StretchReadings::from_indicators(&closes, &series));
        let trajectory = classify_trajectory(&closes, &lows);

        debug!(
            symbol,
            trend = %trend.label,
            trend_status = trend.status.to_label(),
            momentum = %momentum.label,
            momentum_status = momentum.status.to_label(),
            stretch = %stretch.label,
            stretch_status = stretch.status.to_label(),
            trajectory = trajectory.state.to_label(),
            "Classified technical signals"
        );

        let alignment = Alignment::from_signals(&[&trend, &momentum, &stretch]);

        let report = TechnicalReport {
            symbol: symbol.to_uppercase(),
            as_of,
            price,
            range,
            trend: SignalAnalysis::new(SignalKind::Trend, trend, trend_series(&dates, &series, range)),
            momentum: SignalAnalysis::new(
                SignalKind::Momentum,
                momentum,
                momentum_series(&dates, &series, range),
            ),
            stretch: SignalAnalysis::new(
                SignalKind::Stretch,
                stretch,
                stretch_series(&dates, &closes, &series, range),
            ),
            alignment,
            trajectory,
        };

        info!(
            symbol = %report.symbol,
            as_of = %report.as_of,
            alignment = %report.alignment.label,
            "Technical report ready"
        );

        Ok(report)
    }

    /// Analyze independent symbols in parallel; results keep the input order
    pub fn analyze_many(
        &self,
        inputs: &[(String, PriceHistory)],
        range: ChartRange,
    ) -> Vec<Result<TechnicalReport, AnalysisError>> {
        inputs
            .par_iter()
            .map(|(symbol, history)| self.analyze(symbol, history, range))
            .collect()
    }
}

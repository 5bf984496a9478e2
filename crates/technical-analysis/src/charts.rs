use analysis_core::numeric::{finite_or_zero, pct_change, positive_ratio};
use analysis_core::ChartRange;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorSeries;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Named line for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    /// Pairs the trailing `range` values with their dates
    fn windowed(name: &str, dates: &[NaiveDate], values: &[f64], range: ChartRange) -> Self {
        let n = dates.len().min(values.len());
        let start = n.saturating_sub(range.bars());
        let points = dates[start..n]
            .iter()
            .zip(&values[start..n])
            .map(|(&date, &value)| ChartPoint {
                date,
                value: finite_or_zero(value),
            })
            .collect();

        Self {
            name: name.to_string(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Rebase the trailing `range` values so the first one reads 100
fn rebased(values: &[f64], range: ChartRange) -> Vec<f64> {
    let start = values.len().saturating_sub(range.bars());
    let window = &values[start..];
    let base = window.first().copied().unwrap_or(0.0);
    let mut out = vec![0.0; start];
    out.extend(
        window
            .iter()
            .map(|&v| positive_ratio(v, base).map_or(100.0, |r| r * 100.0)),
    );
    out
}

/// Smoothed price (EMA20) and baseline (EMA200)
pub fn trend_series(dates: &[NaiveDate], series: &IndicatorSeries, range: ChartRange) -> Vec<ChartSeries> {
    vec![
        ChartSeries::windowed("Smoothed price", dates, &series.ema20, range),
        ChartSeries::windowed("Baseline", dates, &series.ema200, range),
    ]
}

/// Short and long EMAs, both rebased to 100 at the window start
pub fn momentum_series(dates: &[NaiveDate], series: &IndicatorSeries, range: ChartRange) -> Vec<ChartSeries> {
    vec![
        ChartSeries::windowed("Short-term", dates, &rebased(&series.ema12, range), range),
        ChartSeries::windowed("Long-term", dates, &rebased(&series.ema26, range), range),
    ]
}

/// Percent distance of each close from its EMA20
pub fn stretch_series(
    dates: &[NaiveDate],
    closes: &[f64],
    series: &IndicatorSeries,
    range: ChartRange,
) -> Vec<ChartSeries> {
    let distance: Vec<f64> = closes
        .iter()
        .zip(&series.ema20)
        .map(|(&close, &ema)| pct_change(ema, close).unwrap_or(0.0))
        .collect();

    vec![ChartSeries::windowed("Distance from 20-day average", dates, &distance, range)]
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::numeric::{clamp_position, finite_or_zero};

/// OHLCV bar as delivered by a price provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub adjusted_close: Option<f64>,
}

/// Single observation of the canonical price series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
    pub high: f64,
    pub low: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64, high: f64, low: f64) -> Self {
        // A missing intraday range collapses onto the close
        let high = if high.is_finite() && high > 0.0 { high } else { close };
        let low = if low.is_finite() && low > 0.0 { low } else { close };
        Self { date, close, high, low }
    }
}

impl From<&Bar> for PricePoint {
    fn from(bar: &Bar) -> Self {
        PricePoint::new(bar.date, bar.close, bar.high, bar.low)
    }
}

/// Price series stored oldest-first.
///
/// Construction sorts by date, keeps the first point for a duplicated date and
/// drops points whose close is not a positive finite number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    points: Vec<PricePoint>,
}

impl PriceHistory {
    pub fn from_points(mut points: Vec<PricePoint>) -> Self {
        points.retain(|p| p.close.is_finite() && p.close > 0.0);
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
        Self { points }
    }

    pub fn from_bars(bars: &[Bar]) -> Self {
        Self::from_points(bars.iter().map(PricePoint::from).collect())
    }

    /// Uses the adjusted close where the provider supplies one
    pub fn from_adjusted_bars(bars: &[Bar]) -> Self {
        Self::from_points(
            bars.iter()
                .map(|b| {
                    let close = b.adjusted_close.filter(|c| c.is_finite() && *c > 0.0).unwrap_or(b.close);
                    PricePoint::new(b.date, close, b.high, b.low)
                })
                .collect(),
        )
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.low).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    /// Date of the newest observation
    pub fn as_of(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// The newest `n` points, oldest-first
    pub fn tail(&self, n: usize) -> &[PricePoint] {
        &self.points[self.points.len().saturating_sub(n)..]
    }
}

/// One fiscal year of income-statement and balance-sheet figures.
///
/// Missing line items are carried as 0; ratios that divide by them report
/// themselves as not computable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialReport {
    pub fiscal_date_ending: NaiveDate,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub net_income: f64,
    #[serde(default)]
    pub operating_income: f64,
    #[serde(default)]
    pub total_assets: f64,
    #[serde(default)]
    pub current_assets: f64,
    #[serde(default)]
    pub current_liabilities: f64,
    #[serde(default)]
    pub total_debt: f64,
    #[serde(default)]
    pub cash: f64,
    #[serde(default)]
    pub shareholder_equity: f64,
    #[serde(default)]
    pub shares_outstanding: Option<f64>,
}

impl FinancialReport {
    pub fn empty(fiscal_date_ending: NaiveDate) -> Self {
        Self {
            fiscal_date_ending,
            revenue: 0.0,
            net_income: 0.0,
            operating_income: 0.0,
            total_assets: 0.0,
            current_assets: 0.0,
            current_liabilities: 0.0,
            total_debt: 0.0,
            cash: 0.0,
            shareholder_equity: 0.0,
            shares_outstanding: None,
        }
    }
}

/// Annual reports ordered most-recent-first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialHistory {
    reports: Vec<FinancialReport>,
}

impl FinancialHistory {
    pub fn from_reports(mut reports: Vec<FinancialReport>) -> Self {
        reports.sort_by(|a, b| b.fiscal_date_ending.cmp(&a.fiscal_date_ending));
        reports.dedup_by_key(|r| r.fiscal_date_ending);
        Self { reports }
    }

    pub fn reports(&self) -> &[FinancialReport] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn latest(&self) -> Option<&FinancialReport> {
        self.reports.first()
    }

    /// The period immediately before the latest one
    pub fn prior(&self) -> Option<&FinancialReport> {
        self.reports.get(1)
    }

    /// The oldest report within the newest `max_periods`, paired with how many
    /// periods back it sits. `None` unless at least two periods exist.
    pub fn earliest_within(&self, max_periods: usize) -> Option<(usize, &FinancialReport)> {
        let window = self.reports.len().min(max_periods);
        if window < 2 {
            return None;
        }
        let idx = window - 1;
        Some((idx, &self.reports[idx]))
    }
}

/// Company snapshot from the fundamentals provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyOverview {
    pub symbol: String,
    #[serde(default)]
    pub market_capitalization: f64,
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    #[serde(default)]
    pub shares_outstanding: f64,
    #[serde(default)]
    pub week_52_high: Option<f64>,
}

/// Traffic-light color used by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Green,
    Yellow,
    Red,
}

/// Verdict of a technical signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStatus {
    Supportive,
    Neutral,
    Unsupportive,
}

impl SignalStatus {
    pub fn tone(&self) -> Tone {
        match self {
            SignalStatus::Supportive => Tone::Green,
            SignalStatus::Neutral => Tone::Yellow,
            SignalStatus::Unsupportive => Tone::Red,
        }
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            SignalStatus::Supportive => "Supportive",
            SignalStatus::Neutral => "Neutral",
            SignalStatus::Unsupportive => "Unsupportive",
        }
    }
}

/// Placement on a 0-100 quadrant chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPosition {
    pub x: f64,
    pub y: f64,
}

impl ChartPosition {
    /// Clamps both axes into `[min, max]`; non-finite coordinates land on the midpoint
    pub fn clamped(x: f64, y: f64, min: f64, max: f64) -> Self {
        Self {
            x: clamp_position(x, min, max),
            y: clamp_position(y, min, max),
        }
    }

    pub fn center() -> Self {
        Self { x: 50.0, y: 50.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubSignal {
    pub label: String,
    pub value: String,
}

impl SubSignal {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Categorical verdict produced by the trend, momentum and stretch classifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub status: SignalStatus,
    /// Always `status.tone()`
    pub color: Tone,
    pub label: String,
    pub interpretation: String,
    /// Continuous value in [-1, 1]; only used for the alignment score
    pub score: f64,
    pub position: ChartPosition,
    pub sub_signals: Vec<SubSignal>,
}

impl Signal {
    /// Low-confidence neutral signal returned when inputs are degenerate
    pub fn neutral_fallback(reason: &str) -> Self {
        Self {
            status: SignalStatus::Neutral,
            color: SignalStatus::Neutral.tone(),
            label: "Insufficient Data".to_string(),
            interpretation: reason.to_string(),
            score: 0.0,
            position: ChartPosition::center(),
            sub_signals: Vec::new(),
        }
    }

    /// Normalizes every number so the signal can be serialized safely
    pub fn sanitized(mut self) -> Self {
        self.color = self.status.tone();
        self.score = finite_or_zero(self.score).clamp(-1.0, 1.0);
        self.position = ChartPosition::clamped(self.position.x, self.position.y, 0.0, 100.0);
        self
    }
}

/// Heuristic label for price behaviour around its long moving average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrajectoryState {
    Recovering,
    Drifting,
    Basing,
    Stable,
}

impl TrajectoryState {
    pub fn to_label(&self) -> &'static str {
        match self {
            TrajectoryState::Recovering => "Recovering",
            TrajectoryState::Drifting => "Drifting",
            TrajectoryState::Basing => "Basing",
            TrajectoryState::Stable => "Stable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub state: TrajectoryState,
    /// Percent distance of the latest close from the long moving average
    pub distance_pct: f64,
}

impl Trajectory {
    pub fn is_above_baseline(&self) -> bool {
        self.distance_pct >= 0.0
    }
}

/// Valuation quadrant strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    Sensible,
    Caution,
    Risky,
}

impl Strength {
    pub fn tone(&self) -> Tone {
        match self {
            Strength::Sensible => Tone::Green,
            Strength::Caution => Tone::Yellow,
            Strength::Risky => Tone::Red,
        }
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            Strength::Sensible => "Sensible",
            Strength::Caution => "Caution",
            Strength::Risky => "Risky",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuadrantId {
    PriceDiscipline,
    PriceTag,
    CapitalDiscipline,
    DoublingPotential,
}

impl QuadrantId {
    /// Fixed presentation order
    pub const ALL: [QuadrantId; 4] = [
        QuadrantId::PriceDiscipline,
        QuadrantId::PriceTag,
        QuadrantId::CapitalDiscipline,
        QuadrantId::DoublingPotential,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            QuadrantId::PriceDiscipline => "Price Discipline",
            QuadrantId::PriceTag => "Price Tag",
            QuadrantId::CapitalDiscipline => "Capital Discipline",
            QuadrantId::DoublingPotential => "Doubling Potential",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuadrantSignal {
    pub label: String,
    pub value: String,
    pub color: Tone,
    pub tooltip: String,
}

/// Two-tier explanation: a short imperative headline and a longer detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub headline: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationQuadrant {
    pub id: QuadrantId,
    pub title: String,
    pub verdict: String,
    pub signals: [QuadrantSignal; 2],
    pub insight: Insight,
    pub strength: Strength,
}

/// Number of trailing bars kept in chart-ready series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChartRange {
    #[serde(rename = "3m")]
    ThreeMonths,
    #[default]
    #[serde(rename = "6m")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
}

impl ChartRange {
    pub fn bars(&self) -> usize {
        match self {
            ChartRange::ThreeMonths => 63,
            ChartRange::SixMonths => 126,
            ChartRange::OneYear => 252,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartRange::ThreeMonths => "3m",
            ChartRange::SixMonths => "6m",
            ChartRange::OneYear => "1y",
        }
    }
}

impl fmt::Display for ChartRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartRange {
    type Err = crate::AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "3m" | "3mo" => Ok(ChartRange::ThreeMonths),
            "6m" | "6mo" => Ok(ChartRange::SixMonths),
            "1y" | "12m" => Ok(ChartRange::OneYear),
            other => Err(crate::AnalysisError::InvalidData(format!(
                "unknown chart range '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_price_history_sorts_newest_first_input() {
        let points = vec![
            PricePoint::new(day(3), 12.0, 12.5, 11.5),
            PricePoint::new(day(2), 11.0, 11.5, 10.5),
            PricePoint::new(day(1), 10.0, 10.5, 9.5),
        ];
        let history = PriceHistory::from_points(points);

        assert_eq!(history.closes(), vec![10.0, 11.0, 12.0]);
        assert_eq!(history.as_of(), Some(day(3)));
    }

    #[test]
    fn test_price_history_drops_bad_closes_and_duplicates() {
        let points = vec![
            PricePoint::new(day(1), 10.0, 10.0, 10.0),
            PricePoint::new(day(1), 99.0, 99.0, 99.0),
            PricePoint::new(day(2), f64::NAN, 1.0, 1.0),
            PricePoint::new(day(3), 0.0, 1.0, 1.0),
            PricePoint::new(day(4), 11.0, f64::NAN, -1.0),
        ];
        let history = PriceHistory::from_points(points);

        assert_eq!(history.len(), 2);
        assert_eq!(history.closes(), vec![10.0, 11.0]);
        // Missing range collapses onto the close
        assert_eq!(history.highs()[1], 11.0);
        assert_eq!(history.lows()[1], 11.0);
    }

    #[test]
    fn test_adjusted_bars_prefer_adjusted_close() {
        let bars = vec![Bar {
            date: day(5),
            open: 100.0,
            high: 105.0,
            low: 95.0,
            close: 100.0,
            volume: 0.0,
            adjusted_close: Some(50.0),
        }];
        let history = PriceHistory::from_adjusted_bars(&bars);
        assert_eq!(history.closes(), vec![50.0]);
    }

    #[test]
    fn test_financial_history_lookback() {
        let reports = (0..6)
            .map(|i| FinancialReport::empty(NaiveDate::from_ymd_opt(2018 + i, 12, 31).unwrap()))
            .collect();
        let history = FinancialHistory::from_reports(reports);

        assert_eq!(history.latest().unwrap().fiscal_date_ending.to_string(), "2023-12-31");
        let (years, earliest) = history.earliest_within(4).unwrap();
        assert_eq!(years, 3);
        assert_eq!(earliest.fiscal_date_ending.to_string(), "2020-12-31");
    }

    #[test]
    fn test_single_report_has_no_lookback() {
        let history = FinancialHistory::from_reports(vec![FinancialReport::empty(day(1))]);
        assert!(history.earliest_within(4).is_none());
        assert!(history.prior().is_none());
    }

    #[test]
    fn test_signal_sanitized_replaces_non_finite() {
        let signal = Signal {
            status: SignalStatus::Unsupportive,
            color: Tone::Green,
            label: "x".to_string(),
            interpretation: String::new(),
            score: f64::NAN,
            position: ChartPosition { x: f64::INFINITY, y: -5.0 },
            sub_signals: vec![],
        }
        .sanitized();

        assert_eq!(signal.score, 0.0);
        assert_eq!(signal.color, Tone::Red);
        assert_eq!(signal.status.to_label(), "Unsupportive");
        assert_eq!(signal.position.x, 50.0);
        assert_eq!(signal.position.y, 0.0);
    }

    #[test]
    fn test_chart_range_parse_and_serde() {
        assert_eq!("6M".parse::<ChartRange>().unwrap(), ChartRange::SixMonths);
        assert!("2w".parse::<ChartRange>().is_err());
        assert_eq!(serde_json::to_string(&ChartRange::OneYear).unwrap(), "\"1y\"");
        assert_eq!(
            serde_json::to_string(&QuadrantId::PriceDiscipline).unwrap(),
            "\"price-discipline\""
        );
    }
}

pub mod quadrants;
pub mod ratios;

use analysis_core::numeric::finite_or_zero;
use analysis_core::{
    AnalysisError, CompanyOverview, FinancialHistory, PriceHistory, Strength, Trajectory, ValuationQuadrant,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use technical_analysis::classify_trajectory;
use tracing::{debug, info};

pub use quadrants::*;
pub use ratios::*;

/// Default number of annual periods searched for the earnings CAGR start point
pub const DEFAULT_EARNINGS_LOOKBACK: usize = 4;
/// Earnings yield (%) counted as attractive in the overall verdict
pub const EARNINGS_YIELD_ATTRACTIVE: f64 = 8.0;

/// Raw inputs behind the quadrants; `None` marks a ratio that is not computable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationMetrics {
    pub price: f64,
    pub enterprise_value: Option<f64>,
    pub earnings_yield: Option<f64>,
    pub roic: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub share_change_pct: Option<f64>,
    pub share_trend: ShareTrend,
    pub week_52_high: Option<f64>,
    pub distance_from_high_pct: Option<f64>,
    pub earnings_growth: EarningsGrowth,
    pub price_cagr_pct: f64,
    pub trajectory: Trajectory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationReport {
    pub symbol: String,
    pub as_of: NaiveDate,
    /// Always four, in `QuadrantId::ALL` order
    pub quadrants: Vec<ValuationQuadrant>,
    pub overall_strength: Strength,
    pub summary: String,
    pub metrics: ValuationMetrics,
}

pub struct ValuationEngine {
    earnings_lookback: usize,
}

impl Default for ValuationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ValuationEngine {
    pub fn new() -> Self {
        Self {
            earnings_lookback: DEFAULT_EARNINGS_LOOKBACK,
        }
    }

    /// Lookback is kept within 2..=4 periods
    pub fn with_earnings_lookback(earnings_lookback: usize) -> Self {
        Self {
            earnings_lookback: earnings_lookback.clamp(2, DEFAULT_EARNINGS_LOOKBACK),
        }
    }

    pub fn earnings_lookback(&self) -> usize {
        self.earnings_lookback
    }

    fn compute_metrics(
        &self,
        overview: &CompanyOverview,
        financials: &FinancialHistory,
        daily: &PriceHistory,
        monthly: &PriceHistory,
        price: f64,
    ) -> Result<ValuationMetrics, AnalysisError> {
        let latest = financials.latest().ok_or_else(|| {
            AnalysisError::InsufficientData(format!("No annual reports for {}", overview.symbol))
        })?;

        let enterprise_value =
            calculate_enterprise_value(overview.market_capitalization, latest.total_debt, latest.cash);
        let earnings_yield = calculate_earnings_yield(latest.operating_income, enterprise_value);
        let roic = calculate_roic(
            latest.operating_income,
            latest.total_assets,
            latest.current_liabilities,
        );

        let shares = latest
            .shares_outstanding
            .or(Some(overview.shares_outstanding))
            .filter(|s| *s > 0.0);
        let eps = calculate_eps(latest.net_income, shares);
        let pe_ratio = calculate_pe_ratio(overview.pe_ratio, price, eps);

        let share_change_pct = calculate_share_change(
            latest.shares_outstanding,
            financials.prior().and_then(|p| p.shares_outstanding),
        );

        let week_52_high = fifty_two_week_high(overview.week_52_high, daily);
        let distance_from_high_pct = distance_from_high(price, week_52_high);

        let trajectory = classify_trajectory(&daily.closes(), &daily.lows());

        Ok(ValuationMetrics {
            price,
            enterprise_value,
            earnings_yield,
            roic,
            pe_ratio,
            share_change_pct,
            share_trend: ShareTrend::from_change(share_change_pct),
            week_52_high,
            distance_from_high_pct,
            earnings_growth: earnings_growth(financials, self.earnings_lookback),
            price_cagr_pct: finite_or_zero(calculate_price_cagr(monthly)),
            trajectory,
        })
    }

    pub fn analyze(
        &self,
        overview: &CompanyOverview,
        financials: &FinancialHistory,
        daily: &PriceHistory,
        monthly: &PriceHistory,
    ) -> Result<ValuationReport, AnalysisError> {
        let last = daily.last().ok_or_else(|| {
            AnalysisError::InsufficientData(format!("No daily prices for {}", overview.symbol))
        })?;

        let metrics = self.compute_metrics(overview, financials, daily, monthly, last.close)?;

        let quadrants = vec![
            price_discipline_quadrant(metrics.distance_from_high_pct, &metrics.trajectory),
            price_tag_quadrant(metrics.pe_ratio, &metrics.earnings_growth),
            capital_discipline_quadrant(metrics.roic, metrics.share_change_pct),
            doubling_potential_quadrant(metrics.price_cagr_pct),
        ];

        debug!(
            symbol = %overview.symbol,
            price_discipline = %quadrants[0].verdict,
            price_tag = %quadrants[1].verdict,
            capital_discipline = %quadrants[2].verdict,
            doubling_potential = %quadrants[3].verdict,
            "Built valuation quadrants"
        );

        let (overall_strength, summary) = overall_verdict(&metrics);

        info!(
            symbol = %overview.symbol,
            overall = overall_strength.to_label(),
            "Valuation report ready"
        );

        Ok(ValuationReport {
            symbol: overview.symbol.to_uppercase(),
            as_of: last.date,
            quadrants,
            overall_strength,
            summary,
            metrics,
        })
    }
}

/// Counts how many of {earnings yield > 8%, ROIC > 15%, non-dilutive} hold
pub fn overall_verdict(metrics: &ValuationMetrics) -> (Strength, String) {
    let checks = [
        (
            "earnings yield",
            metrics.earnings_yield.map_or(false, |y| y > EARNINGS_YIELD_ATTRACTIVE),
        ),
        (
            "return on capital",
            metrics.roic.map_or(false, |r| r > ROIC_STRONG),
        ),
        ("share count discipline", metrics.share_trend.is_non_dilutive()),
    ];

    let passed: Vec<&str> = checks.iter().filter(|(_, ok)| *ok).map(|(name, _)| *name).collect();
    let strength = match passed.len() {
        0 => Strength::Risky,
        1 => Strength::Caution,
        _ => Strength::Sensible,
    };

    let summary = if passed.is_empty() {
        format!("{}: none of the 3 value checks pass", strength.to_label())
    } else {
        format!(
            "{}: {} of 3 value checks pass ({})",
            strength.to_label(),
            passed.len(),
            passed.join(", ")
        )
    };

    (strength, summary)
}

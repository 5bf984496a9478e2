//! Fundamental ratio helpers.
//!
//! Every ratio that can divide by zero or by a negative base returns `None`
//! ("not computable") instead of a sentinel number.

use analysis_core::numeric::positive_ratio;
use analysis_core::{FinancialHistory, PriceHistory};
use serde::{Deserialize, Serialize};

/// Share-count change (%) inside which the count is treated as unchanged
pub const DILUTION_TOLERANCE_PCT: f64 = 1.0;
/// Daily bars in a trading year
pub const TRADING_YEAR_BARS: usize = 252;
/// Growth assigned to a loss-to-profit turnaround
pub const TURNAROUND_GROWTH_PCT: f64 = 25.0;
/// Shortest monthly window (years) a price CAGR is computed over
pub const MIN_CAGR_YEARS: f64 = 0.5;
const DAYS_PER_YEAR: f64 = 365.25;

fn finite(value: f64) -> Option<f64> {
    Some(value).filter(|v| v.is_finite())
}

/// Market cap + debt - cash; `None` unless positive
pub fn calculate_enterprise_value(market_cap: f64, total_debt: f64, cash: f64) -> Option<f64> {
    finite(market_cap + total_debt - cash).filter(|ev| *ev > 0.0)
}

/// Operating income over enterprise value, in percent
pub fn calculate_earnings_yield(operating_income: f64, enterprise_value: Option<f64>) -> Option<f64> {
    positive_ratio(operating_income, enterprise_value?).and_then(|r| finite(r * 100.0))
}

/// Operating income over invested capital (total assets - current liabilities), in percent
pub fn calculate_roic(operating_income: f64, total_assets: f64, current_liabilities: f64) -> Option<f64> {
    positive_ratio(operating_income, total_assets - current_liabilities).and_then(|r| finite(r * 100.0))
}

/// Reported P/E when positive, else price over EPS
pub fn calculate_pe_ratio(reported: Option<f64>, price: f64, eps: Option<f64>) -> Option<f64> {
    if let Some(pe) = reported.filter(|pe| pe.is_finite() && *pe > 0.0) {
        return Some(pe);
    }
    let eps = eps.filter(|e| *e > 0.0)?;
    positive_ratio(price, eps).filter(|pe| *pe > 0.0)
}

/// Net income per share
pub fn calculate_eps(net_income: f64, shares: Option<f64>) -> Option<f64> {
    positive_ratio(net_income, shares?)
}

/// Percent change in shares outstanding between two periods
pub fn calculate_share_change(latest: Option<f64>, prior: Option<f64>) -> Option<f64> {
    let prior = prior.filter(|p| *p > 0.0)?;
    let latest = latest.filter(|l| l.is_finite() && *l > 0.0)?;
    finite((latest - prior) / prior * 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareTrend {
    Buyback,
    Stable,
    Dilution,
    Unknown,
}

impl ShareTrend {
    pub fn from_change(change_pct: Option<f64>) -> Self {
        match change_pct {
            Some(c) if c < -DILUTION_TOLERANCE_PCT => ShareTrend::Buyback,
            Some(c) if c > DILUTION_TOLERANCE_PCT => ShareTrend::Dilution,
            Some(_) => ShareTrend::Stable,
            None => ShareTrend::Unknown,
        }
    }

    /// Unknown share history does not count as non-dilutive
    pub fn is_non_dilutive(&self) -> bool {
        matches!(self, ShareTrend::Buyback | ShareTrend::Stable)
    }
}

/// `(high - price) / high * 100`
pub fn distance_from_high(price: f64, high: Option<f64>) -> Option<f64> {
    let high = high.filter(|h| h.is_finite() && *h > 0.0)?;
    finite((high - price) / high * 100.0)
}

/// Reported 52-week high, else the highest high of the last trading year
pub fn fifty_two_week_high(reported: Option<f64>, daily: &PriceHistory) -> Option<f64> {
    if let Some(high) = reported.filter(|h| h.is_finite() && *h > 0.0) {
        return Some(high);
    }
    daily
        .tail(TRADING_YEAR_BARS)
        .iter()
        .map(|p| p.high)
        .fold(None, |acc: Option<f64>, h| Some(acc.map_or(h, |a| a.max(h))))
}

/// Multi-year earnings growth with an explicit computability flag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EarningsGrowth {
    /// Annualized growth in percent; 0 when not computable
    pub cagr_pct: f64,
    pub computable: bool,
    /// Set when the rate is the capped loss-to-profit value
    pub turnaround: bool,
    pub years: usize,
}

impl EarningsGrowth {
    pub fn not_computable(years: usize) -> Self {
        Self {
            cagr_pct: 0.0,
            computable: false,
            turnaround: false,
            years,
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.computable.then_some(self.cagr_pct)
    }
}

pub fn calculate_earnings_cagr(recent: f64, old: f64, years: usize) -> EarningsGrowth {
    if years == 0 || !recent.is_finite() || !old.is_finite() {
        return EarningsGrowth::not_computable(years);
    }

    if recent > 0.0 && old > 0.0 {
        let cagr = ((recent / old).powf(1.0 / years as f64) - 1.0) * 100.0;
        match finite(cagr) {
            Some(cagr_pct) => EarningsGrowth {
                cagr_pct,
                computable: true,
                turnaround: false,
                years,
            },
            None => EarningsGrowth::not_computable(years),
        }
    } else if recent > 0.0 {
        EarningsGrowth {
            cagr_pct: TURNAROUND_GROWTH_PCT,
            computable: true,
            turnaround: true,
            years,
        }
    } else {
        EarningsGrowth::not_computable(years)
    }
}

/// Net income CAGR from the earliest report within `lookback` periods to the latest
pub fn earnings_growth(history: &FinancialHistory, lookback: usize) -> EarningsGrowth {
    match (history.latest(), history.earliest_within(lookback)) {
        (Some(latest), Some((years, earliest))) => {
            calculate_earnings_cagr(latest.net_income, earliest.net_income, years)
        }
        _ => EarningsGrowth::not_computable(0),
    }
}

/// Annualized growth of monthly adjusted closes over the full window, in percent.
/// Windows shorter than `MIN_CAGR_YEARS` yield 0.
pub fn calculate_price_cagr(monthly: &PriceHistory) -> f64 {
    let (first, last) = match (monthly.first(), monthly.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return 0.0,
    };

    let years = (last.date - first.date).num_days() as f64 / DAYS_PER_YEAR;
    if years < MIN_CAGR_YEARS || first.close <= 0.0 {
        return 0.0;
    }

    finite(((last.close / first.close).powf(1.0 / years) - 1.0) * 100.0).unwrap_or(0.0)
}

/// Rule of 72; `None` when the price is not growing
pub fn years_to_double(cagr_pct: f64) -> Option<f64> {
    positive_ratio(72.0, cagr_pct)
}

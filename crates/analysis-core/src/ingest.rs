//! Conversion of raw provider payloads into the engine's data model.
//!
//! Filing providers report every amount as a string and use placeholders such
//! as `"None"` or `"-"` for missing values. Those are parsed leniently here so
//! the engines only ever see finite numbers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{AnalysisError, CompanyOverview, FinancialHistory, FinancialReport};

/// Parse a provider amount. Placeholders, blanks and non-finite values yield `None`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "none" | "null" | "-" | "n/a" | "na" | "nan" => return None,
        _ => {}
    }
    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn amount(raw: &Option<String>) -> Option<f64> {
    raw.as_deref().and_then(parse_amount)
}

fn amount_or_zero(raw: &Option<String>) -> f64 {
    amount(raw).unwrap_or(0.0)
}

fn parse_fiscal_date(raw: &str) -> Result<NaiveDate, AnalysisError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| AnalysisError::InvalidData(format!("bad fiscal date '{}': {}", raw, e)))
}

/// Annual income statement as delivered by the filing provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIncomeStatement {
    pub fiscal_date_ending: String,
    #[serde(default)]
    pub total_revenue: Option<String>,
    #[serde(default)]
    pub net_income: Option<String>,
    #[serde(default)]
    pub operating_income: Option<String>,
}

/// Annual balance sheet as delivered by the filing provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBalanceSheet {
    pub fiscal_date_ending: String,
    #[serde(default)]
    pub total_assets: Option<String>,
    #[serde(default)]
    pub total_current_assets: Option<String>,
    #[serde(default)]
    pub total_current_liabilities: Option<String>,
    #[serde(default)]
    pub short_long_term_debt_total: Option<String>,
    #[serde(default)]
    pub short_term_debt: Option<String>,
    #[serde(default)]
    pub long_term_debt: Option<String>,
    #[serde(default)]
    pub cash_and_cash_equivalents_at_carrying_value: Option<String>,
    #[serde(default)]
    pub total_shareholder_equity: Option<String>,
    #[serde(default)]
    pub common_stock_shares_outstanding: Option<String>,
}

impl RawBalanceSheet {
    /// Reported total debt, falling back to short + long term debt
    fn total_debt(&self) -> f64 {
        amount(&self.short_long_term_debt_total).unwrap_or_else(|| {
            amount_or_zero(&self.short_term_debt) + amount_or_zero(&self.long_term_debt)
        })
    }
}

/// Company overview as delivered by the filing provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawOverview {
    #[serde(rename = "Symbol", default)]
    pub symbol: Option<String>,
    #[serde(rename = "MarketCapitalization", default)]
    pub market_capitalization: Option<String>,
    #[serde(rename = "PERatio", default)]
    pub pe_ratio: Option<String>,
    #[serde(rename = "SharesOutstanding", default)]
    pub shares_outstanding: Option<String>,
    #[serde(rename = "52WeekHigh", default)]
    pub week_52_high: Option<String>,
}

impl RawOverview {
    pub fn into_overview(self, fallback_symbol: &str) -> CompanyOverview {
        CompanyOverview {
            symbol: self
                .symbol
                .clone()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| fallback_symbol.to_string())
                .to_uppercase(),
            market_capitalization: amount_or_zero(&self.market_capitalization),
            pe_ratio: amount(&self.pe_ratio),
            shares_outstanding: amount_or_zero(&self.shares_outstanding),
            week_52_high: amount(&self.week_52_high).filter(|h| *h > 0.0),
        }
    }
}

/// Join income statements and balance sheets on their fiscal date.
///
/// A period present in only one of the two inputs is kept with the other
/// side's line items left at zero. Unparseable fiscal dates are an error since
/// they indicate a malformed payload rather than a missing value.
pub fn merge_statements(
    income: &[RawIncomeStatement],
    balance: &[RawBalanceSheet],
) -> Result<FinancialHistory, AnalysisError> {
    let mut by_date: BTreeMap<NaiveDate, FinancialReport> = BTreeMap::new();

    for statement in income {
        let date = parse_fiscal_date(&statement.fiscal_date_ending)?;
        let report = by_date.entry(date).or_insert_with(|| FinancialReport::empty(date));
        report.revenue = amount_or_zero(&statement.total_revenue);
        report.net_income = amount_or_zero(&statement.net_income);
        report.operating_income = amount_or_zero(&statement.operating_income);
    }

    for sheet in balance {
        let date = parse_fiscal_date(&sheet.fiscal_date_ending)?;
        let report = by_date.entry(date).or_insert_with(|| FinancialReport::empty(date));
        report.total_assets = amount_or_zero(&sheet.total_assets);
        report.current_assets = amount_or_zero(&sheet.total_current_assets);
        report.current_liabilities = amount_or_zero(&sheet.total_current_liabilities);
        report.total_debt = sheet.total_debt();
        report.cash = amount_or_zero(&sheet.cash_and_cash_equivalents_at_carrying_value);
        report.shareholder_equity = amount_or_zero(&sheet.total_shareholder_equity);
        report.shares_outstanding = amount(&sheet.common_stock_shares_outstanding).filter(|s| *s > 0.0);
    }

    Ok(FinancialHistory::from_reports(by_date.into_values().collect()))
}

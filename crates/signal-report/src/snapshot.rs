//! Provider backed by JSON dumps on disk.
//!
//! Price files are arrays of bars. Statement files are either a bare array of
//! annual reports or the provider's `{"annualReports": [...]}` envelope.

use analysis_core::{
    merge_statements, AnalysisError, Bar, CompanyOverview, FinancialHistory, FinancialReport, FundamentalsProvider,
    PriceProvider, RawBalanceSheet, RawIncomeStatement, RawOverview,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone)]
pub struct SnapshotPaths {
    pub prices: PathBuf,
    pub monthly: Option<PathBuf>,
    pub income: Option<PathBuf>,
    pub balance: Option<PathBuf>,
    pub overview: Option<PathBuf>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnnualReports<T> {
    Envelope {
        #[serde(rename = "annualReports")]
        annual_reports: Vec<T>,
    },
    Bare(Vec<T>),
}

impl<T> AnnualReports<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            AnnualReports::Envelope { annual_reports } => annual_reports,
            AnnualReports::Bare(reports) => reports,
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn read_reports<T: DeserializeOwned>(path: &Option<PathBuf>) -> Result<Vec<T>> {
    match path {
        Some(p) => Ok(read_json::<AnnualReports<T>>(p)?.into_vec()),
        None => Ok(Vec::new()),
    }
}

/// One symbol's data, loaded up front
pub struct SnapshotProvider {
    symbol: String,
    daily: Vec<Bar>,
    monthly: Vec<Bar>,
    financials: Option<FinancialHistory>,
    overview: Option<CompanyOverview>,
}

impl SnapshotProvider {
    pub fn load(symbol: &str, paths: &SnapshotPaths) -> Result<Self> {
        let daily: Vec<Bar> = read_json(&paths.prices)?;
        let monthly: Vec<Bar> = match &paths.monthly {
            Some(p) => read_json(p)?,
            None => Vec::new(),
        };

        let income: Vec<RawIncomeStatement> = read_reports(&paths.income)?;
        let balance: Vec<RawBalanceSheet> = read_reports(&paths.balance)?;
        let financials = if income.is_empty() && balance.is_empty() {
            None
        } else {
            Some(merge_statements(&income, &balance).context("merging annual statements")?)
        };

        let overview = match &paths.overview {
            Some(p) => Some(read_json::<RawOverview>(p)?.into_overview(symbol)),
            None => None,
        };

        tracing::info!(
            symbol,
            daily_bars = daily.len(),
            monthly_bars = monthly.len(),
            annual_reports = financials.as_ref().map_or(0, |f| f.len()),
            "Loaded snapshot"
        );

        Ok(Self::from_parts(symbol, daily, monthly, financials, overview))
    }

    pub fn from_parts(
        symbol: &str,
        daily: Vec<Bar>,
        monthly: Vec<Bar>,
        financials: Option<FinancialHistory>,
        overview: Option<CompanyOverview>,
    ) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            daily,
            monthly,
            financials,
            overview,
        }
    }

    fn check_symbol(&self, symbol: &str) -> Result<(), AnalysisError> {
        if symbol.trim().eq_ignore_ascii_case(&self.symbol) {
            Ok(())
        } else {
            Err(AnalysisError::ProviderError(format!(
                "snapshot holds {}, not {}",
                self.symbol, symbol
            )))
        }
    }
}

#[async_trait]
impl PriceProvider for SnapshotProvider {
    async fn daily_bars(&self, symbol: &str) -> Result<Vec<Bar>, AnalysisError> {
        self.check_symbol(symbol)?;
        Ok(self.daily.clone())
    }

    async fn monthly_adjusted_bars(&self, symbol: &str) -> Result<Vec<Bar>, AnalysisError> {
        self.check_symbol(symbol)?;
        if self.monthly.is_empty() {
            return Err(AnalysisError::ProviderError(format!("no monthly prices for {}", symbol)));
        }
        Ok(self.monthly.clone())
    }
}

#[async_trait]
impl FundamentalsProvider for SnapshotProvider {
    async fn annual_reports(&self, symbol: &str) -> Result<Vec<FinancialReport>, AnalysisError> {
        self.check_symbol(symbol)?;
        self.financials
            .as_ref()
            .map(|f| f.reports().to_vec())
            .ok_or_else(|| AnalysisError::ProviderError(format!("no annual statements for {}", symbol)))
    }

    async fn overview(&self, symbol: &str) -> Result<CompanyOverview, AnalysisError> {
        self.check_symbol(symbol)?;
        self.overview
            .clone()
            .ok_or_else(|| AnalysisError::ProviderError(format!("no overview for {}", symbol)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_envelope_and_bare_array() {
        let envelope = r#"{"annualReports": [{"fiscalDateEnding": "2023-12-31", "netIncome": "120"}]}"#;
        let bare = r#"[{"fiscalDateEnding": "2023-12-31", "netIncome": "None"}]"#;

        let a: Vec<RawIncomeStatement> = serde_json::from_str::<AnnualReports<_>>(envelope).unwrap().into_vec();
        let b: Vec<RawIncomeStatement> = serde_json::from_str::<AnnualReports<_>>(bare).unwrap().into_vec();

        assert_eq!(a.len(), 1);
        assert_eq!(a[0].net_income.as_deref(), Some("120"));
        assert_eq!(b[0].net_income.as_deref(), Some("None"));
    }

    #[tokio::test]
    async fn test_serves_only_its_symbol() {
        let provider = SnapshotProvider::from_parts("aapl", Vec::new(), Vec::new(), None, None);

        assert!(provider.daily_bars("AAPL").await.is_ok());
        assert!(matches!(
            provider.daily_bars("MSFT").await,
            Err(AnalysisError::ProviderError(_))
        ));
        assert!(provider.annual_reports("AAPL").await.is_err());
        assert!(provider.monthly_adjusted_bars("AAPL").await.is_err());
    }

    #[test]
    fn test_missing_file_has_context() {
        let paths = SnapshotPaths {
            prices: PathBuf::from("/nonexistent/prices.json"),
            ..SnapshotPaths::default()
        };
        let err = SnapshotProvider::load("AAPL", &paths).err().unwrap();
        assert!(err.to_string().contains("/nonexistent/prices.json"));
    }
}

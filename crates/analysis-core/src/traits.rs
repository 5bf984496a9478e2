use async_trait::async_trait;
use crate::{AnalysisError, Bar, CompanyOverview, FinancialReport};

/// Source of daily and monthly price bars.
///
/// Implementations may return bars in any order (providers usually hand them
/// out newest-first); the engine normalizes them through `PriceHistory`.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn daily_bars(&self, symbol: &str) -> Result<Vec<Bar>, AnalysisError>;

    /// Monthly bars with split/dividend adjusted closes, used for price CAGR
    async fn monthly_adjusted_bars(&self, symbol: &str) -> Result<Vec<Bar>, AnalysisError>;
}

/// Source of annual filings and the company overview
#[async_trait]
pub trait FundamentalsProvider: Send + Sync {
    async fn annual_reports(&self, symbol: &str) -> Result<Vec<FinancialReport>, AnalysisError>;

    async fn overview(&self, symbol: &str) -> Result<CompanyOverview, AnalysisError>;
}

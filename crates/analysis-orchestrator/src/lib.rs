use analysis_core::{
    AnalysisError, Bar, ChartRange, CompanyOverview, FinancialHistory, FinancialReport, FundamentalsProvider,
    PriceHistory, PriceProvider,
};
use chrono::NaiveDate;
use fundamental_analysis::{ValuationEngine, ValuationReport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use technical_analysis::{TechnicalAnalysisEngine, TechnicalReport};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

pub mod cache;
pub mod config;

pub use cache::{CacheKey, Clock, DataKind, ManualClock, ResultCache, SystemClock};
pub use config::EngineConfig;

/// Everything the presentation layer needs for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReport {
    pub symbol: String,
    pub as_of: NaiveDate,
    pub technical: TechnicalReport,
    /// `None` when fundamentals were unavailable
    pub valuation: Option<ValuationReport>,
}

pub struct SignalOrchestrator {
    prices: Arc<dyn PriceProvider>,
    fundamentals: Arc<dyn FundamentalsProvider>,
    technical_engine: TechnicalAnalysisEngine,
    valuation_engine: ValuationEngine,
    config: EngineConfig,
    daily_cache: ResultCache<Vec<Bar>>,
    monthly_cache: ResultCache<Vec<Bar>>,
    reports_cache: ResultCache<Vec<FinancialReport>>,
    overview_cache: ResultCache<CompanyOverview>,
    report_cache: ResultCache<SignalReport>,
}

impl SignalOrchestrator {
    pub fn new(
        prices: Arc<dyn PriceProvider>,
        fundamentals: Arc<dyn FundamentalsProvider>,
        config: EngineConfig,
    ) -> Result<Self, AnalysisError> {
        Self::with_clock(prices, fundamentals, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        prices: Arc<dyn PriceProvider>,
        fundamentals: Arc<dyn FundamentalsProvider>,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AnalysisError> {
        config
            .validate()
            .map_err(|e| AnalysisError::InvalidData(e.to_string()))?;
        let ttl = config.cache_ttl();

        Ok(Self {
            prices,
            fundamentals,
            technical_engine: TechnicalAnalysisEngine::with_min_points(config.min_price_points),
            valuation_engine: ValuationEngine::with_earnings_lookback(config.earnings_lookback),
            daily_cache: ResultCache::with_clock(ttl, clock.clone())?,
            monthly_cache: ResultCache::with_clock(ttl, clock.clone())?,
            reports_cache: ResultCache::with_clock(ttl, clock.clone())?,
            overview_cache: ResultCache::with_clock(ttl, clock.clone())?,
            report_cache: ResultCache::with_clock(ttl, clock)?,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Daily prices (cached)
    pub async fn daily_history(&self, symbol: &str) -> Result<PriceHistory, AnalysisError> {
        let key = CacheKey::new(symbol, DataKind::DailyBars);
        let bars = self
            .daily_cache
            .get_or_try_compute(key, || self.prices.daily_bars(symbol))
            .await?;
        Ok(PriceHistory::from_bars(&bars))
    }

    /// Monthly adjusted prices (cached)
    pub async fn monthly_history(&self, symbol: &str) -> Result<PriceHistory, AnalysisError> {
        let key = CacheKey::new(symbol, DataKind::MonthlyBars);
        let bars = self
            .monthly_cache
            .get_or_try_compute(key, || self.prices.monthly_adjusted_bars(symbol))
            .await?;
        Ok(PriceHistory::from_adjusted_bars(&bars))
    }

    /// Annual reports, most recent first (cached)
    pub async fn financial_history(&self, symbol: &str) -> Result<FinancialHistory, AnalysisError> {
        let key = CacheKey::new(symbol, DataKind::AnnualReports);
        let reports = self
            .reports_cache
            .get_or_try_compute(key, || self.fundamentals.annual_reports(symbol))
            .await?;
        Ok(FinancialHistory::from_reports(reports))
    }

    /// Company overview (cached)
    pub async fn overview(&self, symbol: &str) -> Result<CompanyOverview, AnalysisError> {
        let key = CacheKey::new(symbol, DataKind::Overview);
        self.overview_cache
            .get_or_try_compute(key, || self.fundamentals.overview(symbol))
            .await
    }

    fn ensure_enough_points(&self, symbol: &str, history: &PriceHistory) -> Result<(), AnalysisError> {
        if history.len() < self.config.min_price_points {
            return Err(AnalysisError::too_few_points(
                symbol,
                history.len(),
                self.config.min_price_points,
            ));
        }
        Ok(())
    }

    pub async fn analyze_technical(&self, symbol: &str, range: ChartRange) -> Result<TechnicalReport, AnalysisError> {
        let daily = self.daily_history(symbol).await?;
        self.ensure_enough_points(symbol, &daily)?;
        self.technical_engine.analyze(symbol, &daily, range)
    }

    pub async fn analyze_valuation(&self, symbol: &str) -> Result<ValuationReport, AnalysisError> {
        let overview = self.overview(symbol).await?;
        let financials = self.financial_history(symbol).await?;
        let daily = self.daily_history(symbol).await?;
        let monthly = match self.monthly_history(symbol).await {
            Ok(history) => history,
            Err(e) => {
                warn!(symbol, error = %e, "Monthly prices unavailable, price CAGR falls back to 0");
                PriceHistory::default()
            }
        };

        self.valuation_engine.analyze(&overview, &financials, &daily, &monthly)
    }

    /// Full report over the configured chart range
    pub async fn analyze(&self, symbol: &str) -> Result<SignalReport, AnalysisError> {
        self.analyze_with_range(symbol, self.config.chart_range).await
    }

    pub async fn analyze_with_range(&self, symbol: &str, range: ChartRange) -> Result<SignalReport, AnalysisError> {
        let key = CacheKey::new(symbol, DataKind::SignalReport).with_param(range.as_str());
        self.report_cache
            .get_or_try_compute(key, || self.build_report(symbol, range))
            .await
    }

    async fn build_report(&self, symbol: &str, range: ChartRange) -> Result<SignalReport, AnalysisError> {
        let technical = self.analyze_technical(symbol, range).await?;

        let valuation = match self.analyze_valuation(symbol).await {
            Ok(report) => Some(report),
            Err(e) if e.is_data_problem() => {
                warn!(symbol, error = %e, "Valuation unavailable, returning technical signals only");
                None
            }
            Err(e) => {
                error!(symbol, error = %e, "Valuation failed, returning technical signals only");
                None
            }
        };

        info!(
            symbol = %technical.symbol,
            as_of = %technical.as_of,
            has_valuation = valuation.is_some(),
            "Signal report built"
        );

        Ok(SignalReport {
            symbol: technical.symbol.clone(),
            as_of: technical.as_of,
            technical,
            valuation,
        })
    }

    /// Analyze several symbols concurrently; results keep the input order
    pub async fn analyze_batch(
        self: &Arc<Self>,
        symbols: Vec<String>,
    ) -> Vec<(String, Result<SignalReport, AnalysisError>)> {
        let mut tasks = JoinSet::new();

        for (idx, symbol) in symbols.iter().cloned().enumerate() {
            let orchestrator = Arc::clone(self);
            tasks.spawn(async move {
                let result = orchestrator.analyze(&symbol).await;
                (idx, result)
            });
        }

        let mut slots: Vec<Option<Result<SignalReport, AnalysisError>>> = symbols.iter().map(|_| None).collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, result)) => {
                    if let Err(e) = &result {
                        warn!("Failed to analyze {}: {}", symbols[idx], e);
                    }
                    slots[idx] = Some(result);
                }
                Err(e) => {
                    error!("Task error: {}", e);
                }
            }
        }

        symbols
            .into_iter()
            .zip(slots)
            .map(|(symbol, slot)| {
                let result = slot.unwrap_or_else(|| {
                    Err(AnalysisError::CalculationError(format!(
                        "analysis task for {} did not complete",
                        symbol
                    )))
                });
                (symbol, result)
            })
            .collect()
    }

    /// Drops every cached entry for `symbol`
    pub fn invalidate(&self, symbol: &str) -> usize {
        self.daily_cache.invalidate_entity(symbol)
            + self.monthly_cache.invalidate_entity(symbol)
            + self.reports_cache.invalidate_entity(symbol)
            + self.overview_cache.invalidate_entity(symbol)
            + self.report_cache.invalidate_entity(symbol)
    }

    /// Removes expired entries from every cache
    pub fn purge_expired(&self) -> usize {
        self.daily_cache.purge_expired()
            + self.monthly_cache.purge_expired()
            + self.reports_cache.purge_expired()
            + self.overview_cache.purge_expired()
            + self.report_cache.purge_expired()
    }
}

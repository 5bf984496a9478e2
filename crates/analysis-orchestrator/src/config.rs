use analysis_core::ChartRange;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use technical_analysis::MIN_PRICE_POINTS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub cache_ttl_secs: i64,          // 3600 (1 hour)
    pub min_price_points: usize,      // 50, never lower
    pub chart_range: ChartRange,      // 6m
    pub earnings_lookback: usize,     // 4 annual periods
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 3600,
            min_price_points: MIN_PRICE_POINTS,
            chart_range: ChartRange::SixMonths,
            earnings_lookback: 4,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            cache_ttl_secs: env::var("SIGNAL_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .context("SIGNAL_CACHE_TTL_SECS must be an integer")?,
            min_price_points: env::var("SIGNAL_MIN_PRICE_POINTS")
                .unwrap_or_else(|_| MIN_PRICE_POINTS.to_string())
                .parse()
                .context("SIGNAL_MIN_PRICE_POINTS must be a positive integer")?,
            chart_range: env::var("SIGNAL_CHART_RANGE")
                .unwrap_or_else(|_| "6m".to_string())
                .parse()
                .context("SIGNAL_CHART_RANGE must be one of 3m, 6m, 1y")?,
            earnings_lookback: env::var("SIGNAL_EARNINGS_LOOKBACK")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .context("SIGNAL_EARNINGS_LOOKBACK must be a positive integer")?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_ttl_secs <= 0 {
            bail!("cache TTL must be positive, got {}", self.cache_ttl_secs);
        }
        if self.min_price_points < MIN_PRICE_POINTS {
            bail!(
                "min_price_points must be at least {}, got {}",
                MIN_PRICE_POINTS,
                self.min_price_points
            );
        }
        if !(2..=4).contains(&self.earnings_lookback) {
            bail!(
                "earnings_lookback must be between 2 and 4, got {}",
                self.earnings_lookback
            );
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-wide
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: [&str; 4] = [
        "SIGNAL_CACHE_TTL_SECS",
        "SIGNAL_MIN_PRICE_POINTS",
        "SIGNAL_CHART_RANGE",
        "SIGNAL_EARNINGS_LOOKBACK",
    ];

    fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for name in VARS {
            env::remove_var(name);
        }
        for (name, value) in vars {
            env::set_var(name, value);
        }
        let out = f();
        for name in VARS {
            env::remove_var(name);
        }
        out
    }

    #[test]
    fn test_defaults() {
        let config = with_env(&[], EngineConfig::from_env).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.cache_ttl(), chrono::Duration::hours(1));
    }

    #[test]
    fn test_overrides() {
        let config = with_env(
            &[
                ("SIGNAL_CACHE_TTL_SECS", "120"),
                ("SIGNAL_MIN_PRICE_POINTS", "200"),
                ("SIGNAL_CHART_RANGE", "1y"),
                ("SIGNAL_EARNINGS_LOOKBACK", "3"),
            ],
            EngineConfig::from_env,
        )
        .unwrap();

        assert_eq!(config.cache_ttl_secs, 120);
        assert_eq!(config.min_price_points, 200);
        assert_eq!(config.chart_range, ChartRange::OneYear);
        assert_eq!(config.earnings_lookback, 3);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(with_env(&[("SIGNAL_MIN_PRICE_POINTS", "20")], EngineConfig::from_env).is_err());
        assert!(with_env(&[("SIGNAL_EARNINGS_LOOKBACK", "6")], EngineConfig::from_env).is_err());
        assert!(with_env(&[("SIGNAL_CACHE_TTL_SECS", "0")], EngineConfig::from_env).is_err());
        assert!(with_env(&[("SIGNAL_CHART_RANGE", "2w")], EngineConfig::from_env).is_err());
        assert!(with_env(&[("SIGNAL_CACHE_TTL_SECS", "soon")], EngineConfig::from_env).is_err());
    }
}

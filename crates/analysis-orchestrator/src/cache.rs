use analysis_core::AnalysisError;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Time source for cache freshness checks
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }

    pub fn set(&self, to: DateTime<Utc>) {
        self.millis.store(to.timestamp_millis(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    DailyBars,
    MonthlyBars,
    AnnualReports,
    Overview,
    SignalReport,
}

impl DataKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::DailyBars => "daily_bars",
            DataKind::MonthlyBars => "monthly_bars",
            DataKind::AnnualReports => "annual_reports",
            DataKind::Overview => "overview",
            DataKind::SignalReport => "signal_report",
        }
    }
}

/// (entity, data kind, optional parameter); the entity is upper-cased
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub entity: String,
    pub kind: DataKind,
    pub param: Option<String>,
}

impl CacheKey {
    pub fn new(entity: &str, kind: DataKind) -> Self {
        Self {
            entity: entity.trim().to_uppercase(),
            kind,
            param: None,
        }
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = Some(param.into());
        self
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.param {
            Some(p) => write!(f, "{}:{}:{}", self.entity, self.kind.as_str(), p),
            None => write!(f, "{}:{}", self.entity, self.kind.as_str()),
        }
    }
}

/// Internal cache entry with timestamp
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

/// TTL cache shared across requests.
///
/// An entry is fresh while `now - cached_at < ttl`. Concurrent misses on the
/// same key may both compute and both write; the last write wins.
pub struct ResultCache<V> {
    entries: DashMap<CacheKey, CacheEntry<V>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> ResultCache<V> {
    pub fn new(ttl: Duration) -> Result<Self, AnalysisError> {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Result<Self, AnalysisError> {
        if ttl <= Duration::zero() {
            return Err(AnalysisError::CacheError(format!(
                "cache TTL must be positive, got {}s",
                ttl.num_seconds()
            )));
        }
        Ok(Self {
            entries: DashMap::new(),
            ttl,
            clock,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, entry: &CacheEntry<V>, now: DateTime<Utc>) -> bool {
        now - entry.cached_at < self.ttl
    }

    /// Fresh value for `key`, if any
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let now = self.clock.now();
        let entry = self.entries.get(key)?;
        if self.is_fresh(&entry, now) {
            Some(entry.data.clone())
        } else {
            None
        }
    }

    pub fn insert(&self, key: CacheKey, data: V) {
        self.entries.insert(
            key,
            CacheEntry {
                data,
                cached_at: self.clock.now(),
            },
        );
    }

    /// Returns the cached value or runs `compute` and stores its result.
    /// Errors are not cached.
    pub async fn get_or_try_compute<F, Fut, E>(&self, key: CacheKey, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(hit) = self.get(&key) {
            debug!(key = %key, "Cache hit");
            return Ok(hit);
        }

        debug!(key = %key, "Cache miss");
        let value = compute().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drops every entry for `entity`, whatever its kind or parameter
    pub fn invalidate_entity(&self, entity: &str) -> usize {
        let entity = entity.trim().to_uppercase();
        let before = self.entries.len();
        self.entries.retain(|k, _| k.entity != entity);
        before - self.entries.len()
    }

    /// Removes stale entries and returns how many were dropped
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, e| now - e.cached_at < ttl);
        before - self.entries.len()
    }

    /// Entry count, stale entries included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn cache(clock: &Arc<ManualClock>) -> ResultCache<u32> {
        ResultCache::with_clock(Duration::hours(1), clock.clone()).unwrap()
    }

    #[test]
    fn test_key_normalizes_entity() {
        let a = CacheKey::new(" aapl", DataKind::SignalReport).with_param("6m");
        let b = CacheKey::new("AAPL", DataKind::SignalReport).with_param("6m");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "AAPL:signal_report:6m");
        assert_ne!(a, CacheKey::new("AAPL", DataKind::SignalReport));
    }

    #[test]
    fn test_rejects_non_positive_ttl() {
        assert!(matches!(
            ResultCache::<u32>::new(Duration::zero()),
            Err(AnalysisError::CacheError(_))
        ));
    }

    #[test]
    fn test_entry_expires_at_ttl() {
        let clock = Arc::new(ManualClock::new(start()));
        let cache = cache(&clock);
        let key = CacheKey::new("MSFT", DataKind::Overview);

        cache.insert(key.clone(), 7);
        clock.advance(Duration::minutes(59));
        assert_eq!(cache.get(&key), Some(7));

        // now - cached_at == ttl is stale
        clock.advance(Duration::minutes(1));
        assert_eq!(cache.get(&key), None);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_get_or_compute_within_and_after_ttl() {
        let clock = Arc::new(ManualClock::new(start()));
        let cache = cache(&clock);
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let key = CacheKey::new("nvda", DataKind::SignalReport);

        let compute = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, AnalysisError>(42)
        };

        assert_eq!(cache.get_or_try_compute(key.clone(), compute).await.unwrap(), 42);
        clock.advance(Duration::minutes(30));
        assert_eq!(cache.get_or_try_compute(key.clone(), compute).await.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::minutes(31));
        assert_eq!(cache.get_or_try_compute(key, compute).await.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let clock = Arc::new(ManualClock::new(start()));
        let cache = cache(&clock);
        let key = CacheKey::new("TSLA", DataKind::DailyBars);

        let failed = cache
            .get_or_try_compute(key.clone(), || async {
                Err::<u32, _>(AnalysisError::ProviderError("timeout".to_string()))
            })
            .await;
        assert!(failed.is_err());
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn test_invalidate_entity() {
        let clock = Arc::new(ManualClock::new(start()));
        let cache = cache(&clock);
        cache.insert(CacheKey::new("AAPL", DataKind::DailyBars), 1);
        cache.insert(CacheKey::new("AAPL", DataKind::SignalReport).with_param("1y"), 2);
        cache.insert(CacheKey::new("MSFT", DataKind::DailyBars), 3);

        assert_eq!(cache.invalidate_entity("aapl"), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.invalidate(&CacheKey::new("MSFT", DataKind::DailyBars)));
        assert!(!cache.invalidate(&CacheKey::new("MSFT", DataKind::DailyBars)));
    }

    #[test]
    fn test_manual_clock_set() {
        let clock = ManualClock::new(start());
        clock.set(start() + Duration::days(2));
        assert_eq!(clock.now(), start() + Duration::days(2));
    }
}

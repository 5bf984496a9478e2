use serde::{Deserialize, Serialize};

pub const RSI_PERIOD: usize = 14;
/// Value written into the RSI warm-up slots; not a real reading
pub const RSI_NEUTRAL: f64 = 50.0;
/// RS used when the average loss is zero
const RSI_SATURATED_RS: f64 = 100.0;

pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

/// Simple Moving Average
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - period + 1);
    for i in period - 1..data.len() {
        let sum: f64 = data[i + 1 - period..=i].iter().sum();
        result.push(sum / period as f64);
    }
    result
}

/// Average of the newest `min(period, len)` values; 0 for empty input
pub fn sma_last(data: &[f64], period: usize) -> f64 {
    let window = period.min(data.len());
    if window == 0 {
        return 0.0;
    }
    data[data.len() - window..].iter().sum::<f64>() / window as f64
}

/// Exponential Moving Average, same length as `data`.
///
/// The first value is the simple average of the first `min(period, len)`
/// inputs; later values blend each price with the previous EMA using
/// `k = 2 / (period + 1)`.
pub fn ema(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.is_empty() {
        return vec![];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed_len = period.min(data.len());
    let seed = data[..seed_len].iter().sum::<f64>() / seed_len as f64;

    let mut result = Vec::with_capacity(data.len());
    result.push(seed);

    for i in 1..data.len() {
        let ema_val = data[i] * k + result[i - 1] * (1.0 - k);
        result.push(ema_val);
    }

    result
}

/// Relative Strength Index with Wilder smoothing, same length as `data`.
///
/// The first `period + 1` values are the neutral placeholder `RSI_NEUTRAL`;
/// callers must not treat them as readings. Fewer than 2 points yields an
/// empty series.
pub fn rsi(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < 2 {
        return vec![];
    }

    let warm_up = (period + 1).min(data.len());
    let mut rsi_values = vec![RSI_NEUTRAL; warm_up];
    if data.len() <= period + 1 {
        return rsi_values;
    }

    let mut gains = Vec::with_capacity(data.len() - 1);
    let mut losses = Vec::with_capacity(data.len() - 1);

    for i in 1..data.len() {
        let change = data[i] - data[i - 1];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(change.abs());
        }
    }

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;

    // gains[i] is the move into data[i + 1]
    for i in period..gains.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;

        let rs = if avg_loss == 0.0 {
            RSI_SATURATED_RS
        } else {
            avg_gain / avg_loss
        };

        let rsi = 100.0 - (100.0 / (1.0 + rs));
        rsi_values.push(rsi);
    }

    rsi_values
}

/// MACD (Moving Average Convergence Divergence)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacdResult {
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// All three MACD series share the input's length and indexing.
pub fn macd(data: &[f64], fast_period: usize, slow_period: usize, signal_period: usize) -> MacdResult {
    if fast_period == 0 || slow_period == 0 || signal_period == 0 || data.is_empty() {
        return MacdResult::default();
    }

    let ema_fast = ema(data, fast_period);
    let ema_slow = ema(data, slow_period);
    macd_from_emas(&ema_fast, &ema_slow, signal_period)
}

fn macd_from_emas(ema_fast: &[f64], ema_slow: &[f64], signal_period: usize) -> MacdResult {
    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(ema_slow)
        .map(|(fast, slow)| fast - slow)
        .collect();
    let signal_line = ema(&macd_line, signal_period);
    let histogram = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(line, signal)| line - signal)
        .collect();

    MacdResult {
        macd_line,
        signal_line,
        histogram,
    }
}

/// Every derived series the classifiers read, index-aligned with the closes
/// they were computed from. Built once per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub ema20: Vec<f64>,
    pub ema50: Vec<f64>,
    pub ema200: Vec<f64>,
    pub ema12: Vec<f64>,
    pub ema26: Vec<f64>,
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub macd_histogram: Vec<f64>,
    pub rsi14: Vec<f64>,
}

impl IndicatorSeries {
    /// Computes all indicators from oldest-first closes.
    ///
    /// Fewer than 2 closes produce an empty (degenerate) set; classifiers
    /// fed from it fall back to neutral signals.
    pub fn compute(closes: &[f64]) -> Self {
        if closes.len() < 2 {
            return Self::default();
        }

        let ema12 = ema(closes, MACD_FAST);
        let ema26 = ema(closes, MACD_SLOW);
        let macd = macd_from_emas(&ema12, &ema26, MACD_SIGNAL);

        Self {
            ema20: ema(closes, 20),
            ema50: ema(closes, 50),
            ema200: ema(closes, 200),
            ema12,
            ema26,
            macd_line: macd.macd_line,
            signal_line: macd.signal_line,
            macd_histogram: macd.histogram,
            rsi14: rsi(closes, RSI_PERIOD),
        }
    }

    pub fn len(&self) -> usize {
        self.ema20.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ema20.is_empty()
    }
}

/// Last element of a series
pub(crate) fn last(series: &[f64]) -> Option<f64> {
    series.last().copied()
}

/// Element `back` positions before the last, clamped to the first element
pub(crate) fn lookback(series: &[f64], back: usize) -> Option<f64> {
    if series.is_empty() {
        return None;
    }
    let idx = series.len().saturating_sub(back + 1);
    Some(series[idx])
}

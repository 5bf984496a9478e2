#[cfg(test)]
mod tests {
    use super::super::indicators::*;
    use approx::assert_relative_eq;

    // Helper function to create sample price data
    fn sample_prices() -> Vec<f64> {
        vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ]
    }

    // Deterministic zig-zag walk long enough for every indicator window
    fn long_walk(len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 6.0 + i as f64 * 0.05)
            .collect()
    }

    #[test]
    fn test_sma_basic() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma(&data, 3);

        assert_eq!(result.len(), 3);
        assert!((result[0] - 2.0).abs() < 0.001); // (1+2+3)/3 = 2
        assert!((result[1] - 3.0).abs() < 0.001); // (2+3+4)/3 = 3
        assert!((result[2] - 4.0).abs() < 0.001); // (3+4+5)/3 = 4
    }

    #[test]
    fn test_sma_insufficient_data() {
        let data = vec![1.0, 2.0];
        let result = sma(&data, 5);

        assert_eq!(result.len(), 0);
    }

    #[test]
    fn test_sma_last_degrades_window() {
        let data = vec![2.0, 4.0, 6.0];
        assert_relative_eq!(sma_last(&data, 200), 4.0);
        assert_relative_eq!(sma_last(&data, 2), 5.0);
        assert_eq!(sma_last(&[], 10), 0.0);
    }

    #[test]
    fn test_ema_basic() {
        let data = vec![22.0, 24.0, 23.0, 25.0, 26.0];
        let result = ema(&data, 3);

        assert_eq!(result.len(), data.len());
        // EMA should start with SMA
        let first_sma = (22.0 + 24.0 + 23.0) / 3.0;
        assert!((result[0] - first_sma).abs() < 0.01);
        // k = 0.5
        assert_relative_eq!(result[1], 24.0 * 0.5 + first_sma * 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_ema_short_series_seeds_from_available_points() {
        let data = vec![10.0, 20.0];
        let result = ema(&data, 200);

        assert_eq!(result.len(), 2);
        assert_relative_eq!(result[0], 15.0);
    }

    #[test]
    fn test_ema_empty_data() {
        let data: Vec<f64> = vec![];
        let result = ema(&data, 5);

        assert_eq!(result.len(), 0);
    }

    #[test]
    fn test_ema_constant_series_stays_constant() {
        let data = vec![42.5; 300];
        for period in [1, 9, 12, 20, 26, 50, 200, 500] {
            let result = ema(&data, period);
            assert_eq!(result.len(), data.len());
            for value in result {
                assert_relative_eq!(value, 42.5, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_ema_increases_with_uptrend() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let result = ema(&data, 3);

        // EMA should generally increase with uptrend
        for i in 1..result.len() {
            assert!(result[i] > result[i - 1]);
        }
    }

    #[test]
    fn test_rsi_basic() {
        let prices = sample_prices();
        let result = rsi(&prices, 14);

        assert_eq!(result.len(), prices.len());
        // RSI should be between 0 and 100
        for &value in &result {
            assert!(value >= 0.0 && value <= 100.0);
        }
    }

    #[test]
    fn test_rsi_warm_up_is_neutral() {
        let prices = long_walk(60);
        let result = rsi(&prices, 14);

        assert_eq!(result.len(), 60);
        for &value in &result[..15] {
            assert_eq!(value, RSI_NEUTRAL);
        }
    }

    #[test]
    fn test_rsi_insufficient_data() {
        assert!(rsi(&[1.0], 14).is_empty());

        // Too short for a reading: every slot is warm-up
        let data = vec![1.0, 2.0, 3.0];
        let result = rsi(&data, 14);
        assert_eq!(result, vec![RSI_NEUTRAL; 3]);
    }

    #[test]
    fn test_rsi_bounds_on_long_walk() {
        for len in [16, 40, 250] {
            let result = rsi(&long_walk(len), 14);
            assert!(result.iter().all(|v| (0.0..=100.0).contains(v)));
        }
    }

    #[test]
    fn test_rsi_overbought_oversold() {
        // Create data that should produce extreme RSI
        let mut uptrend = vec![100.0];
        for i in 1..20 {
            uptrend.push(100.0 + i as f64);
        }

        let result = rsi(&uptrend, 14);
        // No losses: RS saturates at 100
        assert_relative_eq!(*result.last().unwrap(), 100.0 - 100.0 / 101.0, epsilon = 1e-9);

        let downtrend: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let result = rsi(&downtrend, 14);
        assert!(*result.last().unwrap() < 1.0);
    }

    #[test]
    fn test_macd_basic() {
        let prices = sample_prices();
        let result = macd(&prices, 12, 26, 9);

        assert_eq!(result.macd_line.len(), prices.len());
        assert_eq!(result.signal_line.len(), prices.len());
        assert_eq!(result.histogram.len(), prices.len());
    }

    #[test]
    fn test_macd_histogram() {
        let prices = long_walk(120);
        let result = macd(&prices, 12, 26, 9);

        // Histogram should be macd_line - signal_line, exactly
        for (i, &hist) in result.histogram.iter().enumerate() {
            assert_eq!(hist, result.macd_line[i] - result.signal_line[i]);
        }
    }

    #[test]
    fn test_indicator_series_alignment() {
        let closes = long_walk(80);
        let series = IndicatorSeries::compute(&closes);

        assert_eq!(series.len(), 80);
        for s in [
            &series.ema20,
            &series.ema50,
            &series.ema200,
            &series.ema12,
            &series.ema26,
            &series.macd_line,
            &series.signal_line,
            &series.macd_histogram,
            &series.rsi14,
        ] {
            assert_eq!(s.len(), closes.len());
        }

        let direct = macd(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);
        assert_eq!(series.macd_histogram, direct.histogram);
    }

    #[test]
    fn test_indicator_series_degenerate() {
        assert!(IndicatorSeries::compute(&[]).is_empty());
        assert!(IndicatorSeries::compute(&[10.0]).is_empty());
    }

    #[test]
    fn test_indicators_idempotent() {
        let closes = long_walk(150);
        let a = IndicatorSeries::compute(&closes);
        let b = IndicatorSeries::compute(&closes);
        assert_eq!(a, b);
    }
}

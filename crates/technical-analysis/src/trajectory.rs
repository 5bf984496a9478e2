//! Heuristic label for how price behaves around its long moving average.
//!
//! Feeds the price-discipline quadrant; it is not a user-facing signal.

use analysis_core::numeric::{max_of, mean, min_of, pct_change};
use analysis_core::{Trajectory, TrajectoryState};

use crate::indicators::sma_last;

/// Closes averaged for the baseline (degrades to the available history)
pub const BASELINE_PERIOD: usize = 200;
/// Percent band around the baseline counted as "near"
pub const NEAR_BASELINE_PCT: f64 = 5.0;
/// Deepest discount (%) below the baseline at which basing is still considered
pub const BASING_FLOOR_PCT: f64 = 15.0;
/// Bars per stabilization window (lows, range, baseline slope)
pub const STABILIZE_WINDOW: usize = 10;
/// Maximum baseline change (%) across a stabilization window to count as flat
pub const FLATTENING_PCT: f64 = 1.0;
/// Stabilizing conditions required for basing
pub const BASING_CONDITIONS: usize = 2;
/// Roughly three trading weeks
pub const CATCH_UP_BARS: usize = 15;
/// Distance improvement (percentage points) over `CATCH_UP_BARS` that counts as catching up
pub const CATCH_UP_POINTS: f64 = 3.0;
/// One trading week
pub const WEEK_BARS: usize = 5;

/// Percent distance of the last close from the baseline over `closes`
fn baseline_distance(closes: &[f64]) -> Option<f64> {
    let price = *closes.last()?;
    pct_change(sma_last(closes, BASELINE_PERIOD), price)
}

/// Recent window vs the one before it, both `STABILIZE_WINDOW` long
fn split_windows(values: &[f64]) -> Option<(&[f64], &[f64])> {
    if values.len() < STABILIZE_WINDOW * 2 {
        return None;
    }
    let n = values.len();
    Some((
        &values[n - STABILIZE_WINDOW..],
        &values[n - STABILIZE_WINDOW * 2..n - STABILIZE_WINDOW],
    ))
}

/// No new low in the recent window
fn lows_stabilizing(lows: &[f64]) -> bool {
    split_windows(lows)
        .and_then(|(recent, prior)| Some(min_of(recent)? >= min_of(prior)?))
        .unwrap_or(false)
}

/// Recent close range no wider than the prior one
fn range_tightening(closes: &[f64]) -> bool {
    let range = |w: &[f64]| Some(max_of(w)? - min_of(w)?);
    split_windows(closes)
        .and_then(|(recent, prior)| Some(range(recent)? <= range(prior)?))
        .unwrap_or(false)
}

fn baseline_flattening(closes: &[f64]) -> bool {
    if closes.len() <= STABILIZE_WINDOW {
        return false;
    }
    let now = sma_last(closes, BASELINE_PERIOD);
    let then = sma_last(&closes[..closes.len() - STABILIZE_WINDOW], BASELINE_PERIOD);
    pct_change(then, now)
        .map(|change| change.abs() < FLATTENING_PCT)
        .unwrap_or(false)
}

/// Distance now minus distance `CATCH_UP_BARS` ago
fn catch_up(closes: &[f64], distance: f64) -> Option<f64> {
    if closes.len() <= CATCH_UP_BARS {
        return None;
    }
    let earlier = baseline_distance(&closes[..closes.len() - CATCH_UP_BARS])?;
    Some(distance - earlier)
}

/// Last week's average slipped below the week before
fn week_weakening(closes: &[f64]) -> bool {
    if closes.len() < WEEK_BARS * 2 {
        return false;
    }
    let n = closes.len();
    mean(&closes[n - WEEK_BARS..]) < mean(&closes[n - WEEK_BARS * 2..n - WEEK_BARS])
}

/// Classify trajectory from oldest-first closes and lows
pub fn classify_trajectory(closes: &[f64], lows: &[f64]) -> Trajectory {
    let distance = match closes.len() {
        0 | 1 => None,
        _ => baseline_distance(closes),
    };
    let Some(distance) = distance.filter(|d| d.is_finite()) else {
        return Trajectory {
            state: TrajectoryState::Stable,
            distance_pct: 0.0,
        };
    };

    let state = if distance < 0.0 {
        if distance >= -NEAR_BASELINE_PCT {
            TrajectoryState::Recovering
        } else if distance >= -BASING_FLOOR_PCT
            && [
                lows_stabilizing(lows),
                range_tightening(closes),
                baseline_flattening(closes),
            ]
            .iter()
            .filter(|&&c| c)
            .count()
                >= BASING_CONDITIONS
        {
            TrajectoryState::Basing
        } else if catch_up(closes, distance).map_or(false, |gain| gain >= CATCH_UP_POINTS) {
            TrajectoryState::Recovering
        } else {
            TrajectoryState::Drifting
        }
    } else if week_weakening(closes) {
        TrajectoryState::Drifting
    } else if distance <= NEAR_BASELINE_PCT {
        TrajectoryState::Recovering
    } else {
        TrajectoryState::Stable
    };

    Trajectory {
        state,
        distance_pct: distance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_then(tail: &[f64]) -> Vec<f64> {
        let mut closes = vec![100.0; 200];
        closes.extend_from_slice(tail);
        closes
    }

    fn classify(closes: &[f64]) -> Trajectory {
        classify_trajectory(closes, closes)
    }

    #[test]
    fn test_degenerate_is_stable() {
        let t = classify(&[100.0]);
        assert_eq!(t.state, TrajectoryState::Stable);
        assert_eq!(t.distance_pct, 0.0);
        assert_eq!(classify(&[]).state, TrajectoryState::Stable);
    }

    #[test]
    fn test_extended_uptrend_is_stable() {
        let closes: Vec<f64> = (0..250).map(|i| 100.0 + i as f64).collect();
        let t = classify(&closes);
        assert_eq!(t.state, TrajectoryState::Stable);
        assert!(t.is_above_baseline());
        assert!((t.distance_pct - (349.0 - 249.5) / 249.5 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_fresh_reclaim_is_recovering() {
        let t = classify(&flat_then(&[103.0; 5]));
        assert_eq!(t.state, TrajectoryState::Recovering);
        assert!(t.distance_pct > 0.0 && t.distance_pct <= NEAR_BASELINE_PCT);
    }

    #[test]
    fn test_weakening_week_above_baseline_is_drifting() {
        let mut tail = vec![110.0; 5];
        tail.extend(vec![108.0; 5]);
        let t = classify(&flat_then(&tail));
        assert_eq!(t.state, TrajectoryState::Drifting);
        assert!(t.is_above_baseline());
    }

    #[test]
    fn test_just_below_baseline_is_recovering() {
        let t = classify(&flat_then(&[97.0; 5]));
        assert_eq!(t.state, TrajectoryState::Recovering);
        assert!(!t.is_above_baseline());
    }

    #[test]
    fn test_quiet_discount_is_basing() {
        // 20 bars pinned at 90: no new lows, no range expansion, baseline barely moving
        let closes = flat_then(&[90.0; 20]);
        let t = classify(&closes);
        assert_eq!(t.state, TrajectoryState::Basing);
        assert!(t.distance_pct < -NEAR_BASELINE_PCT && t.distance_pct > -BASING_FLOOR_PCT);
    }

    #[test]
    fn test_steady_decline_is_drifting() {
        let tail: Vec<f64> = (1..=30).map(|i| 100.0 - i as f64).collect();
        let t = classify(&flat_then(&tail));
        assert_eq!(t.state, TrajectoryState::Drifting);
        assert!(t.distance_pct < -BASING_FLOOR_PCT);
    }

    #[test]
    fn test_deep_discount_catching_up_is_recovering() {
        let mut tail = vec![60.0; 20];
        tail.extend((1..=15).map(|i| 60.0 + i as f64));
        let t = classify(&flat_then(&tail));
        assert!(t.distance_pct < -BASING_FLOOR_PCT);
        assert_eq!(t.state, TrajectoryState::Recovering);
    }

    #[test]
    fn test_idempotent() {
        let tail: Vec<f64> = (0..40).map(|i| 95.0 + (i as f64 * 0.4).sin() * 3.0).collect();
        let closes = flat_then(&tail);
        assert_eq!(classify(&closes), classify(&closes));
    }
}

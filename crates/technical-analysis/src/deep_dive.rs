use analysis_core::SignalStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Trend,
    Momentum,
    Stretch,
}

/// One-paragraph explanation shown beneath a signal's chart
pub fn deep_dive(kind: SignalKind, status: SignalStatus) -> &'static str {
    match (kind, status) {
        (SignalKind::Trend, SignalStatus::Supportive) => {
            "The smoothed price line is riding above the long-term baseline and recent swings \
             are setting higher marks. Trends like this tend to persist until price closes back \
             under its shorter averages, so pullbacks toward the smoothed line have historically \
             been where buyers stepped in."
        }
        (SignalKind::Trend, SignalStatus::Neutral) => {
            "Price is tangled up in its moving averages. Some averages still point up while \
             others have rolled over, which usually means the market is deciding between a \
             pause and a reversal. Watch whether the smoothed line reclaims or loses the baseline."
        }
        (SignalKind::Trend, SignalStatus::Unsupportive) => {
            "Price sits below every key average and the averages themselves are stacked \
             downward. Rallies in this structure often stall at the smoothed line. A change \
             would first show up as price holding above the 20-day average for several weeks."
        }
        (SignalKind::Momentum, SignalStatus::Supportive) => {
            "Both the short and long averages are turning up and the gap between them keeps \
             widening. Momentum is doing the work here: buyers are not just present, they are \
             getting more aggressive."
        }
        (SignalKind::Momentum, SignalStatus::Neutral) => {
            "The short average and long average are converging. Momentum is either cooling off \
             a run or starting to rebuild after a decline. The next few sessions usually settle \
             which side takes over."
        }
        (SignalKind::Momentum, SignalStatus::Unsupportive) => {
            "The short average is falling away from the long one and the gap has been negative \
             for a while. Selling pressure is persistent rather than a one-day event, so bounces \
             have little force behind them."
        }
        (SignalKind::Stretch, SignalStatus::Supportive) => {
            "Price is trading near its 20-day average with RSI in a comfortable middle range. \
             Nothing is overextended, which leaves room to move in either direction without \
             a snap-back."
        }
        (SignalKind::Stretch, SignalStatus::Neutral) => {
            "Price has wandered away from its 20-day average but is not at an extreme. Moves \
             like this either settle back toward the average or build into a full stretch, so \
             the direction of RSI over the next week matters most."
        }
        (SignalKind::Stretch, SignalStatus::Unsupportive) => {
            "Price is far from its 20-day average and RSI sits at an extreme. Stretched moves \
             rarely continue in a straight line; a cool-off or sharp reversal back toward the \
             average is the usual outcome."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pair_has_text() {
        let kinds = [SignalKind::Trend, SignalKind::Momentum, SignalKind::Stretch];
        let statuses = [SignalStatus::Supportive, SignalStatus::Neutral, SignalStatus::Unsupportive];

        let mut seen = std::collections::HashSet::new();
        for kind in kinds {
            for status in statuses {
                let text = deep_dive(kind, status);
                assert!(!text.is_empty());
                assert!(seen.insert(text));
            }
        }
    }
}

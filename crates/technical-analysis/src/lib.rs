pub mod analyzer;
pub mod charts;
pub mod deep_dive;
pub mod indicators;
pub mod momentum;
pub mod stretch;
pub mod trajectory;
pub mod trend;

#[cfg(test)]
mod indicators_tests;

pub use analyzer::*;
pub use charts::{ChartPoint, ChartSeries};
pub use deep_dive::SignalKind;
pub use indicators::*;
pub use momentum::{classify_momentum, MomentumReadings, MomentumState};
pub use stretch::{classify_stretch, StretchReadings, StretchState};
pub use trajectory::classify_trajectory;
pub use trend::{classify_trend, SwingStructure, TrendInputs, TrendState};

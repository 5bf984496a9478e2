//! The four valuation quadrants.
//!
//! Each quadrant is an ordered decision table: an enum of cases, a `classify`
//! that preserves the fall-through order, and a builder that renders the case
//! into a `ValuationQuadrant`.

use analysis_core::numeric::format_signed_pct;
use analysis_core::{
    Insight, QuadrantId, QuadrantSignal, Strength, Tone, Trajectory, TrajectoryState, ValuationQuadrant,
};

use crate::ratios::{years_to_double, EarningsGrowth, ShareTrend};

/// Within this distance (%) of the 52-week high an entry counts as euphoric
pub const NEAR_HIGH_PCT: f64 = 10.0;
/// P/E at or below this is "low"
pub const LOW_PE_MAX: f64 = 20.0;
/// Earnings CAGR (%) at or above this is "high"
pub const HIGH_GROWTH_MIN: f64 = 10.0;
pub const ROIC_STRONG: f64 = 15.0;
pub const ROIC_ADEQUATE: f64 = 8.0;
pub const CAGR_FAST: f64 = 15.0;
pub const CAGR_STEADY: f64 = 7.0;

fn signal(label: &str, value: impl Into<String>, color: Tone, tooltip: &str) -> QuadrantSignal {
    QuadrantSignal {
        label: label.to_string(),
        value: value.into(),
        color,
        tooltip: tooltip.to_string(),
    }
}

fn insight(headline: &str, detail: &str) -> Insight {
    Insight {
        headline: headline.to_string(),
        detail: detail.to_string(),
    }
}

fn pct_or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.1}%", v))
}

// ---------------------------------------------------------------------------
// Price discipline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceDiscipline {
    EuphoricEntry,
    SensibleEntry,
    WatchlistEntry,
    RecoveryEntry,
    MonitorClosely,
    RiskyEntry,
    NeutralEntry,
}

impl PriceDiscipline {
    /// Near-high overrides everything else
    pub fn classify(distance_from_high: Option<f64>, above_sma: bool, trajectory: TrajectoryState) -> Self {
        if distance_from_high.map_or(false, |d| d < NEAR_HIGH_PCT) {
            return PriceDiscipline::EuphoricEntry;
        }

        match (above_sma, trajectory) {
            (true, TrajectoryState::Recovering) => PriceDiscipline::SensibleEntry,
            (true, TrajectoryState::Drifting) => PriceDiscipline::WatchlistEntry,
            (false, TrajectoryState::Recovering) => PriceDiscipline::RecoveryEntry,
            (false, TrajectoryState::Basing) => PriceDiscipline::MonitorClosely,
            (false, TrajectoryState::Drifting) => PriceDiscipline::RiskyEntry,
            _ => PriceDiscipline::NeutralEntry,
        }
    }

    pub fn verdict(&self) -> &'static str {
        match self {
            PriceDiscipline::EuphoricEntry => "Euphoric Entry",
            PriceDiscipline::SensibleEntry => "Sensible Entry",
            PriceDiscipline::WatchlistEntry => "Watchlist Entry",
            PriceDiscipline::RecoveryEntry => "Recovery Entry",
            PriceDiscipline::MonitorClosely => "Monitor Closely",
            PriceDiscipline::RiskyEntry => "Risky Entry",
            PriceDiscipline::NeutralEntry => "Neutral Entry",
        }
    }

    pub fn strength(&self) -> Strength {
        match self {
            PriceDiscipline::SensibleEntry | PriceDiscipline::RecoveryEntry => Strength::Sensible,
            PriceDiscipline::EuphoricEntry | PriceDiscipline::RiskyEntry => Strength::Risky,
            _ => Strength::Caution,
        }
    }

    fn insight(&self) -> Insight {
        match self {
            PriceDiscipline::EuphoricEntry => insight(
                "Wait for a pullback before buying.",
                "Price is within 10% of its 52-week high. Entries made near a peak leave little room \
                 for error if enthusiasm fades.",
            ),
            PriceDiscipline::SensibleEntry => insight(
                "Entry conditions look reasonable.",
                "Price has reclaimed its 200-day average without running far past it, so you are not \
                 chasing a move that is already stretched.",
            ),
            PriceDiscipline::WatchlistEntry => insight(
                "Keep it on the watchlist for now.",
                "Price is above its 200-day average but the last week has been softer than the one \
                 before. Let the dip play out before committing.",
            ),
            PriceDiscipline::RecoveryEntry => insight(
                "A recovery entry may be forming.",
                "Price is still below its 200-day average but is closing the gap. Buying here is a bet \
                 that the repair continues.",
            ),
            PriceDiscipline::MonitorClosely => insight(
                "Monitor for a confirmed turn.",
                "Price is at a discount to its 200-day average and is starting to stabilize, but a base \
                 is not a breakout. Wait for it to reclaim the average.",
            ),
            PriceDiscipline::RiskyEntry => insight(
                "Avoid catching a falling knife.",
                "Price is below its 200-day average and still sliding. There is no sign yet that sellers \
                 are done.",
            ),
            PriceDiscipline::NeutralEntry => insight(
                "No clear timing edge either way.",
                "Price is neither stretched nor depressed relative to its history, so timing adds little \
                 to the decision.",
            ),
        }
    }
}

pub fn price_discipline_quadrant(distance_from_high: Option<f64>, trajectory: &Trajectory) -> ValuationQuadrant {
    let above = trajectory.is_above_baseline();
    let case = PriceDiscipline::classify(distance_from_high, above, trajectory.state);

    let high_color = match distance_from_high {
        Some(d) if d < NEAR_HIGH_PCT => Tone::Red,
        Some(_) => Tone::Green,
        None => Tone::Yellow,
    };
    let sma_color = match (above, trajectory.state) {
        (_, TrajectoryState::Drifting) => Tone::Red,
        (true, _) => Tone::Green,
        (false, _) => Tone::Yellow,
    };

    ValuationQuadrant {
        id: QuadrantId::PriceDiscipline,
        title: QuadrantId::PriceDiscipline.title().to_string(),
        verdict: case.verdict().to_string(),
        signals: [
            signal(
                "Below 52-week high",
                pct_or_na(distance_from_high),
                high_color,
                "How far the current price sits under its highest price of the past year.",
            ),
            signal(
                "Vs 200-day average",
                format!(
                    "{} ({})",
                    format_signed_pct(trajectory.distance_pct),
                    trajectory.state.to_label()
                ),
                sma_color,
                "Distance from the long-term moving average and how price is behaving around it.",
            ),
        ],
        insight: case.insight(),
        strength: case.strength(),
    }
}

// ---------------------------------------------------------------------------
// Price tag
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceTag {
    HiddenGem,
    ValueTrapRisk,
    GrowthPremium,
    Overpriced,
    NoEarningsAnchor,
    GrowthUnclear,
}

impl PriceTag {
    pub fn classify(pe: Option<f64>, growth: &EarningsGrowth) -> Self {
        let Some(pe) = pe else {
            return PriceTag::NoEarningsAnchor;
        };
        let Some(growth) = growth.value() else {
            return PriceTag::GrowthUnclear;
        };

        match (pe <= LOW_PE_MAX, growth >= HIGH_GROWTH_MIN) {
            (true, true) => PriceTag::HiddenGem,
            (true, false) => PriceTag::ValueTrapRisk,
            (false, true) => PriceTag::GrowthPremium,
            (false, false) => PriceTag::Overpriced,
        }
    }

    pub fn verdict(&self) -> &'static str {
        match self {
            PriceTag::HiddenGem => "Hidden Gem",
            PriceTag::ValueTrapRisk => "Value Trap Risk",
            PriceTag::GrowthPremium => "Growth Premium",
            PriceTag::Overpriced => "Overpriced",
            PriceTag::NoEarningsAnchor => "No Earnings Anchor",
            PriceTag::GrowthUnclear => "Growth Unclear",
        }
    }

    pub fn strength(&self) -> Strength {
        match self {
            PriceTag::HiddenGem => Strength::Sensible,
            PriceTag::Overpriced | PriceTag::NoEarningsAnchor => Strength::Risky,
            _ => Strength::Caution,
        }
    }

    fn insight(&self) -> Insight {
        match self {
            PriceTag::HiddenGem => insight(
                "Growth is on sale.",
                "Earnings are compounding at a double-digit pace while the price tag stays modest. The \
                 market may be underestimating the business.",
            ),
            PriceTag::ValueTrapRisk => insight(
                "Check why it is cheap.",
                "The multiple is low but so is growth. Cheap stocks without growth can stay cheap for a \
                 long time.",
            ),
            PriceTag::GrowthPremium => insight(
                "You are paying up for growth.",
                "Earnings are growing quickly and the price already reflects it. Any slowdown could hit \
                 the multiple hard.",
            ),
            PriceTag::Overpriced => insight(
                "The price outruns the profits.",
                "A high multiple paired with slow earnings growth leaves the valuation relying on hope \
                 rather than results.",
            ),
            PriceTag::NoEarningsAnchor => insight(
                "There are no earnings to anchor the price.",
                "The company is not profitable on a per-share basis, so a P/E cannot tell you whether the \
                 price is fair.",
            ),
            PriceTag::GrowthUnclear => insight(
                "Growth history is too thin to judge.",
                "There is not enough profitable history to measure an earnings growth rate, so the \
                 multiple has nothing to be compared against.",
            ),
        }
    }
}

pub fn price_tag_quadrant(pe: Option<f64>, growth: &EarningsGrowth) -> ValuationQuadrant {
    let case = PriceTag::classify(pe, growth);

    let pe_color = match pe {
        Some(p) if p <= LOW_PE_MAX => Tone::Green,
        Some(_) => Tone::Yellow,
        None => Tone::Red,
    };
    let growth_color = match growth.value() {
        Some(g) if g >= HIGH_GROWTH_MIN => Tone::Green,
        Some(g) if g > 0.0 => Tone::Yellow,
        Some(_) => Tone::Red,
        None => Tone::Yellow,
    };
    let growth_value = match growth.value() {
        Some(g) if growth.turnaround => format!("{:.1}% (turnaround)", g),
        Some(g) => format!("{:.1}%", g),
        None => "n/a".to_string(),
    };

    ValuationQuadrant {
        id: QuadrantId::PriceTag,
        title: QuadrantId::PriceTag.title().to_string(),
        verdict: case.verdict().to_string(),
        signals: [
            signal(
                "P/E ratio",
                pe.map_or_else(|| "n/a".to_string(), |p| format!("{:.1}", p)),
                pe_color,
                "Price paid for each dollar of annual earnings.",
            ),
            signal(
                "Earnings growth",
                growth_value,
                growth_color,
                "Annualized net income growth over the last few fiscal years.",
            ),
        ],
        insight: case.insight(),
        strength: case.strength(),
    }
}

// ---------------------------------------------------------------------------
// Capital discipline
// ---------------------------------------------------------------------------

pub fn capital_strength(roic: Option<f64>) -> Strength {
    match roic {
        Some(r) if r > ROIC_STRONG => Strength::Sensible,
        Some(r) if r > ROIC_ADEQUATE => Strength::Caution,
        Some(_) => Strength::Risky,
        None => Strength::Caution,
    }
}

pub fn capital_discipline_quadrant(roic: Option<f64>, share_change: Option<f64>) -> ValuationQuadrant {
    let strength = capital_strength(roic);
    let shares = ShareTrend::from_change(share_change);

    let (verdict, headline, detail) = match (roic, strength) {
        (None, _) => (
            "Returns Unclear",
            "Returns on capital cannot be measured.",
            "Invested capital is zero or negative in the latest filing, so the return on it is not \
             meaningful.",
        ),
        (Some(_), Strength::Sensible) => (
            "Efficient Compounder",
            "Management earns strong returns on capital.",
            "Each dollar kept in the business earns well above a typical cost of capital, which is \
             what lets value compound.",
        ),
        (Some(_), Strength::Caution) => (
            "Adequate Returns",
            "Returns on capital are acceptable, not exceptional.",
            "The business covers its cost of capital but reinvested profits will not compound quickly.",
        ),
        (Some(_), Strength::Risky) => (
            "Capital Drag",
            "Capital is earning too little.",
            "Returns barely clear, or fall short of, a typical cost of capital. Growth funded this way \
             can destroy value.",
        ),
    };

    let (share_value, share_color) = match shares {
        ShareTrend::Buyback => ("Buying back", Tone::Green),
        ShareTrend::Stable => ("Stable", Tone::Green),
        ShareTrend::Dilution => ("Diluting", Tone::Red),
        ShareTrend::Unknown => ("Unknown", Tone::Yellow),
    };
    let share_value = match share_change {
        Some(c) => format!("{} ({})", share_value, format_signed_pct(c)),
        None => share_value.to_string(),
    };

    ValuationQuadrant {
        id: QuadrantId::CapitalDiscipline,
        title: QuadrantId::CapitalDiscipline.title().to_string(),
        verdict: verdict.to_string(),
        signals: [
            signal(
                "Return on capital",
                pct_or_na(roic),
                strength.tone(),
                "Operating income divided by total assets less current liabilities.",
            ),
            signal(
                "Share count",
                share_value,
                share_color,
                "Change in shares outstanding between the last two fiscal years.",
            ),
        ],
        insight: insight(headline, detail),
        strength,
    }
}

// ---------------------------------------------------------------------------
// Doubling potential
// ---------------------------------------------------------------------------

pub fn doubling_strength(price_cagr: f64) -> Strength {
    if price_cagr > CAGR_FAST {
        Strength::Sensible
    } else if price_cagr > CAGR_STEADY {
        Strength::Caution
    } else {
        Strength::Risky
    }
}

pub fn doubling_potential_quadrant(price_cagr: f64) -> ValuationQuadrant {
    let strength = doubling_strength(price_cagr);
    let years = years_to_double(price_cagr);

    let (verdict, headline, detail) = match strength {
        Strength::Sensible => (
            "Fast Doubler",
            "Historically this price has doubled quickly.",
            "At its long-run pace the share price would double in under five years.",
        ),
        Strength::Caution => (
            "Steady Doubler",
            "A patient holder has been rewarded.",
            "At its long-run pace the share price doubles roughly once a decade.",
        ),
        Strength::Risky => (
            "Slow Doubler",
            "Do not count on price growth alone.",
            "The long-run price trend is too slow, flat or negative to double within a decade.",
        ),
    };

    ValuationQuadrant {
        id: QuadrantId::DoublingPotential,
        title: QuadrantId::DoublingPotential.title().to_string(),
        verdict: verdict.to_string(),
        signals: [
            signal(
                "Price CAGR",
                format!("{:.1}%", price_cagr),
                strength.tone(),
                "Annualized growth of the adjusted share price over the available monthly history.",
            ),
            signal(
                "Years to double",
                years.map_or_else(|| "n/a".to_string(), |y| format!("{:.1}", y)),
                strength.tone(),
                "Rule of 72: 72 divided by the annual growth rate.",
            ),
        ],
        insight: insight(headline, detail),
        strength,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratios::calculate_earnings_cagr;

    fn trajectory(state: TrajectoryState, distance_pct: f64) -> Trajectory {
        Trajectory { state, distance_pct }
    }

    #[test]
    fn test_near_high_overrides_everything() {
        for above in [true, false] {
            for state in [
                TrajectoryState::Recovering,
                TrajectoryState::Drifting,
                TrajectoryState::Basing,
                TrajectoryState::Stable,
            ] {
                let case = PriceDiscipline::classify(Some(5.0), above, state);
                assert_eq!(case.verdict(), "Euphoric Entry");
                assert_eq!(case.strength(), Strength::Risky);
            }
        }
    }

    #[test]
    fn test_price_discipline_table() {
        let cases = [
            (true, TrajectoryState::Recovering, "Sensible Entry", Strength::Sensible),
            (true, TrajectoryState::Drifting, "Watchlist Entry", Strength::Caution),
            (false, TrajectoryState::Recovering, "Recovery Entry", Strength::Sensible),
            (false, TrajectoryState::Basing, "Monitor Closely", Strength::Caution),
            (false, TrajectoryState::Drifting, "Risky Entry", Strength::Risky),
            (true, TrajectoryState::Stable, "Neutral Entry", Strength::Caution),
            (false, TrajectoryState::Stable, "Neutral Entry", Strength::Caution),
        ];
        for (above, state, verdict, strength) in cases {
            let case = PriceDiscipline::classify(Some(10.0), above, state);
            assert_eq!(case.verdict(), verdict, "{:?} above={}", state, above);
            assert_eq!(case.strength(), strength);
        }

        // Unknown 52-week high does not trigger the override
        assert_eq!(
            PriceDiscipline::classify(None, true, TrajectoryState::Recovering),
            PriceDiscipline::SensibleEntry
        );
    }

    #[test]
    fn test_price_discipline_quadrant_render() {
        let q = price_discipline_quadrant(Some(22.0), &trajectory(TrajectoryState::Recovering, 3.2));
        assert_eq!(q.id, QuadrantId::PriceDiscipline);
        assert_eq!(q.verdict, "Sensible Entry");
        assert_eq!(q.strength, Strength::Sensible);
        assert_eq!(q.signals[0].value, "22.0%");
        assert_eq!(q.signals[1].value, "+3.2% (Recovering)");
        assert!(!q.insight.headline.is_empty() && !q.insight.detail.is_empty());
    }

    #[test]
    fn test_price_tag_grid() {
        let fast = calculate_earnings_cagr(200.0, 100.0, 2);
        let slow = calculate_earnings_cagr(105.0, 100.0, 2);

        assert_eq!(PriceTag::classify(Some(15.0), &fast), PriceTag::HiddenGem);
        assert_eq!(PriceTag::classify(Some(20.0), &slow), PriceTag::ValueTrapRisk);
        assert_eq!(PriceTag::classify(Some(35.0), &fast), PriceTag::GrowthPremium);
        assert_eq!(PriceTag::classify(Some(35.0), &slow), PriceTag::Overpriced);
        assert_eq!(PriceTag::HiddenGem.strength(), Strength::Sensible);
        assert_eq!(PriceTag::Overpriced.strength(), Strength::Risky);
    }

    #[test]
    fn test_price_tag_fallbacks() {
        let fast = calculate_earnings_cagr(200.0, 100.0, 2);
        let unknown = EarningsGrowth::not_computable(0);

        let q = price_tag_quadrant(None, &fast);
        assert_eq!(q.verdict, "No Earnings Anchor");
        assert_eq!(q.strength, Strength::Risky);

        let q = price_tag_quadrant(Some(12.0), &unknown);
        assert_eq!(q.verdict, "Growth Unclear");
        assert_eq!(q.strength, Strength::Caution);
        assert_eq!(q.signals[1].value, "n/a");
    }

    #[test]
    fn test_turnaround_growth_counts_as_high() {
        let turnaround = calculate_earnings_cagr(50.0, -20.0, 3);
        let q = price_tag_quadrant(Some(14.0), &turnaround);
        assert_eq!(q.verdict, "Hidden Gem");
        assert_eq!(q.signals[1].value, "25.0% (turnaround)");
    }

    #[test]
    fn test_capital_discipline() {
        assert_eq!(capital_strength(Some(20.0)), Strength::Sensible);
        assert_eq!(capital_strength(Some(15.0)), Strength::Caution);
        assert_eq!(capital_strength(Some(8.0)), Strength::Risky);
        assert_eq!(capital_strength(None), Strength::Caution);

        let q = capital_discipline_quadrant(Some(22.0), Some(-3.0));
        assert_eq!(q.verdict, "Efficient Compounder");
        assert_eq!(q.signals[1].color, Tone::Green);
        assert_eq!(q.signals[1].value, "Buying back (-3.0%)");

        let q = capital_discipline_quadrant(None, Some(4.0));
        assert_eq!(q.verdict, "Returns Unclear");
        assert_eq!(q.strength, Strength::Caution);
        assert_eq!(q.signals[1].color, Tone::Red);
    }

    #[test]
    fn test_doubling_potential() {
        let q = doubling_potential_quadrant(18.0);
        assert_eq!(q.strength, Strength::Sensible);
        assert_eq!(q.signals[1].value, "4.0");

        assert_eq!(doubling_strength(15.0), Strength::Caution);
        assert_eq!(doubling_strength(7.0), Strength::Risky);

        let q = doubling_potential_quadrant(0.0);
        assert_eq!(q.verdict, "Slow Doubler");
        assert_eq!(q.signals[1].value, "n/a");
    }
}

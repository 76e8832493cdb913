//! GARP / Growth / Value scoring.
//!
//! Two strategies share one capability: [`FullScoring`] is the multi-factor formula used by
//! the on-demand screen, [`QuickScoring`] is the single-threshold formula used by the
//! background worker. Both are deterministic and do no I/O.

use serde::{Deserialize, Serialize};

use crate::domain::stock::Fundamentals;

pub const MAX_SCORE: i32 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub garp: i32,
    pub growth: i32,
    pub value: i32,
}

impl Scores {
    /// Builds scores clamped to `0..=MAX_SCORE`.
    pub fn clamped(garp: i32, growth: i32, value: i32) -> Self {
        Self {
            garp: garp.clamp(0, MAX_SCORE),
            growth: growth.clamp(0, MAX_SCORE),
            value: value.clamp(0, MAX_SCORE),
        }
    }

    pub fn total(&self) -> i32 {
        self.garp + self.growth + self.value
    }

    pub fn recommendation(&self) -> Recommendation {
        Recommendation::from_total(self.total())
    }
}

pub trait ScoringStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn score(&self, f: &Fundamentals) -> Scores;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FullScoring;

impl ScoringStrategy for FullScoring {
    fn name(&self) -> &'static str {
        "full"
    }

    fn score(&self, f: &Fundamentals) -> Scores {
        let pe = f.pe_ratio;
        let peg = f.peg_ratio;
        let growth_rate = f.revenue_growth;

        let mut garp = 0;
        if 0.0 < pe && pe < 20.0 && 0.0 < peg && peg < 1.5 {
            garp += 3;
        } else if 0.0 < pe && pe < 25.0 && 0.0 < peg && peg < 2.0 {
            garp += 2;
        } else if pe > 0.0 && peg > 0.0 {
            garp += 1;
        }
        if growth_rate > 0.10 {
            garp += 2;
        } else if growth_rate > 0.05 {
            garp += 1;
        }

        let mut growth = 0;
        if growth_rate > 0.15 {
            growth += 3;
        } else if growth_rate > 0.10 {
            growth += 2;
        } else if growth_rate > 0.05 {
            growth += 1;
        }
        if f.roe > 0.15 {
            growth += 2;
        } else if f.roe > 0.10 {
            growth += 1;
        }

        let mut value = 0;
        if 0.0 < pe && pe < 15.0 {
            value += 3;
        } else if 0.0 < pe && pe < 20.0 {
            value += 2;
        } else if 0.0 < pe && pe < 25.0 {
            value += 1;
        }
        let pb = f.price_to_book;
        if 0.0 < pb && pb < 1.5 {
            value += 2;
        } else if 0.0 < pb && pb < 2.5 {
            value += 1;
        }

        Scores::clamped(garp, growth, value)
    }
}

/// Each score is 3 when its primary threshold holds, otherwise 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuickScoring;

impl ScoringStrategy for QuickScoring {
    fn name(&self) -> &'static str {
        "quick"
    }

    fn score(&self, f: &Fundamentals) -> Scores {
        let pe = f.pe_ratio;
        let garp = if 0.0 < pe && pe < 20.0 { 3 } else { 1 };
        let growth = if f.revenue_growth > 0.10 { 3 } else { 1 };
        let value = if 0.0 < pe && pe < 15.0 { 3 } else { 1 };
        Scores::clamped(garp, growth, value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    #[serde(rename = "Strong Buy")]
    StrongBuy,
    Buy,
    Hold,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub rating: Rating,
    pub confidence: Confidence,
}

impl Recommendation {
    pub fn from_total(total: i32) -> Self {
        let (rating, confidence) = match total {
            t if t >= 12 => (Rating::StrongBuy, Confidence::High),
            t if t >= 9 => (Rating::Buy, Confidence::Medium),
            t if t >= 6 => (Rating::Hold, Confidence::Low),
            _ => (Rating::Sell, Confidence::Low),
        };
        Self { rating, confidence }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fundamentals(pe: f64, peg: f64, pb: f64, roe: f64, growth: f64) -> Fundamentals {
        Fundamentals {
            pe_ratio: pe,
            peg_ratio: peg,
            price_to_book: pb,
            roe,
            revenue_growth: growth,
            ..Default::default()
        }
    }

    #[test]
    fn garp_reasonable_price_with_growth_hits_max() {
        let s = FullScoring.score(&fundamentals(18.0, 1.2, 0.0, 0.0, 0.12));
        assert_eq!(s.garp, 5);
    }

    #[test]
    fn garp_without_peg_or_growth_is_zero() {
        let s = FullScoring.score(&fundamentals(30.0, 0.0, 0.0, 0.0, 0.02));
        assert_eq!(s.garp, 0);
    }

    #[test]
    fn garp_middle_and_weak_bands() {
        assert_eq!(FullScoring.score(&fundamentals(22.0, 1.8, 0.0, 0.0, 0.06)).garp, 3);
        assert_eq!(FullScoring.score(&fundamentals(40.0, 3.0, 0.0, 0.0, 0.0)).garp, 1);
    }

    #[test]
    fn growth_combines_revenue_and_roe() {
        assert_eq!(FullScoring.score(&fundamentals(0.0, 0.0, 0.0, 0.20, 0.16)).growth, 5);
        assert_eq!(FullScoring.score(&fundamentals(0.0, 0.0, 0.0, 0.12, 0.11)).growth, 3);
        assert_eq!(FullScoring.score(&fundamentals(0.0, 0.0, 0.0, 0.10, 0.05)).growth, 0);
    }

    #[test]
    fn value_combines_pe_and_price_to_book() {
        assert_eq!(FullScoring.score(&fundamentals(12.0, 0.0, 1.0, 0.0, 0.0)).value, 5);
        assert_eq!(FullScoring.score(&fundamentals(19.0, 0.0, 2.0, 0.0, 0.0)).value, 3);
        assert_eq!(FullScoring.score(&fundamentals(24.0, 0.0, 3.0, 0.0, 0.0)).value, 1);
        assert_eq!(FullScoring.score(&fundamentals(-5.0, 0.0, -1.0, 0.0, 0.0)).value, 0);
    }

    #[test]
    fn quick_scoring_is_three_or_one() {
        let strong = QuickScoring.score(&fundamentals(12.0, 0.0, 0.0, 0.0, 0.2));
        assert_eq!(strong, Scores { garp: 3, growth: 3, value: 3 });

        let weak = QuickScoring.score(&fundamentals(0.0, 0.0, 0.0, 0.0, 0.0));
        assert_eq!(weak, Scores { garp: 1, growth: 1, value: 1 });

        // pe=18 passes the GARP threshold but not the value one.
        let mixed = QuickScoring.score(&fundamentals(18.0, 0.0, 0.0, 0.0, 0.10));
        assert_eq!(mixed, Scores { garp: 3, growth: 1, value: 1 });
    }

    #[test]
    fn strategies_diverge_on_the_same_input() {
        let f = fundamentals(18.0, 1.2, 1.0, 0.2, 0.12);
        assert_ne!(FullScoring.score(&f), QuickScoring.score(&f));
        assert_eq!(FullScoring.name(), "full");
        assert_eq!(QuickScoring.name(), "quick");
    }

    #[test]
    fn recommendation_bands() {
        let cases = [
            (13, Rating::StrongBuy, Confidence::High),
            (12, Rating::StrongBuy, Confidence::High),
            (9, Rating::Buy, Confidence::Medium),
            (6, Rating::Hold, Confidence::Low),
            (2, Rating::Sell, Confidence::Low),
        ];
        for (total, rating, confidence) in cases {
            let r = Recommendation::from_total(total);
            assert_eq!(r.rating, rating, "total={total}");
            assert_eq!(r.confidence, confidence, "total={total}");
        }
    }

    #[test]
    fn rating_serializes_with_display_names() {
        let r = Recommendation::from_total(15);
        let v = serde_json::to_value(r).unwrap();
        assert_eq!(v, serde_json::json!({"rating": "Strong Buy", "confidence": "High"}));
    }

    proptest! {
        #[test]
        fn scores_stay_in_range(
            pe in -100.0f64..200.0,
            peg in -5.0f64..10.0,
            pb in -5.0f64..20.0,
            roe in -2.0f64..2.0,
            growth in -1.0f64..3.0,
        ) {
            let f = fundamentals(pe, peg, pb, roe, growth);
            for s in [FullScoring.score(&f), QuickScoring.score(&f)] {
                for v in [s.garp, s.growth, s.value] {
                    prop_assert!((0..=MAX_SCORE).contains(&v));
                }
            }
        }
    }
}

//! Pattern scores for run evaluation
//!
//! A run is a maximal line of same-colour stones. Its value depends on how
//! far it is from the win length K and how many of its two ends are empty.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Default pattern scores, named for the K = 5 case.
/// "Four" means K−1 stones, "three" K−2, "two" K−3.
pub struct PatternScore;

impl PatternScore {
    /// K in a row - win
    pub const FIVE: i32 = 1_000_000;
    /// Open four: _OOOO_ (unstoppable)
    pub const OPEN_FOUR: i32 = 100_000;
    /// Closed four: XOOOO_ or _OOOOX (one way to extend)
    pub const CLOSED_FOUR: i32 = 50_000;
    /// Open three: _OOO_ (becomes open four if not blocked)
    pub const OPEN_THREE: i32 = 10_000;
    /// Closed three: XOOO_ or _OOOX
    pub const CLOSED_THREE: i32 = 1_500;
    /// Open two: _OO_
    pub const OPEN_TWO: i32 = 1_000;
    /// Closed two: XOO_ or _OOX
    pub const CLOSED_TWO: i32 = 200;
    /// Anything shorter with both ends open
    pub const SINGLE: i32 = 10;
    /// Per-stone bonus per unit of closeness to the center
    pub const CENTER: i32 = 3;
}

/// Evaluator weight table. Deserialized from the `[search.weights]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalWeights {
    pub win: i32,
    pub open_four: i32,
    pub closed_four: i32,
    pub open_three: i32,
    pub closed_three: i32,
    pub open_two: i32,
    pub closed_two: i32,
    pub single: i32,
    pub center: i32,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            win: PatternScore::FIVE,
            open_four: PatternScore::OPEN_FOUR,
            closed_four: PatternScore::CLOSED_FOUR,
            open_three: PatternScore::OPEN_THREE,
            closed_three: PatternScore::CLOSED_THREE,
            open_two: PatternScore::OPEN_TWO,
            closed_two: PatternScore::CLOSED_TWO,
            single: PatternScore::SINGLE,
            center: PatternScore::CENTER,
        }
    }
}

impl EvalWeights {
    /// The ladder must be non-increasing from `win` down to `single`, so a
    /// strictly better run never scores lower.
    pub fn validate(&self) -> Result<()> {
        let ladder = [
            ("win", self.win),
            ("open_four", self.open_four),
            ("closed_four", self.closed_four),
            ("open_three", self.open_three),
            ("closed_three", self.closed_three),
            ("open_two", self.open_two),
            ("closed_two", self.closed_two),
            ("single", self.single),
        ];
        for pair in ladder.windows(2) {
            let (hi_name, hi) = pair[0];
            let (lo_name, lo) = pair[1];
            if lo > hi {
                return Err(EngineError::InvalidConfig(format!(
                    "weight {lo_name} ({lo}) exceeds {hi_name} ({hi})"
                )));
            }
        }
        if self.single < 0 || self.center < 0 {
            return Err(EngineError::InvalidConfig(
                "weights must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Score one run of `count` stones with `open_ends` empty neighbours (0..=2).
    ///
    /// `count >= win_length` is a win regardless of ends; the caller decides
    /// whether a capped exact-K run counts under the double-block rule.
    pub fn line_score(&self, count: usize, open_ends: u8, win_length: usize) -> i32 {
        if count >= win_length {
            return self.win;
        }
        match (win_length - count, open_ends) {
            (_, 0) => 0,
            (1, 2) => self.open_four,
            (1, _) => self.closed_four,
            (2, 2) => self.open_three,
            (2, _) => self.closed_three,
            (3, 2) => self.open_two,
            (3, _) => self.closed_two,
            (_, 2) => self.single,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_score_hierarchy() {
        assert!(PatternScore::FIVE > PatternScore::OPEN_FOUR);
        assert!(PatternScore::OPEN_FOUR > PatternScore::CLOSED_FOUR);
        assert!(PatternScore::CLOSED_FOUR > PatternScore::OPEN_THREE);
        assert!(PatternScore::OPEN_THREE > PatternScore::CLOSED_THREE);
        assert!(PatternScore::CLOSED_THREE > PatternScore::OPEN_TWO);
        assert!(PatternScore::OPEN_TWO > PatternScore::CLOSED_TWO);
        assert!(PatternScore::CLOSED_TWO > PatternScore::SINGLE);
        assert!(EvalWeights::default().validate().is_ok());
    }

    #[test]
    fn test_line_score_k5() {
        let w = EvalWeights::default();
        assert_eq!(w.line_score(5, 0, 5), w.win);
        assert_eq!(w.line_score(6, 1, 5), w.win);
        assert_eq!(w.line_score(4, 2, 5), w.open_four);
        assert_eq!(w.line_score(4, 1, 5), w.closed_four);
        assert_eq!(w.line_score(3, 2, 5), w.open_three);
        assert_eq!(w.line_score(2, 1, 5), w.closed_two);
        assert_eq!(w.line_score(1, 2, 5), w.single);
        assert_eq!(w.line_score(1, 1, 5), 0);
        assert_eq!(w.line_score(4, 0, 5), 0, "dead four cannot grow");
    }

    #[test]
    fn test_line_score_scales_with_k() {
        let w = EvalWeights::default();
        // K = 3: two stones are one short of a win
        assert_eq!(w.line_score(2, 2, 3), w.open_four);
        assert_eq!(w.line_score(1, 2, 3), w.open_three);
    }

    #[test]
    fn test_line_score_monotonic() {
        let w = EvalWeights::default();
        for k in 3..=7usize {
            for count in 1..=k {
                for open in 0..=2u8 {
                    let s = w.line_score(count, open, k);
                    assert!(w.line_score(count + 1, open, k) >= s, "k={k} count={count}");
                    if open < 2 {
                        assert!(w.line_score(count, open + 1, k) >= s, "k={k} count={count}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_validate_rejects_inverted_ladder() {
        let w = EvalWeights {
            open_three: PatternScore::OPEN_FOUR * 2,
            ..EvalWeights::default()
        };
        assert!(w.validate().is_err());
    }
}

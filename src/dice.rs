//! Dice rolling and dice-expression evaluation.
//!
//! Most rolls in the combat system are d100 contested rolls; damage
//! formulas use chains of `NdS` terms and integer literals joined by
//! `+`/`-` (e.g. `1d6+2-1d4`). Every random draw goes through the
//! [`DiceRoller`] trait so tests can substitute a deterministic source.

use rand::rngs::ThreadRng;
use rand::Rng;
use thiserror::Error;

/// Error type for dice-expression evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("malformed dice expression: {0}")]
    MalformedExpression(String),
}

/// The random-draw boundary of the combat core.
///
/// Production code uses [`RngRoller`]; tests use the fixed and scripted
/// rollers from [`crate::testing`].
pub trait DiceRoller {
    /// Roll one die, returning a face in `[1, sides]`.
    fn die(&mut self, sides: i32) -> i32;
}

/// A [`DiceRoller`] backed by a [`rand::Rng`].
pub struct RngRoller<R: Rng> {
    rng: R,
}

impl RngRoller<ThreadRng> {
    /// Roller backed by the thread-local RNG.
    pub fn from_entropy() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for RngRoller<ThreadRng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl<R: Rng> RngRoller<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> DiceRoller for RngRoller<R> {
    fn die(&mut self, sides: i32) -> i32 {
        self.rng.gen_range(1..=sides.max(1))
    }
}

/// Roll `num` dice of `sides` sides and add `bonus`.
pub fn dice<R: DiceRoller + ?Sized>(roller: &mut R, sides: i32, num: i32, bonus: i32) -> i32 {
    let mut acc = 0;
    for _ in 0..num.max(0) {
        acc += roller.die(sides);
    }
    acc + bonus
}

/// Convenience for rolling a d100. Contested rolls are all d100s.
pub fn d100<R: DiceRoller + ?Sized>(roller: &mut R) -> i32 {
    dice(roller, 100, 1, 0)
}

/// Evaluate a dice-expression chain such as `1d6+2-1d4`.
///
/// Each term is either an integer literal or an `NdS` dice term; terms
/// are joined by embedded `+`/`-` signs and summed. Whitespace is
/// ignored. Attribute tokens (`weapon`, `imp`, ...) must already have
/// been substituted away; anything that is neither a literal nor a dice
/// term is a [`DiceError::MalformedExpression`].
pub fn eval_formula<R: DiceRoller + ?Sized>(roller: &mut R, expr: &str) -> Result<i32, DiceError> {
    let compact: String = expr.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(DiceError::MalformedExpression(expr.to_string()));
    }

    let mut total = 0;
    for (sign, term) in signed_terms(&compact) {
        if term.is_empty() {
            return Err(DiceError::MalformedExpression(expr.to_string()));
        }
        total += sign * eval_term(roller, term)?;
    }
    Ok(total)
}

/// Split `expr` into `(sign, term)` pairs on `+`/`-` boundaries.
fn signed_terms(expr: &str) -> Vec<(i32, &str)> {
    let mut terms = Vec::new();
    let mut sign = 1;
    let mut start = 0;
    for (idx, ch) in expr.char_indices() {
        if ch == '+' || ch == '-' {
            if idx > start {
                terms.push((sign, &expr[start..idx]));
            } else if idx > 0 {
                // two adjacent signs produce an empty term
                terms.push((sign, ""));
            }
            sign = if ch == '+' { 1 } else { -1 };
            start = idx + 1;
        }
    }
    terms.push((sign, &expr[start..]));
    terms
}

fn eval_term<R: DiceRoller + ?Sized>(roller: &mut R, term: &str) -> Result<i32, DiceError> {
    if let Some(d_pos) = term.find('d') {
        let num: i32 = term[..d_pos]
            .parse()
            .map_err(|_| DiceError::MalformedExpression(term.to_string()))?;
        let sides: i32 = term[d_pos + 1..]
            .parse()
            .map_err(|_| DiceError::MalformedExpression(term.to_string()))?;
        if sides < 1 {
            return Err(DiceError::MalformedExpression(term.to_string()));
        }
        Ok(dice(roller, sides, num, 0))
    } else {
        term.parse()
            .map_err(|_| DiceError::MalformedExpression(term.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FixedRoller;

    #[test]
    fn test_dice_with_fixed_roller() {
        let mut roller = FixedRoller(2);
        assert_eq!(dice(&mut roller, 3, 1, 0), 2);
        assert_eq!(dice(&mut roller, 3, 2, 0), 4);
        assert_eq!(dice(&mut roller, 3, 2, 1), 5);
        assert_eq!(d100(&mut roller), 2);
    }

    #[test]
    fn test_formula_chains() {
        let mut roller = FixedRoller(2);
        assert_eq!(eval_formula(&mut roller, "1d3").unwrap(), 2);
        assert_eq!(eval_formula(&mut roller, "2d3").unwrap(), 4);
        assert_eq!(eval_formula(&mut roller, "2d3+1").unwrap(), 5);
        assert_eq!(eval_formula(&mut roller, "2d3-1").unwrap(), 3);
        assert_eq!(eval_formula(&mut roller, "2d3-1+2").unwrap(), 5);
        assert_eq!(eval_formula(&mut roller, "1d6+2-1d4").unwrap(), 2 + 2 - 2);
        assert_eq!(eval_formula(&mut roller, "5").unwrap(), 5);
        assert_eq!(eval_formula(&mut roller, "-3+1d4").unwrap(), -1);
    }

    #[test]
    fn test_formula_ignores_whitespace() {
        let mut roller = FixedRoller(1);
        assert_eq!(eval_formula(&mut roller, " 1d4 + 2 ").unwrap(), 3);
    }

    #[test]
    fn test_malformed_formulas() {
        let mut roller = FixedRoller(1);
        for bad in ["", "+", "1d", "d6", "1dx", "fish", "1d6+weapon", "2d3++1"] {
            assert!(
                matches!(
                    eval_formula(&mut roller, bad),
                    Err(DiceError::MalformedExpression(_))
                ),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_roll_within_bounds() {
        let mut roller = RngRoller::from_entropy();
        for _ in 0..100 {
            let result = eval_formula(&mut roller, "2d6+3").unwrap();
            assert!((5..=15).contains(&result));
        }
    }
}

//! Fixed-point arithmetic on WAD-scaled `U256` values.
//!
//! Every fraction in the engine is an integer scaled by [`WAD`] (1e18 = 100%).
//! Products are always formed before quotients, and every division goes
//! through [`mul_div`] so the rounding direction is chosen in one place:
//! cost paths round [`RoundingDirection::Up`], refund paths round
//! [`RoundingDirection::Down`].

use alloy_primitives::U256;

use crate::error::{CurveError, Result};

/// 1.0 in fixed-point (1e18)
pub const WAD: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Seconds in one day, the unit the adaptive rate is configured in
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Direction in which a division result is rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundingDirection {
    /// Round toward positive infinity
    Up,
    /// Round toward zero
    Down,
}

/// Checked multiplication.
pub fn mul(x: U256, y: U256) -> Result<U256> {
    x.checked_mul(y).ok_or(CurveError::ArithmeticOverflow)
}

/// Checked addition.
pub fn add(x: U256, y: U256) -> Result<U256> {
    x.checked_add(y).ok_or(CurveError::ArithmeticOverflow)
}

/// Computes `x * y / denominator` with the product formed first.
pub fn mul_div(x: U256, y: U256, denominator: U256, rounding: RoundingDirection) -> Result<U256> {
    div(mul(x, y)?, denominator, rounding)
}

/// Divides `numerator` by `denominator`, rounding in the given direction.
pub fn div(numerator: U256, denominator: U256, rounding: RoundingDirection) -> Result<U256> {
    if denominator.is_zero() {
        return Err(CurveError::DivisionByZero);
    }

    let quotient = numerator / denominator;
    match rounding {
        RoundingDirection::Down => Ok(quotient),
        RoundingDirection::Up => {
            if (numerator % denominator).is_zero() {
                Ok(quotient)
            } else {
                add(quotient, U256::from(1))
            }
        }
    }
}

/// `x * y / WAD`
pub fn w_mul(x: U256, y: U256, rounding: RoundingDirection) -> Result<U256> {
    mul_div(x, y, WAD, rounding)
}

/// Returns `x - y` if positive, otherwise zero
pub fn zero_floor_sub(x: U256, y: U256) -> U256 {
    x.saturating_sub(y)
}

/// Fixed-point exponentiation: `(base / WAD)^exp` in WAD.
///
/// Binary exponentiation, rounding each step down. `base` must not exceed
/// [`WAD`], so every intermediate stays below `WAD^2`.
pub fn w_pow(base: U256, exp: u64) -> Result<U256> {
    let mut result = WAD;
    let mut b = base;
    let mut e = exp;

    while e > 0 {
        if e & 1 == 1 {
            result = w_mul(result, b, RoundingDirection::Down)?;
        }
        e >>= 1;
        if e > 0 {
            b = w_mul(b, b, RoundingDirection::Down)?;
        }
    }

    Ok(result)
}

/// Builds a WAD-scaled value from a fraction expressed in parts per million.
///
/// `from_ppm(52_500)` is 5.25%.
pub fn from_ppm(ppm: u64) -> U256 {
    U256::from(ppm) * U256::from(1_000_000_000_000u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_rounding() {
        let seven = U256::from(7);
        let two = U256::from(2);
        assert_eq!(
            mul_div(seven, U256::from(1), two, RoundingDirection::Down).unwrap(),
            U256::from(3)
        );
        assert_eq!(
            mul_div(seven, U256::from(1), two, RoundingDirection::Up).unwrap(),
            U256::from(4)
        );
    }

    #[test]
    fn test_mul_div_exact_does_not_round_up() {
        let result = mul_div(U256::from(6), U256::from(4), U256::from(3), RoundingDirection::Up);
        assert_eq!(result.unwrap(), U256::from(8));
    }

    #[test]
    fn test_div_by_zero() {
        let result = div(WAD, U256::ZERO, RoundingDirection::Down);
        assert_eq!(result, Err(CurveError::DivisionByZero));
    }

    #[test]
    fn test_mul_overflow() {
        assert_eq!(mul(U256::MAX, U256::from(2)), Err(CurveError::ArithmeticOverflow));
    }

    #[test]
    fn test_w_mul_rounding() {
        let half = WAD / U256::from(2);
        assert_eq!(w_mul(half, half, RoundingDirection::Down).unwrap(), WAD / U256::from(4));
        let third = WAD / U256::from(3);
        assert_eq!(
            w_mul(third, third, RoundingDirection::Up).unwrap(),
            w_mul(third, third, RoundingDirection::Down).unwrap() + U256::from(1)
        );
    }

    #[test]
    fn test_w_pow_identities() {
        let half = WAD / U256::from(2);
        assert_eq!(w_pow(half, 0).unwrap(), WAD);
        assert_eq!(w_pow(half, 1).unwrap(), half);
        assert_eq!(w_pow(half, 3).unwrap(), WAD / U256::from(8));
        assert_eq!(w_pow(WAD, 1_000_000).unwrap(), WAD);
        assert_eq!(w_pow(U256::ZERO, 5).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_w_pow_decreases_with_exponent() {
        let base = WAD - U256::from(1_000_000_000_000u64);
        let one_day = w_pow(base, SECONDS_PER_DAY).unwrap();
        let two_days = w_pow(base, 2 * SECONDS_PER_DAY).unwrap();
        assert!(two_days < one_day);
        assert!(one_day < WAD);
    }

    #[test]
    fn test_zero_floor_sub() {
        assert_eq!(zero_floor_sub(U256::from(5), U256::from(3)), U256::from(2));
        assert_eq!(zero_floor_sub(U256::from(3), U256::from(5)), U256::ZERO);
    }

    #[test]
    fn test_from_ppm() {
        assert_eq!(from_ppm(1_000_000), WAD);
        assert_eq!(from_ppm(52_500), U256::from(52_500_000_000_000_000u64));
    }
}

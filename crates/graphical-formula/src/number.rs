//! Numeric values produced by formula evaluation
//!
//! Integers stay exact 64-bit integers until an operation overflows, at which
//! point the computation continues in [`Decimal`]. Anything with a fractional
//! part (decimal literals, true division, fractional powers) is a `Decimal`.

use crate::error::{FormulaError, FormulaResult};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, MathematicalOps};
use std::fmt;

/// A number produced by evaluating a formula
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Integer(i64),
    Decimal(Decimal),
}

impl Number {
    /// Convert a binary float, failing on NaN and infinities
    pub fn try_from_f64(value: f64) -> FormulaResult<Number> {
        Decimal::from_f64(value)
            .map(Number::Decimal)
            .ok_or_else(|| FormulaError::Evaluation(format!("{} is not a finite number", value)))
    }

    /// Exact decimal view of this number
    pub fn to_decimal(self) -> Decimal {
        match self {
            Number::Integer(i) => Decimal::from(i),
            Number::Decimal(d) => d,
        }
    }

    /// Lossy float view, for extension functions working on `f64`
    pub fn to_f64(self) -> f64 {
        match self {
            Number::Integer(i) => i as f64,
            Number::Decimal(d) => d.to_f64().unwrap_or(f64::NAN),
        }
    }

    /// The value as an integer, if it has no fractional part
    pub fn as_integer(self) -> Option<i64> {
        match self {
            Number::Integer(i) => Some(i),
            Number::Decimal(d) if d.fract().is_zero() => d.to_i64(),
            Number::Decimal(_) => None,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Integer(i) => i == 0,
            Number::Decimal(d) => d.is_zero(),
        }
    }

    pub fn add(self, rhs: Number) -> FormulaResult<Number> {
        integer_or_decimal(self, rhs, i64::checked_add, Decimal::checked_add, "+")
    }

    pub fn sub(self, rhs: Number) -> FormulaResult<Number> {
        integer_or_decimal(self, rhs, i64::checked_sub, Decimal::checked_sub, "-")
    }

    pub fn mul(self, rhs: Number) -> FormulaResult<Number> {
        integer_or_decimal(self, rhs, i64::checked_mul, Decimal::checked_mul, "*")
    }

    /// True division; always yields a decimal
    pub fn div(self, rhs: Number) -> FormulaResult<Number> {
        if rhs.is_zero() {
            return Err(division_by_zero());
        }
        self.to_decimal()
            .checked_div(rhs.to_decimal())
            .map(Number::Decimal)
            .ok_or_else(|| overflow("/"))
    }

    /// Floor division (`//`), rounding toward negative infinity
    pub fn floor_div(self, rhs: Number) -> FormulaResult<Number> {
        if rhs.is_zero() {
            return Err(division_by_zero());
        }
        if let (Number::Integer(l), Number::Integer(r)) = (self, rhs) {
            if let (Some(q), Some(m)) = (l.checked_div(r), l.checked_rem(r)) {
                let q = if m != 0 && ((m < 0) != (r < 0)) { q - 1 } else { q };
                return Ok(Number::Integer(q));
            }
        }
        self.to_decimal()
            .checked_div(rhs.to_decimal())
            .map(|q| Number::Decimal(q.floor()))
            .ok_or_else(|| overflow("//"))
    }

    /// Modulo (`%`); the result takes the sign of the divisor
    pub fn rem(self, rhs: Number) -> FormulaResult<Number> {
        if rhs.is_zero() {
            return Err(division_by_zero());
        }
        if let (Number::Integer(l), Number::Integer(r)) = (self, rhs) {
            if let Some(m) = l.checked_rem(r) {
                let m = if m != 0 && ((m < 0) != (r < 0)) { m + r } else { m };
                return Ok(Number::Integer(m));
            }
        }
        let (l, r) = (self.to_decimal(), rhs.to_decimal());
        let m = l.checked_rem(r).ok_or_else(|| overflow("%"))?;
        if !m.is_zero() && (m.is_sign_negative() != r.is_sign_negative()) {
            m.checked_add(r)
                .map(Number::Decimal)
                .ok_or_else(|| overflow("%"))
        } else {
            Ok(Number::Decimal(m))
        }
    }

    /// Exponentiation (`**`)
    pub fn pow(self, rhs: Number) -> FormulaResult<Number> {
        if let (Number::Integer(base), Number::Integer(exp)) = (self, rhs) {
            if let Ok(exp) = u32::try_from(exp) {
                if let Some(value) = base.checked_pow(exp) {
                    return Ok(Number::Integer(value));
                }
            }
        }
        let base = self.to_decimal();
        let exp = rhs.to_decimal();
        if base.is_zero() && exp.is_sign_negative() {
            return Err(division_by_zero());
        }
        if base.is_sign_negative() && !exp.fract().is_zero() {
            return Err(FormulaError::Evaluation(
                "negative number cannot be raised to a fractional power".into(),
            ));
        }
        let result = match rhs.as_integer() {
            Some(exp) => base.checked_powi(exp),
            None => base.checked_powd(exp),
        };
        match result {
            Some(value) => Ok(Number::Decimal(value)),
            // Too small to represent: rounds to zero
            None if (base.abs() < Decimal::ONE) != exp.is_sign_negative()
                && base.abs() != Decimal::ONE =>
            {
                Ok(Number::Decimal(Decimal::ZERO))
            }
            None => Err(overflow("**")),
        }
    }

    pub fn neg(self) -> FormulaResult<Number> {
        match self {
            Number::Integer(i) => Ok(i
                .checked_neg()
                .map(Number::Integer)
                .unwrap_or_else(|| Number::Decimal(-Decimal::from(i)))),
            Number::Decimal(d) => Ok(Number::Decimal(-d)),
        }
    }
}

fn integer_or_decimal(
    lhs: Number,
    rhs: Number,
    int_op: fn(i64, i64) -> Option<i64>,
    dec_op: fn(Decimal, Decimal) -> Option<Decimal>,
    symbol: &str,
) -> FormulaResult<Number> {
    if let (Number::Integer(l), Number::Integer(r)) = (lhs, rhs) {
        if let Some(value) = int_op(l, r) {
            return Ok(Number::Integer(value));
        }
    }
    dec_op(lhs.to_decimal(), rhs.to_decimal())
        .map(Number::Decimal)
        .ok_or_else(|| overflow(symbol))
}

fn division_by_zero() -> FormulaError {
    FormulaError::Evaluation("division by zero".into())
}

fn overflow(symbol: &str) -> FormulaError {
    FormulaError::Evaluation(format!("numeric overflow in '{}'", symbol))
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Integer(l), Number::Integer(r)) => l == r,
            _ => self.to_decimal() == other.to_decimal(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Decimal(d) => {
                let d = d.normalize();
                if d.scale() == 0 {
                    write!(f, "{}.0", d)
                } else {
                    write!(f, "{}", d)
                }
            }
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Integer(value)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::Integer(value.into())
    }
}

impl From<u32> for Number {
    fn from(value: u32) -> Self {
        Number::Integer(value.into())
    }
}

impl From<Decimal> for Number {
    fn from(value: Decimal) -> Self {
        Number::Decimal(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Number {
        Number::Decimal(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn test_integer_arithmetic_stays_integer() {
        let n = Number::from(6).mul(Number::from(7)).unwrap();
        assert!(matches!(n, Number::Integer(42)));
    }

    #[test]
    fn test_overflow_promotes_to_decimal() {
        let n = Number::from(i64::MAX).add(Number::from(1)).unwrap();
        assert!(matches!(n, Number::Decimal(_)));
        assert_eq!(n.to_string(), "9223372036854775808.0");
    }

    #[test]
    fn test_true_division() {
        let n = Number::from(3).div(Number::from(2)).unwrap();
        assert_eq!(n, dec("1.5"));
        let n = Number::from(6).div(Number::from(2)).unwrap();
        assert_eq!(n, Number::from(3));
        assert_eq!(n.to_string(), "3.0");
    }

    #[test]
    fn test_division_by_zero() {
        assert!(Number::from(1).div(Number::from(0)).is_err());
        assert!(Number::from(1).floor_div(Number::from(0)).is_err());
        assert!(Number::from(1).rem(Number::from(0)).is_err());
    }

    #[test]
    fn test_floor_division_and_modulo_follow_divisor_sign() {
        assert_eq!(Number::from(7).floor_div(Number::from(2)).unwrap(), Number::from(3));
        assert_eq!(Number::from(-7).floor_div(Number::from(2)).unwrap(), Number::from(-4));
        assert_eq!(Number::from(-7).rem(Number::from(3)).unwrap(), Number::from(2));
        assert_eq!(Number::from(7).rem(Number::from(-3)).unwrap(), Number::from(-2));
        assert_eq!(dec("7.5").rem(Number::from(2)).unwrap(), dec("1.5"));
    }

    #[test]
    fn test_power() {
        assert_eq!(Number::from(2).pow(Number::from(10)).unwrap(), Number::from(1024));
        assert_eq!(Number::from(2).pow(Number::from(-1)).unwrap(), dec("0.5"));
        assert!(Number::from(0).pow(Number::from(-1)).is_err());
        assert_eq!(dec("-8").pow(Number::from(2)).unwrap(), Number::from(64));
    }

    #[test]
    fn test_negative_base_fractional_exponent() {
        let err = Number::from(-8).pow(dec("0.5")).unwrap_err();
        assert!(err.is_evaluation_fault());
        assert!(err.to_string().contains("fractional power"));
        assert_eq!(Number::from(-2).pow(dec("3.0")).unwrap(), Number::from(-8));
    }

    #[test]
    fn test_power_underflow_rounds_to_zero() {
        let tiny = dec("0.5").pow(dec("70000000000000000000.5")).unwrap();
        assert_eq!(tiny, Number::from(0));
        let tiny = Number::from(10).pow(dec("-70000000000000000000.5")).unwrap();
        assert_eq!(tiny, Number::from(0));

        let err = Number::from(10).pow(dec("70000000000000000000.5")).unwrap_err();
        assert!(err.to_string().contains("overflow"));
    }

    #[test]
    fn test_cross_representation_equality() {
        assert_eq!(dec("6.00"), Number::from(6));
        assert_ne!(dec("6.28"), Number::from(6));
    }

    #[test]
    fn test_display() {
        assert_eq!(dec("6.280").to_string(), "6.28");
        assert_eq!(Number::from(-4).to_string(), "-4");
    }

    #[test]
    fn test_float_conversion() {
        assert!(Number::try_from_f64(f64::NAN).is_err());
        assert_eq!(Number::try_from_f64(0.5).unwrap(), dec("0.5"));
    }
}

//! 滑点保护：根据期望数量和滑点百分比计算可接受的最小数量

use crate::common::error::{ClmmError, ClmmResult};
use crate::common::types::{BaseUnitAmount, Decimal};
use bigdecimal::RoundingMode;
use num_bigint::{BigInt, Sign};
use num_traits::{One, Zero};

/// Returns `1 - slippage_percent / 100`, failing unless it lies in `(0, 1]`.
pub fn validate_slippage(slippage_percent: &Decimal) -> ClmmResult<Decimal> {
    let ratio = Decimal::one() - slippage_percent * Decimal::new(BigInt::one(), 2);
    if ratio <= Decimal::zero() || ratio > Decimal::one() {
        return Err(ClmmError::InvalidSlippage(slippage_percent.to_string()));
    }
    Ok(ratio)
}

/// `floor(desired * (1 - slippage_percent / 100))`
pub fn minimum_amount(
    desired: &BaseUnitAmount,
    slippage_percent: &Decimal,
) -> ClmmResult<BaseUnitAmount> {
    let ratio = validate_slippage(slippage_percent)?;
    let desired = Decimal::new(BigInt::from_biguint(Sign::Plus, desired.clone()), 0);
    let (minimum, _) = (desired * ratio)
        .with_scale_round(0, RoundingMode::Floor)
        .into_bigint_and_exponent();
    minimum
        .to_biguint()
        .ok_or_else(|| ClmmError::InvalidSlippage(slippage_percent.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_one_percent() {
        let minimum = minimum_amount(&BigUint::from(1000u32), &dec("1")).unwrap();
        assert_eq!(minimum, BigUint::from(990u32));
    }

    #[test]
    fn test_zero_slippage_is_identity() {
        let desired = BigUint::from(123_456_789u64);
        assert_eq!(minimum_amount(&desired, &dec("0")).unwrap(), desired);
    }

    #[test]
    fn test_floors_fractional_result() {
        // 999 * 0.995 = 994.005
        let minimum = minimum_amount(&BigUint::from(999u32), &dec("0.5")).unwrap();
        assert_eq!(minimum, BigUint::from(994u32));
        assert_eq!(minimum_amount(&BigUint::from(1u32), &dec("99.99")).unwrap(), BigUint::zero());
    }

    #[test]
    fn test_rejects_out_of_range() {
        for bad in ["100", "-5", "150", "-0.0001"] {
            assert!(
                matches!(
                    minimum_amount(&BigUint::from(1000u32), &dec(bad)),
                    Err(ClmmError::InvalidSlippage(_))
                ),
                "slippage {bad} should be rejected"
            );
        }
    }
}

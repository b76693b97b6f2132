//! 定点数学：人类可读价格/数量 ↔ 协议整数表示
//!
//! 所有十进制计算都使用 `BigDecimal`，只有在最终转换为整数时才取整。
//! 对数与平方根同样在十进制精度下计算，避免原生浮点在 tick 边界处漂移。

use crate::common::error::{ClmmError, ClmmResult};
use crate::common::fee_tier::FeeTier;
use crate::common::types::{BaseUnitAmount, Decimal, SqrtPriceX64, TickIndex};
use crate::constants::{
    DECIMAL_PRECISION, MAX_SQRT_PRICE_X64, MAX_TICK, MIN_SQRT_PRICE_X64, MIN_TICK, Q64, RESOLUTION,
    TICK_BASE,
};
use crate::utils::calc::clmm_math::tick_math;
use bigdecimal::RoundingMode;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, ToPrimitive, Zero};
use once_cell::sync::Lazy;
use std::str::FromStr;

/// ln(1.0001)
static LN_TICK_BASE: Lazy<Decimal> = Lazy::new(|| {
    let base = Decimal::from_str(TICK_BASE).unwrap_or_else(|_| Decimal::one());
    ln_positive(&base)
});

/// 计算结果与最近整数的差距小于该值时视为整数 (1e-40)
static TICK_SNAP_EPSILON: Lazy<Decimal> = Lazy::new(|| Decimal::new(BigInt::one(), 40));

/// `10^exp` as an exact decimal (exp may be negative).
pub fn pow10(exp: i64) -> Decimal {
    Decimal::new(BigInt::one(), -exp)
}

fn q64() -> Decimal {
    Decimal::new(BigInt::from(Q64), 0)
}

fn to_decimal(value: &BigUint) -> Decimal {
    Decimal::new(BigInt::from_biguint(Sign::Plus, value.clone()), 0)
}

/// Converts an already-integral, non-negative decimal into a `BigUint`.
fn integral_to_biguint(value: &Decimal) -> Option<BigUint> {
    let (int_val, scale) = value.with_scale(0).into_bigint_and_exponent();
    debug_assert_eq!(scale, 0);
    int_val.to_biguint()
}

fn ensure_positive_price(price: &Decimal) -> ClmmResult<()> {
    if price <= &Decimal::zero() {
        return Err(ClmmError::InvalidPrice(price.to_string()));
    }
    Ok(())
}

/// `amount * 10^decimals`，四舍五入（half-up）到整数
pub fn scale_up(amount: &Decimal, decimals: u8) -> ClmmResult<BaseUnitAmount> {
    if amount.sign() == Sign::Minus {
        return Err(ClmmError::InvalidAmount(amount.to_string()));
    }
    let scaled = (amount * pow10(decimals as i64)).with_scale_round(0, RoundingMode::HalfUp);
    integral_to_biguint(&scaled).ok_or_else(|| ClmmError::InvalidAmount(amount.to_string()))
}

/// `amount / 10^decimals`, exact.
pub fn scale_down(amount: &BaseUnitAmount, decimals: u8) -> Decimal {
    Decimal::new(BigInt::from_biguint(Sign::Plus, amount.clone()), decimals as i64)
}

/// Human price (B per A) → base-unit ratio: `price * 10^(decimals_b - decimals_a)`.
fn effective_ratio(price: &Decimal, decimals_a: u8, decimals_b: u8) -> Decimal {
    price * pow10(decimals_b as i64 - decimals_a as i64)
}

/// 协议可接受的 sqrt price 区间 `[MIN_SQRT_PRICE_X64, MAX_SQRT_PRICE_X64)`
pub fn ensure_sqrt_price_in_range(sqrt_price_x64: &SqrtPriceX64) -> ClmmResult<()> {
    let raw = sqrt_price_x64.to_u128().unwrap_or(u128::MAX);
    if !(MIN_SQRT_PRICE_X64..MAX_SQRT_PRICE_X64).contains(&raw) {
        return Err(ClmmError::SqrtPriceOutOfRange(raw));
    }
    Ok(())
}

/// `floor(sqrt(price * 10^(decimals_b - decimals_a)) * 2^64)`
///
/// Fails with `SqrtPriceOutOfRange` when the result is outside the protocol range.
pub fn price_to_sqrt_price_x64(
    price: &Decimal,
    decimals_a: u8,
    decimals_b: u8,
) -> ClmmResult<SqrtPriceX64> {
    ensure_positive_price(price)?;
    let ratio = effective_ratio(price, decimals_a, decimals_b);
    let root = ratio.sqrt().ok_or_else(|| ClmmError::InvalidPrice(price.to_string()))?;
    let scaled = (root * q64()).with_scale_round(0, RoundingMode::Floor);
    let sqrt_price = integral_to_biguint(&scaled)
        .ok_or_else(|| ClmmError::InvalidPrice(price.to_string()))?;
    ensure_sqrt_price_in_range(&sqrt_price)?;
    Ok(sqrt_price)
}

/// Inverse of [`price_to_sqrt_price_x64`]: `(sqrt / 2^64)^2 * 10^(decimals_a - decimals_b)`.
pub fn sqrt_price_x64_to_price(
    sqrt_price_x64: &SqrtPriceX64,
    decimals_a: u8,
    decimals_b: u8,
) -> ClmmResult<Decimal> {
    if sqrt_price_x64.is_zero() {
        return Err(ClmmError::InvalidPrice("zero sqrt price".to_string()));
    }
    let numerator = to_decimal(&(sqrt_price_x64 * sqrt_price_x64));
    let denominator = to_decimal(&(BigUint::one() << (2 * RESOLUTION)));
    let ratio = numerator / denominator;
    Ok(ratio * pow10(decimals_a as i64 - decimals_b as i64))
}

/// `floor(ln(price * 10^(decimals_b - decimals_a)) / ln(1.0001))`
pub fn price_to_tick_index(
    price: &Decimal,
    decimals_a: u8,
    decimals_b: u8,
) -> ClmmResult<TickIndex> {
    ensure_positive_price(price)?;
    let ratio = effective_ratio(price, decimals_a, decimals_b);
    let exact = ln_positive(&ratio) / &*LN_TICK_BASE;

    // 精确落在 tick 上的价格在对数误差下可能略小于整数，先贴近最近整数
    let nearest = exact.with_scale_round(0, RoundingMode::HalfUp);
    let tick = if (&exact - &nearest).abs() < *TICK_SNAP_EPSILON {
        nearest
    } else {
        exact.with_scale_round(0, RoundingMode::Floor)
    };

    let tick = tick.to_i64().ok_or_else(|| ClmmError::InvalidPrice(price.to_string()))?;
    if tick < MIN_TICK as i64 || tick > MAX_TICK as i64 {
        return Err(ClmmError::TickOutOfRange(tick));
    }
    Ok(tick as TickIndex)
}

/// Protocol-exact sqrt price for a tick.
pub fn tick_index_to_sqrt_price_x64(tick: TickIndex) -> ClmmResult<SqrtPriceX64> {
    tick_math::tick_index_to_sqrt_price_x64(tick).map(BigUint::from)
}

/// Greatest tick whose sqrt price does not exceed `sqrt_price_x64`.
pub fn sqrt_price_x64_to_tick_index(sqrt_price_x64: &SqrtPriceX64) -> ClmmResult<TickIndex> {
    let raw = sqrt_price_x64
        .to_u128()
        .ok_or(ClmmError::SqrtPriceOutOfRange(u128::MAX))?;
    tick_math::sqrt_price_x64_to_tick_index(raw)
}

pub fn tick_index_to_price(tick: TickIndex, decimals_a: u8, decimals_b: u8) -> ClmmResult<Decimal> {
    let sqrt_price = tick_index_to_sqrt_price_x64(tick)?;
    sqrt_price_x64_to_price(&sqrt_price, decimals_a, decimals_b)
}

/// `tick -= tick % tick_spacing`，向零取整到 tick spacing 的倍数
pub fn snap_tick(tick: TickIndex, fee_tier: &FeeTier) -> TickIndex {
    snap_tick_to_spacing(tick, fee_tier.tick_spacing)
}

pub fn snap_tick_to_spacing(tick: TickIndex, tick_spacing: u32) -> TickIndex {
    if tick_spacing == 0 {
        return tick;
    }
    let tick = tick as i64;
    (tick - tick % tick_spacing as i64) as TickIndex
}

/// `value * 2^64`
pub fn to_x64(value: &BigUint) -> BigUint {
    value << RESOLUTION
}

/// `value / 2^64`, truncated.
pub fn from_x64(value: &BigUint) -> BigUint {
    value >> RESOLUTION
}

/// `value / 2^64`, rounded up.
pub fn from_x64_ceil(value: &BigUint) -> BigUint {
    let truncated = from_x64(value);
    if to_x64(&truncated) == *value { truncated } else { truncated + 1u32 }
}

/// Natural logarithm of a positive decimal.
///
/// Square-root range reduction until the argument is within 1% of one,
/// then `ln(y) = 2 * atanh((y - 1) / (y + 1))`.
fn ln_positive(x: &Decimal) -> Decimal {
    let one = Decimal::one();
    let lower = Decimal::new(BigInt::from(99), 2);
    let upper = Decimal::new(BigInt::from(101), 2);

    let mut y = x.clone();
    let mut halvings = 0u32;
    while y > upper || y < lower {
        y = match y.sqrt() {
            Some(root) => root.with_prec(DECIMAL_PRECISION),
            None => break,
        };
        halvings += 1;
    }

    let z = ((&y - &one) / (&y + &one)).with_prec(DECIMAL_PRECISION);
    let z_squared = (&z * &z).with_prec(DECIMAL_PRECISION);
    let epsilon = Decimal::new(BigInt::one(), DECIMAL_PRECISION as i64 + 5);

    let mut sum = z.clone();
    let mut power = z;
    let mut denominator = 1u64;
    loop {
        power = (&power * &z_squared).with_prec(DECIMAL_PRECISION);
        denominator += 2;
        let term = &power / Decimal::from(denominator);
        if term.abs() < epsilon {
            break;
        }
        sum += term;
    }

    (sum * Decimal::from(1u64 << (halvings + 1))).with_prec(DECIMAL_PRECISION)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_scale_up_rounds_to_nearest() {
        assert_eq!(scale_up(&dec("1.23456"), 6).unwrap(), BigUint::from(1_234_560u32));
        assert_eq!(scale_up(&dec("0.0000005"), 6).unwrap(), BigUint::from(1u32));
        assert_eq!(scale_up(&dec("0.0000004"), 6).unwrap(), BigUint::zero());
        assert_eq!(scale_up(&dec("0"), 9).unwrap(), BigUint::zero());
    }

    #[test]
    fn test_scale_up_large_amount() {
        let amount = dec("340282366920938463463374607431.768211456");
        let expected = BigUint::from_str("340282366920938463463374607431768211456").unwrap();
        assert_eq!(scale_up(&amount, 9).unwrap(), expected);
    }

    #[test]
    fn test_scale_up_rejects_negative() {
        assert!(matches!(scale_up(&dec("-1"), 6), Err(ClmmError::InvalidAmount(_))));
    }

    #[test]
    fn test_scale_down() {
        assert_eq!(scale_down(&BigUint::from(1_234_560u32), 6), dec("1.23456"));
    }

    #[test]
    fn test_price_one_is_q64() {
        assert_eq!(price_to_sqrt_price_x64(&dec("1"), 9, 9).unwrap(), BigUint::from(Q64));
        assert_eq!(price_to_sqrt_price_x64(&dec("100"), 6, 6).unwrap(), BigUint::from(10 * Q64));
        // 1 A = 1 B，B 精度多 2 位 → 原始比率 100
        assert_eq!(price_to_sqrt_price_x64(&dec("1"), 6, 8).unwrap(), BigUint::from(10 * Q64));
    }

    #[test]
    fn test_price_to_sqrt_price_rejects_non_positive() {
        for bad in ["0", "-2"] {
            assert!(matches!(
                price_to_sqrt_price_x64(&dec(bad), 6, 6),
                Err(ClmmError::InvalidPrice(_))
            ));
        }
        assert!(matches!(price_to_tick_index(&dec("0"), 6, 6), Err(ClmmError::InvalidPrice(_))));
    }

    #[test]
    fn test_price_to_sqrt_price_rejects_out_of_range() {
        assert!(matches!(
            price_to_sqrt_price_x64(&dec("1e-40"), 6, 6),
            Err(ClmmError::SqrtPriceOutOfRange(0))
        ));
        assert!(matches!(
            price_to_sqrt_price_x64(&dec("1e40"), 6, 6),
            Err(ClmmError::SqrtPriceOutOfRange(u128::MAX))
        ));
        assert!(ensure_sqrt_price_in_range(&BigUint::from(MIN_SQRT_PRICE_X64)).is_ok());
        assert!(ensure_sqrt_price_in_range(&BigUint::from(MIN_SQRT_PRICE_X64 - 1)).is_err());
        assert!(ensure_sqrt_price_in_range(&BigUint::from(MAX_SQRT_PRICE_X64)).is_err());
    }

    #[test]
    fn test_sqrt_price_to_price() {
        assert_eq!(sqrt_price_x64_to_price(&BigUint::from(Q64), 9, 9).unwrap(), dec("1"));
        assert_eq!(sqrt_price_x64_to_price(&BigUint::from(10 * Q64), 6, 8).unwrap(), dec("1"));
        assert!(sqrt_price_x64_to_price(&BigUint::zero(), 6, 6).is_err());
    }

    #[test]
    fn test_price_to_tick_index() {
        assert_eq!(price_to_tick_index(&dec("1"), 6, 6).unwrap(), 0);
        assert_eq!(price_to_tick_index(&dec("1.0001"), 6, 6).unwrap(), 1);
        assert_eq!(price_to_tick_index(&dec("1.00020001"), 6, 6).unwrap(), 2);
        assert_eq!(price_to_tick_index(&dec("2"), 6, 6).unwrap(), 6931);
        assert_eq!(price_to_tick_index(&dec("0.5"), 6, 6).unwrap(), -6932);
        // 1 SUI(9) = 1.5 USDC(6) → ratio 0.0015
        assert_eq!(price_to_tick_index(&dec("1.5"), 9, 6).unwrap(), -65027);
    }

    #[test]
    fn test_tick_index_to_price_matches_curve() {
        let price = tick_index_to_price(6931, 6, 6).unwrap();
        assert!(price > dec("1.9998") && price < dec("2"));
        assert_eq!(tick_index_to_price(0, 6, 6).unwrap(), dec("1"));
    }

    #[test]
    fn test_snap_tick_toward_zero() {
        let tier = FeeTier::new("FEE3000BPS", 60).unwrap();
        assert_eq!(snap_tick(125, &tier), 120);
        assert_eq!(snap_tick(-125, &tier), -120);
        assert_eq!(snap_tick(-60, &tier), -60);
        assert_eq!(snap_tick(59, &tier), 0);
        assert_eq!(snap_tick(snap_tick(-65027, &tier), &tier), -64980);
    }

    #[test]
    fn test_x64_helpers() {
        let one = BigUint::one();
        assert_eq!(to_x64(&one), BigUint::from(Q64));
        assert_eq!(from_x64(&BigUint::from(Q64 + 1)), one);
        assert_eq!(from_x64_ceil(&BigUint::from(Q64 + 1)), BigUint::from(2u32));
        assert_eq!(from_x64_ceil(&BigUint::from(Q64)), one);
        assert_eq!(from_x64(&BigUint::from(Q64 - 1)), BigUint::zero());
    }

    #[test]
    fn test_ln_matches_known_values() {
        let ln2 = ln_positive(&dec("2"));
        let expected = dec("0.69314718055994530941723212145817656807550013436025525412068");
        assert!((ln2 - expected).abs() < dec("1e-50"));
        assert_eq!(ln_positive(&dec("1")), Decimal::zero());
    }
}

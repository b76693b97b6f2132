//! 流动性 ↔ 代币数量
//!
//! 按当前价格相对区间 [lower, upper) 的位置分三种情况计算。
//! sqrt price 直接作为任意精度整数参与运算，只在最终结果取整。

use crate::common::error::{ClmmError, ClmmResult};
use crate::common::types::{BaseUnitAmount, Liquidity, SqrtPriceX64, TickIndex};
use crate::constants::DEFAULT_REFERENCE_LIQUIDITY;
use crate::utils::calc::fixed_point::{tick_index_to_sqrt_price_x64, to_x64};
use num_bigint::BigUint;
use num_traits::Zero;

/// Rounding applied to the final token amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rounding {
    /// 向上取整：提供流动性时的默认方式（至少需要的数量）
    #[default]
    Ceil,
    /// 向下取整：取回流动性/最小输出场景
    Floor,
}

/// Token amounts represented by a liquidity position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenAmounts {
    pub amount_a: BaseUnitAmount,
    pub amount_b: BaseUnitAmount,
}

fn div_round(numerator: &BigUint, denominator: &BigUint, rounding: Rounding) -> BigUint {
    let quotient = numerator / denominator;
    match rounding {
        Rounding::Floor => quotient,
        Rounding::Ceil => {
            if (numerator % denominator).is_zero() {
                quotient
            } else {
                quotient + 1u32
            }
        }
    }
}

fn validate_range(lower: &SqrtPriceX64, upper: &SqrtPriceX64) -> ClmmResult<()> {
    if lower.is_zero() {
        return Err(ClmmError::InvalidPrice("zero lower sqrt price".to_string()));
    }
    if lower >= upper {
        return Err(ClmmError::InvalidTickRange {
            lower: lower.to_string(),
            upper: upper.to_string(),
        });
    }
    Ok(())
}

/// `toX64(L) * (upper - lower) / (lower * upper)`
fn amount_a_delta(
    lower: &SqrtPriceX64,
    upper: &SqrtPriceX64,
    liquidity: &Liquidity,
    rounding: Rounding,
) -> BaseUnitAmount {
    let numerator = to_x64(liquidity) * (upper - lower);
    div_round(&numerator, &(lower * upper), rounding)
}

/// `fromX64(L * (upper - lower))`
fn amount_b_delta(
    lower: &SqrtPriceX64,
    upper: &SqrtPriceX64,
    liquidity: &Liquidity,
    rounding: Rounding,
) -> BaseUnitAmount {
    let numerator = liquidity * (upper - lower);
    div_round(&numerator, &to_x64(&BigUint::from(1u32)), rounding)
}

/// Token amounts for `liquidity` in the range `[lower, upper)` at `current`.
pub fn amounts_for_liquidity(
    current: &SqrtPriceX64,
    lower: &SqrtPriceX64,
    upper: &SqrtPriceX64,
    liquidity: &Liquidity,
    rounding: Rounding,
) -> ClmmResult<TokenAmounts> {
    validate_range(lower, upper)?;

    let amounts = if current < lower {
        TokenAmounts {
            amount_a: amount_a_delta(lower, upper, liquidity, rounding),
            amount_b: BigUint::zero(),
        }
    } else if current < upper {
        TokenAmounts {
            amount_a: amount_a_delta(current, upper, liquidity, rounding),
            amount_b: amount_b_delta(lower, current, liquidity, rounding),
        }
    } else {
        TokenAmounts {
            amount_a: BigUint::zero(),
            amount_b: amount_b_delta(lower, upper, liquidity, rounding),
        }
    };
    Ok(amounts)
}

/// Same as [`amounts_for_liquidity`] with the range given as ticks.
pub fn amounts_for_tick_range(
    current: &SqrtPriceX64,
    tick_lower: TickIndex,
    tick_upper: TickIndex,
    liquidity: &Liquidity,
    rounding: Rounding,
) -> ClmmResult<TokenAmounts> {
    if tick_lower >= tick_upper {
        return Err(ClmmError::InvalidTickRange {
            lower: tick_lower.to_string(),
            upper: tick_upper.to_string(),
        });
    }
    let lower = tick_index_to_sqrt_price_x64(tick_lower)?;
    let upper = tick_index_to_sqrt_price_x64(tick_upper)?;
    amounts_for_liquidity(current, &lower, &upper, liquidity, rounding)
}

/// 参考流动性（1e8）下的数量，仅用于预览
pub fn reference_amounts(
    current: &SqrtPriceX64,
    tick_lower: TickIndex,
    tick_upper: TickIndex,
) -> ClmmResult<TokenAmounts> {
    let liquidity = BigUint::from(DEFAULT_REFERENCE_LIQUIDITY);
    amounts_for_tick_range(current, tick_lower, tick_upper, &liquidity, Rounding::Ceil)
}

/// Largest liquidity fundable by `amount_a` and `amount_b`, rounded down.
pub fn liquidity_for_amounts(
    current: &SqrtPriceX64,
    lower: &SqrtPriceX64,
    upper: &SqrtPriceX64,
    amount_a: &BaseUnitAmount,
    amount_b: &BaseUnitAmount,
) -> ClmmResult<Liquidity> {
    validate_range(lower, upper)?;

    // L = a * lower * upper / ((upper - lower) * 2^64)
    let from_a = |lo: &BigUint, hi: &BigUint| amount_a * lo * hi / to_x64(&(hi - lo));
    // L = b * 2^64 / (upper - lower)
    let from_b = |lo: &BigUint, hi: &BigUint| to_x64(amount_b) / (hi - lo);

    let liquidity = if current <= lower {
        from_a(lower, upper)
    } else if current < upper {
        from_a(current, upper).min(from_b(lower, current))
    } else {
        from_b(lower, upper)
    };
    Ok(liquidity)
}

//! 流动性交易参数
//!
//! 所有数值在这里已经是协议整数表示；交给交易组装层后不再做任何取整或修改。

use crate::common::error::{ClmmError, ClmmResult};
use crate::common::fee_tier::FeeTier;
use crate::common::types::{BaseUnitAmount, Decimal, Liquidity, SqrtPriceX64, TickIndex};
use crate::constants::{MAX_TICK, MIN_TICK};
use crate::utils::calc::fixed_point::{price_to_tick_index, scale_up, snap_tick};
use crate::utils::calc::slippage::minimum_amount;
use serde::{Deserialize, Serialize};

/// Tick index in the protocol's `(magnitude, negative)` encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignedTick {
    pub magnitude: u32,
    pub negative: bool,
}

impl From<TickIndex> for SignedTick {
    fn from(tick: TickIndex) -> Self {
        Self { magnitude: tick.unsigned_abs(), negative: tick < 0 }
    }
}

impl SignedTick {
    /// Back to a native signed tick; fails outside `[MIN_TICK, MAX_TICK]`.
    pub fn to_tick(self) -> ClmmResult<TickIndex> {
        let magnitude = i64::from(self.magnitude);
        let tick = if self.negative { -magnitude } else { magnitude };
        if tick < i64::from(MIN_TICK) || tick > i64::from(MAX_TICK) {
            return Err(ClmmError::TickOutOfRange(tick));
        }
        Ok(tick as TickIndex)
    }
}

/// Desired amounts and their slippage floors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountBounds {
    pub amount_a: BaseUnitAmount,
    pub amount_b: BaseUnitAmount,
    pub amount_a_min: BaseUnitAmount,
    pub amount_b_min: BaseUnitAmount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePoolArgs {
    pub coin_type_a: String,
    pub coin_type_b: String,
    pub fee_type: String,
    pub initial_sqrt_price: SqrtPriceX64,
    pub tick_lower: SignedTick,
    pub tick_upper: SignedTick,
    pub amounts: AmountBounds,
    pub coins_a: Vec<String>,
    pub coins_b: Vec<String>,
    /// Unix 毫秒时间戳
    pub deadline: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLiquidityArgs {
    pub pool_id: String,
    pub coin_type_a: String,
    pub coin_type_b: String,
    pub fee_type: String,
    pub tick_lower: SignedTick,
    pub tick_upper: SignedTick,
    pub amounts: AmountBounds,
    pub coins_a: Vec<String>,
    pub coins_b: Vec<String>,
    pub deadline: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncreaseLiquidityArgs {
    pub pool_id: String,
    pub position_id: String,
    pub coin_type_a: String,
    pub coin_type_b: String,
    pub fee_type: String,
    pub amounts: AmountBounds,
    pub coins_a: Vec<String>,
    pub coins_b: Vec<String>,
    pub deadline: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecreaseLiquidityArgs {
    pub pool_id: String,
    pub position_id: String,
    pub coin_type_a: String,
    pub coin_type_b: String,
    pub fee_type: String,
    pub liquidity: Liquidity,
    pub amount_a_min: BaseUnitAmount,
    pub amount_b_min: BaseUnitAmount,
    pub deadline: u64,
}

/// 价格区间 → 按 tick spacing 对齐后的 tick 区间
pub fn tick_range_from_prices(
    lower_price: &Decimal,
    upper_price: &Decimal,
    decimals_a: u8,
    decimals_b: u8,
    fee_tier: &FeeTier,
) -> ClmmResult<(TickIndex, TickIndex)> {
    let tick_lower = snap_tick(price_to_tick_index(lower_price, decimals_a, decimals_b)?, fee_tier);
    let tick_upper = snap_tick(price_to_tick_index(upper_price, decimals_a, decimals_b)?, fee_tier);
    if tick_lower >= tick_upper {
        return Err(ClmmError::InvalidTickRange {
            lower: format!("{lower_price} (tick {tick_lower})"),
            upper: format!("{upper_price} (tick {tick_upper})"),
        });
    }
    Ok((tick_lower, tick_upper))
}

/// 人类可读数量 → 整数数量及其滑点下限
pub fn amount_bounds(
    amount_a: &Decimal,
    amount_b: &Decimal,
    decimals_a: u8,
    decimals_b: u8,
    slippage_percent: &Decimal,
) -> ClmmResult<AmountBounds> {
    let amount_a = scale_up(amount_a, decimals_a)?;
    let amount_b = scale_up(amount_b, decimals_b)?;
    Ok(AmountBounds {
        amount_a_min: minimum_amount(&amount_a, slippage_percent)?,
        amount_b_min: minimum_amount(&amount_b, slippage_percent)?,
        amount_a,
        amount_b,
    })
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
    fn test_signed_tick_encoding() {
        assert_eq!(SignedTick::from(-64980), SignedTick { magnitude: 64980, negative: true });
        assert_eq!(SignedTick::from(120), SignedTick { magnitude: 120, negative: false });
        assert_eq!(SignedTick::from(0), SignedTick { magnitude: 0, negative: false });
        assert_eq!(SignedTick::from(MIN_TICK).to_tick().unwrap(), MIN_TICK);
        assert_eq!(SignedTick::from(-64980).to_tick().unwrap(), -64980);
    }

    #[test]
    fn test_signed_tick_out_of_range() {
        let tick = SignedTick { magnitude: 500_000, negative: true };
        assert!(matches!(tick.to_tick(), Err(ClmmError::TickOutOfRange(-500_000))));
    }

    #[test]
    fn test_tick_range_is_snapped() {
        let tier = FeeTier::new("FEE3000BPS", 60).unwrap();
        let (lower, upper) = tick_range_from_prices(&dec("0.5"), &dec("2"), 9, 9, &tier).unwrap();
        // -6932 → -6900, 6931 → 6900
        assert_eq!((lower, upper), (-6900, 6900));
        assert_eq!(lower % 60, 0);
    }

    #[test]
    fn test_tick_range_rejects_collapsed_range() {
        let tier = FeeTier::new("FEE10000BPS", 200).unwrap();
        // 两个价格落在同一个 spacing 内
        let err = tick_range_from_prices(&dec("1.001"), &dec("1.002"), 6, 6, &tier).unwrap_err();
        assert!(matches!(err, ClmmError::InvalidTickRange { .. }));
        let err = tick_range_from_prices(&dec("2"), &dec("1"), 6, 6, &tier).unwrap_err();
        assert!(matches!(err, ClmmError::InvalidTickRange { .. }));
    }

    #[test]
    fn test_amount_bounds() {
        let bounds = amount_bounds(&dec("1.5"), &dec("2000"), 9, 6, &dec("1")).unwrap();
        assert_eq!(bounds.amount_a, BigUint::from(1_500_000_000u64));
        assert_eq!(bounds.amount_b, BigUint::from(2_000_000_000u64));
        assert_eq!(bounds.amount_a_min, BigUint::from(1_485_000_000u64));
        assert_eq!(bounds.amount_b_min, BigUint::from(1_980_000_000u64));
    }

    #[test]
    fn test_amount_bounds_rejects_negative() {
        assert!(matches!(
            amount_bounds(&dec("-1"), &dec("1"), 9, 6, &dec("1")),
            Err(ClmmError::InvalidAmount(_))
        ));
    }
}

// Copyright (c) Raydium Foundation
// Licensed under Apache 2.0
// Source: https://github.com/raydium-io/raydium-clmm/programs/amm/src/libraries/tick_math.rs
// Adapted for client-side liquidity math (ClmmError results, no anchor dependencies)

//! Tick ↔ sqrt price (U64.64)
//!
//! `sqrt_price(tick) = 1.0001^(tick/2) * 2^64`，与链上合约逐位一致。

use super::big_num::U128;
use crate::common::error::{ClmmError, ClmmResult};
use crate::constants::{MAX_SQRT_PRICE_X64, MAX_TICK, MIN_SQRT_PRICE_X64, MIN_TICK};

const NUM_64: U128 = U128([64, 0]);

/// `1 / sqrt(1.0001)^(2^i)` in U0.64 for bit `i` of `|tick|`, i = 1..18.
/// Bit 0 is handled separately since its seed replaces the initial ratio.
const RATIO_TABLE: [(u32, u64); 18] = [
    (0x2, 0xfff97272373d4000),
    (0x4, 0xfff2e50f5f657000),
    (0x8, 0xffe5caca7e10f000),
    (0x10, 0xffcb9843d60f7000),
    (0x20, 0xff973b41fa98e800),
    (0x40, 0xff2ea16466c9b000),
    (0x80, 0xfe5dee046a9a3800),
    (0x100, 0xfcbe86c7900bb000),
    (0x200, 0xf987a7253ac65800),
    (0x400, 0xf3392b0822bb6000),
    (0x800, 0xe7159475a2caf000),
    (0x1000, 0xd097f3bdfd2f2000),
    (0x2000, 0xa9f746462d9f8000),
    (0x4000, 0x70d869a156f31c00),
    (0x8000, 0x31be135f97ed3200),
    (0x10000, 0x9aa508b5b85a500),
    (0x20000, 0x5d6af8dedc582c),
    (0x40000, 0x2216e584f5fa),
];

/// Calculates `1.0001^(tick/2)` as a U64.64 sqrt price.
pub fn tick_index_to_sqrt_price_x64(tick: i32) -> ClmmResult<u128> {
    let abs_tick = tick.unsigned_abs();
    if abs_tick > MAX_TICK as u32 {
        return Err(ClmmError::TickOutOfRange(tick as i64));
    }

    let mut ratio = if abs_tick & 0x1 != 0 { U128([0xfffcb933bd6fb800, 0]) } else { U128([0, 1]) };
    for (bit, multiplier) in RATIO_TABLE {
        if abs_tick & bit != 0 {
            ratio = (ratio * U128([multiplier, 0])) >> NUM_64;
        }
    }

    // 表中是负 tick 的比率，正 tick 取倒数
    if tick > 0 {
        ratio = U128::MAX / ratio;
    }

    Ok(ratio.as_u128())
}

/// Greatest tick such that `tick_index_to_sqrt_price_x64(tick) <= sqrt_price_x64`.
pub fn sqrt_price_x64_to_tick_index(sqrt_price_x64: u128) -> ClmmResult<i32> {
    if !(MIN_SQRT_PRICE_X64..MAX_SQRT_PRICE_X64).contains(&sqrt_price_x64) {
        return Err(ClmmError::SqrtPriceOutOfRange(sqrt_price_x64));
    }

    // log2 整数部分
    let msb: u32 = 128 - sqrt_price_x64.leading_zeros() - 1;
    let log2p_integer_x32 = (msb as i128 - 64) << 32;

    // log2 小数部分，逐位平方逼近
    let mut bit: i128 = 0x8000_0000_0000_0000i128;
    let mut precision = 0;
    let mut log2p_fraction_x64 = 0;
    let mut r = if msb >= 64 { sqrt_price_x64 >> (msb - 63) } else { sqrt_price_x64 << (63 - msb) };

    const BIT_PRECISION: u32 = 16;
    while bit > 0 && precision < BIT_PRECISION {
        r *= r;
        let is_r_more_than_two = r >> 127_u32;
        r >>= 63 + is_r_more_than_two;
        log2p_fraction_x64 += bit * is_r_more_than_two as i128;
        bit >>= 1;
        precision += 1;
    }

    let log2p_fraction_x32 = log2p_fraction_x64 >> 32;
    let log2p_x32 = log2p_integer_x32 + log2p_fraction_x32;

    // log_sqrt(1.0001)(p) = log2(p) / log2(sqrt(1.0001))
    let log_sqrt_10001_x64 = log2p_x32 * 59543866431248i128;

    // 误差修正后得到的两个候选 tick
    let tick_low = ((log_sqrt_10001_x64 - 184467440737095516i128) >> 64) as i32;
    let tick_high = ((log_sqrt_10001_x64 + 15793534762490258745i128) >> 64) as i32;

    let tick = if tick_low == tick_high {
        tick_low
    } else if tick_index_to_sqrt_price_x64(tick_high)? <= sqrt_price_x64 {
        tick_high
    } else {
        tick_low
    };
    Ok(tick.clamp(MIN_TICK, MAX_TICK))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Q64;

    #[test]
    fn test_tick_zero_is_one() {
        assert_eq!(tick_index_to_sqrt_price_x64(0).unwrap(), Q64);
        assert_eq!(sqrt_price_x64_to_tick_index(Q64).unwrap(), 0);
    }

    #[test]
    fn test_bounds() {
        assert_eq!(tick_index_to_sqrt_price_x64(MIN_TICK).unwrap(), MIN_SQRT_PRICE_X64);
        assert_eq!(tick_index_to_sqrt_price_x64(MAX_TICK).unwrap(), MAX_SQRT_PRICE_X64);
        assert!(matches!(
            tick_index_to_sqrt_price_x64(MAX_TICK + 1),
            Err(ClmmError::TickOutOfRange(_))
        ));
        assert!(matches!(
            sqrt_price_x64_to_tick_index(MIN_SQRT_PRICE_X64 - 1),
            Err(ClmmError::SqrtPriceOutOfRange(_))
        ));
    }

    #[test]
    fn test_tick_round_trip() {
        for tick in [-443636, -100_000, -6932, -1, 1, 60, 6931, 100_000, 443_635] {
            let sqrt_price = tick_index_to_sqrt_price_x64(tick).unwrap();
            assert_eq!(sqrt_price_x64_to_tick_index(sqrt_price).unwrap(), tick, "tick {tick}");
        }
    }

    #[test]
    fn test_sqrt_price_monotonic() {
        let mut prev = 0u128;
        for tick in (-1000..1000).step_by(7) {
            let sqrt_price = tick_index_to_sqrt_price_x64(tick).unwrap();
            assert!(sqrt_price > prev);
            prev = sqrt_price;
        }
    }

    #[test]
    fn test_between_ticks_rounds_down() {
        let at = tick_index_to_sqrt_price_x64(500).unwrap();
        let next = tick_index_to_sqrt_price_x64(501).unwrap();
        assert_eq!(sqrt_price_x64_to_tick_index(at + 1).unwrap(), 500);
        assert_eq!(sqrt_price_x64_to_tick_index(next - 1).unwrap(), 500);
    }
}

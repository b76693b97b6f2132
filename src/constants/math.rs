//! 定点数学常量
//!
//! sqrt price 使用 U64.64 定点格式：`sqrt(price) * 2^64`

/// Number of fractional bits in a `SqrtPriceX64`.
pub const RESOLUTION: u32 = 64;

/// 2^64 as a plain integer (one unit in X64 fixed point).
pub const Q64: u128 = 1u128 << RESOLUTION;

/// The minimum tick supported by the protocol.
pub const MIN_TICK: i32 = -443636;
/// The maximum tick supported by the protocol.
pub const MAX_TICK: i32 = -MIN_TICK;

/// The minimum value that can be returned from `tick_index_to_sqrt_price_x64`.
pub const MIN_SQRT_PRICE_X64: u128 = 4295048016;
/// The maximum value that can be returned from `tick_index_to_sqrt_price_x64`.
pub const MAX_SQRT_PRICE_X64: u128 = 79226673521066979257578248091;

/// Base of the tick price curve: `price(tick) = 1.0001^tick`.
pub const TICK_BASE: &str = "1.0001";

/// 参考流动性（1e8），仅用于价格影响预览，不用于真实交易
pub const DEFAULT_REFERENCE_LIQUIDITY: u128 = 100_000_000;

/// Significant digits kept for intermediate logarithm/sqrt terms.
pub const DECIMAL_PRECISION: u64 = 80;

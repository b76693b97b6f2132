// 协议 tick 数学
pub mod clmm_math;

pub mod fixed_point;
pub mod liquidity;
pub mod slippage;

pub use fixed_point::{
    price_to_sqrt_price_x64, price_to_tick_index, scale_down, scale_up, snap_tick,
    sqrt_price_x64_to_price, tick_index_to_price, tick_index_to_sqrt_price_x64,
};
pub use liquidity::{Rounding, TokenAmounts, amounts_for_liquidity, amounts_for_tick_range};
pub use slippage::minimum_amount;

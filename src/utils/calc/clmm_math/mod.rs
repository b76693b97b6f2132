//! 协议 tick 数学（U64.64 sqrt price）

pub mod big_num;
pub mod tick_math;

pub use big_num::U128;
pub use tick_math::{sqrt_price_x64_to_tick_index, tick_index_to_sqrt_price_x64};

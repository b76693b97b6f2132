pub mod liquidity;
pub mod utils;

pub use liquidity::{
    AddLiquidityArgs, AmountBounds, CreatePoolArgs, DecreaseLiquidityArgs, IncreaseLiquidityArgs,
    SignedTick,
};

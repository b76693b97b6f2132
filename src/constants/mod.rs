pub mod fee_tiers;
pub mod math;
pub mod trade;

pub use math::*;
pub use trade::*;

//! 标准费率档位
//!
//! (fee type 名称, tick spacing)。fee type 为链上类型签名的最后一段，
//! 注册表按完整类型或最后一段匹配。

pub const FEE100BPS: (&str, u32) = ("FEE100BPS", 2);
pub const FEE500BPS: (&str, u32) = ("FEE500BPS", 10);
pub const FEE2500BPS: (&str, u32) = ("FEE2500BPS", 50);
pub const FEE3000BPS: (&str, u32) = ("FEE3000BPS", 60);
pub const FEE10000BPS: (&str, u32) = ("FEE10000BPS", 200);

pub const STANDARD_FEE_TIERS: [(&str, u32); 5] =
    [FEE100BPS, FEE500BPS, FEE2500BPS, FEE3000BPS, FEE10000BPS];

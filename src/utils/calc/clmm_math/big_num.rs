// Copyright (c) Raydium Foundation
// Licensed under Apache 2.0
// Source: https://github.com/raydium-io/raydium-clmm/programs/amm/src/libraries/big_num.rs
// Simplified for client-side use - only the U128 type

//! 128 位定点整数
//!
//! U128 用于 U64.64 tick 数学中的乘法后右移，避免中间结果溢出原生 u128。

use uint::construct_uint;

construct_uint! {
    pub struct U128(2);
}

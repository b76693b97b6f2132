//! Coin 选择
//!
//! 贪心策略：按余额从大到小累加，刚好覆盖目标数量即停止。
//! 不是最优子集求解，也不校验余额是否充足（由调用方判断）。

use crate::common::types::BaseUnitAmount;
use num_bigint::BigUint;
use num_traits::Zero;

/// One spendable coin object owned by an address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoinRecord {
    pub id: String,
    pub balance: BaseUnitAmount,
}

impl CoinRecord {
    pub fn new(id: impl Into<String>, balance: impl Into<BaseUnitAmount>) -> Self {
        Self { id: id.into(), balance: balance.into() }
    }
}

/// Sum of all balances.
pub fn total_balance(coins: &[CoinRecord]) -> BaseUnitAmount {
    coins.iter().fold(BigUint::zero(), |acc, coin| acc + &coin.balance)
}

/// Selects the largest-first prefix whose balance covers `target`.
///
/// Ties keep arrival order (stable sort). If every coin together falls short,
/// all coins are returned.
pub fn select_coins(coins: &[CoinRecord], target: &BaseUnitAmount) -> Vec<CoinRecord> {
    if target.is_zero() {
        return Vec::new();
    }

    let mut sorted: Vec<&CoinRecord> = coins.iter().collect();
    sorted.sort_by(|a, b| b.balance.cmp(&a.balance));

    let mut selected = Vec::new();
    let mut running = BigUint::zero();
    for coin in sorted {
        running += &coin.balance;
        selected.push(coin.clone());
        if &running >= target {
            break;
        }
    }
    selected
}

/// Coin ids of [`select_coins`], in selection order.
pub fn select_coin_ids(coins: &[CoinRecord], target: &BaseUnitAmount) -> Vec<String> {
    select_coins(coins, target).into_iter().map(|coin| coin.id).collect()
}

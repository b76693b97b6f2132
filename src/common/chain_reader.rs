//! 链上读取接口
//!
//! 数学核心只消费这些读取结果；具体实现见 `rpc_client`（JSON-RPC）与
//! `mock_rpc`（内存实现，测试/离线预览）。

use crate::common::error::{ClmmError, ClmmResult};
use crate::common::types::{AnyResult, Liquidity, SqrtPriceX64, TickIndex};
use crate::constants::MAX_COIN_PAGES;
use crate::utils::calc::fixed_point::sqrt_price_x64_to_tick_index;
use crate::utils::coin_select::CoinRecord;
use anyhow::bail;
use async_trait::async_trait;

/// One page of an owner's coins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoinPage {
    pub data: Vec<CoinRecord>,
    pub next_cursor: Option<String>,
    pub has_next_page: bool,
}

/// Pool fields the client needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub pool_id: String,
    /// Full type signature, e.g. `0x..::pool::Pool<CoinA, CoinB, FeeType>`.
    pub pool_type: String,
    pub sqrt_price: SqrtPriceX64,
    pub tick_current: TickIndex,
}

impl PoolSnapshot {
    /// `sqrt_price`，前提是它与 `tick_current` 一致（允许 1 个 tick 的取整差）
    pub fn current_sqrt_price(&self) -> ClmmResult<&SqrtPriceX64> {
        let derived = sqrt_price_x64_to_tick_index(&self.sqrt_price)?;
        if (derived as i64 - self.tick_current as i64).abs() > 1 {
            return Err(ClmmError::InvalidPrice(format!(
                "pool {} sqrt price {} is at tick {derived}, but tick_current is {}",
                self.pool_id, self.sqrt_price, self.tick_current
            )));
        }
        Ok(&self.sqrt_price)
    }
}

/// Position fields the client needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionSnapshot {
    pub position_id: String,
    pub tick_lower: TickIndex,
    pub tick_upper: TickIndex,
    pub liquidity: Liquidity,
}

/// 链上读取 trait（支持 JSON-RPC 与 Mock）
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// `Ok(None)` when the coin type has no metadata.
    async fn get_coin_decimals(&self, coin_type: &str) -> AnyResult<Option<u8>>;

    async fn get_coins(
        &self,
        owner: &str,
        coin_type: &str,
        cursor: Option<String>,
    ) -> AnyResult<CoinPage>;

    async fn get_pool(&self, pool_id: &str) -> AnyResult<PoolSnapshot>;

    async fn get_position(&self, position_id: &str) -> AnyResult<PositionSnapshot>;
}

/// 拉取全部分页，直到没有下一页
///
/// 部分分页绝不能交给 coin 选择，因此游标不前进时直接报错。
pub async fn list_all_coins<R: ChainReader + ?Sized>(
    reader: &R,
    owner: &str,
    coin_type: &str,
) -> AnyResult<Vec<CoinRecord>> {
    let mut coins = Vec::new();
    let mut cursor: Option<String> = None;

    for _ in 0..MAX_COIN_PAGES {
        let page = reader.get_coins(owner, coin_type, cursor.clone()).await?;
        coins.extend(page.data);

        if !page.has_next_page {
            return Ok(coins);
        }
        match page.next_cursor {
            Some(next) if Some(&next) != cursor.as_ref() => cursor = Some(next),
            _ => bail!(
                "coin listing for {owner} / {coin_type} stopped advancing at cursor {cursor:?}"
            ),
        }
    }
    bail!("coin listing for {owner} / {coin_type} exceeded {MAX_COIN_PAGES} pages")
}

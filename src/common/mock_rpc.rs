//! 内存 Mock 链上读取器
//!
//! 用于测试与离线预览：所有数据在构造时注入，不发起任何网络请求。
//!
//! ```
//! use clmm_liquidity_sdk::common::mock_rpc::MockChainReader;
//! use clmm_liquidity_sdk::utils::coin_select::CoinRecord;
//!
//! let reader = MockChainReader::new()
//!     .with_decimals("0x2::sui::SUI", 9)
//!     .with_coins("0xowner", "0x2::sui::SUI", vec![CoinRecord::new("0xc1", 10u64)]);
//! ```

use crate::common::chain_reader::{ChainReader, CoinPage, PoolSnapshot, PositionSnapshot};
use crate::common::types::AnyResult;
use crate::utils::coin_select::CoinRecord;
use anyhow::anyhow;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

const DEFAULT_PAGE_SIZE: usize = 50;

/// In-memory [`ChainReader`].
#[derive(Debug)]
pub struct MockChainReader {
    decimals: DashMap<String, u8>,
    coins: DashMap<(String, String), Vec<CoinRecord>>,
    pools: DashMap<String, PoolSnapshot>,
    positions: DashMap<String, PositionSnapshot>,
    page_size: usize,
    decimals_calls: AtomicUsize,
    coin_page_calls: AtomicUsize,
}

impl Default for MockChainReader {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChainReader {
    pub fn new() -> Self {
        Self {
            decimals: DashMap::new(),
            coins: DashMap::new(),
            pools: DashMap::new(),
            positions: DashMap::new(),
            page_size: DEFAULT_PAGE_SIZE,
            decimals_calls: AtomicUsize::new(0),
            coin_page_calls: AtomicUsize::new(0),
        }
    }

    /// 分页大小（最小为 1）
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_decimals(self, coin_type: &str, decimals: u8) -> Self {
        self.decimals.insert(coin_type.to_string(), decimals);
        self
    }

    pub fn with_coins(self, owner: &str, coin_type: &str, coins: Vec<CoinRecord>) -> Self {
        self.coins.insert((owner.to_string(), coin_type.to_string()), coins);
        self
    }

    pub fn with_pool(self, pool: PoolSnapshot) -> Self {
        self.pools.insert(pool.pool_id.clone(), pool);
        self
    }

    pub fn with_position(self, position: PositionSnapshot) -> Self {
        self.positions.insert(position.position_id.clone(), position);
        self
    }

    /// Number of metadata lookups served so far.
    pub fn decimals_calls(&self) -> usize {
        self.decimals_calls.load(Ordering::Relaxed)
    }

    /// Number of coin pages served so far.
    pub fn coin_page_calls(&self) -> usize {
        self.coin_page_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ChainReader for MockChainReader {
    async fn get_coin_decimals(&self, coin_type: &str) -> AnyResult<Option<u8>> {
        self.decimals_calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.decimals.get(coin_type).map(|entry| *entry))
    }

    async fn get_coins(
        &self,
        owner: &str,
        coin_type: &str,
        cursor: Option<String>,
    ) -> AnyResult<CoinPage> {
        self.coin_page_calls.fetch_add(1, Ordering::Relaxed);

        let key = (owner.to_string(), coin_type.to_string());
        let Some(all) = self.coins.get(&key) else {
            return Ok(CoinPage::default());
        };

        // 游标为下一页起始下标
        let start = match cursor {
            Some(raw) => raw.parse::<usize>().map_err(|e| anyhow!("bad cursor {raw:?}: {e}"))?,
            None => 0,
        };
        let end = (start + self.page_size).min(all.len());
        let data = all.get(start..end).map(<[CoinRecord]>::to_vec).unwrap_or_default();
        let has_next_page = end < all.len();

        Ok(CoinPage {
            data,
            next_cursor: has_next_page.then(|| end.to_string()),
            has_next_page,
        })
    }

    async fn get_pool(&self, pool_id: &str) -> AnyResult<PoolSnapshot> {
        self.pools
            .get(pool_id)
            .map(|entry| entry.clone())
            .ok_or_else(|| anyhow!("pool {pool_id} not found"))
    }

    async fn get_position(&self, position_id: &str) -> AnyResult<PositionSnapshot> {
        self.positions
            .get(position_id)
            .map(|entry| entry.clone())
            .ok_or_else(|| anyhow!("position {position_id} not found"))
    }
}

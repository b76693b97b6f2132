//! Coin 元数据工具函数
//!
//! 精度在链上不可变，读取一次后进入全局缓存。

use crate::common::chain_reader::ChainReader;
use crate::common::error::{ClmmError, ClmmResult};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::warn;

const MAX_COIN_METADATA_CACHE_SIZE: usize = 10_000;

/// 全局 Coin Decimal 缓存
static DECIMALS_CACHE: Lazy<DashMap<String, u8>> =
    Lazy::new(|| DashMap::with_capacity(MAX_COIN_METADATA_CACHE_SIZE));

/// 获取 coin 精度
///
/// 使用全局缓存减少 RPC 调用；没有元数据或读取失败时返回 `InvalidCoinType`。
pub async fn get_coin_decimals<R: ChainReader + ?Sized>(
    reader: &R,
    coin_type: &str,
) -> ClmmResult<u8> {
    // Fast path: 检查缓存
    if let Some(cached) = DECIMALS_CACHE.get(coin_type) {
        return Ok(*cached);
    }

    match reader.get_coin_decimals(coin_type).await {
        Ok(Some(decimals)) => {
            DECIMALS_CACHE.insert(coin_type.to_string(), decimals);
            Ok(decimals)
        }
        Ok(None) => Err(ClmmError::InvalidCoinType(coin_type.to_string())),
        Err(e) => {
            warn!(coin_type, error = %e, "coin metadata lookup failed");
            Err(ClmmError::InvalidCoinType(format!("{coin_type}: {e}")))
        }
    }
}

/// 获取一对 coin 的精度（并发读取）
pub async fn get_pair_decimals<R: ChainReader + ?Sized>(
    reader: &R,
    coin_type_a: &str,
    coin_type_b: &str,
) -> ClmmResult<(u8, u8)> {
    tokio::try_join!(get_coin_decimals(reader, coin_type_a), get_coin_decimals(reader, coin_type_b))
}

/// 清空精度缓存
pub fn clear_decimals_cache() {
    DECIMALS_CACHE.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::mock_rpc::MockChainReader;

    #[tokio::test]
    async fn test_decimals_are_cached() {
        let coin = "0xaa01::cache_test::COIN";
        let reader = MockChainReader::new().with_decimals(coin, 6);

        assert_eq!(get_coin_decimals(&reader, coin).await.unwrap(), 6);
        assert_eq!(get_coin_decimals(&reader, coin).await.unwrap(), 6);
        assert_eq!(reader.decimals_calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_metadata_is_invalid_coin_type() {
        let reader = MockChainReader::new();
        let err = get_coin_decimals(&reader, "0xaa02::missing::COIN").await.unwrap_err();
        assert!(matches!(err, ClmmError::InvalidCoinType(_)));
    }

    #[tokio::test]
    async fn test_pair_decimals() {
        let reader = MockChainReader::new()
            .with_decimals("0xaa03::pair::A", 9)
            .with_decimals("0xaa03::pair::B", 6);
        let pair = get_pair_decimals(&reader, "0xaa03::pair::A", "0xaa03::pair::B").await.unwrap();
        assert_eq!(pair, (9, 6));
    }
}

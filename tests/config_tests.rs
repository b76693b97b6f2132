//! 配置与费率档位加载测试


use clmm_liquidity_sdk::common::fee_tier::{FeeTier, FeeTierRegistry};
use clmm_liquidity_sdk::common::mock_rpc::MockChainReader;
use clmm_liquidity_sdk::constants::{
    DEFAULT_DEADLINE_MILLIS, DEFAULT_RPC_TIMEOUT_MILLIS, DEFAULT_RPC_URL,
};
use clmm_liquidity_sdk::utils::token::{clear_decimals_cache, get_coin_decimals};
use clmm_liquidity_sdk::{ClientConfig, ClmmError, LiquidityClient, NoopSubmitter};
use serial_test::serial;
use std::io::Write;
use std::sync::Arc;
use test_helpers::*;

const ENV_VARS: [&str; 4] =
    ["CLMM_RPC_URL", "CLMM_RPC_TIMEOUT_MS", "CLMM_DEFAULT_SLIPPAGE", "CLMM_DEADLINE_MS"];

fn clear_env() {
    for name in ENV_VARS {
        // SAFETY: 环境变量测试通过 #[serial] 串行执行
        unsafe { std::env::remove_var(name) };
    }
}

fn set_env(name: &str, value: &str) {
    // SAFETY: 同上
    unsafe { std::env::set_var(name, value) };
}

#[test]
#[serial(env)]
fn test_from_env_defaults() {
    clear_env();
    let config = ClientConfig::from_env().unwrap();
    assert_eq!(config.rpc_url, DEFAULT_RPC_URL);
    assert_eq!(config.timeout_millis, DEFAULT_RPC_TIMEOUT_MILLIS);
    assert_eq!(config.deadline_millis, DEFAULT_DEADLINE_MILLIS);
    assert_eq!(config.default_slippage_percent, dec("1"));
}

#[test]
#[serial(env)]
fn test_from_env_overrides() {
    clear_env();
    set_env("CLMM_RPC_URL", "http://127.0.0.1:9000");
    set_env("CLMM_RPC_TIMEOUT_MS", "2500");
    set_env("CLMM_DEFAULT_SLIPPAGE", "0.25");
    set_env("CLMM_DEADLINE_MS", "120000");

    let config = ClientConfig::from_env().unwrap();
    assert_eq!(config.rpc_url, "http://127.0.0.1:9000");
    assert_eq!(config.timeout_millis, 2500);
    assert_eq!(config.default_slippage_percent, dec("0.25"));
    assert_eq!(config.deadline_millis, 120_000);
    clear_env();
}

#[test]
#[serial(env)]
fn test_from_env_rejects_bad_values() {
    clear_env();
    set_env("CLMM_DEFAULT_SLIPPAGE", "150");
    assert!(matches!(ClientConfig::from_env(), Err(ClmmError::InvalidSlippage(_))));

    clear_env();
    set_env("CLMM_DEFAULT_SLIPPAGE", "abc");
    assert!(matches!(ClientConfig::from_env(), Err(ClmmError::InvalidSlippage(_))));

    clear_env();
    set_env("CLMM_RPC_TIMEOUT_MS", "soon");
    assert!(matches!(ClientConfig::from_env(), Err(ClmmError::External(_))));
    clear_env();
}

#[test]
fn test_fee_tier_registry_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[{{"type": "FEE3000BPS", "tickSpacing": 60}},
            {{"type": "0xfee::tiers::FEE42BPS", "tickSpacing": 8}}]"#
    )
    .unwrap();

    let registry = FeeTierRegistry::load(file.path()).unwrap();
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.resolve("0x1eab::fee3000bps::FEE3000BPS").unwrap().tick_spacing, 60);
    assert_eq!(registry.resolve("0xfee::tiers::FEE42BPS").unwrap().tick_spacing, 8);
    assert!(registry.resolve("FEE500BPS").is_err());
}

#[test]
fn test_fee_tier_registry_load_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    assert!(matches!(FeeTierRegistry::load(&missing), Err(ClmmError::External(_))));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"[{{"type": "FEE0BPS", "tickSpacing": 0}}]"#).unwrap();
    assert!(matches!(FeeTierRegistry::load(file.path()), Err(ClmmError::InvalidPoolType(_))));
}

#[tokio::test]
async fn test_client_uses_custom_registry() {
    let mut registry = FeeTierRegistry::empty();
    registry.insert(FeeTier::new("FEE3000BPS", 120).unwrap()).unwrap();
    let config = ClientConfig::default().with_fee_tiers(registry);
    let client = LiquidityClient::new(config, Arc::new(mock_reader()), Arc::new(NoopSubmitter));

    assert_eq!(client.resolve_fee_tier(POOL_ID).await.unwrap().tick_spacing, 120);
}

#[tokio::test]
#[serial(decimals_cache)]
async fn test_clear_decimals_cache_refetches() {
    let coin = "0xc4c3::cache::CLEAR";
    let reader = MockChainReader::new().with_decimals(coin, 8);

    assert_eq!(get_coin_decimals(&reader, coin).await.unwrap(), 8);
    assert_eq!(get_coin_decimals(&reader, coin).await.unwrap(), 8);
    assert_eq!(reader.decimals_calls(), 1);

    clear_decimals_cache();
    assert_eq!(get_coin_decimals(&reader, coin).await.unwrap(), 8);
    assert_eq!(reader.decimals_calls(), 2);
}

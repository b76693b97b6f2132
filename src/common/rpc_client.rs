use crate::common::chain_reader::{ChainReader, CoinPage, PoolSnapshot, PositionSnapshot};
use crate::common::types::{AnyResult, TickIndex};
use crate::constants::{COINS_PAGE_LIMIT, DEFAULT_RPC_TIMEOUT_MILLIS, DEFAULT_RPC_URL};
use crate::utils::coin_select::CoinRecord;
use anyhow::{Context, anyhow, bail};
use async_trait::async_trait;
use num_bigint::BigUint;
use reqwest::{Client, Proxy};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::{env, time::Duration};
use tracing::debug;

/// JSON-RPC 客户端配置
#[derive(Debug, Clone)]
pub struct JsonRpcConfig {
    /// 节点地址
    pub url: String,
    /// 请求超时时间（毫秒）
    pub timeout_millis: u64,
}

impl Default for JsonRpcConfig {
    fn default() -> Self {
        Self { url: DEFAULT_RPC_URL.to_string(), timeout_millis: DEFAULT_RPC_TIMEOUT_MILLIS }
    }
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct CoinMetadata {
    decimals: u8,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCoin {
    coin_object_id: String,
    balance: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCoinPage {
    data: Vec<RawCoin>,
    next_cursor: Option<String>,
    has_next_page: bool,
}

/// JSON-RPC 2.0 ledger client (metadata, coin listing and object reads only)
pub struct JsonRpcClient {
    http: Client,
    pub config: JsonRpcConfig,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(config: JsonRpcConfig) -> AnyResult<Self> {
        let timeout = Duration::from_millis(config.timeout_millis);
        let mut builder = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .tcp_nodelay(true)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5));

        // 优先使用 HTTPS_PROXY，其次 HTTP_PROXY
        if let Ok(https_proxy) = env::var("HTTPS_PROXY").or_else(|_| env::var("https_proxy")) {
            builder = builder.proxy(Proxy::https(&https_proxy)?);
        } else if let Ok(http_proxy) = env::var("HTTP_PROXY").or_else(|_| env::var("http_proxy")) {
            builder = builder.proxy(Proxy::http(&http_proxy)?);
        }

        let http = builder.build()?;
        Ok(Self { http, config, next_id: AtomicU64::new(1) })
    }

    pub fn from_url(url: impl Into<String>) -> AnyResult<Self> {
        Self::new(JsonRpcConfig { url: url.into(), ..JsonRpcConfig::default() })
    }

    /// 发送请求；`result` 为 null 时返回 `None`
    async fn call_optional<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> AnyResult<Option<T>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        debug!(method, id, "json-rpc request");

        let envelope = self
            .http
            .post(&self.config.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<RpcEnvelope<T>>()
            .await
            .with_context(|| format!("malformed {method} response"))?;

        if let Some(err) = envelope.error {
            bail!("{method} failed ({}): {}", err.code, err.message);
        }
        Ok(envelope.result)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> AnyResult<T> {
        self.call_optional(method, params)
            .await?
            .ok_or_else(|| anyhow!("{method} returned an empty result"))
    }

    /// 读取对象的 `type` 与 `content.fields`
    async fn get_object(&self, object_id: &str) -> AnyResult<(String, Value)> {
        let result: Value = self
            .call("sui_getObject", json!([object_id, { "showType": true, "showContent": true }]))
            .await?;
        let data = result.get("data").ok_or_else(|| {
            anyhow!("object {object_id} not found: {}", result.get("error").unwrap_or(&Value::Null))
        })?;
        let object_type = data
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("object {object_id} has no type"))?
            .to_string();
        let fields = data
            .pointer("/content/fields")
            .cloned()
            .ok_or_else(|| anyhow!("object {object_id} has no move fields"))?;
        Ok((object_type, fields))
    }
}

fn parse_u128_field(fields: &Value, name: &str) -> AnyResult<BigUint> {
    let raw = match fields.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        other => bail!("field {name} missing or not numeric: {other:?}"),
    };
    BigUint::from_str(&raw).with_context(|| format!("field {name} is not an integer: {raw}"))
}

/// 链上 I32 以补码 `bits: u32` 存储
fn parse_i32_field(fields: &Value, name: &str) -> AnyResult<TickIndex> {
    let bits = fields
        .get(name)
        .and_then(|v| v.pointer("/fields/bits"))
        .ok_or_else(|| anyhow!("field {name}.fields.bits missing"))?;
    let bits = match bits {
        Value::String(s) => s.parse::<u32>()?,
        Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| anyhow!("bad bits {n}"))?,
        other => bail!("field {name}.fields.bits is not numeric: {other}"),
    };
    Ok(bits as i32)
}

#[async_trait]
impl ChainReader for JsonRpcClient {
    async fn get_coin_decimals(&self, coin_type: &str) -> AnyResult<Option<u8>> {
        let metadata: Option<CoinMetadata> =
            self.call_optional("suix_getCoinMetadata", json!([coin_type])).await?;
        Ok(metadata.map(|m| m.decimals))
    }

    async fn get_coins(
        &self,
        owner: &str,
        coin_type: &str,
        cursor: Option<String>,
    ) -> AnyResult<CoinPage> {
        let page: RawCoinPage = self
            .call("suix_getCoins", json!([owner, coin_type, cursor, COINS_PAGE_LIMIT]))
            .await?;
        let data = page
            .data
            .into_iter()
            .map(|coin| {
                let balance = BigUint::from_str(&coin.balance).with_context(|| {
                    format!("coin {} has bad balance {}", coin.coin_object_id, coin.balance)
                })?;
                Ok(CoinRecord { id: coin.coin_object_id, balance })
            })
            .collect::<AnyResult<Vec<_>>>()?;
        Ok(CoinPage { data, next_cursor: page.next_cursor, has_next_page: page.has_next_page })
    }

    async fn get_pool(&self, pool_id: &str) -> AnyResult<PoolSnapshot> {
        let (pool_type, fields) = self.get_object(pool_id).await?;
        Ok(PoolSnapshot {
            pool_id: pool_id.to_string(),
            pool_type,
            sqrt_price: parse_u128_field(&fields, "sqrt_price")?,
            tick_current: parse_i32_field(&fields, "tick_current_index")?,
        })
    }

    async fn get_position(&self, position_id: &str) -> AnyResult<PositionSnapshot> {
        let (_, fields) = self.get_object(position_id).await?;
        Ok(PositionSnapshot {
            position_id: position_id.to_string(),
            tick_lower: parse_i32_field(&fields, "tick_lower_index")?,
            tick_upper: parse_i32_field(&fields, "tick_upper_index")?,
            liquidity: parse_u128_field(&fields, "liquidity")?,
        })
    }
}

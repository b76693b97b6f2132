use crate::common::error::{ClmmError, ClmmResult};
use crate::common::fee_tier::FeeTierRegistry;
use crate::constants::{
    DEFAULT_DEADLINE_MILLIS, DEFAULT_RPC_TIMEOUT_MILLIS, DEFAULT_RPC_URL, DEFAULT_SLIPPAGE_PERCENT,
};
use bigdecimal::BigDecimal;
use num_bigint::BigUint;
use std::str::FromStr;

/// Human-facing decimal value (prices, UI amounts). Never rounded until
/// converted to base units.
pub type Decimal = BigDecimal;
/// Token amount in its smallest indivisible unit.
pub type BaseUnitAmount = BigUint;
/// `sqrt(price) * 2^64`, price in base-unit-per-base-unit terms.
pub type SqrtPriceX64 = BigUint;
/// Protocol liquidity units.
pub type Liquidity = BigUint;
/// Signed tick index; the `(magnitude, negative)` split happens only at the
/// transaction boundary.
pub type TickIndex = i32;

pub type AnyResult<T> = anyhow::Result<T>;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub rpc_url: String,
    /// RPC 请求超时（毫秒）
    pub timeout_millis: u64,
    /// 未指定滑点时使用的默认值（百分比）
    pub default_slippage_percent: Decimal,
    /// 交易过期时间 = now + deadline_millis
    pub deadline_millis: u64,
    pub fee_tiers: FeeTierRegistry,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_RPC_URL.to_string())
    }
}

impl ClientConfig {
    pub fn new(rpc_url: String) -> Self {
        Self {
            rpc_url,
            timeout_millis: DEFAULT_RPC_TIMEOUT_MILLIS,
            default_slippage_percent: default_slippage(),
            deadline_millis: DEFAULT_DEADLINE_MILLIS,
            fee_tiers: FeeTierRegistry::standard(),
        }
    }

    /// 从环境变量读取配置
    ///
    /// - `CLMM_RPC_URL`
    /// - `CLMM_RPC_TIMEOUT_MS`
    /// - `CLMM_DEFAULT_SLIPPAGE`（百分比）
    /// - `CLMM_DEADLINE_MS`
    ///
    /// 未设置的变量使用默认值；设置了但无法解析的变量返回错误。
    pub fn from_env() -> ClmmResult<Self> {
        let rpc_url = std::env::var("CLMM_RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string());
        let mut config = Self::new(rpc_url);

        if let Ok(raw) = std::env::var("CLMM_RPC_TIMEOUT_MS") {
            config.timeout_millis = raw
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid CLMM_RPC_TIMEOUT_MS {raw:?}: {e}"))?;
        }
        if let Ok(raw) = std::env::var("CLMM_DEFAULT_SLIPPAGE") {
            let slippage = Decimal::from_str(raw.trim())
                .map_err(|_| ClmmError::InvalidSlippage(raw.clone()))?;
            config = config.with_default_slippage(slippage)?;
        }
        if let Ok(raw) = std::env::var("CLMM_DEADLINE_MS") {
            config.deadline_millis = raw
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid CLMM_DEADLINE_MS {raw:?}: {e}"))?;
        }
        Ok(config)
    }

    /// 设置默认滑点，范围必须在 [0, 100)
    pub fn with_default_slippage(mut self, slippage_percent: Decimal) -> ClmmResult<Self> {
        crate::utils::calc::slippage::validate_slippage(&slippage_percent)?;
        self.default_slippage_percent = slippage_percent;
        Ok(self)
    }

    pub fn with_deadline_millis(mut self, deadline_millis: u64) -> Self {
        self.deadline_millis = deadline_millis;
        self
    }

    pub fn with_timeout_millis(mut self, timeout_millis: u64) -> Self {
        self.timeout_millis = timeout_millis;
        self
    }

    pub fn with_fee_tiers(mut self, fee_tiers: FeeTierRegistry) -> Self {
        self.fee_tiers = fee_tiers;
        self
    }
}

fn default_slippage() -> Decimal {
    // 常量字面量，解析不会失败
    Decimal::from_str(DEFAULT_SLIPPAGE_PERCENT).unwrap_or_else(|_| Decimal::from(1))
}

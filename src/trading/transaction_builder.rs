//! 交易提交边界
//!
//! SDK 只负责生成参数；签名与广播由上游实现 [`TransactionSubmitter`] 完成。

use crate::common::types::AnyResult;
use crate::instruction::liquidity::{
    AddLiquidityArgs, CreatePoolArgs, DecreaseLiquidityArgs, IncreaseLiquidityArgs,
};
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Fully computed transaction arguments, ready to be assembled and signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransactionPayload {
    CreatePool(CreatePoolArgs),
    AddLiquidity(AddLiquidityArgs),
    IncreaseLiquidity(IncreaseLiquidityArgs),
    DecreaseLiquidity(DecreaseLiquidityArgs),
}

impl TransactionPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreatePool(_) => "create_pool",
            Self::AddLiquidity(_) => "add_liquidity",
            Self::IncreaseLiquidity(_) => "increase_liquidity",
            Self::DecreaseLiquidity(_) => "decrease_liquidity",
        }
    }

    /// 交易过期时间（Unix 毫秒）
    pub fn deadline(&self) -> u64 {
        match self {
            Self::CreatePool(args) => args.deadline,
            Self::AddLiquidity(args) => args.deadline,
            Self::IncreaseLiquidity(args) => args.deadline,
            Self::DecreaseLiquidity(args) => args.deadline,
        }
    }

    /// JSON 表示（用于日志或跨进程传递）
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            warn!("交易参数序列化失败: {e}");
            serde_json::Value::Null
        })
    }
}

/// 交易组装、签名与广播 Trait
///
/// 返回交易摘要（digest）。
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    async fn submit(&self, payload: TransactionPayload) -> AnyResult<String>;
}

type SubmitFn = dyn Fn(TransactionPayload) -> BoxFuture<'static, AnyResult<String>> + Send + Sync;

/// Closure adapter for [`TransactionSubmitter`].
///
/// ```
/// use clmm_liquidity_sdk::trading::FnSubmitter;
/// use futures::FutureExt;
///
/// let submitter = FnSubmitter::new(|payload| {
///     async move { Ok::<_, anyhow::Error>(payload.kind().to_string()) }.boxed()
/// });
/// ```
pub struct FnSubmitter {
    inner: Box<SubmitFn>,
}

impl FnSubmitter {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(TransactionPayload) -> BoxFuture<'static, AnyResult<String>> + Send + Sync + 'static,
    {
        Self { inner: Box::new(f) }
    }
}

#[async_trait]
impl TransactionSubmitter for FnSubmitter {
    async fn submit(&self, payload: TransactionPayload) -> AnyResult<String> {
        (self.inner)(payload).await
    }
}

/// 只计算不提交时使用；调用 `submit` 会返回错误
pub struct NoopSubmitter;

#[async_trait]
impl TransactionSubmitter for NoopSubmitter {
    async fn submit(&self, payload: TransactionPayload) -> AnyResult<String> {
        anyhow::bail!("no transaction submitter configured for {}", payload.kind())
    }
}

/// 当前 Unix 毫秒时间戳 + `deadline_millis`
pub fn deadline_from_now(deadline_millis: u64) -> u64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_else(|e| {
        warn!("获取系统时间失败: {}，使用 0 作为默认时间戳", e);
        Duration::from_secs(0)
    });
    (now.as_millis() as u64).saturating_add(deadline_millis)
}

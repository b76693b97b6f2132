//! 费率档位
//!
//! FeeTier 由外部注册表提供，对数学核心而言只有 `tick_spacing` 有意义。

use crate::common::error::{ClmmError, ClmmResult};
use crate::constants::fee_tiers::STANDARD_FEE_TIERS;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Immutable fee tier value object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeeTier {
    /// Fee type identifier (the third type argument of a pool).
    #[serde(rename = "type")]
    pub fee_type: String,
    /// Tick spacing; every usable tick is a multiple of it.
    #[serde(rename = "tickSpacing")]
    pub tick_spacing: u32,
}

impl FeeTier {
    pub fn new(fee_type: impl Into<String>, tick_spacing: u32) -> ClmmResult<Self> {
        if tick_spacing == 0 {
            return Err(ClmmError::InvalidPoolType("tick spacing must be positive".to_string()));
        }
        Ok(Self { fee_type: fee_type.into(), tick_spacing })
    }
}

/// Fee type → [`FeeTier`] lookup.
///
/// Keys are matched on the full type string first, then on the last `::`
/// segment, so `0xabc::fee3000bps::FEE3000BPS` resolves against `FEE3000BPS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeTierRegistry {
    tiers: HashMap<String, FeeTier>,
}

impl Default for FeeTierRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl FeeTierRegistry {
    /// Registry without any tiers.
    pub fn empty() -> Self {
        Self { tiers: HashMap::new() }
    }

    /// Registry populated with the protocol's standard tiers.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for (fee_type, tick_spacing) in STANDARD_FEE_TIERS {
            registry.tiers.insert(
                fee_type.to_string(),
                FeeTier { fee_type: fee_type.to_string(), tick_spacing },
            );
        }
        registry
    }

    /// 解析 JSON 数组：`[{"type": "...", "tickSpacing": 60}, ...]`
    pub fn from_json(json: &str) -> ClmmResult<Self> {
        let tiers: Vec<FeeTier> = serde_json::from_str(json)
            .map_err(|e| ClmmError::InvalidPoolType(format!("malformed fee tier list: {e}")))?;
        let mut registry = Self::empty();
        for tier in tiers {
            registry.insert(tier)?;
        }
        Ok(registry)
    }

    /// 从文件加载费率档位
    pub fn load(path: impl AsRef<Path>) -> ClmmResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fee tier file {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn insert(&mut self, tier: FeeTier) -> ClmmResult<()> {
        if tier.tick_spacing == 0 {
            return Err(ClmmError::InvalidPoolType(format!(
                "fee tier {} has zero tick spacing",
                tier.fee_type
            )));
        }
        self.tiers.insert(tier.fee_type.clone(), tier);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn get(&self, fee_type: &str) -> Option<&FeeTier> {
        self.tiers.get(fee_type).or_else(|| {
            let short = fee_type.rsplit("::").next()?;
            self.tiers.get(short)
        })
    }

    /// Like [`get`](Self::get) but fails with `InvalidPoolType` for unknown tiers.
    pub fn resolve(&self, fee_type: &str) -> ClmmResult<&FeeTier> {
        self.get(fee_type)
            .ok_or_else(|| ClmmError::InvalidPoolType(format!("unknown fee type {fee_type}")))
    }
}

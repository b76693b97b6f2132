//! Pool 类型签名解析
//!
//! `0xpkg::pool::Pool<CoinA, CoinB, FeeType>`，类型参数本身可以带泛型。

use crate::common::error::{ClmmError, ClmmResult};
use crate::common::fee_tier::{FeeTier, FeeTierRegistry};

/// Type arguments of a pool object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolTypeArgs {
    /// `pkg::module::Pool` without type arguments.
    pub pool_struct: String,
    pub coin_type_a: String,
    pub coin_type_b: String,
    pub fee_type: String,
}

impl PoolTypeArgs {
    pub fn parse(pool_type: &str) -> ClmmResult<Self> {
        let invalid = |reason: &str| ClmmError::InvalidPoolType(format!("{pool_type}: {reason}"));

        let trimmed = pool_type.trim();
        let open = trimmed.find('<').ok_or_else(|| invalid("missing type arguments"))?;
        let inner = trimmed[open + 1..]
            .strip_suffix('>')
            .ok_or_else(|| invalid("unterminated type arguments"))?;

        let pool_struct = trimmed[..open].trim();
        if pool_struct.is_empty() {
            return Err(invalid("missing struct name"));
        }

        let args = split_top_level(inner).ok_or_else(|| invalid("unbalanced brackets"))?;
        let [coin_type_a, coin_type_b, fee_type] = args.as_slice() else {
            return Err(invalid(&format!("expected 3 type arguments, found {}", args.len())));
        };
        if [coin_type_a, coin_type_b, fee_type].iter().any(|arg| arg.is_empty()) {
            return Err(invalid("empty type argument"));
        }

        Ok(Self {
            pool_struct: pool_struct.to_string(),
            coin_type_a: coin_type_a.to_string(),
            coin_type_b: coin_type_b.to_string(),
            fee_type: fee_type.to_string(),
        })
    }

    /// Looks the fee type up in `registry`.
    pub fn fee_tier<'a>(&self, registry: &'a FeeTierRegistry) -> ClmmResult<&'a FeeTier> {
        registry.resolve(&self.fee_type)
    }
}

/// Splits on commas at bracket depth 0; `None` if brackets don't balance.
fn split_top_level(inner: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in inner.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parts.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(inner[start..].trim());
    Some(parts)
}

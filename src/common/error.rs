//! SDK 错误类型
//!
//! 数学核心的失败都是确定性的输入校验失败，同步返回给调用方，不做重试。

use num_bigint::BigUint;

/// Errors produced by the math core, the coin-selection layer and the client.
#[derive(Debug, thiserror::Error)]
pub enum ClmmError {
    /// Negative or otherwise unusable amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    /// Non-positive price or a zero sqrt price.
    #[error("invalid price: {0}")]
    InvalidPrice(String),
    /// Slippage outside `[0, 100)`.
    #[error("invalid slippage: {0}% (must be within [0, 100))")]
    InvalidSlippage(String),
    /// Token metadata could not be resolved.
    #[error("invalid coin type: {0}")]
    InvalidCoinType(String),
    /// Pool type signature did not parse into `(coinA, coinB, feeType)`,
    /// or the fee type is not a known tier.
    #[error("invalid pool type: {0}")]
    InvalidPoolType(String),
    #[error("tick {0} out of range")]
    TickOutOfRange(i64),
    #[error("sqrt price {0} out of range")]
    SqrtPriceOutOfRange(u128),
    #[error("invalid tick range: lower {lower} must be below upper {upper}")]
    InvalidTickRange { lower: String, upper: String },
    #[error("insufficient balance of {coin_type}: required {required}, available {available}")]
    InsufficientBalance {
        coin_type: String,
        required: BigUint,
        available: BigUint,
    },
    /// Failure in the RPC, file or transaction hand-off glue.
    #[error(transparent)]
    External(#[from] anyhow::Error),
}

pub type ClmmResult<T> = Result<T, ClmmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ClmmError::InvalidSlippage("100".to_string());
        assert_eq!(err.to_string(), "invalid slippage: 100% (must be within [0, 100))");

        let err = ClmmError::InsufficientBalance {
            coin_type: "0x2::sui::SUI".to_string(),
            required: BigUint::from(10u32),
            available: BigUint::from(3u32),
        };
        assert!(err.to_string().contains("required 10, available 3"));
    }

    #[test]
    fn test_external_error_is_transparent() {
        let err: ClmmError = anyhow::anyhow!("connection refused").into();
        assert_eq!(err.to_string(), "connection refused");
    }
}

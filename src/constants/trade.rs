//! 交易默认参数

/// 默认滑点（百分比，1 = 1%）
pub const DEFAULT_SLIPPAGE_PERCENT: &str = "1";

/// 默认交易过期时间（毫秒）
pub const DEFAULT_DEADLINE_MILLIS: u64 = 60_000;

/// 默认 RPC 请求超时（毫秒）
pub const DEFAULT_RPC_TIMEOUT_MILLIS: u64 = 10_000;

/// Default JSON-RPC endpoint used when nothing is configured.
pub const DEFAULT_RPC_URL: &str = "https://fullnode.mainnet.sui.io:443";

/// Page size requested when enumerating an owner's coins.
pub const COINS_PAGE_LIMIT: u32 = 50;

/// Upper bound on pages followed while draining a coin listing.
pub const MAX_COIN_PAGES: usize = 1_000;

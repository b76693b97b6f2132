pub mod chain_reader;
pub mod error;
pub mod fee_tier;
pub mod mock_rpc;
pub mod rpc_client;
pub mod types;

pub use chain_reader::{ChainReader, CoinPage, PoolSnapshot, PositionSnapshot, list_all_coins};
pub use error::{ClmmError, ClmmResult};
pub use fee_tier::{FeeTier, FeeTierRegistry};
pub use rpc_client::{JsonRpcClient, JsonRpcConfig};
pub use types::*;

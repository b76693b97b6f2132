pub mod common;
pub mod constants;
pub mod instruction;
pub mod trading;
pub mod utils;

use crate::common::chain_reader::{ChainReader, PoolSnapshot, list_all_coins};
use crate::common::fee_tier::FeeTier;
use crate::common::rpc_client::{JsonRpcClient, JsonRpcConfig};
use crate::instruction::liquidity::{
    AddLiquidityArgs, CreatePoolArgs, DecreaseLiquidityArgs, IncreaseLiquidityArgs, amount_bounds,
    tick_range_from_prices,
};
use crate::instruction::utils::pool_type::PoolTypeArgs;
use crate::utils::calc::fixed_point::price_to_sqrt_price_x64;
use crate::utils::calc::liquidity::{amounts_for_tick_range, reference_amounts};
use crate::utils::calc::slippage::{minimum_amount, validate_slippage};
use crate::utils::coin_select::{CoinRecord, select_coin_ids, total_balance};
use crate::utils::token::get_pair_decimals;
use num_traits::Zero;
use std::sync::Arc;
use tracing::debug;

pub use crate::common::error::{ClmmError, ClmmResult};
pub use crate::common::types::{
    BaseUnitAmount, ClientConfig, Decimal, Liquidity, SqrtPriceX64, TickIndex,
};
pub use crate::instruction::liquidity::{AmountBounds, SignedTick};
pub use crate::trading::{FnSubmitter, NoopSubmitter, TransactionPayload, TransactionSubmitter};
pub use crate::utils::calc::liquidity::{Rounding, TokenAmounts};

/// Create a new pool and open the first position in it.
#[derive(Debug, Clone, Default)]
pub struct CreatePoolRequest {
    pub owner: String,
    pub coin_type_a: String,
    pub coin_type_b: String,
    /// Fee type identifier, looked up in [`ClientConfig::fee_tiers`].
    pub fee_type: String,
    /// Initial price, B per A.
    pub price: Decimal,
    pub lower_price: Decimal,
    pub upper_price: Decimal,
    pub amount_a: Decimal,
    pub amount_b: Decimal,
    /// Falls back to the configured default when `None`.
    pub slippage_percent: Option<Decimal>,
}

/// Open a new position in an existing pool.
#[derive(Debug, Clone, Default)]
pub struct AddLiquidityRequest {
    pub owner: String,
    pub pool_id: String,
    pub lower_price: Decimal,
    pub upper_price: Decimal,
    pub amount_a: Decimal,
    pub amount_b: Decimal,
    pub slippage_percent: Option<Decimal>,
}

/// Add funds to an existing position.
#[derive(Debug, Clone, Default)]
pub struct IncreaseLiquidityRequest {
    pub owner: String,
    pub pool_id: String,
    pub position_id: String,
    pub amount_a: Decimal,
    pub amount_b: Decimal,
    pub slippage_percent: Option<Decimal>,
}

/// Withdraw part or all of a position's liquidity.
#[derive(Debug, Clone, Default)]
pub struct DecreaseLiquidityRequest {
    pub pool_id: String,
    pub position_id: String,
    pub liquidity: Liquidity,
    pub slippage_percent: Option<Decimal>,
}

/// Result of handing a payload to the submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTransaction {
    pub digest: String,
    pub payload: TransactionPayload,
}

/// Liquidity client
///
/// Every operation reads chain state first (independent reads run
/// concurrently), then runs the pure math core, then hands a
/// [`TransactionPayload`] to the configured [`TransactionSubmitter`].
pub struct LiquidityClient {
    pub config: ClientConfig,
    reader: Arc<dyn ChainReader>,
    submitter: Arc<dyn TransactionSubmitter>,
}

impl LiquidityClient {
    pub fn new(
        config: ClientConfig,
        reader: Arc<dyn ChainReader>,
        submitter: Arc<dyn TransactionSubmitter>,
    ) -> Self {
        Self { config, reader, submitter }
    }

    /// 使用 JSON-RPC 读取器创建客户端
    pub fn connect(
        config: ClientConfig,
        submitter: Arc<dyn TransactionSubmitter>,
    ) -> ClmmResult<Self> {
        let rpc = JsonRpcClient::new(JsonRpcConfig {
            url: config.rpc_url.clone(),
            timeout_millis: config.timeout_millis,
        })?;
        Ok(Self::new(config, Arc::new(rpc), submitter))
    }

    /// Get the chain reader
    pub fn reader(&self) -> &Arc<dyn ChainReader> {
        &self.reader
    }

    /// Fee tier of `pool_id`, resolved from its type signature.
    pub async fn resolve_fee_tier(&self, pool_id: &str) -> ClmmResult<FeeTier> {
        let pool = self.reader.get_pool(pool_id).await?;
        let (_, fee_tier) = self.resolve_pool(&pool)?;
        Ok(fee_tier)
    }

    pub async fn prepare_create_pool(
        &self,
        request: &CreatePoolRequest,
    ) -> ClmmResult<CreatePoolArgs> {
        let fee_tier = self.config.fee_tiers.resolve(&request.fee_type)?.clone();
        let slippage = self.slippage(request.slippage_percent.as_ref())?;

        let ((decimals_a, decimals_b), coins_a, coins_b) = tokio::try_join!(
            get_pair_decimals(self.reader.as_ref(), &request.coin_type_a, &request.coin_type_b),
            self.owned_coins(&request.owner, &request.coin_type_a),
            self.owned_coins(&request.owner, &request.coin_type_b),
        )?;

        let initial_sqrt_price = price_to_sqrt_price_x64(&request.price, decimals_a, decimals_b)?;
        let (tick_lower, tick_upper) = tick_range_from_prices(
            &request.lower_price,
            &request.upper_price,
            decimals_a,
            decimals_b,
            &fee_tier,
        )?;
        let amounts =
            amount_bounds(&request.amount_a, &request.amount_b, decimals_a, decimals_b, &slippage)?;
        let coins_a = fund(&request.coin_type_a, &coins_a, &amounts.amount_a)?;
        let coins_b = fund(&request.coin_type_b, &coins_b, &amounts.amount_b)?;

        debug!(
            coin_type_a = %request.coin_type_a,
            coin_type_b = %request.coin_type_b,
            %initial_sqrt_price,
            tick_lower,
            tick_upper,
            "prepared create_pool"
        );

        Ok(CreatePoolArgs {
            coin_type_a: request.coin_type_a.clone(),
            coin_type_b: request.coin_type_b.clone(),
            fee_type: request.fee_type.clone(),
            initial_sqrt_price,
            tick_lower: tick_lower.into(),
            tick_upper: tick_upper.into(),
            amounts,
            coins_a,
            coins_b,
            deadline: trading::deadline_from_now(self.config.deadline_millis),
        })
    }

    pub async fn prepare_add_liquidity(
        &self,
        request: &AddLiquidityRequest,
    ) -> ClmmResult<AddLiquidityArgs> {
        let slippage = self.slippage(request.slippage_percent.as_ref())?;
        let pool = self.reader.get_pool(&request.pool_id).await?;
        let (args, fee_tier) = self.resolve_pool(&pool)?;

        let ((decimals_a, decimals_b), coins_a, coins_b) = tokio::try_join!(
            get_pair_decimals(self.reader.as_ref(), &args.coin_type_a, &args.coin_type_b),
            self.owned_coins(&request.owner, &args.coin_type_a),
            self.owned_coins(&request.owner, &args.coin_type_b),
        )?;

        let (tick_lower, tick_upper) = tick_range_from_prices(
            &request.lower_price,
            &request.upper_price,
            decimals_a,
            decimals_b,
            &fee_tier,
        )?;
        let amounts =
            amount_bounds(&request.amount_a, &request.amount_b, decimals_a, decimals_b, &slippage)?;
        let coins_a = fund(&args.coin_type_a, &coins_a, &amounts.amount_a)?;
        let coins_b = fund(&args.coin_type_b, &coins_b, &amounts.amount_b)?;

        debug!(pool_id = %request.pool_id, tick_lower, tick_upper, "prepared add_liquidity");

        Ok(AddLiquidityArgs {
            pool_id: pool.pool_id,
            coin_type_a: args.coin_type_a,
            coin_type_b: args.coin_type_b,
            fee_type: args.fee_type,
            tick_lower: tick_lower.into(),
            tick_upper: tick_upper.into(),
            amounts,
            coins_a,
            coins_b,
            deadline: trading::deadline_from_now(self.config.deadline_millis),
        })
    }

    pub async fn prepare_increase_liquidity(
        &self,
        request: &IncreaseLiquidityRequest,
    ) -> ClmmResult<IncreaseLiquidityArgs> {
        let slippage = self.slippage(request.slippage_percent.as_ref())?;
        let (pool, position) = tokio::try_join!(
            self.reader.get_pool(&request.pool_id),
            self.reader.get_position(&request.position_id),
        )?;
        let (args, _) = self.resolve_pool(&pool)?;

        let ((decimals_a, decimals_b), coins_a, coins_b) = tokio::try_join!(
            get_pair_decimals(self.reader.as_ref(), &args.coin_type_a, &args.coin_type_b),
            self.owned_coins(&request.owner, &args.coin_type_a),
            self.owned_coins(&request.owner, &args.coin_type_b),
        )?;

        let amounts =
            amount_bounds(&request.amount_a, &request.amount_b, decimals_a, decimals_b, &slippage)?;
        let coins_a = fund(&args.coin_type_a, &coins_a, &amounts.amount_a)?;
        let coins_b = fund(&args.coin_type_b, &coins_b, &amounts.amount_b)?;

        debug!(
            pool_id = %request.pool_id,
            position_id = %position.position_id,
            "prepared increase_liquidity"
        );

        Ok(IncreaseLiquidityArgs {
            pool_id: pool.pool_id,
            position_id: position.position_id,
            coin_type_a: args.coin_type_a,
            coin_type_b: args.coin_type_b,
            fee_type: args.fee_type,
            amounts,
            coins_a,
            coins_b,
            deadline: trading::deadline_from_now(self.config.deadline_millis),
        })
    }

    pub async fn prepare_decrease_liquidity(
        &self,
        request: &DecreaseLiquidityRequest,
    ) -> ClmmResult<DecreaseLiquidityArgs> {
        let slippage = self.slippage(request.slippage_percent.as_ref())?;
        let (pool, position) = tokio::try_join!(
            self.reader.get_pool(&request.pool_id),
            self.reader.get_position(&request.position_id),
        )?;
        let (args, _) = self.resolve_pool(&pool)?;

        if request.liquidity.is_zero() || request.liquidity > position.liquidity {
            return Err(ClmmError::InvalidAmount(format!(
                "liquidity {} must be within (0, {}]",
                request.liquidity, position.liquidity
            )));
        }

        // 取回数量按 floor 计算，不承诺多于协议实际释放的数量
        let released = amounts_for_tick_range(
            pool.current_sqrt_price()?,
            position.tick_lower,
            position.tick_upper,
            &request.liquidity,
            Rounding::Floor,
        )?;

        debug!(
            pool_id = %request.pool_id,
            position_id = %position.position_id,
            amount_a = %released.amount_a,
            amount_b = %released.amount_b,
            "prepared decrease_liquidity"
        );

        Ok(DecreaseLiquidityArgs {
            pool_id: pool.pool_id,
            position_id: position.position_id,
            coin_type_a: args.coin_type_a,
            coin_type_b: args.coin_type_b,
            fee_type: args.fee_type,
            liquidity: request.liquidity.clone(),
            amount_a_min: minimum_amount(&released.amount_a, &slippage)?,
            amount_b_min: minimum_amount(&released.amount_b, &slippage)?,
            deadline: trading::deadline_from_now(self.config.deadline_millis),
        })
    }

    pub async fn create_pool(
        &self,
        request: &CreatePoolRequest,
    ) -> ClmmResult<SubmittedTransaction> {
        let args = self.prepare_create_pool(request).await?;
        self.submit(TransactionPayload::CreatePool(args)).await
    }

    pub async fn add_liquidity(
        &self,
        request: &AddLiquidityRequest,
    ) -> ClmmResult<SubmittedTransaction> {
        let args = self.prepare_add_liquidity(request).await?;
        self.submit(TransactionPayload::AddLiquidity(args)).await
    }

    pub async fn increase_liquidity(
        &self,
        request: &IncreaseLiquidityRequest,
    ) -> ClmmResult<SubmittedTransaction> {
        let args = self.prepare_increase_liquidity(request).await?;
        self.submit(TransactionPayload::IncreaseLiquidity(args)).await
    }

    pub async fn decrease_liquidity(
        &self,
        request: &DecreaseLiquidityRequest,
    ) -> ClmmResult<SubmittedTransaction> {
        let args = self.prepare_decrease_liquidity(request).await?;
        self.submit(TransactionPayload::DecreaseLiquidity(args)).await
    }

    /// Token amounts for the reference liquidity in `[tick_lower, tick_upper)`
    /// at the pool's current price. Preview only.
    pub async fn preview_amounts(
        &self,
        pool_id: &str,
        tick_lower: TickIndex,
        tick_upper: TickIndex,
    ) -> ClmmResult<TokenAmounts> {
        let pool = self.reader.get_pool(pool_id).await?;
        reference_amounts(pool.current_sqrt_price()?, tick_lower, tick_upper)
    }

    async fn submit(&self, payload: TransactionPayload) -> ClmmResult<SubmittedTransaction> {
        debug!(
            kind = payload.kind(),
            deadline = payload.deadline(),
            payload = %payload.to_json(),
            "submitting transaction"
        );
        let digest = self.submitter.submit(payload.clone()).await?;
        Ok(SubmittedTransaction { digest, payload })
    }

    fn slippage(&self, requested: Option<&Decimal>) -> ClmmResult<Decimal> {
        let slippage = match requested {
            Some(slippage) => slippage.clone(),
            None => {
                log::debug!(
                    "no slippage given, using default {}%",
                    self.config.default_slippage_percent
                );
                self.config.default_slippage_percent.clone()
            }
        };
        validate_slippage(&slippage)?;
        Ok(slippage)
    }

    fn resolve_pool(&self, pool: &PoolSnapshot) -> ClmmResult<(PoolTypeArgs, FeeTier)> {
        let args = PoolTypeArgs::parse(&pool.pool_type)?;
        let fee_tier = args.fee_tier(&self.config.fee_tiers)?.clone();
        Ok((args, fee_tier))
    }

    async fn owned_coins(&self, owner: &str, coin_type: &str) -> ClmmResult<Vec<CoinRecord>> {
        Ok(list_all_coins(self.reader.as_ref(), owner, coin_type).await?)
    }
}

/// Coin ids covering `required`, or `InsufficientBalance`.
fn fund(
    coin_type: &str,
    coins: &[CoinRecord],
    required: &BaseUnitAmount,
) -> ClmmResult<Vec<String>> {
    let available = total_balance(coins);
    if &available < required {
        return Err(ClmmError::InsufficientBalance {
            coin_type: coin_type.to_string(),
            required: required.clone(),
            available,
        });
    }
    Ok(select_coin_ids(coins, required))
}

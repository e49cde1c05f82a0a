//! Add, remove and claim orchestration for DLMM positions.
//!
//! `add_liquidity` runs as an explicit state machine:
//!
//! ```text
//! Sizing -> Building -> Simulating -> Submitting -> Confirming -> Verifying -> Done
//!                                                                    |
//!                                                               BugDetected -> Cleanup -> Sizing
//!                                                                                   \-> Failed
//! ```
//!
//! A deposit that confirms but moves zero of a requested side is a
//! "statistical bug": the position is unwound through `remove_liquidity` and
//! the deposit is sized again, up to `max_add_attempts` times.

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::signer::keypair::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use std::sync::Arc;

use crate::config::{Config, ExistingPositionPolicy, ManagerConfig};
use crate::error::{LiquidityError, Result};
use crate::meteora::{
    DepositRequest, DlmmProgram, LiquidityStrategy, PoolClient, StrategyType, WithdrawRequest,
    FULL_WITHDRAWAL_BPS,
};
use crate::models::{Amount, Bin, Pool, Position};
use crate::solana::{create_client_from_config, create_wallet_manager_from_config, WalletSigner};
use crate::strategy::sizing::calculate_pool_amounts;
use crate::utils::{format_pair, format_pubkey};
use crate::verifier::{RpcTransactionVerifier, TransactionVerifier};

/// Caller-supplied deposit parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddLiquidityParams {
    /// Amount of X in UI units, or `"auto"`
    pub amount_x: String,
    /// Amount of Y in UI units, or `"auto"`
    pub amount_y: String,
    /// Bins on each side of the active bin when a new position is opened;
    /// the configured default when absent
    #[serde(default)]
    pub range_interval: Option<u16>,
    #[serde(default)]
    pub strategy: StrategyType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddLiquidityOutcome {
    pub position: Pubkey,
    /// Verified amounts that left the wallet, base units
    pub liquidity_added: [u64; 2],
    pub signature: Signature,
    pub attempts: u32,
    pub created_position: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoveLiquidityOutcome {
    pub position: Pubkey,
    pub liquidity_removed: [u64; 2],
    pub fees_claimed: [u64; 2],
    pub signatures: Vec<Signature>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimFeesOutcome {
    pub position: Pubkey,
    pub claimed: [u64; 2],
    pub signature: Signature,
}

/// Attempt bookkeeping for one `add_liquidity` call
#[derive(Debug)]
struct RetryState {
    attempt: u32,
    max_attempts: u32,
    last_error: Option<LiquidityError>,
}

impl RetryState {
    fn new(max_attempts: u32) -> Self {
        Self { attempt: 1, max_attempts: max_attempts.max(1), last_error: None }
    }

    fn exhausted(&self) -> bool {
        self.attempt >= self.max_attempts
    }
}

/// A built deposit travelling through the pipeline
struct DraftDeposit {
    transaction: Transaction,
    position: Pubkey,
    /// Present when the transaction initializes a new position
    position_keypair: Option<Keypair>,
    totals: (u64, u64),
}

enum AddState {
    Sizing,
    Building { existing: Option<Position>, active_bin: Bin, totals: (u64, u64) },
    Simulating(DraftDeposit),
    Submitting(DraftDeposit),
    Confirming { draft: DraftDeposit, signature: Signature },
    Verifying { draft: DraftDeposit, signature: Signature },
    BugDetected { position: Pubkey },
    Cleanup { position: Pubkey },
    Done(AddLiquidityOutcome),
    Failed(LiquidityError),
}

impl AddState {
    fn name(&self) -> &'static str {
        match self {
            AddState::Sizing => "Sizing",
            AddState::Building { .. } => "Building",
            AddState::Simulating(_) => "Simulating",
            AddState::Submitting(_) => "Submitting",
            AddState::Confirming { .. } => "Confirming",
            AddState::Verifying { .. } => "Verifying",
            AddState::BugDetected { .. } => "BugDetected",
            AddState::Cleanup { .. } => "Cleanup",
            AddState::Done(_) => "Done",
            AddState::Failed(_) => "Failed",
        }
    }
}

/// Validated inputs shared by every attempt of one deposit
struct AddContext<'a> {
    pool: &'a Pool,
    owner: Pubkey,
    amount_x: Amount,
    amount_y: Amount,
    range_interval: u16,
    strategy: StrategyType,
}

/// Orchestrates liquidity operations against one wallet
pub struct LiquidityPositionManager {
    pools: PoolClient,
    program: Arc<dyn DlmmProgram>,
    wallet: Arc<dyn WalletSigner>,
    verifier: Arc<dyn TransactionVerifier>,
    config: ManagerConfig,
}

impl LiquidityPositionManager {
    pub fn new(
        pools: PoolClient,
        program: Arc<dyn DlmmProgram>,
        wallet: Arc<dyn WalletSigner>,
        verifier: Arc<dyn TransactionVerifier>,
        config: ManagerConfig,
    ) -> Self {
        Self { pools, program, wallet, verifier, config }
    }

    /// Wire the RPC-backed wallet, verifier and pool client described by `config`
    pub fn from_config(config: &Config, program: Arc<dyn DlmmProgram>) -> Result<Self> {
        let client = create_client_from_config(config);
        let wallet = create_wallet_manager_from_config(config, client.clone())?;
        let verifier = RpcTransactionVerifier::new(client.clone(), wallet.public_key());
        let pools = PoolClient::from_config(config, client, program.clone());

        Ok(Self::new(
            pools,
            program,
            Arc::new(wallet),
            Arc::new(verifier),
            config.manager_config(),
        ))
    }

    pub fn owner(&self) -> Pubkey {
        self.wallet.public_key()
    }

    pub async fn pools(&self, token_a: &str, token_b: &str, limit: usize) -> Result<Vec<Pool>> {
        self.pools.list_pools(token_a, token_b, limit).await
    }

    pub async fn pool(&self, address: &Pubkey) -> Result<Pool> {
        self.pools.get_pool(address).await
    }

    /// Positions of the wallet, in every pool or in `pool` only
    pub async fn positions(&self, pool: Option<&Pubkey>) -> Result<Vec<Position>> {
        self.pools.get_user_positions(&self.owner(), pool).await
    }

    pub async fn active_bin(&self, pool: &Pubkey) -> Result<Bin> {
        self.pools.get_active_bin(pool).await
    }

    /// Deposit into the wallet's position in `pool`, opening one if needed
    pub async fn add_liquidity(
        &self,
        pool: &Pool,
        params: &AddLiquidityParams,
    ) -> Result<AddLiquidityOutcome> {
        let ctx = self.validate_add(pool, params)?;
        info!(
            "Adding liquidity to {} ({}): x={} y={} interval={}",
            pool.name, pool.address, ctx.amount_x, ctx.amount_y, ctx.range_interval
        );

        let mut retry = RetryState::new(self.config.max_add_attempts);
        let mut state = AddState::Sizing;

        loop {
            state = match state {
                AddState::Done(outcome) => {
                    info!(
                        "Added {} to position {} after {} attempt(s)",
                        format_pair(&outcome.liquidity_added),
                        outcome.position,
                        outcome.attempts
                    );
                    return Ok(outcome);
                }
                AddState::Failed(e) => {
                    return Err(e.in_operation("add_liquidity", format!("pool {}", pool.address)));
                }
                current => {
                    let from = current.name();
                    let next = match self.advance(&ctx, current, &mut retry).await {
                        Ok(next) => next,
                        Err(e) => AddState::Failed(e),
                    };
                    debug!(
                        "add_liquidity[{}] attempt {}: {} -> {}",
                        format_pubkey(&pool.address),
                        retry.attempt,
                        from,
                        next.name()
                    );
                    next
                }
            };
        }
    }

    async fn advance(
        &self,
        ctx: &AddContext<'_>,
        state: AddState,
        retry: &mut RetryState,
    ) -> Result<AddState> {
        let pool = ctx.pool;

        match state {
            AddState::Sizing => {
                let existing = self
                    .pools
                    .get_user_positions(&ctx.owner, Some(&pool.address))
                    .await?
                    .into_iter()
                    .next();
                let refuse =
                    self.config.existing_position_policy == ExistingPositionPolicy::Refuse;
                if existing.is_some() && refuse {
                    return Err(LiquidityError::InvalidParameters(format!(
                        "wallet already holds a position in pool {}",
                        pool.address
                    )));
                }

                let active_bin = self.pools.get_active_bin(&pool.address).await?;
                let totals = calculate_pool_amounts(
                    &ctx.amount_x,
                    &ctx.amount_y,
                    active_bin.price_per_token,
                    pool,
                )?;
                if totals == (0, 0) {
                    return Err(LiquidityError::ZeroLiquidity);
                }

                Ok(AddState::Building { existing, active_bin, totals })
            }

            AddState::Building { existing, active_bin, totals } => {
                let (position, position_keypair, min_bin_id, max_bin_id) = match existing {
                    Some(position) => {
                        debug!(
                            "Reusing position {} [{}, {}]",
                            position.address, position.min_bin_id, position.max_bin_id
                        );
                        (position.address, None, position.min_bin_id, position.max_bin_id)
                    }
                    None => {
                        let (min_bin_id, max_bin_id) =
                            symmetric_range(active_bin.bin_id, ctx.range_interval)?;
                        let keypair = Keypair::new();
                        debug!(
                            "Opening position {} [{}, {}] at prices {}",
                            keypair.pubkey(),
                            min_bin_id,
                            max_bin_id,
                            price_range(pool, min_bin_id, max_bin_id)
                        );
                        (keypair.pubkey(), Some(keypair), min_bin_id, max_bin_id)
                    }
                };

                let request = DepositRequest {
                    pool: pool.address,
                    owner: ctx.owner,
                    position,
                    initialize_position: position_keypair.is_some(),
                    total_x: totals.0,
                    total_y: totals.1,
                    strategy: LiquidityStrategy {
                        min_bin_id,
                        max_bin_id,
                        strategy_type: ctx.strategy,
                    },
                    slippage_bps: self.config.slippage_bps,
                };
                let transaction = self.program.build_add_liquidity(&request).await?;

                Ok(AddState::Simulating(DraftDeposit {
                    transaction,
                    position,
                    position_keypair,
                    totals,
                }))
            }

            AddState::Simulating(draft) => {
                let [x, y] =
                    self.verifier.simulate_add_liquidity(&draft.transaction, pool).await?;
                if x.amount == 0 || y.amount == 0 {
                    return Err(LiquidityError::SimulationFailed(format!(
                        "deposit into {} would move x={} y={}",
                        draft.position, x.amount, y.amount
                    )));
                }
                Ok(AddState::Submitting(draft))
            }

            AddState::Submitting(draft) => {
                let extra_signers: Vec<&Keypair> = draft.position_keypair.iter().collect();
                let signature = self
                    .wallet
                    .sign_and_send(draft.transaction.clone(), &extra_signers)
                    .await?;
                Ok(AddState::Confirming { draft, signature })
            }

            AddState::Confirming { draft, signature } => {
                let status = self.wallet.wait_for_confirmation(&signature).await?;
                if let Some(reason) = status.err {
                    return Err(LiquidityError::TransactionFailed { signature, reason });
                }
                Ok(AddState::Verifying { draft, signature })
            }

            AddState::Verifying { draft, signature } => {
                let (mint_x, mint_y) = pool.mints();
                let changes =
                    self.verifier.extract_balance_changes(&signature, &mint_x, &mint_y).await?;
                let deposited = changes.liquidity_deposited();

                let (requested_x, requested_y) = draft.totals;
                let missing_x = requested_x > 0 && deposited[0] == 0;
                let missing_y = requested_y > 0 && deposited[1] == 0;
                if missing_x || missing_y {
                    warn!(
                        "Deposit {} into {} requested ({}, {}) but moved {}",
                        signature,
                        draft.position,
                        requested_x,
                        requested_y,
                        format_pair(&deposited)
                    );
                    return Ok(AddState::BugDetected { position: draft.position });
                }

                Ok(AddState::Done(AddLiquidityOutcome {
                    position: draft.position,
                    liquidity_added: deposited,
                    signature,
                    attempts: retry.attempt,
                    created_position: draft.position_keypair.is_some(),
                }))
            }

            AddState::BugDetected { position } => {
                retry.last_error = Some(LiquidityError::StatisticalBug { position });
                Ok(AddState::Cleanup { position })
            }

            AddState::Cleanup { position } => {
                if let Err(e) = self.remove_liquidity(pool, Some(&position), true).await {
                    warn!("Cleanup of position {} failed, continuing: {}", position, e);
                }

                let last = retry
                    .last_error
                    .take()
                    .unwrap_or(LiquidityError::StatisticalBug { position });
                if retry.exhausted() {
                    error!(
                        "Deposit into pool {} failed verification {} times",
                        pool.address, retry.attempt
                    );
                    return Ok(AddState::Failed(LiquidityError::RetryBudgetExhausted {
                        attempts: retry.attempt,
                        last: Box::new(last),
                    }));
                }

                retry.attempt += 1;
                info!(
                    "Retrying deposit into {} (attempt {}/{})",
                    pool.address, retry.attempt, retry.max_attempts
                );
                Ok(AddState::Sizing)
            }

            terminal @ (AddState::Done(_) | AddState::Failed(_)) => Ok(terminal),
        }
    }

    fn validate_add<'a>(
        &self,
        pool: &'a Pool,
        params: &AddLiquidityParams,
    ) -> Result<AddContext<'a>> {
        if params.amount_x.trim().is_empty() || params.amount_y.trim().is_empty() {
            return Err(LiquidityError::InvalidParameters(
                "both amount_x and amount_y are required (one may be \"auto\")".to_string(),
            ));
        }
        if pool.address == Pubkey::default() {
            return Err(LiquidityError::InvalidParameters("pool address is required".to_string()));
        }
        if pool.token_x.mint == pool.token_y.mint {
            return Err(LiquidityError::InvalidParameters(format!(
                "pool {} has identical token mints",
                pool.address
            )));
        }

        let amount_x: Amount = params.amount_x.parse()?;
        let amount_y: Amount = params.amount_y.parse()?;
        if amount_x.is_derived() && amount_y.is_derived() {
            return Err(LiquidityError::AmbiguousAmount);
        }

        Ok(AddContext {
            pool,
            owner: self.wallet.public_key(),
            amount_x,
            amount_y,
            range_interval: params.range_interval.unwrap_or(self.config.default_range_interval),
            strategy: params.strategy,
        })
    }

    /// Withdraw all liquidity of a position, optionally closing it
    pub async fn remove_liquidity(
        &self,
        pool: &Pool,
        position: Option<&Pubkey>,
        should_close_position: bool,
    ) -> Result<RemoveLiquidityOutcome> {
        self.remove_position_liquidity(pool, position, should_close_position)
            .await
            .map_err(|e| e.in_operation("remove_liquidity", format!("pool {}", pool.address)))
    }

    async fn remove_position_liquidity(
        &self,
        pool: &Pool,
        position: Option<&Pubkey>,
        should_close_position: bool,
    ) -> Result<RemoveLiquidityOutcome> {
        let owner = self.wallet.public_key();
        let position = self.resolve_position(pool, position).await?;
        let bin_ids = position.bin_ids();
        info!(
            "Removing liquidity from position {} ({} bins, close={})",
            position.address,
            bin_ids.len(),
            should_close_position
        );

        let mut outcome =
            RemoveLiquidityOutcome { position: position.address, ..Default::default() };
        if bin_ids.is_empty() && !should_close_position {
            info!("Position {} holds no liquidity", position.address);
            return Ok(outcome);
        }

        let request = WithdrawRequest {
            pool: pool.address,
            owner,
            position: position.address,
            bin_ids,
            bps: FULL_WITHDRAWAL_BPS,
            claim_and_close: should_close_position,
        };
        let transactions = self.program.build_remove_liquidity(&request).await?;
        let (mint_x, mint_y) = pool.mints();

        for (index, transaction) in transactions.into_iter().enumerate() {
            let signature = self.submit(transaction, &[]).await?;
            let changes =
                self.verifier.extract_balance_changes(&signature, &mint_x, &mint_y).await?;
            let removed = changes.liquidity_removed();
            debug!(
                "Removal transaction {} ({}) returned {} plus fees {}",
                index + 1,
                signature,
                format_pair(&removed),
                format_pair(&changes.fees_claimed)
            );

            for side in 0..2 {
                let total = &mut outcome.liquidity_removed[side];
                *total = total.saturating_add(removed[side]);
                let fees = &mut outcome.fees_claimed[side];
                *fees = fees.saturating_add(changes.fees_claimed[side]);
            }
            outcome.signatures.push(signature);
        }

        info!(
            "Removed {} and claimed {} from position {}",
            format_pair(&outcome.liquidity_removed),
            format_pair(&outcome.fees_claimed),
            outcome.position
        );
        Ok(outcome)
    }

    /// Claim the accrued fees of the wallet's position in `pool`
    pub async fn claim_fees(&self, pool: &Pool) -> Result<ClaimFeesOutcome> {
        self.claim_position_fees(pool)
            .await
            .map_err(|e| e.in_operation("claim_fees", format!("pool {}", pool.address)))
    }

    async fn claim_position_fees(&self, pool: &Pool) -> Result<ClaimFeesOutcome> {
        let owner = self.wallet.public_key();
        let before = self.resolve_position(pool, None).await?;
        debug!(
            "Fees before claim on {}: ({}, {})",
            before.address, before.fee_x, before.fee_y
        );

        let transaction = self.program.build_claim_fee(&owner, &before).await?;
        let signature = self.submit(transaction, &[]).await?;

        let after = self
            .pools
            .get_position(&before.address)
            .await?
            .ok_or(LiquidityError::NoPositionFound(pool.address))?;

        let claimed = [
            before.fee_x.saturating_sub(after.fee_x),
            before.fee_y.saturating_sub(after.fee_y),
        ];
        info!("Claimed fees {} from position {}", format_pair(&claimed), before.address);

        Ok(ClaimFeesOutcome { position: before.address, claimed, signature })
    }

    /// Explicit position, or the wallet's first position in `pool`
    async fn resolve_position(&self, pool: &Pool, address: Option<&Pubkey>) -> Result<Position> {
        let position = match address {
            Some(address) => self.pools.get_position(address).await?,
            None => self
                .pools
                .get_user_positions(&self.wallet.public_key(), Some(&pool.address))
                .await?
                .into_iter()
                .next(),
        };

        let position = position.ok_or(LiquidityError::NoPositionFound(pool.address))?;
        if position.pool != pool.address {
            return Err(LiquidityError::InvalidParameters(format!(
                "position {} belongs to pool {}, not {}",
                position.address, position.pool, pool.address
            )));
        }
        Ok(position)
    }

    /// Sign, send and wait for a transaction that is not part of the deposit pipeline
    async fn submit(
        &self,
        transaction: Transaction,
        extra_signers: &[&Keypair],
    ) -> Result<Signature> {
        let signature = self.wallet.sign_and_send(transaction, extra_signers).await?;
        let status = self.wallet.wait_for_confirmation(&signature).await?;
        match status.err {
            Some(reason) => Err(LiquidityError::TransactionFailed { signature, reason }),
            None => Ok(signature),
        }
    }
}

/// UI prices at the edges of a bin range, for logging
fn price_range(pool: &Pool, min_bin_id: i32, max_bin_id: i32) -> String {
    let price = |bin_id| {
        Bin::from_id(bin_id, pool.bin_step, pool.token_x.decimals, pool.token_y.decimals)
            .map(|bin| bin.price_per_token.round_dp(6).to_string())
            .unwrap_or_else(|| "?".to_string())
    };
    format!("{}..{}", price(min_bin_id), price(max_bin_id))
}

/// `[active - interval, active + interval]`
fn symmetric_range(active_bin_id: i32, interval: u16) -> Result<(i32, i32)> {
    let interval = i32::from(interval);
    match (active_bin_id.checked_sub(interval), active_bin_id.checked_add(interval)) {
        (Some(min), Some(max)) => Ok((min, max)),
        _ => Err(LiquidityError::InvalidParameters(format!(
            "range interval {} overflows around bin {}",
            interval, active_bin_id
        ))),
    }
}

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal_macros::dec;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::signer::keypair::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use meteora_dlmm_manager::config::{Config, ExistingPositionPolicy, ManagerConfig};
use meteora_dlmm_manager::error::{LiquidityError, Result};
use meteora_dlmm_manager::meteora::{
    DepositRequest, DlmmProgram, PoolClient, StrategyType, WithdrawRequest,
};
use meteora_dlmm_manager::models::{Bin, Pool, Position, PositionBin, TokenInfo};
use meteora_dlmm_manager::retry::RetryPolicy;
use meteora_dlmm_manager::solana::{ConfirmationStatus, SolanaClient, WalletSigner};
use meteora_dlmm_manager::strategy::{AddLiquidityParams, LiquidityPositionManager};
use meteora_dlmm_manager::verifier::{BalanceChanges, SimulatedAmount, TransactionVerifier};

const MAX_BINS_PER_TX: usize = 20;

enum PendingOp {
    Deposit(DepositRequest),
    Withdraw { position: Pubkey, bin_ids: Vec<i32>, close: bool },
    Claim { position: Pubkey },
}

#[derive(Default)]
struct ChainState {
    active_bins: HashMap<Pubkey, Bin>,
    positions: HashMap<Pubkey, Position>,
    pending: HashMap<u64, PendingOp>,
    next_op: u64,
    changes: HashMap<Signature, BalanceChanges>,
    failed: HashMap<Signature, String>,
    /// Deposits that confirm while moving no Y
    partial_deposits: u32,
    /// Next submitted transaction fails on chain with this error
    reject_next: Option<String>,
    /// Simulated deposits predict that no Y leaves the wallet
    simulate_without_y: bool,
    /// Removal builds that fail before anything is sent
    failing_removals: u32,
    deposits_sent: u32,
    withdraw_transactions: u32,
    closing_withdrawals: u32,
}

/// In-memory stand-in for the DLMM program, the wallet and the verifier
struct FakeChain {
    owner: Keypair,
    program_id: Pubkey,
    state: Mutex<ChainState>,
}

impl FakeChain {
    fn new() -> Self {
        Self {
            owner: Keypair::new(),
            program_id: Pubkey::new_unique(),
            state: Mutex::new(ChainState::default()),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut ChainState) -> T) -> T {
        f(&mut self.state.lock().unwrap())
    }

    fn tagged(&self, state: &mut ChainState, op: PendingOp) -> Transaction {
        let id = state.next_op;
        state.next_op += 1;
        state.pending.insert(id, op);
        let instruction = Instruction::new_with_bytes(self.program_id, &id.to_le_bytes(), vec![]);
        Transaction::new_with_payer(&[instruction], Some(&self.owner.pubkey()))
    }
}

fn op_id(transaction: &Transaction) -> u64 {
    let data = &transaction.message.instructions[0].data;
    u64::from_le_bytes(data[..8].try_into().unwrap())
}

fn apply_deposit(state: &mut ChainState, request: &DepositRequest) -> Result<BalanceChanges> {
    let position = state
        .positions
        .get_mut(&request.position)
        .ok_or(LiquidityError::NoPositionFound(request.pool))?;

    state.deposits_sent += 1;
    let (x, y) = if state.partial_deposits > 0 {
        state.partial_deposits -= 1;
        (request.total_x, 0)
    } else {
        (request.total_x, request.total_y)
    };

    let count = position.bins.len() as u64;
    for (index, bin) in position.bins.iter_mut().enumerate() {
        let last = index as u64 == count - 1;
        bin.x_amount += if last { x / count + x % count } else { x / count };
        bin.y_amount += if last { y / count + y % count } else { y / count };
    }

    Ok(BalanceChanges { liquidity: [-(x as i128), -(y as i128)], fees_claimed: [0, 0] })
}

#[async_trait]
impl DlmmProgram for FakeChain {
    async fn active_bin(&self, pool: &Pubkey) -> Result<Option<Bin>> {
        Ok(self.with_state(|s| s.active_bins.get(pool).cloned()))
    }

    async fn positions_by_owner(
        &self,
        owner: &Pubkey,
        pool: Option<&Pubkey>,
    ) -> Result<Vec<Position>> {
        Ok(self.with_state(|s| {
            s.positions
                .values()
                .filter(|p| p.owner == *owner && pool.map_or(true, |pool| p.pool == *pool))
                .cloned()
                .collect()
        }))
    }

    async fn position(&self, address: &Pubkey) -> Result<Option<Position>> {
        Ok(self.with_state(|s| s.positions.get(address).cloned()))
    }

    async fn build_add_liquidity(&self, request: &DepositRequest) -> Result<Transaction> {
        let mut state = self.state.lock().unwrap();
        if !request.initialize_position && !state.positions.contains_key(&request.position) {
            return Err(LiquidityError::NoPositionFound(request.pool));
        }
        Ok(self.tagged(&mut state, PendingOp::Deposit(request.clone())))
    }

    async fn build_remove_liquidity(&self, request: &WithdrawRequest) -> Result<Vec<Transaction>> {
        let mut state = self.state.lock().unwrap();
        if state.failing_removals > 0 {
            state.failing_removals -= 1;
            return Err(LiquidityError::Program(anyhow::anyhow!("bin array account unavailable")));
        }
        let chunks: Vec<Vec<i32>> = if request.bin_ids.is_empty() {
            vec![Vec::new()]
        } else {
            request.bin_ids.chunks(MAX_BINS_PER_TX).map(<[i32]>::to_vec).collect()
        };

        let last = chunks.len() - 1;
        Ok(chunks
            .into_iter()
            .enumerate()
            .map(|(index, bin_ids)| {
                let op = PendingOp::Withdraw {
                    position: request.position,
                    bin_ids,
                    close: request.claim_and_close && index == last,
                };
                self.tagged(&mut state, op)
            })
            .collect())
    }

    async fn build_claim_fee(&self, _owner: &Pubkey, position: &Position) -> Result<Transaction> {
        let mut state = self.state.lock().unwrap();
        Ok(self.tagged(&mut state, PendingOp::Claim { position: position.address }))
    }
}

#[async_trait]
impl WalletSigner for FakeChain {
    fn public_key(&self) -> Pubkey {
        self.owner.pubkey()
    }

    async fn sign_and_send(
        &self,
        transaction: Transaction,
        extra_signers: &[&Keypair],
    ) -> Result<Signature> {
        let mut state = self.state.lock().unwrap();
        let op = state
            .pending
            .remove(&op_id(&transaction))
            .ok_or_else(|| LiquidityError::InvalidParameters("unknown transaction".to_string()))?;
        let signature = Signature::new_unique();

        if let Some(reason) = state.reject_next.take() {
            state.failed.insert(signature, reason);
            return Ok(signature);
        }

        let changes = match op {
            PendingOp::Deposit(request) => {
                if request.initialize_position {
                    if !extra_signers.iter().any(|k| k.pubkey() == request.position) {
                        return Err(LiquidityError::InvalidParameters(
                            "position keypair did not sign".to_string(),
                        ));
                    }
                    let bins = (request.strategy.min_bin_id..=request.strategy.max_bin_id)
                        .map(|bin_id| PositionBin {
                            bin_id,
                            x_amount: 0,
                            y_amount: 0,
                            liquidity_share: 0,
                        })
                        .collect();
                    state.positions.insert(
                        request.position,
                        Position {
                            address: request.position,
                            pool: request.pool,
                            owner: request.owner,
                            min_bin_id: request.strategy.min_bin_id,
                            max_bin_id: request.strategy.max_bin_id,
                            bins,
                            fee_x: 0,
                            fee_y: 0,
                            last_updated_at: Some(Utc::now()),
                        },
                    );
                }
                apply_deposit(&mut state, &request)?
            }
            PendingOp::Withdraw { position, bin_ids, close } => {
                state.withdraw_transactions += 1;
                let held = state
                    .positions
                    .get_mut(&position)
                    .ok_or(LiquidityError::NoPositionFound(position))?;

                let mut returned = [0i128; 2];
                held.bins.retain(|bin| {
                    if bin_ids.contains(&bin.bin_id) {
                        returned[0] += i128::from(bin.x_amount);
                        returned[1] += i128::from(bin.y_amount);
                        false
                    } else {
                        true
                    }
                });

                let mut fees = [0u64; 2];
                if close {
                    fees = [held.fee_x, held.fee_y];
                    state.positions.remove(&position);
                    state.closing_withdrawals += 1;
                }
                BalanceChanges { liquidity: returned, fees_claimed: fees }
            }
            PendingOp::Claim { position } => {
                let held = state
                    .positions
                    .get_mut(&position)
                    .ok_or(LiquidityError::NoPositionFound(position))?;
                let fees = [held.fee_x, held.fee_y];
                held.fee_x = 0;
                held.fee_y = 0;
                BalanceChanges { liquidity: [0, 0], fees_claimed: fees }
            }
        };

        state.changes.insert(signature, changes);
        Ok(signature)
    }

    async fn wait_for_confirmation(&self, signature: &Signature) -> Result<ConfirmationStatus> {
        Ok(ConfirmationStatus { err: self.with_state(|s| s.failed.get(signature).cloned()) })
    }
}

#[async_trait]
impl TransactionVerifier for FakeChain {
    async fn extract_balance_changes(
        &self,
        signature: &Signature,
        _mint_x: &Pubkey,
        _mint_y: &Pubkey,
    ) -> Result<BalanceChanges> {
        self.with_state(|s| s.changes.get(signature).copied())
            .ok_or(LiquidityError::TransactionNotFound(*signature))
    }

    async fn simulate_add_liquidity(
        &self,
        transaction: &Transaction,
        _pool: &Pool,
    ) -> Result<[SimulatedAmount; 2]> {
        self.with_state(|s| match s.pending.get(&op_id(transaction)) {
            Some(PendingOp::Deposit(request)) => {
                let y = if s.simulate_without_y { 0 } else { request.total_y };
                Ok([
                    SimulatedAmount { amount: request.total_x, ui_amount: 0.0 },
                    SimulatedAmount { amount: y, ui_amount: 0.0 },
                ])
            }
            _ => Err(LiquidityError::SimulationFailed("not a deposit".to_string())),
        })
    }
}

struct Harness {
    chain: Arc<FakeChain>,
    manager: LiquidityPositionManager,
    pool: Pool,
}

/// X has 9 decimals, Y has 6; bin step 10 with one X worth 2.0 Y
fn test_pool() -> Pool {
    Pool {
        address: Pubkey::new_unique(),
        name: "SOL-USDC".to_string(),
        token_x: TokenInfo::new(Pubkey::new_unique(), 9),
        token_y: TokenInfo::new(Pubkey::new_unique(), 6),
        bin_step: 10,
        base_fee_percentage: dec!(0.1),
        max_fee_percentage: dec!(1),
        protocol_fee_percentage: dec!(5),
        liquidity: dec!(100000),
        volume_24h: 0.0,
        fees_24h: 0.0,
        current_price: dec!(2.0),
        fetched_at: Utc::now(),
    }
}

fn harness(config: ManagerConfig) -> Harness {
    let _ = env_logger::builder().is_test(true).try_init();

    let chain = Arc::new(FakeChain::new());
    let pool = test_pool();
    chain.with_state(|s| {
        let bin = Bin {
            bin_id: 693,
            price: dec!(0.002),
            price_per_token: dec!(2.0),
            x_amount: 0,
            y_amount: 0,
        };
        s.active_bins.insert(pool.address, bin)
    });

    let quick = RetryPolicy::fixed(2, Duration::from_millis(1));
    let solana = SolanaClient::new("http://127.0.0.1:8899");
    let pools = PoolClient::new("http://127.0.0.1:9", solana, chain.clone(), quick);
    let manager =
        LiquidityPositionManager::new(pools, chain.clone(), chain.clone(), chain.clone(), config);

    Harness { chain, manager, pool }
}

fn params(amount_x: &str, amount_y: &str) -> AddLiquidityParams {
    AddLiquidityParams {
        amount_x: amount_x.to_string(),
        amount_y: amount_y.to_string(),
        range_interval: Some(10),
        strategy: StrategyType::Spot,
    }
}

#[tokio::test]
async fn test_active_bin_reads_are_idempotent() {
    let h = harness(ManagerConfig::default());
    let first = h.manager.active_bin(&h.pool.address).await.unwrap();
    let second = h.manager.active_bin(&h.pool.address).await.unwrap();
    assert_eq!(first, second);

    let missing = h.manager.active_bin(&Pubkey::new_unique()).await;
    assert!(matches!(missing, Err(LiquidityError::PoolNotFound(_))));
}

#[tokio::test]
async fn test_add_then_remove_round_trip() {
    let h = harness(ManagerConfig::default());

    let added = h.manager.add_liquidity(&h.pool, &params("1", "auto")).await.unwrap();
    assert!(added.created_position);
    assert_eq!(added.attempts, 1);
    assert_eq!(added.liquidity_added, [1_000_000_000, 2_000_000]);

    let positions = h.manager.positions(Some(&h.pool.address)).await.unwrap();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].address, added.position);
    assert_eq!((positions[0].min_bin_id, positions[0].max_bin_id), (683, 703));

    let removed = h.manager.remove_liquidity(&h.pool, None, true).await.unwrap();
    assert_eq!(removed.position, added.position);
    assert_eq!(removed.liquidity_removed, added.liquidity_added);
    assert_eq!(removed.fees_claimed, [0, 0]);

    assert!(h.manager.positions(Some(&h.pool.address)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_derived_x_at_price_two() {
    let h = harness(ManagerConfig::default());
    let added = h.manager.add_liquidity(&h.pool, &params("auto", "100")).await.unwrap();
    assert_eq!(added.liquidity_added, [50_000_000_000, 100_000_000]);
}

#[tokio::test]
async fn test_removal_split_across_transactions_is_summed() {
    let h = harness(ManagerConfig::default());
    let added = h.manager.add_liquidity(&h.pool, &params("2.1", "4.2")).await.unwrap();

    let position = h.manager.positions(Some(&h.pool.address)).await.unwrap().remove(0);
    assert_eq!(position.bins.len(), 21);

    let removed = h.manager.remove_liquidity(&h.pool, Some(&added.position), true).await.unwrap();
    assert_eq!(removed.signatures.len(), 2);
    assert_eq!(removed.liquidity_removed, [2_100_000_000, 4_200_000]);
    assert_eq!(h.chain.with_state(|s| s.withdraw_transactions), 2);
}

#[tokio::test]
async fn test_statistical_bug_is_cleaned_up_and_retried() {
    let h = harness(ManagerConfig::default());
    h.chain.with_state(|s| s.partial_deposits = 1);

    let added = h.manager.add_liquidity(&h.pool, &params("1", "auto")).await.unwrap();
    assert_eq!(added.attempts, 2);
    assert!(added.created_position);
    assert_eq!(added.liquidity_added, [1_000_000_000, 2_000_000]);

    let (deposits, cleanups) = h.chain.with_state(|s| (s.deposits_sent, s.closing_withdrawals));
    assert_eq!(deposits, 2);
    assert_eq!(cleanups, 1);

    // Only the successful deposit's position remains
    let positions = h.manager.positions(Some(&h.pool.address)).await.unwrap();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].address, added.position);
}

#[tokio::test]
async fn test_retry_budget_is_bounded() {
    let config = ManagerConfig { max_add_attempts: 3, ..ManagerConfig::default() };
    let h = harness(config);
    h.chain.with_state(|s| s.partial_deposits = 10);

    let result = h.manager.add_liquidity(&h.pool, &params("1", "auto")).await;
    match result {
        Err(LiquidityError::RetryBudgetExhausted { attempts, last }) => {
            assert_eq!(attempts, 3);
            assert!(matches!(*last, LiquidityError::StatisticalBug { .. }));
        }
        other => panic!("expected exhausted retry budget, got {:?}", other),
    }

    let (deposits, cleanups) = h.chain.with_state(|s| (s.deposits_sent, s.closing_withdrawals));
    assert_eq!(deposits, 3);
    assert_eq!(cleanups, 3);
    assert!(h.manager.positions(Some(&h.pool.address)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_claim_fees_reports_snapshot_difference() {
    let h = harness(ManagerConfig::default());
    let added = h.manager.add_liquidity(&h.pool, &params("1", "2")).await.unwrap();
    h.chain.with_state(|s| {
        let position = s.positions.get_mut(&added.position).unwrap();
        position.fee_x = 500;
        position.fee_y = 70;
    });

    let claimed = h.manager.claim_fees(&h.pool).await.unwrap();
    assert_eq!(claimed.position, added.position);
    assert_eq!(claimed.claimed, [500, 70]);

    let position = h.manager.positions(Some(&h.pool.address)).await.unwrap().remove(0);
    assert_eq!((position.fee_x, position.fee_y), (0, 0));
}

#[tokio::test]
async fn test_closing_removal_reports_fees_separately() {
    let h = harness(ManagerConfig::default());
    let added = h.manager.add_liquidity(&h.pool, &params("1", "2")).await.unwrap();
    h.chain.with_state(|s| {
        let position = s.positions.get_mut(&added.position).unwrap();
        position.fee_x = 12;
        position.fee_y = 34;
    });

    let removed = h.manager.remove_liquidity(&h.pool, None, true).await.unwrap();
    assert_eq!(removed.liquidity_removed, [1_000_000_000, 2_000_000]);
    assert_eq!(removed.fees_claimed, [12, 34]);
}

#[tokio::test]
async fn test_existing_position_is_reused() {
    let h = harness(ManagerConfig::default());
    let first = h.manager.add_liquidity(&h.pool, &params("1", "2")).await.unwrap();
    let second = h.manager.add_liquidity(&h.pool, &params("1", "2")).await.unwrap();

    assert!(!second.created_position);
    assert_eq!(second.position, first.position);

    let position = h.manager.positions(Some(&h.pool.address)).await.unwrap().remove(0);
    assert_eq!(position.total_x(), 2_000_000_000);
    assert_eq!(position.total_y(), 4_000_000);
}

#[tokio::test]
async fn test_refuse_policy_rejects_second_deposit() {
    let config = ManagerConfig {
        existing_position_policy: ExistingPositionPolicy::Refuse,
        ..ManagerConfig::default()
    };
    let h = harness(config);
    h.manager.add_liquidity(&h.pool, &params("1", "2")).await.unwrap();

    let second = h.manager.add_liquidity(&h.pool, &params("1", "2")).await;
    assert!(matches!(second, Err(LiquidityError::InvalidParameters(_))));
    assert_eq!(h.chain.with_state(|s| s.deposits_sent), 1);
}

#[tokio::test]
async fn test_amounts_that_round_to_zero() {
    let h = harness(ManagerConfig::default());
    let result = h.manager.add_liquidity(&h.pool, &params("0.0000000001", "auto")).await;
    assert!(matches!(result, Err(LiquidityError::ZeroLiquidity)));
    assert_eq!(h.chain.with_state(|s| s.deposits_sent), 0);
}

#[tokio::test]
async fn test_invalid_deposit_parameters() {
    let h = harness(ManagerConfig::default());

    let both_auto = h.manager.add_liquidity(&h.pool, &params("auto", "AUTO")).await;
    assert!(matches!(both_auto, Err(LiquidityError::AmbiguousAmount)));

    let empty = h.manager.add_liquidity(&h.pool, &params("", "1")).await;
    assert!(matches!(empty, Err(LiquidityError::InvalidParameters(_))));

    let garbage = h.manager.add_liquidity(&h.pool, &params("abc", "1")).await;
    assert!(matches!(garbage, Err(LiquidityError::InvalidAmount(_))));

    let mut same_mints = h.pool.clone();
    same_mints.token_y = same_mints.token_x.clone();
    let same = h.manager.add_liquidity(&same_mints, &params("1", "1")).await;
    assert!(matches!(same, Err(LiquidityError::InvalidParameters(_))));
}

#[tokio::test]
async fn test_failed_deposit_is_not_retried() {
    let h = harness(ManagerConfig::default());
    h.chain.with_state(|s| s.reject_next = Some("custom program error: 0x1771".to_string()));

    let result = h.manager.add_liquidity(&h.pool, &params("1", "2")).await;
    match result {
        Err(LiquidityError::TransactionFailed { reason, .. }) => {
            assert!(reason.contains("0x1771"))
        }
        other => panic!("expected failed transaction, got {:?}", other),
    }
    assert_eq!(h.chain.with_state(|s| s.closing_withdrawals), 0);
}

#[tokio::test]
async fn test_remove_without_position() {
    let h = harness(ManagerConfig::default());
    let result = h.manager.remove_liquidity(&h.pool, None, true).await;
    assert!(
        matches!(result, Err(LiquidityError::NoPositionFound(pool)) if pool == h.pool.address)
    );

    let claim = h.manager.claim_fees(&h.pool).await;
    assert!(matches!(claim, Err(LiquidityError::NoPositionFound(_))));
}

#[tokio::test]
async fn test_both_auto_rejected_before_any_read() {
    let h = harness(ManagerConfig::default());
    // No active bin is known for this pool
    let unknown = test_pool();

    let result = h.manager.add_liquidity(&unknown, &params("auto", "auto")).await;
    assert!(matches!(result, Err(LiquidityError::AmbiguousAmount)));
}

#[tokio::test]
async fn test_missing_range_interval_uses_configured_default() {
    let config = ManagerConfig { default_range_interval: 5, ..ManagerConfig::default() };
    let h = harness(config);
    let deposit = AddLiquidityParams { range_interval: None, ..params("1", "auto") };

    let added = h.manager.add_liquidity(&h.pool, &deposit).await.unwrap();
    assert!(added.created_position);

    let position = h.manager.positions(Some(&h.pool.address)).await.unwrap().remove(0);
    assert_eq!((position.min_bin_id, position.max_bin_id), (688, 698));
    assert_eq!(position.bins.len(), 11);
}

#[tokio::test]
async fn test_simulated_zero_side_stops_before_submission() {
    let h = harness(ManagerConfig::default());
    h.chain.with_state(|s| s.simulate_without_y = true);

    let result = h.manager.add_liquidity(&h.pool, &params("1", "2")).await;
    assert!(matches!(result, Err(LiquidityError::SimulationFailed(_))));

    let sent = h.chain.with_state(|s| (s.deposits_sent, s.withdraw_transactions));
    assert_eq!(sent, (0, 0));
    assert!(h.manager.positions(Some(&h.pool.address)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_cleanup_still_retries_deposit() {
    let h = harness(ManagerConfig::default());
    h.chain.with_state(|s| {
        s.partial_deposits = 1;
        s.failing_removals = 1;
    });

    let added = h.manager.add_liquidity(&h.pool, &params("1", "auto")).await.unwrap();
    assert_eq!(added.attempts, 2);
    // The position left behind by the failed cleanup is deposited into again
    assert!(!added.created_position);
    assert_eq!(added.liquidity_added, [1_000_000_000, 2_000_000]);

    let (deposits, cleanups) = h.chain.with_state(|s| (s.deposits_sent, s.closing_withdrawals));
    assert_eq!((deposits, cleanups), (2, 0));

    let position = h.manager.positions(Some(&h.pool.address)).await.unwrap().remove(0);
    assert_eq!(position.address, added.position);
    assert_eq!(position.total_x(), 2_000_000_000);
    assert_eq!(position.total_y(), 2_000_000);
}

#[tokio::test]
async fn test_manager_from_config_loads_wallet() {
    let keypair = Keypair::new();
    let path = std::env::temp_dir().join(format!("dlmm-manager-{}.json", keypair.pubkey()));
    std::fs::write(&path, serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap()).unwrap();

    let config = Config {
        rpc_url: "http://127.0.0.1:8899".to_string(),
        keypair_path: path.to_string_lossy().to_string(),
        ..Config::default()
    };
    let program = Arc::new(FakeChain::new());
    let manager = LiquidityPositionManager::from_config(&config, program);
    std::fs::remove_file(&path).unwrap();

    assert_eq!(manager.unwrap().owner(), keypair.pubkey());
}

#[tokio::test]
async fn test_manager_from_config_without_keypair_file() {
    let config = Config {
        keypair_path: "/nonexistent/dlmm-manager/keypair.json".to_string(),
        ..Config::default()
    };
    let result = LiquidityPositionManager::from_config(&config, Arc::new(FakeChain::new()));
    assert!(matches!(result, Err(LiquidityError::Program(_))));
}

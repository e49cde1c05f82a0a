use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, warn};
use rust_decimal::prelude::ToPrimitive;
use solana_account_decoder::{UiAccount, UiAccountData, UiAccountEncoding};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use solana_transaction_status::option_serializer::OptionSerializer;
use solana_transaction_status::{
    EncodedConfirmedTransactionWithStatusMeta, EncodedTransaction, UiInstruction, UiMessage,
    UiTransactionTokenBalance,
};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{LiquidityError, Result};
use crate::models::pool::{TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID};
use crate::models::Pool;
use crate::retry::{with_retry, RetryPolicy};
use crate::solana::{token_account_fields, SolanaClient};
use crate::utils::base_units_to_ui;
use crate::verifier::attribution::{
    attribute_balance_changes, BalanceSnapshot, ExecutedInstruction, InstructionView,
    TokenBalanceRow,
};
use crate::verifier::{BalanceChanges, SimulatedAmount, TransactionVerifier};

const LAMPORTS_PER_SIGNATURE: u64 = 5_000;

/// Verifier reading confirmed transactions and simulations from an RPC node
pub struct RpcTransactionVerifier {
    client: SolanaClient,
    owner: Pubkey,
    /// Confirmed transactions can take a moment to become queryable
    lookup_retry: RetryPolicy,
}

impl RpcTransactionVerifier {
    pub fn new(client: SolanaClient, owner: Pubkey) -> Self {
        Self {
            client,
            owner,
            lookup_retry: RetryPolicy::fixed(5, Duration::from_millis(800)),
        }
    }

    pub fn with_lookup_retry(mut self, policy: RetryPolicy) -> Self {
        self.lookup_retry = policy;
        self
    }
}

#[async_trait]
impl TransactionVerifier for RpcTransactionVerifier {
    async fn extract_balance_changes(
        &self,
        signature: &Signature,
        mint_x: &Pubkey,
        mint_y: &Pubkey,
    ) -> Result<BalanceChanges> {
        let transaction = with_retry(
            "fetch confirmed transaction",
            &self.lookup_retry,
            |e| matches!(e, LiquidityError::TransactionNotFound(_)) || e.is_transient(),
            || self.client.get_transaction(signature),
        )
        .await?;

        let executed = decode_transaction(signature, transaction, &self.owner)?;
        let changes = attribute_balance_changes(
            &self.owner,
            [mint_x, mint_y],
            &executed.snapshot,
            &executed.instructions,
        );
        debug!(
            "Transaction {} moved liquidity {:?}, fees {:?}",
            signature, changes.liquidity, changes.fees_claimed
        );
        Ok(changes)
    }

    async fn simulate_add_liquidity(
        &self,
        transaction: &Transaction,
        pool: &Pool,
    ) -> Result<[SimulatedAmount; 2]> {
        let message = &transaction.message;
        let keys = &message.account_keys;
        let before = self.client.get_multiple_accounts(keys).await?;

        let result = self.client.simulate_transaction(transaction, keys).await?;
        if let Some(err) = result.err {
            let logs = result.logs.unwrap_or_default();
            return Err(LiquidityError::SimulationFailed(format!(
                "{} [{}]",
                err,
                logs.join("; ")
            )));
        }
        let after = result.accounts.ok_or_else(|| {
            LiquidityError::SimulationFailed("no account states returned".to_string())
        })?;

        let owner_index = keys.iter().position(|key| *key == self.owner);
        let mut snapshot = BalanceSnapshot {
            owner_index,
            fee: if owner_index == Some(0) {
                u64::from(message.header.num_required_signatures) * LAMPORTS_PER_SIGNATURE
            } else {
                0
            },
            ..Default::default()
        };
        for (index, key) in keys.iter().enumerate() {
            let (pre_lamports, pre_row) = match before.get(index).and_then(Option::as_ref) {
                Some(account) => (
                    account.lamports,
                    token_row(index, &account.owner, &account.data),
                ),
                None => (0, None),
            };
            let (post_lamports, post_row) = match after.get(index).and_then(Option::as_ref) {
                Some(account) => simulated_state(index, key, account),
                // Account closed by the transaction
                None => (0, None),
            };
            snapshot.pre_lamports.push(pre_lamports);
            snapshot.post_lamports.push(post_lamports);
            snapshot.pre_tokens.extend(pre_row);
            snapshot.post_tokens.extend(post_row);
        }

        let tokens = [&pool.token_x, &pool.token_y];
        let changes =
            attribute_balance_changes(&self.owner, tokens.map(|t| &t.mint), &snapshot, &[]);
        let deposited = changes.liquidity_deposited();
        let predicted = [0usize, 1].map(|side| SimulatedAmount {
            amount: deposited[side],
            ui_amount: base_units_to_ui(deposited[side], tokens[side].decimals)
                .to_f64()
                .unwrap_or(0.0),
        });

        debug!(
            "Simulated deposit into {} moves {} / {}",
            pool.address, predicted[0].amount, predicted[1].amount
        );
        Ok(predicted)
    }
}

/// Token balance row of an account owned by one of the token programs
fn token_row(index: usize, program: &Pubkey, data: &[u8]) -> Option<TokenBalanceRow> {
    if *program != TOKEN_PROGRAM_ID && *program != TOKEN_2022_PROGRAM_ID {
        return None;
    }
    let (mint, owner, amount) = token_account_fields(data)?;
    Some(TokenBalanceRow {
        account_index: u8::try_from(index).ok()?,
        mint,
        owner: Some(owner),
        amount,
    })
}

fn simulated_state(
    index: usize,
    key: &Pubkey,
    account: &UiAccount,
) -> (u64, Option<TokenBalanceRow>) {
    let UiAccountData::Binary(encoded, UiAccountEncoding::Base64) = &account.data else {
        warn!("Unexpected encoding of simulated state of {}", key);
        return (account.lamports, None);
    };
    let (Ok(data), Ok(program)) = (STANDARD.decode(encoded), Pubkey::from_str(&account.owner))
    else {
        warn!("Could not decode simulated state of {}", key);
        return (account.lamports, None);
    };
    (account.lamports, token_row(index, &program, &data))
}

struct DecodedTransaction {
    snapshot: BalanceSnapshot,
    instructions: Vec<ExecutedInstruction>,
}

fn malformed(signature: &Signature, reason: &str) -> LiquidityError {
    LiquidityError::MalformedTransaction { signature: *signature, reason: reason.to_string() }
}

fn balance_rows(
    signature: &Signature,
    balances: &OptionSerializer<Vec<UiTransactionTokenBalance>>,
    label: &str,
) -> Result<Vec<TokenBalanceRow>> {
    let OptionSerializer::Some(balances) = balances else {
        return Err(malformed(signature, &format!("missing {} token balances", label)));
    };

    balances
        .iter()
        .map(|balance| {
            let mint = Pubkey::from_str(&balance.mint)
                .map_err(|_| malformed(signature, &format!("invalid mint {}", balance.mint)))?;
            let owner = match &balance.owner {
                OptionSerializer::Some(owner) => Pubkey::from_str(owner).ok(),
                _ => None,
            };
            let raw = &balance.ui_token_amount.amount;
            let amount = raw
                .parse::<u64>()
                .map_err(|_| malformed(signature, &format!("invalid token amount {}", raw)))?;
            Ok(TokenBalanceRow { account_index: balance.account_index, mint, owner, amount })
        })
        .collect()
}

fn decode_transaction(
    signature: &Signature,
    transaction: EncodedConfirmedTransactionWithStatusMeta,
    owner: &Pubkey,
) -> Result<DecodedTransaction> {
    let meta = transaction
        .transaction
        .meta
        .ok_or_else(|| malformed(signature, "missing status meta"))?;

    let pre_tokens = balance_rows(signature, &meta.pre_token_balances, "pre")?;
    let post_tokens = balance_rows(signature, &meta.post_token_balances, "post")?;

    let EncodedTransaction::Json(ui_transaction) = transaction.transaction.transaction else {
        return Err(malformed(signature, "unexpected transaction encoding"));
    };
    let UiMessage::Raw(message) = ui_transaction.message else {
        return Err(malformed(signature, "unexpected parsed message"));
    };

    // Static keys followed by keys loaded from address lookup tables
    let mut keys = message.account_keys;
    if let OptionSerializer::Some(loaded) = &meta.loaded_addresses {
        keys.extend(loaded.writable.iter().cloned());
        keys.extend(loaded.readonly.iter().cloned());
    }
    let keys: Vec<Pubkey> = keys
        .iter()
        .map(|key| {
            Pubkey::from_str(key)
                .map_err(|_| malformed(signature, &format!("invalid account key {}", key)))
        })
        .collect::<Result<_>>()?;

    if meta.pre_balances.len() != keys.len() || meta.post_balances.len() != keys.len() {
        return Err(malformed(signature, "lamport balances do not match account keys"));
    }
    let owner_index = keys.iter().position(|key| key == owner);
    let snapshot = BalanceSnapshot {
        pre_tokens,
        post_tokens,
        pre_lamports: meta.pre_balances,
        post_lamports: meta.post_balances,
        owner_index,
        // Only the fee payer is charged
        fee: if owner_index == Some(0) { meta.fee } else { 0 },
    };

    let view = |program_id_index: u8, accounts: Vec<u8>, data: &str| -> Result<InstructionView> {
        let program_id = *keys
            .get(usize::from(program_id_index))
            .ok_or_else(|| malformed(signature, "program index out of range"))?;
        let data = bs58::decode(data)
            .into_vec()
            .map_err(|_| malformed(signature, "instruction data is not base58"))?;
        Ok(InstructionView { program_id, accounts, data })
    };

    let mut instructions = Vec::with_capacity(message.instructions.len());
    for compiled in message.instructions {
        instructions.push(ExecutedInstruction {
            instruction: view(compiled.program_id_index, compiled.accounts, &compiled.data)?,
            inner: Vec::new(),
        });
    }

    if let OptionSerializer::Some(inner_sets) = meta.inner_instructions {
        for set in inner_sets {
            let Some(parent) = instructions.get_mut(usize::from(set.index)) else {
                return Err(malformed(
                    signature,
                    "inner instructions reference a missing instruction",
                ));
            };
            for inner in set.instructions {
                if let UiInstruction::Compiled(compiled) = inner {
                    let decoded =
                        view(compiled.program_id_index, compiled.accounts, &compiled.data)?;
                    parent.inner.push(decoded);
                }
            }
        }
    }

    Ok(DecodedTransaction { snapshot, instructions })
}

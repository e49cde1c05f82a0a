//! Splitting a transaction's balance delta into liquidity and fee portions.
//!
//! The fee portion is whatever the DLMM `claim_fee` instructions transferred
//! into wallet-owned token accounts (their inner SPL Token transfers). Everything
//! else in the net delta is attributed to liquidity.
//!
//! Native SOL is usually wrapped into a temporary token account that is created
//! and closed inside the same transaction, so it never shows up in the token
//! balance snapshots. For the native mint the wallet's lamport delta is used
//! instead, with the network fee and rent moved into or out of other accounts
//! taken back out.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;

use crate::meteora::{CLAIM_FEE2_DISCRIMINATOR, CLAIM_FEE_DISCRIMINATOR, DLMM_PROGRAM_ID};
use crate::models::pool::{NATIVE_MINT, TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID};

const TRANSFER_TAG: u8 = 3;
const TRANSFER_CHECKED_TAG: u8 = 12;

/// Per-token effect of a transaction on the wallet, X first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceChanges {
    /// Net wallet delta excluding claimed fees; negative when tokens left the wallet
    pub liquidity: [i128; 2],
    pub fees_claimed: [u64; 2],
}

impl BalanceChanges {
    /// Tokens returned to the wallet by a withdrawal
    pub fn liquidity_removed(&self) -> [u64; 2] {
        self.liquidity.map(clamp_u64)
    }

    /// Tokens that left the wallet in a deposit
    pub fn liquidity_deposited(&self) -> [u64; 2] {
        self.liquidity.map(|delta| clamp_u64(-delta))
    }
}

fn clamp_u64(value: i128) -> u64 {
    value.clamp(0, i128::from(u64::MAX)) as u64
}

/// One entry of a pre/post token balance snapshot
#[derive(Debug, Clone)]
pub struct TokenBalanceRow {
    pub account_index: u8,
    pub mint: Pubkey,
    pub owner: Option<Pubkey>,
    pub amount: u64,
}

/// Account balances around one transaction
#[derive(Debug, Clone, Default)]
pub struct BalanceSnapshot {
    pub pre_tokens: Vec<TokenBalanceRow>,
    pub post_tokens: Vec<TokenBalanceRow>,
    /// Lamports of every account key, in key order
    pub pre_lamports: Vec<u64>,
    pub post_lamports: Vec<u64>,
    /// Position of the wallet among the account keys
    pub owner_index: Option<usize>,
    /// Network fee paid by the wallet
    pub fee: u64,
}

impl BalanceSnapshot {
    /// Accounts that hold no lamports before or after, i.e. created and closed in between
    fn transient_accounts(&self) -> impl Iterator<Item = usize> + '_ {
        self.pre_lamports
            .iter()
            .zip(&self.post_lamports)
            .enumerate()
            .filter(|(_, (before, after))| **before == 0 && **after == 0)
            .map(|(index, _)| index)
    }

    /// Lamports the wallet moved as SOL liquidity: its lamport delta with the fee
    /// added back and rent deposited into created accounts or refunded from closed
    /// ones removed. Wrapped SOL left in those accounts is not rent.
    fn native_lamport_delta(&self) -> i128 {
        let Some(owner) = self.owner_index else {
            return 0;
        };
        let (Some(before), Some(after)) =
            (self.pre_lamports.get(owner), self.post_lamports.get(owner))
        else {
            return 0;
        };

        let mut delta = i128::from(*after) - i128::from(*before) + i128::from(self.fee);
        let accounts = self.pre_lamports.iter().zip(&self.post_lamports).enumerate();
        for (index, (before, after)) in accounts {
            if index == owner {
                continue;
            }
            match (*before, *after) {
                (0, 0) => {}
                (0, after) => {
                    delta += i128::from(after) - wrapped_amount(&self.post_tokens, index);
                }
                (before, 0) => {
                    delta -= i128::from(before) - wrapped_amount(&self.pre_tokens, index);
                }
                _ => {}
            }
        }
        delta
    }
}

/// Wrapped SOL held by the token account at `index`
fn wrapped_amount(rows: &[TokenBalanceRow], index: usize) -> i128 {
    rows.iter()
        .filter(|row| row.mint == NATIVE_MINT && usize::from(row.account_index) == index)
        .map(|row| i128::from(row.amount))
        .sum()
}

/// A compiled instruction with its program resolved
#[derive(Debug, Clone)]
pub struct InstructionView {
    pub program_id: Pubkey,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

/// A top-level instruction and the inner instructions it invoked
#[derive(Debug, Clone)]
pub struct ExecutedInstruction {
    pub instruction: InstructionView,
    pub inner: Vec<InstructionView>,
}

impl InstructionView {
    fn is_fee_claim(&self) -> bool {
        self.program_id == DLMM_PROGRAM_ID
            && (self.data.starts_with(&CLAIM_FEE_DISCRIMINATOR)
                || self.data.starts_with(&CLAIM_FEE2_DISCRIMINATOR))
    }

    /// `(destination account index, amount)` of an SPL Token transfer
    fn token_transfer(&self) -> Option<(u8, u64)> {
        if self.program_id != TOKEN_PROGRAM_ID && self.program_id != TOKEN_2022_PROGRAM_ID {
            return None;
        }
        let amount = u64::from_le_bytes(self.data.get(1..9)?.try_into().ok()?);
        let destination = match *self.data.first()? {
            TRANSFER_TAG => *self.accounts.get(1)?,
            TRANSFER_CHECKED_TAG => *self.accounts.get(2)?,
            _ => return None,
        };
        Some((destination, amount))
    }
}

/// Compute the wallet's liquidity and fee deltas for `mints` (X, Y)
pub fn attribute_balance_changes(
    owner: &Pubkey,
    mints: [&Pubkey; 2],
    snapshot: &BalanceSnapshot,
    instructions: &[ExecutedInstruction],
) -> BalanceChanges {
    let owned = |row: &&TokenBalanceRow| row.owner.as_ref() == Some(owner);

    let sum = |rows: &[TokenBalanceRow], mint: &Pubkey| -> i128 {
        rows.iter()
            .filter(owned)
            .filter(|row| row.mint == *mint)
            .map(|row| i128::from(row.amount))
            .sum()
    };

    let mut wallet_accounts: HashMap<u8, Pubkey> = snapshot
        .pre_tokens
        .iter()
        .chain(snapshot.post_tokens.iter())
        .filter(owned)
        .map(|row| (row.account_index, row.mint))
        .collect();

    let has_native = mints.iter().any(|mint| **mint == NATIVE_MINT);
    if has_native {
        // Temporary wrapped SOL accounts that received claimed fees before closing
        for index in snapshot.transient_accounts() {
            if let Ok(index) = u8::try_from(index) {
                wallet_accounts.entry(index).or_insert(NATIVE_MINT);
            }
        }
    }

    let mut fees = [0u64; 2];
    for executed in instructions.iter().filter(|ix| ix.instruction.is_fee_claim()) {
        let transfers = executed.inner.iter().filter_map(InstructionView::token_transfer);
        for (destination, amount) in transfers {
            let Some(mint) = wallet_accounts.get(&destination) else {
                continue;
            };
            for (side, expected) in mints.iter().enumerate() {
                if mint == *expected {
                    fees[side] = fees[side].saturating_add(amount);
                }
            }
        }
    }

    let mut liquidity = [0i128; 2];
    for (side, mint) in mints.iter().enumerate() {
        let mut net = sum(&snapshot.post_tokens, *mint) - sum(&snapshot.pre_tokens, *mint);
        if **mint == NATIVE_MINT {
            net += snapshot.native_lamport_delta();
        }
        liquidity[side] = net - i128::from(fees[side]);
    }

    BalanceChanges { liquidity, fees_claimed: fees }
}

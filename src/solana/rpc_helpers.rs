use anyhow::{Result, Context};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

// SPL Token account layout: mint (32) | owner (32) | amount (8) | ...
const TOKEN_ACCOUNT_LEN: usize = 165;
const TOKEN_ACCOUNT_AMOUNT_OFFSET: usize = 64;
// Token-2022 extensions follow the base layout, tagged with the account type
const ACCOUNT_TYPE_ACCOUNT: u8 = 2;
// SPL Mint layout: mint_authority (36) | supply (8) | decimals (1) | ...
const MINT_DECIMALS_OFFSET: usize = 44;

/// Parse pubkey from string with helpful error message
pub fn parse_pubkey(pubkey_str: &str) -> Result<Pubkey> {
    Pubkey::from_str(pubkey_str)
        .with_context(|| format!("Failed to parse pubkey: {}", pubkey_str))
}

/// Read `(mint, owner, amount)` of a token account (SPL Token and Token-2022).
/// Mints and other Token-2022 account types return `None`.
pub fn token_account_fields(data: &[u8]) -> Option<(Pubkey, Pubkey, u64)> {
    if data.len() < TOKEN_ACCOUNT_LEN {
        return None;
    }
    if data.len() > TOKEN_ACCOUNT_LEN && data[TOKEN_ACCOUNT_LEN] != ACCOUNT_TYPE_ACCOUNT {
        return None;
    }
    let mint = Pubkey::try_from(&data[0..32]).ok()?;
    let owner = Pubkey::try_from(&data[32..64]).ok()?;
    let amount = data.get(TOKEN_ACCOUNT_AMOUNT_OFFSET..TOKEN_ACCOUNT_AMOUNT_OFFSET + 8)?;
    Some((mint, owner, u64::from_le_bytes(amount.try_into().ok()?)))
}

/// Read the decimals field of a mint account (SPL Token and Token-2022)
pub fn mint_decimals(data: &[u8]) -> Option<u8> {
    data.get(MINT_DECIMALS_OFFSET).copied()
}

use solana_sdk::pubkey::Pubkey;

/// Format a pubkey for display (shortened)
pub fn format_pubkey(pubkey: &Pubkey) -> String {
    let pubkey_str = pubkey.to_string();
    let len = pubkey_str.len();
    format!("{}...{}", &pubkey_str[0..4], &pubkey_str[len-4..len])
}

/// Format a per-token pair of base-unit amounts as `[x, y]`
pub fn format_pair(amounts: &[u64; 2]) -> String {
    format!("[{}, {}]", amounts[0], amounts[1])
}

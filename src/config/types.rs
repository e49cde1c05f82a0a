use serde::{Deserialize, Serialize};
use anyhow::Result;
use std::env;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// What to do when the wallet already holds a position in the target pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExistingPositionPolicy {
    /// Deposit into the existing position, reusing its bin range
    Reuse,
    /// Refuse to deposit while a position exists
    Refuse,
}

impl std::str::FromStr for ExistingPositionPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reuse" => Ok(Self::Reuse),
            "refuse" => Ok(Self::Refuse),
            other => Err(anyhow::anyhow!("Unknown existing position policy: {}", other)),
        }
    }
}

/// Configuration for the DLMM liquidity manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Solana RPC URL
    pub rpc_url: String,
    /// Wallet keypair path
    pub keypair_path: String,
    /// Base URL of the DLMM indexer API
    pub indexer_url: String,
    /// Attempts for pool and position reads
    pub read_retry_attempts: u32,
    /// Initial backoff between read attempts (in milliseconds)
    pub read_retry_backoff_ms: u64,
    /// Attempts for a deposit before giving up on the statistical bug
    pub max_add_attempts: u32,
    /// How long to wait for a transaction to confirm (in seconds)
    pub confirmation_timeout_seconds: u64,
    /// Bins on each side of the active bin for a new position
    pub default_range_interval: u16,
    /// Slippage tolerance passed to the program when building deposits
    pub slippage_bps: u16,
    pub existing_position_policy: ExistingPositionPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            keypair_path: "keypair.json".to_string(),
            indexer_url: "https://dlmm-api.meteora.ag".to_string(),
            read_retry_attempts: 3,
            read_retry_backoff_ms: 500,
            max_add_attempts: 3,
            confirmation_timeout_seconds: 60,
            default_range_interval: 10,
            slippage_bps: 100, // 1%
            existing_position_policy: ExistingPositionPolicy::Reuse,
        }
    }
}

impl Config {
    /// Retry policy for indexer and on-chain reads
    pub fn read_retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.read_retry_attempts.max(1),
            initial_interval: Duration::from_millis(self.read_retry_backoff_ms),
            ..RetryPolicy::default()
        }
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_seconds)
    }

    /// Settings consumed by the position manager
    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig {
            max_add_attempts: self.max_add_attempts.max(1),
            slippage_bps: self.slippage_bps,
            default_range_interval: self.default_range_interval,
            existing_position_policy: self.existing_position_policy,
        }
    }
}

/// Settings for `LiquidityPositionManager`
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    pub max_add_attempts: u32,
    pub slippage_bps: u16,
    /// Used when a deposit does not name its own range interval
    pub default_range_interval: u16,
    pub existing_position_policy: ExistingPositionPolicy,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Config::default().manager_config()
    }
}

/// Loads configuration from environment variables, falling back to default values
pub fn load_config() -> Result<Config> {
    dotenv::dotenv().ok();

    let mut config = Config::default();

    if let Ok(rpc_url) = env::var("RPC_URL") {
        config.rpc_url = rpc_url;
    }

    if let Ok(keypair_path) = env::var("KEYPAIR_PATH") {
        config.keypair_path = keypair_path;
    }

    if let Ok(indexer_url) = env::var("INDEXER_URL") {
        config.indexer_url = indexer_url.trim_end_matches('/').to_string();
    }

    if let Ok(attempts) = env::var("READ_RETRY_ATTEMPTS") {
        if let Ok(value) = attempts.parse::<u32>() {
            config.read_retry_attempts = value;
        }
    }

    if let Ok(backoff) = env::var("READ_RETRY_BACKOFF_MS") {
        if let Ok(value) = backoff.parse::<u64>() {
            config.read_retry_backoff_ms = value;
        }
    }

    if let Ok(attempts) = env::var("MAX_ADD_ATTEMPTS") {
        if let Ok(value) = attempts.parse::<u32>() {
            config.max_add_attempts = value;
        }
    }

    if let Ok(timeout) = env::var("CONFIRMATION_TIMEOUT_SECONDS") {
        if let Ok(value) = timeout.parse::<u64>() {
            config.confirmation_timeout_seconds = value;
        }
    }

    if let Ok(interval) = env::var("DEFAULT_RANGE_INTERVAL") {
        if let Ok(value) = interval.parse::<u16>() {
            config.default_range_interval = value;
        }
    }

    if let Ok(slippage) = env::var("SLIPPAGE_BPS") {
        if let Ok(value) = slippage.parse::<u16>() {
            config.slippage_bps = value;
        }
    }

    if let Ok(policy) = env::var("EXISTING_POSITION_POLICY") {
        config.existing_position_policy = policy.parse()?;
    }

    Ok(config)
}

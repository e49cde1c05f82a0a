//! Error types for the liquidity position manager

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LiquidityError>;

/// Errors raised by pool reads, sizing, submission and verification
#[derive(Debug, Error)]
pub enum LiquidityError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Pool not found: {0}")]
    PoolNotFound(Pubkey),

    #[error("No position found in pool {0}")]
    NoPositionFound(Pubkey),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Both amounts are set to auto; at least one side must be fixed")]
    AmbiguousAmount,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Deposit resolves to zero liquidity on both sides")]
    ZeroLiquidity,

    #[error("Simulation rejected the transaction: {0}")]
    SimulationFailed(String),

    #[error("Transaction {signature} failed: {reason}")]
    TransactionFailed { signature: Signature, reason: String },

    #[error("Timed out waiting for confirmation of {0}")]
    ConfirmationTimeout(Signature),

    #[error("Deposit into position {position} confirmed but moved zero of a requested side")]
    StatisticalBug { position: Pubkey },

    #[error("Gave up after {attempts} attempts: {last}")]
    RetryBudgetExhausted {
        attempts: u32,
        #[source]
        last: Box<LiquidityError>,
    },

    #[error("Transaction not found: {0}")]
    TransactionNotFound(Signature),

    #[error("Malformed transaction {signature}: {reason}")]
    MalformedTransaction { signature: Signature, reason: String },

    #[error("RPC error: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),

    #[error("Indexer request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Program(#[from] anyhow::Error),

    #[error("{operation} failed ({context}): {source}")]
    Operation {
        operation: &'static str,
        context: String,
        #[source]
        source: Box<LiquidityError>,
    },
}

impl LiquidityError {
    /// Transport-level failures that a read can be retried on
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Rpc(_) | Self::Http(_) | Self::Program(_))
    }

    /// Wrap transport and collaborator errors with the failing operation.
    /// Typed domain errors pass through unchanged so callers can match on them.
    pub fn in_operation(self, operation: &'static str, context: impl Into<String>) -> Self {
        match self {
            Self::Rpc(_) | Self::Http(_) | Self::Program(_) => Self::Operation {
                operation,
                context: context.into(),
                source: Box::new(self),
            },
            other => other,
        }
    }
}

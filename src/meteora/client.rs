use log::{debug, info, warn};
use reqwest::StatusCode;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{LiquidityError, Result};
use crate::meteora::indexer::{ApiPair, PairListResponse};
use crate::meteora::program::DlmmProgram;
use crate::models::{Bin, Pool, Position, TokenInfo};
use crate::retry::{transient, with_retry, RetryPolicy};
use crate::solana::{mint_decimals, SolanaClient};

/// Read-only access to DLMM pools: indexer discovery plus on-chain state
pub struct PoolClient {
    http: reqwest::Client,
    indexer_url: String,
    solana: SolanaClient,
    program: Arc<dyn DlmmProgram>,
    retry: RetryPolicy,
}

impl PoolClient {
    pub fn new(
        indexer_url: &str,
        solana: SolanaClient,
        program: Arc<dyn DlmmProgram>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            indexer_url: indexer_url.trim_end_matches('/').to_string(),
            solana,
            program,
            retry,
        }
    }

    pub fn from_config(
        config: &Config,
        solana: SolanaClient,
        program: Arc<dyn DlmmProgram>,
    ) -> Self {
        Self::new(&config.indexer_url, solana, program, config.read_retry_policy())
    }

    /// Pools trading the unordered pair `token_a`/`token_b` (mints or symbols)
    pub async fn list_pools(
        &self,
        token_a: &str,
        token_b: &str,
        limit: usize,
    ) -> Result<Vec<Pool>> {
        let search_term = format!("{}-{}", token_a, token_b);
        let url = format!("{}/pair/all", self.indexer_url);
        let limit_param = limit.to_string();

        let pairs = with_retry("list pools", &self.retry, transient, || async {
            let response = self
                .http
                .get(&url)
                .query(&[("search_term", search_term.as_str()), ("limit", limit_param.as_str())])
                .send()
                .await?
                .error_for_status()?;
            let body: PairListResponse = response.json().await?;
            Ok(body.into_pairs())
        })
        .await?;

        let listed: Vec<ApiPair> = pairs.into_iter().filter(ApiPair::is_listed).collect();
        let pools = if listed.is_empty() { Vec::new() } else { self.resolve_pools(listed).await? };

        let pools = select_pools(pools, token_a, token_b, limit)?;
        info!("Found {} pools for {}", pools.len(), search_term);
        Ok(pools)
    }

    /// Look up a single pool by address
    pub async fn get_pool(&self, address: &Pubkey) -> Result<Pool> {
        let url = format!("{}/pair/{}", self.indexer_url, address);

        let pair = with_retry("get pool", &self.retry, transient, || async {
            let response = self.http.get(&url).send().await?;
            if response.status() == StatusCode::NOT_FOUND {
                return Err(LiquidityError::PoolNotFound(*address));
            }
            let pair: ApiPair = response.error_for_status()?.json().await?;
            Ok(pair)
        })
        .await?;

        let mut pools = self.resolve_pools(vec![pair]).await?;
        pools.pop().ok_or(LiquidityError::PoolNotFound(*address))
    }

    pub async fn get_active_bin(&self, pool: &Pubkey) -> Result<Bin> {
        let bin = with_retry("get active bin", &self.retry, transient, || {
            self.program.active_bin(pool)
        })
        .await?;
        let bin = bin.ok_or(LiquidityError::PoolNotFound(*pool))?;
        debug!(
            "Active bin of {} is {} (price {})",
            pool, bin.bin_id, bin.price_per_token
        );
        Ok(bin)
    }

    pub async fn get_user_positions(
        &self,
        owner: &Pubkey,
        pool: Option<&Pubkey>,
    ) -> Result<Vec<Position>> {
        with_retry("get user positions", &self.retry, transient, || {
            self.program.positions_by_owner(owner, pool)
        })
        .await
    }

    pub async fn get_position(&self, address: &Pubkey) -> Result<Option<Position>> {
        with_retry("get position", &self.retry, transient, || self.program.position(address))
            .await
    }

    /// Attach decimals and token programs read from the mint accounts
    async fn resolve_pools(&self, pairs: Vec<ApiPair>) -> Result<Vec<Pool>> {
        let mut mints: Vec<Pubkey> = Vec::new();
        for pair in &pairs {
            let (x, y) = pair.mints()?;
            for mint in [x, y] {
                if !mints.contains(&mint) {
                    mints.push(mint);
                }
            }
        }

        let accounts = with_retry("get mint accounts", &self.retry, transient, || {
            self.solana.get_multiple_accounts(&mints)
        })
        .await?;

        let mut tokens: HashMap<Pubkey, TokenInfo> = HashMap::new();
        for (mint, account) in mints.iter().zip(accounts) {
            let Some(account) = account else {
                warn!("Mint account not found: {}", mint);
                continue;
            };
            match mint_decimals(&account.data) {
                Some(decimals) => {
                    let info = TokenInfo {
                        mint: *mint,
                        symbol: None,
                        decimals,
                        token_program: account.owner,
                    };
                    tokens.insert(*mint, info);
                }
                None => warn!("Mint account {} is too short to hold decimals", mint),
            }
        }

        let mut pools = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let (x, y) = pair.mints()?;
            let (Some(token_x), Some(token_y)) = (tokens.get(&x), tokens.get(&y)) else {
                warn!("Skipping pool {}: mint metadata unavailable", pair.address);
                continue;
            };
            let (symbol_x, symbol_y) = pair.symbols();
            let token_x = TokenInfo { symbol: symbol_x, ..token_x.clone() };
            let token_y = TokenInfo { symbol: symbol_y, ..token_y.clone() };
            pools.push(pair.into_pool(token_x, token_y)?);
        }

        Ok(pools)
    }
}

/// Keep pools trading exactly `token_a`/`token_b` when both are mint
/// addresses, then cap the list at `limit`
fn select_pools(
    mut pools: Vec<Pool>,
    token_a: &str,
    token_b: &str,
    limit: usize,
) -> Result<Vec<Pool>> {
    if let (Ok(a), Ok(b)) = (Pubkey::from_str(token_a), Pubkey::from_str(token_b)) {
        pools.retain(|pool| pool.matches_pair(&a, &b));
    }
    pools.truncate(limit);

    if pools.is_empty() {
        return Err(LiquidityError::NotFound(format!(
            "no pools for pair {}-{}",
            token_a, token_b
        )));
    }
    Ok(pools)
}

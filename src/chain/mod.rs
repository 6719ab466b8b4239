//! Chain access layer
//!
//! Everything the sweeper needs from the network goes through [`ChainClient`],
//! so the scanner, executor and broadcaster can run against an in-memory chain
//! in tests.

pub mod error;
pub mod rpc;

#[cfg(test)]
pub mod mock;

use crate::types::SubmitOptions;
use async_trait::async_trait;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;

pub use error::{SweepError, SweepResult};
pub use rpc::RpcChainClient;

/// A token account as reported by the chain, zero balances included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAccountBalance {
    pub address: Pubkey,
    pub mint: Pubkey,
    pub amount: u64,
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    /// List every SPL token account owned by `owner`
    async fn token_holdings(&self, owner: &Pubkey) -> SweepResult<Vec<TokenAccountBalance>>;

    /// Raw balance of a single token account
    async fn token_balance(&self, token_account: &Pubkey) -> SweepResult<u64>;

    async fn account_exists(&self, address: &Pubkey) -> SweepResult<bool>;

    async fn latest_blockhash(&self) -> SweepResult<Hash>;

    /// Send a signed transaction without waiting for confirmation
    async fn submit(&self, transaction: &Transaction, options: SubmitOptions)
        -> SweepResult<Signature>;

    /// Endpoint label for logging
    fn endpoint(&self) -> &str;
}

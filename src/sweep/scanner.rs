use crate::chain::{ChainClient, SweepResult};
use crate::types::Holding;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::debug;

/// Lists the monitored wallet's positive token balances
pub struct BalanceScanner {
    chain: Arc<dyn ChainClient>,
}

impl BalanceScanner {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self { chain }
    }

    /// Query all token accounts of `owner` and keep the non-empty ones
    pub async fn scan(&self, owner: &Pubkey) -> SweepResult<Vec<Holding>> {
        let accounts = self.chain.token_holdings(owner).await?;
        let total = accounts.len();

        let holdings: Vec<Holding> = accounts
            .into_iter()
            .filter(|account| account.amount > 0)
            .map(|account| Holding {
                mint: account.mint,
                amount: account.amount,
                token_account: account.address,
                owner: *owner,
            })
            .collect();

        debug!(
            "Scanned {} token accounts, {} with a positive balance",
            total,
            holdings.len()
        );

        Ok(holdings)
    }
}

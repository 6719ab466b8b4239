use crate::chain::{ChainClient, SweepResult};
use crate::sweep::broadcast::Broadcaster;
use crate::sweep::builder::{SweepPlan, build_sweep_instructions, derive_token_account, sign_transaction};
use crate::types::{Holding, SweepOutcome};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Builds and broadcasts a transfer-all transaction for one holding
pub struct SweepExecutor {
    chain: Arc<dyn ChainClient>,
    broadcaster: Broadcaster,
    owner: Arc<Keypair>,
    fee_payer: Arc<Keypair>,
    destination_wallet: Pubkey,
    priority_fee_micro_lamports: u64,
}

impl SweepExecutor {
    /// Pass the owner again as `fee_payer` when it pays for itself
    pub fn new(
        chain: Arc<dyn ChainClient>,
        broadcaster: Broadcaster,
        owner: Arc<Keypair>,
        fee_payer: Arc<Keypair>,
        destination_wallet: Pubkey,
        priority_fee_micro_lamports: u64,
    ) -> Self {
        Self {
            chain,
            broadcaster,
            owner,
            fee_payer,
            destination_wallet,
            priority_fee_micro_lamports,
        }
    }

    pub fn owner(&self) -> Pubkey {
        self.owner.pubkey()
    }

    pub fn destination_wallet(&self) -> Pubkey {
        self.destination_wallet
    }

    /// Sweep one holding. Errors are logged and folded into the outcome.
    pub async fn sweep(&self, holding: &Holding) -> SweepOutcome {
        match self.try_sweep(holding).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("❌ Sweep of {} failed: {}", holding.mint, e);
                SweepOutcome::Failed(e.to_string())
            }
        }
    }

    async fn try_sweep(&self, holding: &Holding) -> SweepResult<SweepOutcome> {
        let owner = self.owner.pubkey();
        let source = self.source_account(holding);

        // The scan may be stale by now
        let amount = self.chain.token_balance(&source).await?;
        if amount == 0 {
            debug!("Balance of {} is zero at re-check, skipping", holding.mint);
            return Ok(SweepOutcome::Skipped);
        }
        if amount != holding.amount {
            debug!(
                "Balance of {} changed since scan: {} -> {}",
                holding.mint, holding.amount, amount
            );
        }

        let destination = derive_token_account(&self.destination_wallet, &holding.mint);
        let create_destination = !self.chain.account_exists(&destination).await?;
        if create_destination {
            info!("Destination account {} missing, creating it", destination);
        }

        let plan = SweepPlan {
            mint: holding.mint,
            owner,
            fee_payer: self.fee_payer.pubkey(),
            source,
            destination_wallet: self.destination_wallet,
            destination,
            amount,
            create_destination,
            priority_fee_micro_lamports: self.priority_fee_micro_lamports,
        };

        let instructions = build_sweep_instructions(&plan)?;
        let blockhash = self.chain.latest_blockhash().await?;
        let transaction = sign_transaction(&instructions, &self.fee_payer, &self.owner, blockhash)?;

        info!(
            "💸 Sweeping {} units of {} to {}",
            amount, holding.mint, self.destination_wallet
        );

        let signature = self.broadcaster.broadcast(&transaction).await?;

        Ok(SweepOutcome::Submitted { signature, amount })
    }

    /// The owner's associated account, unless the balance sits in another account
    fn source_account(&self, holding: &Holding) -> Pubkey {
        let derived = derive_token_account(&self.owner.pubkey(), &holding.mint);
        if holding.token_account == derived {
            derived
        } else {
            debug!(
                "Holding of {} is in non-associated account {}",
                holding.mint, holding.token_account
            );
            holding.token_account
        }
    }
}

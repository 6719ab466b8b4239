use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::fmt;
use std::time::Duration;

/// A positive token balance held by the monitored wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    /// The token mint address
    pub mint: Pubkey,

    /// Raw amount (in smallest unit) observed at scan time
    pub amount: u64,

    /// The token account custodying this balance
    pub token_account: Pubkey,

    /// Wallet that owns the token account
    pub owner: Pubkey,
}

/// Terminal result of one sweep attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SweepOutcome {
    /// Transaction acknowledged by at least one endpoint
    Submitted { signature: Signature, amount: u64 },

    /// Balance was zero at re-check time, nothing sent
    Skipped,

    Failed(String),
}

impl SweepOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SweepOutcome::Submitted { .. })
    }
}

impl fmt::Display for SweepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepOutcome::Submitted { signature, amount } => {
                write!(f, "submitted {} units ({})", amount, signature)
            }
            SweepOutcome::Skipped => write!(f, "skipped (zero balance)"),
            SweepOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Counters for a single poll cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub holdings: usize,
    pub submitted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl CycleReport {
    pub fn record(&mut self, outcome: &SweepOutcome) {
        match outcome {
            SweepOutcome::Submitted { .. } => self.submitted += 1,
            SweepOutcome::Skipped => self.skipped += 1,
            SweepOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Options passed with every transaction submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOptions {
    pub skip_preflight: bool,
    pub max_retries: usize,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            skip_preflight: true,
            max_retries: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweeperConfig {
    /// Wallet receiving every swept balance
    pub destination_wallet: Pubkey,

    /// RPC endpoints; the first serves queries, all of them take broadcasts
    pub rpc_endpoints: Vec<String>,

    /// Solana CLI keypair file for the monitored wallet.
    /// Falls back to the `SWEEPER_SECRET_KEY` environment variable.
    pub keypair_path: Option<String>,

    /// Optional separate wallet paying fees and account rent
    pub fee_payer_keypair_path: Option<String>,

    pub poll_interval_ms: u64,

    /// Pause after each holding so a cycle does not flood the endpoints
    pub inter_holding_delay_ms: u64,

    /// Compute unit price in micro-lamports
    pub priority_fee_micro_lamports: u64,

    /// Number of concurrent submissions per transaction
    pub broadcast_fanout: usize,

    /// Retries the RPC node performs for each submission
    pub max_retries: usize,

    pub connection_timeout_secs: u64,

    /// Whether to use commitment level "confirmed" (faster) or "finalized" (safer)
    pub use_confirmed_commitment: bool,

    pub log_level: String,
}

impl SweeperConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn inter_holding_delay(&self) -> Duration {
        Duration::from_millis(self.inter_holding_delay_ms)
    }

    pub fn submit_options(&self) -> SubmitOptions {
        SubmitOptions {
            skip_preflight: true,
            max_retries: self.max_retries,
        }
    }
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            destination_wallet: Pubkey::default(),
            rpc_endpoints: vec!["https://api.mainnet-beta.solana.com".to_string()],
            keypair_path: None,
            fee_payer_keypair_path: None,
            poll_interval_ms: 1_000,
            inter_holding_delay_ms: 2_000,
            priority_fee_micro_lamports: 100_000,
            broadcast_fanout: 6,
            max_retries: 5,
            connection_timeout_secs: 30,
            use_confirmed_commitment: true,
            log_level: "info".to_string(),
        }
    }
}

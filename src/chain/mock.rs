//! In-memory chain for tests.
//!
//! Balances, existing accounts and injected failures are all controlled from
//! test code; every submitted transaction is recorded.

use crate::chain::error::{SweepError, SweepResult};
use crate::chain::{ChainClient, TokenAccountBalance};
use crate::types::SubmitOptions;
use async_trait::async_trait;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
struct MockState {
    accounts: Vec<TokenAccountBalance>,
    /// Overrides returned by `token_balance`, simulating changes after a scan
    live_balances: HashMap<Pubkey, u64>,
    existing: HashSet<Pubkey>,
    failing_scans: usize,
    panicking_scans: usize,
    scan_calls: usize,
    failing_submissions: usize,
    submit_calls: usize,
    submitted: Vec<Transaction>,
    submit_options: Vec<SubmitOptions>,
}

#[derive(Default)]
pub struct MockChain {
    label: String,
    state: Mutex<MockState>,
}

impl MockChain {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            state: Mutex::new(MockState::default()),
        }
    }

    /// Register a token account and return its address
    pub fn add_token_account(&self, mint: Pubkey, address: Pubkey, amount: u64) -> Pubkey {
        let mut state = self.state.lock().unwrap();
        state.accounts.push(TokenAccountBalance {
            address,
            mint,
            amount,
        });
        state.existing.insert(address);
        address
    }

    /// Change the balance seen by `token_balance` without touching scan results
    pub fn set_live_balance(&self, token_account: Pubkey, amount: u64) {
        self.state
            .lock()
            .unwrap()
            .live_balances
            .insert(token_account, amount);
    }

    pub fn add_existing_account(&self, address: Pubkey) {
        self.state.lock().unwrap().existing.insert(address);
    }

    /// The next `count` scans return an error
    pub fn fail_next_scans(&self, count: usize) {
        self.state.lock().unwrap().failing_scans = count;
    }

    /// The next `count` scans panic
    pub fn panic_next_scans(&self, count: usize) {
        self.state.lock().unwrap().panicking_scans = count;
    }

    /// The next `count` submissions return an error
    pub fn fail_next_submissions(&self, count: usize) {
        self.state.lock().unwrap().failing_submissions = count;
    }

    pub fn scan_calls(&self) -> usize {
        self.state.lock().unwrap().scan_calls
    }

    pub fn submit_calls(&self) -> usize {
        self.state.lock().unwrap().submit_calls
    }

    pub fn submitted(&self) -> Vec<Transaction> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn submit_options(&self) -> Vec<SubmitOptions> {
        self.state.lock().unwrap().submit_options.clone()
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn token_holdings(&self, _owner: &Pubkey) -> SweepResult<Vec<TokenAccountBalance>> {
        let panic_now = {
            let mut state = self.state.lock().unwrap();
            state.scan_calls += 1;

            if state.failing_scans > 0 {
                state.failing_scans -= 1;
                return Err(SweepError::Unknown("injected scan failure".to_string()));
            }

            let panic_now = state.panicking_scans > 0;
            if panic_now {
                state.panicking_scans -= 1;
            }
            panic_now
        };

        if panic_now {
            panic!("injected scan panic");
        }

        Ok(self.state.lock().unwrap().accounts.clone())
    }

    async fn token_balance(&self, token_account: &Pubkey) -> SweepResult<u64> {
        let state = self.state.lock().unwrap();
        if let Some(amount) = state.live_balances.get(token_account) {
            return Ok(*amount);
        }

        state
            .accounts
            .iter()
            .find(|a| a.address == *token_account)
            .map(|a| a.amount)
            .ok_or_else(|| SweepError::InvalidAccountData(format!("No account {}", token_account)))
    }

    async fn account_exists(&self, address: &Pubkey) -> SweepResult<bool> {
        Ok(self.state.lock().unwrap().existing.contains(address))
    }

    async fn latest_blockhash(&self) -> SweepResult<Hash> {
        Ok(Hash::new_unique())
    }

    async fn submit(
        &self,
        transaction: &Transaction,
        options: SubmitOptions,
    ) -> SweepResult<Signature> {
        let mut state = self.state.lock().unwrap();
        state.submit_calls += 1;
        state.submit_options.push(options);

        if state.failing_submissions > 0 {
            state.failing_submissions -= 1;
            return Err(SweepError::Unknown("injected submit failure".to_string()));
        }

        state.submitted.push(transaction.clone());
        Ok(transaction.signatures[0])
    }

    fn endpoint(&self) -> &str {
        &self.label
    }
}

use crate::chain::error::{SweepError, SweepResult};
use crate::chain::{ChainClient, TokenAccountBalance};
use crate::types::SubmitOptions;
use async_trait::async_trait;
use serde_json::Value;
use solana_account_decoder::UiAccountData;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_client::rpc_request::TokenAccountsFilter;
use solana_client::rpc_response::RpcKeyedAccount;
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use spl_token::solana_program::program_pack::Pack;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

/// [`ChainClient`] backed by a single JSON-RPC endpoint
pub struct RpcChainClient {
    endpoint: String,
    rpc_client: RpcClient,
}

impl RpcChainClient {
    pub fn new(endpoint: String, timeout: Duration, use_confirmed_commitment: bool) -> Self {
        let commitment = if use_confirmed_commitment {
            CommitmentConfig::confirmed()
        } else {
            CommitmentConfig::finalized()
        };

        Self {
            rpc_client: RpcClient::new_with_timeout_and_commitment(
                endpoint.clone(),
                timeout,
                commitment,
            ),
            endpoint,
        }
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn token_holdings(&self, owner: &Pubkey) -> SweepResult<Vec<TokenAccountBalance>> {
        let accounts = self
            .rpc_client
            .get_token_accounts_by_owner(owner, TokenAccountsFilter::ProgramId(spl_token::id()))
            .await?;

        debug!("{} returned {} token accounts", self.endpoint, accounts.len());

        let mut balances = Vec::with_capacity(accounts.len());
        for keyed in &accounts {
            match parse_keyed_account(keyed) {
                Ok(balance) => balances.push(balance),
                // One unreadable account should not hide the others
                Err(e) => warn!("Skipping token account {}: {}", keyed.pubkey, e),
            }
        }

        Ok(balances)
    }

    async fn token_balance(&self, token_account: &Pubkey) -> SweepResult<u64> {
        let ui_amount = self.rpc_client.get_token_account_balance(token_account).await?;
        parse_raw_amount(&ui_amount.amount)
    }

    async fn account_exists(&self, address: &Pubkey) -> SweepResult<bool> {
        let response = self
            .rpc_client
            .get_account_with_commitment(address, self.rpc_client.commitment())
            .await?;
        Ok(response.value.is_some())
    }

    async fn latest_blockhash(&self) -> SweepResult<Hash> {
        Ok(self.rpc_client.get_latest_blockhash().await?)
    }

    async fn submit(
        &self,
        transaction: &Transaction,
        options: SubmitOptions,
    ) -> SweepResult<Signature> {
        let config = RpcSendTransactionConfig {
            skip_preflight: options.skip_preflight,
            max_retries: Some(options.max_retries),
            ..RpcSendTransactionConfig::default()
        };

        Ok(self
            .rpc_client
            .send_transaction_with_config(transaction, config)
            .await?)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Decode a keyed token account in either jsonParsed or binary encoding
fn parse_keyed_account(keyed: &RpcKeyedAccount) -> SweepResult<TokenAccountBalance> {
    let address = Pubkey::from_str(&keyed.pubkey)
        .map_err(|e| SweepError::InvalidAccountData(format!("Invalid account address: {}", e)))?;

    if let UiAccountData::Json(parsed) = &keyed.account.data {
        let (mint, amount) = parse_token_account_info(&parsed.parsed)?;
        return Ok(TokenAccountBalance {
            address,
            mint,
            amount,
        });
    }

    let account: Account = keyed.account.decode().ok_or_else(|| {
        SweepError::InvalidAccountData(format!("Undecodable account data for {}", address))
    })?;
    let token_account = spl_token::state::Account::unpack(&account.data)
        .map_err(|e| SweepError::InvalidAccountData(format!("Not a token account: {}", e)))?;

    Ok(TokenAccountBalance {
        address,
        mint: token_account.mint,
        amount: token_account.amount,
    })
}

/// Pull mint and raw amount out of a jsonParsed token account
fn parse_token_account_info(parsed: &Value) -> SweepResult<(Pubkey, u64)> {
    let info = parsed
        .get("info")
        .ok_or_else(|| SweepError::InvalidAccountData("Missing info field".to_string()))?;

    let mint = info
        .get("mint")
        .and_then(|m| m.as_str())
        .ok_or_else(|| SweepError::InvalidAccountData("Missing mint".to_string()))?;
    let mint = Pubkey::from_str(mint)
        .map_err(|e| SweepError::InvalidAccountData(format!("Invalid mint address: {}", e)))?;

    let amount = info
        .get("tokenAmount")
        .and_then(|t| t.get("amount"))
        .and_then(|a| a.as_str())
        .ok_or_else(|| SweepError::InvalidAccountData("Missing tokenAmount".to_string()))?;

    Ok((mint, parse_raw_amount(amount)?))
}

fn parse_raw_amount(amount: &str) -> SweepResult<u64> {
    amount
        .parse::<u64>()
        .map_err(|e| SweepError::InvalidAccountData(format!("Invalid amount {:?}: {}", amount, e)))
}

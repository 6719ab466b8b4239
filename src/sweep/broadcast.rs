use crate::chain::{ChainClient, SweepError, SweepResult};
use crate::types::SubmitOptions;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Submits one signed transaction several times concurrently and takes the
/// first acknowledgement.
///
/// Attempts are spread round-robin over the configured endpoints. Once one
/// attempt succeeds the rest are dropped; confirmation is never awaited.
pub struct Broadcaster {
    endpoints: Vec<Arc<dyn ChainClient>>,
    fanout: usize,
    options: SubmitOptions,
}

impl Broadcaster {
    pub fn new(endpoints: Vec<Arc<dyn ChainClient>>, fanout: usize, options: SubmitOptions) -> Self {
        Self {
            endpoints,
            fanout: fanout.max(1),
            options,
        }
    }

    pub fn fanout(&self) -> usize {
        self.fanout
    }

    pub async fn broadcast(&self, transaction: &Transaction) -> SweepResult<Signature> {
        if self.endpoints.is_empty() {
            return Err(SweepError::ConfigError(
                "No endpoints to broadcast to".to_string(),
            ));
        }

        let mut attempts: FuturesUnordered<_> = (0..self.fanout)
            .map(|attempt| {
                let endpoint = &self.endpoints[attempt % self.endpoints.len()];
                async move {
                    let result = endpoint.submit(transaction, self.options).await;
                    (attempt, endpoint.endpoint(), result)
                }
            })
            .collect();

        let mut last_error = String::new();

        while let Some((attempt, endpoint, result)) = attempts.next().await {
            match result {
                Ok(signature) => {
                    info!(
                        "📡 Broadcast accepted by {} (attempt {}/{}): {}",
                        endpoint,
                        attempt + 1,
                        self.fanout,
                        signature
                    );
                    return Ok(signature);
                }
                Err(e) => {
                    debug!("Broadcast attempt {} via {} failed: {}", attempt + 1, endpoint, e);
                    last_error = e.to_string();
                }
            }
        }

        warn!("All {} broadcast attempts failed", self.fanout);
        Err(SweepError::BroadcastExhausted {
            attempts: self.fanout,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::mock::MockChain;
    use solana_sdk::hash::Hash;
    use solana_sdk::signature::{Keypair, Signer};
    use solana_sdk::system_instruction;

    fn signed_transaction() -> Transaction {
        let payer = Keypair::new();
        let instruction = system_instruction::transfer(&payer.pubkey(), &payer.pubkey(), 1);
        Transaction::new_signed_with_payer(
            &[instruction],
            Some(&payer.pubkey()),
            &[&payer],
            Hash::new_unique(),
        )
    }

    #[tokio::test]
    async fn test_succeeds_if_any_attempt_succeeds() {
        let chain = Arc::new(MockChain::new("mock"));
        chain.fail_next_submissions(5);
        let broadcaster = Broadcaster::new(vec![chain.clone()], 6, SubmitOptions::default());

        let transaction = signed_transaction();
        let signature = broadcaster.broadcast(&transaction).await.unwrap();

        assert_eq!(signature, transaction.signatures[0]);
        assert_eq!(chain.submitted().len(), 1);
    }

    #[tokio::test]
    async fn test_fails_only_when_all_attempts_fail() {
        let chain = Arc::new(MockChain::new("mock"));
        chain.fail_next_submissions(6);
        let broadcaster = Broadcaster::new(vec![chain.clone()], 6, SubmitOptions::default());

        let result = broadcaster.broadcast(&signed_transaction()).await;

        assert!(matches!(
            result,
            Err(SweepError::BroadcastExhausted { attempts: 6, .. })
        ));
        assert_eq!(chain.submit_calls(), 6);
    }

    #[tokio::test]
    async fn test_attempts_skip_preflight_with_bounded_retries() {
        let chain = Arc::new(MockChain::new("mock"));
        chain.fail_next_submissions(2);
        let options = SubmitOptions {
            skip_preflight: true,
            max_retries: 3,
        };
        let broadcaster = Broadcaster::new(vec![chain.clone()], 6, options);

        broadcaster.broadcast(&signed_transaction()).await.unwrap();

        let recorded = chain.submit_options();
        assert!(!recorded.is_empty());
        assert!(recorded.iter().all(|o| o.skip_preflight && o.max_retries == 3));
    }

    #[tokio::test]
    async fn test_attempts_spread_over_endpoints() {
        let first = Arc::new(MockChain::new("first"));
        let second = Arc::new(MockChain::new("second"));
        first.fail_next_submissions(3);
        second.fail_next_submissions(3);
        let broadcaster = Broadcaster::new(
            vec![first.clone(), second.clone()],
            6,
            SubmitOptions::default(),
        );

        assert!(broadcaster.broadcast(&signed_transaction()).await.is_err());
        assert_eq!(first.submit_calls(), 3);
        assert_eq!(second.submit_calls(), 3);
    }

    #[tokio::test]
    async fn test_zero_fanout_still_submits_once() {
        let chain = Arc::new(MockChain::new("mock"));
        let broadcaster = Broadcaster::new(vec![chain.clone()], 0, SubmitOptions::default());

        assert_eq!(broadcaster.fanout(), 1);
        broadcaster.broadcast(&signed_transaction()).await.unwrap();
        assert_eq!(chain.submit_calls(), 1);
    }
}

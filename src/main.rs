use anyhow::Context;
use solana_sdk::signature::Signer;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use token_sweeper::config::ensure_distinct_destination;
use token_sweeper::{
    BalanceScanner, Broadcaster, ChainClient, PollDriver, RpcChainClient, SweepExecutor,
    load_config, load_keypair, load_optional_keypair,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            init_logging("info");
            error!("Failed to load config: {}", e);
            if std::path::Path::new(&config_path).exists() {
                return Err(e.into());
            }
            info!("Creating default config file...");
            token_sweeper::create_default_config(&config_path)?;
            info!(
                "Please edit {} with your destination wallet address",
                config_path
            );
            return Ok(());
        }
    };

    init_logging(&config.log_level);
    info!("Starting Solana token sweeper");

    let owner = Arc::new(
        load_keypair(config.keypair_path.as_deref()).context("loading monitored wallet")?,
    );
    let fee_payer = match load_optional_keypair(config.fee_payer_keypair_path.as_deref())
        .context("loading fee payer")?
    {
        Some(fee_payer) => Arc::new(fee_payer),
        None => owner.clone(),
    };
    ensure_distinct_destination(&config, &owner.pubkey())?;

    info!("Monitored wallet: {}", owner.pubkey());
    info!("Fee payer: {}", fee_payer.pubkey());
    info!("Destination wallet: {}", config.destination_wallet);

    let timeout = Duration::from_secs(config.connection_timeout_secs);
    let endpoints: Vec<Arc<dyn ChainClient>> = config
        .rpc_endpoints
        .iter()
        .map(|url| {
            Arc::new(RpcChainClient::new(
                url.clone(),
                timeout,
                config.use_confirmed_commitment,
            )) as Arc<dyn ChainClient>
        })
        .collect();
    let primary = endpoints[0].clone();

    let broadcaster = Broadcaster::new(endpoints, config.broadcast_fanout, config.submit_options());
    let executor = SweepExecutor::new(
        primary.clone(),
        broadcaster,
        owner,
        fee_payer,
        config.destination_wallet,
        config.priority_fee_micro_lamports,
    );
    let driver = PollDriver::new(
        BalanceScanner::new(primary),
        executor,
        config.poll_interval(),
        config.inter_holding_delay(),
    );

    info!("Sweeper is running. Press Ctrl+C to stop.");

    driver
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Received shutdown signal");
        })
        .await;

    info!("Shutting down...");
    Ok(())
}

/// `RUST_LOG` wins over the configured level
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

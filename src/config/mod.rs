use crate::chain::error::{SweepError, SweepResult};
use crate::types::SweeperConfig;
use config::{Config, File};
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, read_keypair_file};
use std::path::Path;
use std::str::FromStr;
use tracing::info;
use url::Url;

/// Environment variable holding the base58 secret key when no keypair file is set
pub const SECRET_KEY_ENV: &str = "SWEEPER_SECRET_KEY";

#[derive(Debug, Deserialize)]
struct RawConfig {
    sweeper: RawSweeperConfig,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize)]
struct RawSweeperConfig {
    destination_wallet: String,
    rpc_endpoints: Vec<String>,
    keypair_path: Option<String>,
    fee_payer_keypair_path: Option<String>,
    poll_interval_ms: Option<u64>,
    inter_holding_delay_ms: Option<u64>,
    priority_fee_micro_lamports: Option<u64>,
    broadcast_fanout: Option<usize>,
    max_retries: Option<usize>,
    connection_timeout_secs: Option<u64>,
    use_confirmed_commitment: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> SweepResult<SweeperConfig> {
    info!("Loading configuration from {:?}", path.as_ref());

    let config = Config::builder()
        .add_source(File::from(path.as_ref()))
        .build()
        .map_err(|e| SweepError::ConfigError(format!("Failed to load config: {}", e)))?;

    let raw: RawConfig = config
        .try_deserialize()
        .map_err(|e| SweepError::ConfigError(format!("Failed to parse config: {}", e)))?;

    let sweeper_config = validate(raw)?;

    info!("Configuration loaded successfully");
    info!("Destination wallet: {}", sweeper_config.destination_wallet);
    info!("RPC endpoints: {:?}", sweeper_config.rpc_endpoints);

    Ok(sweeper_config)
}

fn validate(raw: RawConfig) -> SweepResult<SweeperConfig> {
    let defaults = SweeperConfig::default();
    let sweeper = raw.sweeper;

    let destination_wallet = Pubkey::from_str(&sweeper.destination_wallet).map_err(|e| {
        SweepError::ConfigError(format!("Invalid destination wallet address: {}", e))
    })?;

    if sweeper.rpc_endpoints.is_empty() {
        return Err(SweepError::ConfigError(
            "At least one RPC endpoint is required".to_string(),
        ));
    }

    for endpoint in &sweeper.rpc_endpoints {
        let url = Url::parse(endpoint).map_err(|e| {
            SweepError::ConfigError(format!("Invalid RPC endpoint {}: {}", endpoint, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(SweepError::ConfigError(format!(
                "Invalid RPC endpoint (must start with http:// or https://): {}",
                endpoint
            )));
        }
    }

    let poll_interval_ms = sweeper.poll_interval_ms.unwrap_or(defaults.poll_interval_ms);
    if poll_interval_ms == 0 {
        return Err(SweepError::ConfigError(
            "poll_interval_ms must be greater than zero".to_string(),
        ));
    }

    let broadcast_fanout = sweeper.broadcast_fanout.unwrap_or(defaults.broadcast_fanout);
    if broadcast_fanout == 0 {
        return Err(SweepError::ConfigError(
            "broadcast_fanout must be at least 1".to_string(),
        ));
    }

    Ok(SweeperConfig {
        destination_wallet,
        rpc_endpoints: sweeper.rpc_endpoints,
        keypair_path: sweeper.keypair_path,
        fee_payer_keypair_path: sweeper.fee_payer_keypair_path,
        poll_interval_ms,
        inter_holding_delay_ms: sweeper
            .inter_holding_delay_ms
            .unwrap_or(defaults.inter_holding_delay_ms),
        priority_fee_micro_lamports: sweeper
            .priority_fee_micro_lamports
            .unwrap_or(defaults.priority_fee_micro_lamports),
        broadcast_fanout,
        max_retries: sweeper.max_retries.unwrap_or(defaults.max_retries),
        connection_timeout_secs: sweeper
            .connection_timeout_secs
            .unwrap_or(defaults.connection_timeout_secs),
        use_confirmed_commitment: sweeper
            .use_confirmed_commitment
            .unwrap_or(defaults.use_confirmed_commitment),
        log_level: raw
            .logging
            .and_then(|l| l.level)
            .unwrap_or(defaults.log_level),
    })
}

/// Sweeping into the monitored wallet itself would loop forever
pub fn ensure_distinct_destination(config: &SweeperConfig, owner: &Pubkey) -> SweepResult<()> {
    if config.destination_wallet == *owner {
        return Err(SweepError::ConfigError(
            "Destination wallet must differ from the monitored wallet".to_string(),
        ));
    }
    Ok(())
}

/// Load the monitored wallet from a keypair file, or from `SWEEPER_SECRET_KEY`
pub fn load_keypair(path: Option<&str>) -> SweepResult<Keypair> {
    match path {
        Some(path) => read_keypair_file(path)
            .map_err(|e| SweepError::KeypairError(format!("Failed to read {}: {}", path, e))),
        None => {
            let secret = std::env::var(SECRET_KEY_ENV).map_err(|_| {
                SweepError::KeypairError(format!(
                    "No keypair_path configured and {} is not set",
                    SECRET_KEY_ENV
                ))
            })?;
            keypair_from_base58(secret.trim())
        }
    }
}

pub fn load_optional_keypair(path: Option<&str>) -> SweepResult<Option<Keypair>> {
    path.map(|p| load_keypair(Some(p))).transpose()
}

fn keypair_from_base58(secret: &str) -> SweepResult<Keypair> {
    let bytes = bs58::decode(secret)
        .into_vec()
        .map_err(|e| SweepError::KeypairError(format!("Secret key is not base58: {}", e)))?;

    Keypair::from_bytes(&bytes)
        .map_err(|e| SweepError::KeypairError(format!("Invalid secret key: {}", e)))
}

/// Create a default configuration file
pub fn create_default_config<P: AsRef<Path>>(path: P) -> SweepResult<()> {
    let default_config = r#"[sweeper]
# Wallet that receives every swept token balance
destination_wallet = "YOUR_DESTINATION_WALLET_ADDRESS_HERE"

# RPC endpoints. The first one serves balance queries; broadcasts are spread over all of them
rpc_endpoints = [
    "https://api.mainnet-beta.solana.com"
]

# Solana CLI keypair file of the monitored wallet.
# If omitted, the base58 secret key is read from SWEEPER_SECRET_KEY
# keypair_path = "/path/to/monitored-wallet.json"

# Optional separate wallet paying transaction fees and account rent
# fee_payer_keypair_path = "/path/to/fee-payer.json"

# Delay between poll cycles
poll_interval_ms = 1000

# Delay between sweeps within one cycle
inter_holding_delay_ms = 2000

# Compute unit price (micro-lamports) for priority fees
priority_fee_micro_lamports = 100000

# Concurrent submissions per sweep transaction
broadcast_fanout = 6

# Retries the RPC node performs for each submission
max_retries = 5

# Connection timeout in seconds
connection_timeout_secs = 30

# Use "confirmed" commitment level (faster) instead of "finalized" (safer)
use_confirmed_commitment = true

[logging]
# Logging level: trace, debug, info, warn, error
level = "info"
"#;

    std::fs::write(path.as_ref(), default_config)
        .map_err(|e| SweepError::ConfigError(format!("Failed to write config file: {}", e)))?;

    info!("Created default config file at {:?}", path.as_ref());
    Ok(())
}

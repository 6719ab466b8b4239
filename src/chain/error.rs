use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("RPC error: {0}")]
    RpcError(#[from] solana_client::client_error::ClientError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Keypair error: {0}")]
    KeypairError(String),

    #[error("Invalid account data: {0}")]
    InvalidAccountData(String),

    #[error("Failed to build instruction: {0}")]
    InstructionError(#[from] solana_sdk::program_error::ProgramError),

    #[error("Transaction too large: {size} bytes (limit {limit})")]
    TransactionTooLarge { size: u64, limit: u64 },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] bincode::Error),

    #[error("All {attempts} broadcast attempts failed, last error: {last_error}")]
    BroadcastExhausted { attempts: usize, last_error: String },

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Result type for sweeper operations
pub type SweepResult<T> = Result<T, SweepError>;

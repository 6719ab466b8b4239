pub mod types;
pub mod chain;
pub mod config;
pub mod sweep;

pub use types::{Holding, SweepOutcome, CycleReport, SubmitOptions, SweeperConfig};
pub use chain::{ChainClient, RpcChainClient, SweepError, SweepResult};
pub use config::{load_config, create_default_config, load_keypair, load_optional_keypair};
pub use sweep::{Broadcaster, BalanceScanner, PollDriver, SweepExecutor};

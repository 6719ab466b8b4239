//! Balance sweeping
//!
//! [`PollDriver`] runs [`BalanceScanner`] on a fixed interval and hands each
//! positive holding to [`SweepExecutor`], which builds a transfer-all
//! transaction and races it out through [`Broadcaster`].

pub mod broadcast;
pub mod builder;
pub mod driver;
pub mod executor;
pub mod scanner;

pub use broadcast::Broadcaster;
pub use builder::{SweepPlan, build_sweep_instructions, derive_token_account, sign_transaction};
pub use driver::PollDriver;
pub use executor::SweepExecutor;
pub use scanner::BalanceScanner;

use crate::chain::SweepResult;
use crate::sweep::executor::SweepExecutor;
use crate::sweep::scanner::BalanceScanner;
use crate::types::CycleReport;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Repeats scan + sweep on a fixed interval until shut down
pub struct PollDriver {
    scanner: BalanceScanner,
    executor: SweepExecutor,
    poll_interval: Duration,
    inter_holding_delay: Duration,
    /// Held for the whole of a cycle so two cycles never overlap
    cycle_guard: Mutex<()>,
}

impl PollDriver {
    pub fn new(
        scanner: BalanceScanner,
        executor: SweepExecutor,
        poll_interval: Duration,
        inter_holding_delay: Duration,
    ) -> Self {
        Self {
            scanner,
            executor,
            poll_interval,
            inter_holding_delay,
            cycle_guard: Mutex::new(()),
        }
    }

    /// Poll until `shutdown` resolves. Cycle errors and panics are logged and
    /// the loop carries on.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!(
            "Sweeping {} -> {} every {:?}",
            self.executor.owner(),
            self.executor.destination_wallet(),
            self.poll_interval
        );

        let mut cycle: u64 = 0;
        loop {
            cycle += 1;

            let result = tokio::select! {
                _ = &mut shutdown => break,
                result = AssertUnwindSafe(self.run_cycle()).catch_unwind() => result,
            };

            match result {
                Ok(Ok(Some(report))) if report.holdings > 0 => info!(
                    "Cycle {}: {} holdings, {} submitted, {} skipped, {} failed",
                    cycle, report.holdings, report.submitted, report.skipped, report.failed
                ),
                Ok(Ok(Some(_))) => debug!("Cycle {}: nothing to sweep", cycle),
                Ok(Ok(None)) => debug!("Cycle {} skipped, previous cycle still running", cycle),
                Ok(Err(e)) => error!("Cycle {} abandoned: {}", cycle, e),
                Err(panic) => error!("Cycle {} panicked: {}", cycle, panic_message(&*panic)),
            }

            tokio::select! {
                _ = &mut shutdown => break,
                _ = sleep(self.poll_interval) => {}
            }
        }

        info!("Poll loop stopped after {} cycles", cycle);
    }

    /// Run one scan and sweep every positive holding in turn.
    ///
    /// Returns `None` without doing anything if another cycle holds the guard.
    pub async fn run_cycle(&self) -> SweepResult<Option<CycleReport>> {
        let Ok(_guard) = self.cycle_guard.try_lock() else {
            return Ok(None);
        };

        let holdings = self.scanner.scan(&self.executor.owner()).await?;
        let mut report = CycleReport {
            holdings: holdings.len(),
            ..CycleReport::default()
        };

        for (index, holding) in holdings.iter().enumerate() {
            if index > 0 {
                sleep(self.inter_holding_delay).await;
            }

            let outcome = self.executor.sweep(holding).await;
            if outcome.is_submitted() {
                info!("✅ {}: {}", holding.mint, outcome);
            } else {
                warn!("⏭️  {}: {}", holding.mint, outcome);
            }
            report.record(&outcome);
        }

        Ok(Some(report))
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

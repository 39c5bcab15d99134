use tracing::{debug, info, warn};

use super::confirmation::Confirmation;
use super::domain::{Account, AccountOutcome, DeprovisioningOutcome, RunSummary};
use super::pacing::{Clock, RateLimit, SlidingWindowPacer};
use crate::directory::DirectoryClient;

/// Issues one deprovision call per account, in order, under a [`RateLimit`].
///
/// A failing account is recorded and skipped; the run always reaches the end
/// of the list. Failed accounts are not retried.
#[derive(Debug)]
pub struct ThrottledExecutor<'a, D: ?Sized, C> {
    directory: &'a D,
    clock: C,
    rate_limit: RateLimit,
}

impl<'a, D, C> ThrottledExecutor<'a, D, C>
where
    D: DirectoryClient + ?Sized,
    C: Clock,
{
    pub fn new(directory: &'a D, clock: C, rate_limit: RateLimit) -> Self {
        Self {
            directory,
            clock,
            rate_limit,
        }
    }

    pub fn run(&self, accounts: &[Account], _confirmed: Confirmation) -> RunSummary {
        let started = self.clock.now();
        let total = accounts.len();
        let mut pacer = SlidingWindowPacer::new(self.rate_limit);
        let mut outcomes = Vec::with_capacity(total);
        let mut succeeded = 0usize;
        let mut pauses = 0usize;

        info!(
            total,
            max_requests = self.rate_limit.max_requests(),
            window_ms = self.rate_limit.window().as_millis() as u64,
            "starting deprovisioning run"
        );

        for (index, account) in accounts.iter().enumerate() {
            if let Some(wait) = pacer.acquire(&self.clock) {
                pauses += 1;
                info!(
                    wait_ms = wait.as_millis() as u64,
                    completed = index,
                    remaining = total - index,
                    "waiting to ensure directory request limits are met"
                );
            }

            let outcome = match self.directory.deprovision(&account.id) {
                Ok(()) => {
                    succeeded += 1;
                    debug!(email = %account.email, id = %account.id, "account deprovisioned");
                    DeprovisioningOutcome::Succeeded
                }
                Err(err) => {
                    warn!(email = %account.email, id = %account.id, error = %err, "deprovisioning failed");
                    DeprovisioningOutcome::Failed(err.to_string())
                }
            };

            outcomes.push(AccountOutcome {
                account_id: account.id.clone(),
                email: account.email.clone(),
                outcome,
            });
        }

        let summary = RunSummary {
            attempted: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            elapsed: self.clock.now().saturating_duration_since(started),
            pauses,
            outcomes,
        };

        info!(
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            pauses = summary.pauses,
            "deprovisioning run finished"
        );

        summary
    }
}

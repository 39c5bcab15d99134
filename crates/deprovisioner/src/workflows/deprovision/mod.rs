//! Reconcile, back up, confirm, then deprovision under the rate ceiling.

pub mod backup;
pub mod confirmation;
pub mod domain;
pub mod executor;
pub mod pacing;
pub mod prompt;
pub mod reconcile;
pub mod report;

pub use backup::{run_stamp, BackupError, BackupWriter, CsvBackupWriter};
pub use confirmation::{Confirmation, ConfirmationGate, GateState};
pub use domain::{
    Account, AccountOutcome, AccountStatus, DeprovisioningOutcome, RunSummary, TargetIdentitySet,
    Tier,
};
pub use executor::ThrottledExecutor;
pub use pacing::{Clock, RateLimit, SimulatedClock, SlidingWindowPacer, SystemClock};
pub use prompt::{run_gate, ConsolePrompter, Prompter};
pub use reconcile::{reconcile, ReconciliationError, ReconciliationResult, TierCounts};

use crate::directory::{DirectoryClient, DirectoryError};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("fetch phase failed: {0}")]
    Fetch(#[source] DirectoryError),
    #[error("reconciliation phase failed: {0}")]
    Reconciliation(#[from] ReconciliationError),
    #[error("backup phase failed: {0}")]
    Backup(#[from] BackupError),
    #[error("confirmation phase failed: {0}")]
    Confirmation(#[source] std::io::Error),
}

impl WorkflowError {
    pub const fn phase(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetch",
            Self::Reconciliation(_) => "reconciliation",
            Self::Backup(_) => "backup",
            Self::Confirmation(_) => "confirmation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// No imported identity matched a live account.
    NothingToDeprovision,
    /// The operator declined at the confirmation gate.
    Aborted,
    Completed(RunSummary),
}

#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    pub reconciliation: ReconciliationResult,
    pub backup_location: String,
    pub disposition: Disposition,
}

/// Drives one deprovisioning run end to end.
///
/// Nothing mutating is sent to the directory unless the listing succeeded,
/// the snapshot was written, and the gate reached [`GateState::Confirmed`].
#[derive(Debug)]
pub struct DeprovisioningWorkflow<'a, D: ?Sized, B: ?Sized, C> {
    directory: &'a D,
    backup: &'a B,
    clock: C,
    rate_limit: RateLimit,
}

impl<'a, D, B, C> DeprovisioningWorkflow<'a, D, B, C>
where
    D: DirectoryClient + ?Sized,
    B: BackupWriter + ?Sized,
    C: Clock,
{
    pub fn new(directory: &'a D, backup: &'a B, clock: C, rate_limit: RateLimit) -> Self {
        Self {
            directory,
            backup,
            clock,
            rate_limit,
        }
    }

    pub fn run<P: Prompter + ?Sized>(
        &self,
        targets: &TargetIdentitySet,
        mut gate: ConfirmationGate,
        prompter: &mut P,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        info!("gathering current account data and metrics");
        self.directory.authenticate().map_err(WorkflowError::Fetch)?;
        let live = self.directory.list_accounts().map_err(WorkflowError::Fetch)?;

        let reconciliation = reconcile(&live, targets, self.rate_limit)?;

        let backup_location = self.backup.persist(&live)?;
        info!(location = %backup_location, "backup account data stored");

        report::log_reconciliation(&reconciliation, targets.len());

        if reconciliation.nothing_to_do() {
            info!("no imported identities match live accounts; nothing to deprovision");
            return Ok(WorkflowOutcome {
                reconciliation,
                backup_location,
                disposition: Disposition::NothingToDeprovision,
            });
        }

        info!(
            max_requests = self.rate_limit.max_requests(),
            "directory limits requests per second; the run may take a while"
        );
        info!("double checking with operator before proceeding");

        run_gate(&mut gate, prompter).map_err(WorkflowError::Confirmation)?;
        let Some(confirmed) = gate.confirmation() else {
            info!("operator declined to proceed with deprovisioning");
            return Ok(WorkflowOutcome {
                reconciliation,
                backup_location,
                disposition: Disposition::Aborted,
            });
        };

        info!("received confirmation to proceed; starting deprovisioning");
        let executor = ThrottledExecutor::new(self.directory, &self.clock, self.rate_limit);
        let summary = executor.run(&reconciliation.matched_accounts, confirmed);
        report::log_summary(&summary);

        Ok(WorkflowOutcome {
            reconciliation,
            backup_location,
            disposition: Disposition::Completed(summary),
        })
    }
}

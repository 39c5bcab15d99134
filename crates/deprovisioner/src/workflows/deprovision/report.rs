use std::time::Duration;

use serde::Serialize;
use tracing::info;

use super::domain::{RunSummary, Tier};
use super::reconcile::ReconciliationResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierProjection {
    pub tier: Tier,
    pub tier_label: String,
    pub before: usize,
    pub removed: usize,
    pub after: usize,
}

/// Per-tier before/after rows in tier order.
pub fn tier_projections(result: &ReconciliationResult) -> Vec<TierProjection> {
    result
        .tier_counts_before
        .iter()
        .map(|(&tier, &before)| {
            let after = result
                .tier_counts_after
                .get(&tier)
                .copied()
                .unwrap_or(before);
            TierProjection {
                tier,
                tier_label: tier.to_string(),
                before,
                removed: before - after,
                after,
            }
        })
        .collect()
}

/// Emits the pre-confirmation figures an operator needs before agreeing.
pub fn log_reconciliation(result: &ReconciliationResult, imported: usize) {
    info!(total = result.total_before(), "total accounts");
    for row in tier_projections(result) {
        info!(
            tier = %row.tier_label,
            before = row.before,
            after = row.after,
            "tier accounts before and after deprovisioning"
        );
    }
    info!(
        imported,
        matched = result.matched_accounts.len(),
        unmatched = result.unmatched_identifiers.len(),
        "accounts to deprovision"
    );
    for identifier in &result.unmatched_identifiers {
        info!(%identifier, "imported identity has no live account");
    }
    info!(
        total_after = result.total_after(),
        estimated = %format_duration(result.estimated_duration),
        "estimated totals after deprovisioning"
    );
}

pub fn log_summary(summary: &RunSummary) {
    for failure in summary.failures() {
        info!(email = %failure.email, id = %failure.account_id, "account was not deprovisioned");
    }
    info!(
        attempted = summary.attempted,
        succeeded = summary.succeeded,
        failed = summary.failed,
        elapsed = %format_duration(summary.elapsed),
        "number of users deprovisioned: {}",
        summary.succeeded
    );
}

/// Renders a duration as `1h 2m 3s`, dropping leading zero units.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    match (hours, minutes) {
        (0, 0) => format!("{seconds}s"),
        (0, _) => format!("{minutes}m {seconds}s"),
        _ => format!("{hours}h {minutes}m {seconds}s"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_drops_leading_zero_units() {
        assert_eq!(format_duration(Duration::from_millis(900)), "0s");
        assert_eq!(format_duration(Duration::from_secs(75)), "1m 15s");
        assert_eq!(format_duration(Duration::from_secs(3_725)), "1h 2m 5s");
    }
}

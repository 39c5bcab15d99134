use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use super::domain::{Account, TargetIdentitySet, Tier};
use super::pacing::RateLimit;

pub type TierCounts = BTreeMap<Tier, usize>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconciliationError {
    #[error(
        "projected {tier} count went negative ({before} live, {removed} matched); tier classification is inconsistent"
    )]
    NegativeProjection {
        tier: Tier,
        before: usize,
        removed: usize,
    },
}

/// Read-only comparison of the live directory with the import list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationResult {
    pub matched_accounts: Vec<Account>,
    pub unmatched_identifiers: Vec<String>,
    pub tier_counts_before: TierCounts,
    pub tier_counts_after: TierCounts,
    pub estimated_duration: Duration,
}

impl ReconciliationResult {
    pub fn total_before(&self) -> usize {
        self.tier_counts_before.values().sum()
    }

    pub fn total_after(&self) -> usize {
        self.tier_counts_after.values().sum()
    }

    pub fn nothing_to_do(&self) -> bool {
        self.matched_accounts.is_empty()
    }
}

/// Intersects `live` with `targets` by normalized e-mail.
///
/// Matched accounts keep directory order; unmatched identifiers keep import
/// order. Performs no I/O.
pub fn reconcile(
    live: &[Account],
    targets: &TargetIdentitySet,
    rate_limit: RateLimit,
) -> Result<ReconciliationResult, ReconciliationError> {
    let tier_counts_before = count_tiers(live);

    let matched_accounts: Vec<Account> = live
        .iter()
        .filter(|account| targets.contains(&account.email))
        .cloned()
        .collect();

    let found: HashSet<&str> = matched_accounts
        .iter()
        .map(|account| account.email.as_str())
        .collect();
    let unmatched_identifiers = targets
        .iter()
        .filter(|identifier| !found.contains(identifier))
        .map(str::to_string)
        .collect();

    let removed = count_tiers(&matched_accounts);
    let mut tier_counts_after = TierCounts::new();
    for (&tier, &before) in &tier_counts_before {
        let matched = removed.get(&tier).copied().unwrap_or_default();
        let after = before
            .checked_sub(matched)
            .ok_or(ReconciliationError::NegativeProjection {
                tier,
                before,
                removed: matched,
            })?;
        tier_counts_after.insert(tier, after);
    }

    // A tier present only among the matches would mean the match set is not a
    // subset of the live listing.
    if let Some((&tier, &matched)) = removed
        .iter()
        .find(|(tier, _)| !tier_counts_before.contains_key(*tier))
    {
        return Err(ReconciliationError::NegativeProjection {
            tier,
            before: 0,
            removed: matched,
        });
    }

    let estimated_duration = rate_limit.estimate(matched_accounts.len());

    Ok(ReconciliationResult {
        matched_accounts,
        unmatched_identifiers,
        tier_counts_before,
        tier_counts_after,
        estimated_duration,
    })
}

fn count_tiers(accounts: &[Account]) -> TierCounts {
    let mut counts = TierCounts::new();
    for account in accounts {
        *counts.entry(account.tier).or_default() += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::deprovision::domain::AccountStatus;

    fn account(id: &str, email: &str, tier: Tier) -> Account {
        Account::new(id, email, tier, AccountStatus::Active)
    }

    #[test]
    fn unknown_tiers_are_counted_not_dropped() {
        let live = vec![
            account("1", "a@example.com", Tier::Basic),
            account("2", "b@example.com", Tier::Other(3)),
            account("3", "c@example.com", Tier::Other(99)),
        ];
        let targets: TargetIdentitySet = ["b@example.com"].into_iter().collect();

        let result = reconcile(&live, &targets, RateLimit::default()).expect("reconciles");
        assert_eq!(result.total_before(), live.len());
        assert_eq!(result.tier_counts_after.get(&Tier::Other(3)), Some(&0));
        assert_eq!(result.total_after(), 2);
    }

    #[test]
    fn matching_ignores_case() {
        let live = vec![account("1", "Mixed.Case@Example.com", Tier::Pro)];
        let targets: TargetIdentitySet = ["mixed.case@EXAMPLE.com"].into_iter().collect();

        let result = reconcile(&live, &targets, RateLimit::default()).expect("reconciles");
        assert_eq!(result.matched_accounts.len(), 1);
        assert!(result.unmatched_identifiers.is_empty());
    }

    #[test]
    fn empty_target_set_matches_nothing() {
        let live = vec![account("1", "a@example.com", Tier::Basic)];
        let result = reconcile(&live, &TargetIdentitySet::new(), RateLimit::default())
            .expect("reconciles");

        assert!(result.nothing_to_do());
        assert_eq!(result.tier_counts_before, result.tier_counts_after);
        assert_eq!(result.estimated_duration, Duration::ZERO);
    }

    #[test]
    fn estimate_scales_with_matches() {
        let live: Vec<Account> = (0..25)
            .map(|i| account(&i.to_string(), &format!("user{i}@example.com"), Tier::Basic))
            .collect();
        let targets: TargetIdentitySet = live.iter().map(|a| a.email.clone()).collect();

        let result = reconcile(&live, &targets, RateLimit::default()).expect("reconciles");
        assert_eq!(result.estimated_duration, Duration::from_secs(3));
    }
}

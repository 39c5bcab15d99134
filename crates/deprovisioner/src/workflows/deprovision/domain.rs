use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use crate::workflows::import::normalize_identifier;

/// Service tier reported by the directory for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Basic,
    Pro,
    Other(i64),
}

impl Tier {
    /// Maps the Zoom v1 `type` code onto a tier; unknown codes land in `Other`.
    pub const fn from_type_code(code: i64) -> Self {
        match code {
            1 => Self::Basic,
            2 => Self::Pro,
            other => Self::Other(other),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Pro => "Pro",
            Self::Other(_) => "Other",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(code) => write!(f, "Other (type {code})"),
            tier => f.write_str(tier.label()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Inactive,
    Unknown,
}

impl AccountStatus {
    pub fn from_raw(value: Option<&str>) -> Self {
        match value.map(|raw| raw.trim().to_ascii_lowercase()).as_deref() {
            Some("active") => Self::Active,
            Some("inactive") | Some("deactivated") | Some("disabled") => Self::Inactive,
            _ => Self::Unknown,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Unknown => "unknown",
        }
    }
}

/// One account as returned by a directory listing.
///
/// `email` is normalized on construction so reconciliation can compare it
/// directly against a [`TargetIdentitySet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub tier: Tier,
    pub status: AccountStatus,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_login_at: Option<String>,
    #[serde(default)]
    pub client_version: Option<String>,
}

impl Account {
    pub fn new(id: impl Into<String>, email: &str, tier: Tier, status: AccountStatus) -> Self {
        Self {
            id: id.into(),
            email: normalize_identifier(email),
            tier,
            status,
            first_name: None,
            last_name: None,
            department: None,
            created_at: None,
            last_login_at: None,
            client_version: None,
        }
    }

    pub fn display_name(&self) -> Option<String> {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(name), None) | (None, Some(name)) => Some(name.to_string()),
            (None, None) => None,
        }
    }
}

/// Deduplicated identifiers read from an import file, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetIdentitySet {
    ordered: Vec<String>,
    members: HashSet<String>,
}

impl TargetIdentitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a raw identifier, returning `false` for blanks and duplicates.
    pub fn insert(&mut self, raw: &str) -> bool {
        let identifier = normalize_identifier(raw);
        if identifier.is_empty() || self.members.contains(&identifier) {
            return false;
        }

        self.members.insert(identifier.clone());
        self.ordered.push(identifier);
        true
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.members.contains(identifier)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for TargetIdentitySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for raw in iter {
            set.insert(raw.as_ref());
        }
        set
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum DeprovisioningOutcome {
    Succeeded,
    Failed(String),
}

impl DeprovisioningOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountOutcome {
    pub account_id: String,
    pub email: String,
    #[serde(flatten)]
    pub outcome: DeprovisioningOutcome,
}

/// Totals for one executor run. Built once by the executor and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed: Duration,
    pub pauses: usize,
    pub outcomes: Vec<AccountOutcome>,
}

impl RunSummary {
    pub fn failures(&self) -> impl Iterator<Item = &AccountOutcome> {
        self.outcomes
            .iter()
            .filter(|entry| !entry.outcome.is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_codes_fall_back_to_other() {
        assert_eq!(Tier::from_type_code(1), Tier::Basic);
        assert_eq!(Tier::from_type_code(2), Tier::Pro);
        assert_eq!(Tier::from_type_code(3), Tier::Other(3));
        assert_eq!(Tier::Other(3).to_string(), "Other (type 3)");
    }

    #[test]
    fn target_set_dedupes_case_insensitively() {
        let set: TargetIdentitySet = ["Ada@Example.com", " ada@example.com ", "", "bob@example.com"]
            .into_iter()
            .collect();

        assert_eq!(set.len(), 2);
        assert!(set.contains("ada@example.com"));
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec!["ada@example.com", "bob@example.com"]
        );
    }

    #[test]
    fn account_normalizes_email() {
        let account = Account::new("u1", "  Grace@Example.COM", Tier::Pro, AccountStatus::Active);
        assert_eq!(account.email, "grace@example.com");
    }

    #[test]
    fn status_parses_known_values() {
        assert_eq!(AccountStatus::from_raw(Some("Active")), AccountStatus::Active);
        assert_eq!(AccountStatus::from_raw(Some("inactive")), AccountStatus::Inactive);
        assert_eq!(AccountStatus::from_raw(Some("pending")), AccountStatus::Unknown);
        assert_eq!(AccountStatus::from_raw(None), AccountStatus::Unknown);
    }
}

//! Boundary to the remote account directory.

pub mod zoom;

pub use zoom::ZoomClient;

use crate::workflows::deprovision::domain::Account;
use std::fmt::Debug;

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("authentication rejected: {0}")]
    Auth(String),
    #[error("account {0} not found")]
    NotFound(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("directory returned error {code}: {message}")]
    Api { code: i64, message: String },
    #[error("unexpected directory response: {0}")]
    UnexpectedResponse(String),
    #[error("directory runtime unavailable: {0}")]
    Runtime(String),
}

/// Which destructive call the executor issues per account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeprovisionMode {
    #[default]
    PermanentDelete,
    Deactivate,
}

impl DeprovisionMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "delete" | "permanent-delete" | "permanentdelete" => Some(Self::PermanentDelete),
            "deactivate" | "disable" => Some(Self::Deactivate),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PermanentDelete => "permanent delete",
            Self::Deactivate => "deactivate",
        }
    }
}

/// Operations the deprovisioning workflow needs from an account directory.
///
/// Calls are synchronous; implementations that speak async protocols block on
/// their own runtime.
pub trait DirectoryClient: Debug {
    /// Verifies the configured credentials before anything else runs.
    fn authenticate(&self) -> Result<(), DirectoryError>;

    /// Returns every account in directory order.
    fn list_accounts(&self) -> Result<Vec<Account>, DirectoryError>;

    /// Deprovisions one account by its directory id.
    fn deprovision(&self, account_id: &str) -> Result<(), DirectoryError>;
}

impl<T: DirectoryClient + ?Sized> DirectoryClient for Box<T> {
    fn authenticate(&self) -> Result<(), DirectoryError> {
        (**self).authenticate()
    }

    fn list_accounts(&self) -> Result<Vec<Account>, DirectoryError> {
        (**self).list_accounts()
    }

    fn deprovision(&self, account_id: &str) -> Result<(), DirectoryError> {
        (**self).deprovision(account_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_aliases() {
        assert_eq!(
            DeprovisionMode::parse("Delete"),
            Some(DeprovisionMode::PermanentDelete)
        );
        assert_eq!(
            DeprovisionMode::parse("deactivate"),
            Some(DeprovisionMode::Deactivate)
        );
        assert_eq!(DeprovisionMode::parse("archive"), None);
    }
}

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use super::domain::Account;

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("failed to write backup file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode backup row: {0}")]
    Csv(#[from] csv::Error),
}

/// Persists the full live listing before anything is changed.
pub trait BackupWriter {
    /// Writes the snapshot durably and returns where it went.
    fn persist(&self, accounts: &[Account]) -> Result<String, BackupError>;
}

impl<T: BackupWriter + ?Sized> BackupWriter for &T {
    fn persist(&self, accounts: &[Account]) -> Result<String, BackupError> {
        (**self).persist(accounts)
    }
}

/// Filename-safe stamp shared by the run's log and backup files.
pub fn run_stamp(now: DateTime<Local>) -> String {
    now.format("%m-%d-%Y_%H-%M-%S").to_string()
}

/// Writes one CSV snapshot per run into a directory.
#[derive(Debug, Clone)]
pub struct CsvBackupWriter {
    directory: PathBuf,
    stamp: String,
}

impl CsvBackupWriter {
    pub fn new(directory: impl Into<PathBuf>, stamp: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            stamp: stamp.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.directory.join(format!(
            "zoom_users_backup_before_deprovisioning_{}.csv",
            self.stamp
        ))
    }

    fn write_rows(path: &Path, accounts: &[Account]) -> Result<(), BackupError> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);
        for account in accounts {
            writer.serialize(BackupRow::from(account))?;
        }
        writer.flush()?;

        let file = writer
            .into_inner()
            .map_err(|err| BackupError::Io(err.into_error()))?;
        file.sync_all()?;
        Ok(())
    }
}

impl BackupWriter for CsvBackupWriter {
    fn persist(&self, accounts: &[Account]) -> Result<String, BackupError> {
        fs::create_dir_all(&self.directory)?;
        let path = self.path();
        Self::write_rows(&path, accounts)?;
        Ok(path.display().to_string())
    }
}

#[derive(Debug, Serialize)]
struct BackupRow<'a> {
    id: &'a str,
    email: &'a str,
    first_name: Option<&'a str>,
    last_name: Option<&'a str>,
    #[serde(rename = "type")]
    tier: String,
    dept: Option<&'a str>,
    created_at: Option<&'a str>,
    last_client_version: Option<&'a str>,
    last_login_time: Option<&'a str>,
    status: &'static str,
}

impl<'a> From<&'a Account> for BackupRow<'a> {
    fn from(account: &'a Account) -> Self {
        Self {
            id: &account.id,
            email: &account.email,
            first_name: account.first_name.as_deref(),
            last_name: account.last_name.as_deref(),
            tier: account.tier.to_string(),
            dept: account.department.as_deref(),
            created_at: account.created_at.as_deref(),
            last_client_version: account.client_version.as_deref(),
            last_login_time: account.last_login_at.as_deref(),
            status: account.status.label(),
        }
    }
}

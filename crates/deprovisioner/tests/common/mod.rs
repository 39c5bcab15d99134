#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use deprovisioner::directory::{DirectoryClient, DirectoryError};
use deprovisioner::workflows::deprovision::{
    Account, AccountStatus, BackupError, BackupWriter, Clock, Prompter, SimulatedClock, Tier,
};

pub fn account(id: &str, email: &str, tier: Tier) -> Account {
    Account::new(id, email, tier, AccountStatus::Active)
}

/// Twelve live accounts: eight Basic (`basic0..7`) followed by four Pro
/// (`pro0..3`).
pub fn twelve_accounts() -> Vec<Account> {
    let basic = (0..8).map(|i| account(&format!("b{i}"), &format!("basic{i}@example.com"), Tier::Basic));
    let pro = (0..4).map(|i| account(&format!("p{i}"), &format!("pro{i}@example.com"), Tier::Pro));
    basic.chain(pro).collect()
}

/// In-memory directory that records every deprovision call and the simulated
/// time at which it was issued.
#[derive(Debug)]
pub struct FakeDirectory {
    accounts: Vec<Account>,
    missing: HashSet<String>,
    auth_error: bool,
    clock: Arc<SimulatedClock>,
    call_cost: Duration,
    calls: Mutex<Vec<(String, Instant)>>,
    listings: Mutex<usize>,
}

impl FakeDirectory {
    pub fn new(accounts: Vec<Account>, clock: Arc<SimulatedClock>) -> Self {
        Self {
            accounts,
            missing: HashSet::new(),
            auth_error: false,
            clock,
            call_cost: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            listings: Mutex::new(0),
        }
    }

    /// Deprovisioning these ids fails with `NotFound`.
    pub fn with_missing(mut self, ids: &[&str]) -> Self {
        self.missing = ids.iter().map(|id| id.to_string()).collect();
        self
    }

    pub fn rejecting_credentials(mut self) -> Self {
        self.auth_error = true;
        self
    }

    /// Each deprovision call advances the clock by `cost`.
    pub fn with_call_cost(mut self, cost: Duration) -> Self {
        self.call_cost = cost;
        self
    }

    pub fn deprovisioned_ids(&self) -> Vec<String> {
        self.calls
            .lock()
            .expect("calls mutex")
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls
            .lock()
            .expect("calls mutex")
            .iter()
            .map(|(_, at)| *at)
            .collect()
    }

    pub fn listing_count(&self) -> usize {
        *self.listings.lock().expect("listings mutex")
    }
}

impl DirectoryClient for FakeDirectory {
    fn authenticate(&self) -> Result<(), DirectoryError> {
        if self.auth_error {
            Err(DirectoryError::Auth("Invalid api key or secret.".to_string()))
        } else {
            Ok(())
        }
    }

    fn list_accounts(&self) -> Result<Vec<Account>, DirectoryError> {
        self.authenticate()?;
        *self.listings.lock().expect("listings mutex") += 1;
        Ok(self.accounts.clone())
    }

    fn deprovision(&self, account_id: &str) -> Result<(), DirectoryError> {
        self.calls
            .lock()
            .expect("calls mutex")
            .push((account_id.to_string(), self.clock.now()));
        self.clock.advance(self.call_cost);

        if self.missing.contains(account_id) {
            Err(DirectoryError::NotFound(account_id.to_string()))
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryBackup {
    pub snapshots: Mutex<Vec<Vec<Account>>>,
    pub fail: bool,
}

impl MemoryBackup {
    pub fn failing() -> Self {
        Self {
            snapshots: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.lock().expect("backup mutex").len()
    }
}

impl BackupWriter for MemoryBackup {
    fn persist(&self, accounts: &[Account]) -> Result<String, BackupError> {
        if self.fail {
            return Err(BackupError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "read-only volume",
            )));
        }
        let mut guard = self.snapshots.lock().expect("backup mutex");
        guard.push(accounts.to_vec());
        Ok(format!("memory://snapshot/{}", guard.len()))
    }
}

/// Replays canned answers and remembers the questions asked.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub questions: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|answer| answer.to_string()).collect(),
            questions: Vec::new(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        self.questions.push(question.to_string());
        Ok(self.answers.pop_front().unwrap_or_default())
    }
}

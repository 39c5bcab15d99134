//! Zoom account deprovisioning.
//!
//! An operator supplies a CSV of e-mail addresses; the workflow fetches the
//! live Zoom user listing, reconciles it against the import, writes a backup
//! snapshot, asks for a two-step confirmation and then deprovisions the
//! matched accounts at no more than ten requests per second.

pub mod config;
pub mod directory;
pub mod error;
pub mod telemetry;
pub mod workflows;

//! Loading of the identity list an operator wants deprovisioned.
//!
//! The import file is a CSV whose first row is a header and whose first
//! column holds the account e-mail addresses. Other columns are ignored.

mod normalizer;
mod parser;

pub use normalizer::normalize_identifier;

use crate::workflows::deprovision::domain::TargetIdentitySet;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("import file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("import file {} is not a CSV file", .0.display())]
    NotCsv(PathBuf),
    #[error("failed to read import file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid import CSV data: {0}")]
    Format(#[from] csv::Error),
}

pub struct IdentityImporter;

impl IdentityImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<TargetIdentitySet, ImportError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ImportError::NotFound(path.to_path_buf()));
        }

        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if !is_csv {
            return Err(ImportError::NotCsv(path.to_path_buf()));
        }

        info!(path = %path.display(), "collecting identities from import file");
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<TargetIdentitySet, ImportError> {
        let parsed = parser::parse_identities(reader)?;
        debug!(
            rows = parsed.rows,
            skipped = parsed.skipped,
            identities = parsed.identities.len(),
            "parsed import rows"
        );
        Ok(parsed.identities)
    }
}

/// Cleans a path typed at an interactive prompt; shells and file managers
/// often paste paths wrapped in quotes.
pub fn clean_prompted_path(raw: &str) -> PathBuf {
    PathBuf::from(raw.trim().replace('"', ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;

    #[test]
    fn header_row_is_skipped_and_first_column_used() {
        let csv = "Email,Name\nada@example.com,Ada\nBOB@example.com,Bob\n";
        let set = IdentityImporter::from_reader(Cursor::new(csv)).expect("parse");

        assert_eq!(set.len(), 2);
        assert!(set.contains("bob@example.com"));
        assert!(!set.contains("email"));
    }

    #[test]
    fn duplicates_and_blank_rows_are_dropped() {
        let csv = "email\nada@example.com\n\nAda@Example.com\n,extra\ncy@example.com\n";
        let set = IdentityImporter::from_reader(Cursor::new(csv)).expect("parse");

        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec!["ada@example.com", "cy@example.com"]
        );
    }

    #[test]
    fn header_only_file_yields_empty_set() {
        let set = IdentityImporter::from_reader(Cursor::new("email\n")).expect("parse");
        assert!(set.is_empty());
    }

    #[test]
    fn missing_file_is_reported() {
        let error = IdentityImporter::from_path("./does-not-exist.csv").expect_err("missing");
        assert!(matches!(error, ImportError::NotFound(_)));
    }

    #[test]
    fn non_csv_extension_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("users.txt");
        let mut file = std::fs::File::create(&path).expect("create");
        writeln!(file, "email\nada@example.com").expect("write");

        let error = IdentityImporter::from_path(&path).expect_err("not csv");
        assert!(matches!(error, ImportError::NotCsv(_)));
    }

    #[test]
    fn invalid_utf8_is_a_format_error() {
        let bytes: Vec<u8> = b"email\n\xff\xfe@example.com\n".to_vec();
        let error = IdentityImporter::from_reader(Cursor::new(bytes)).expect_err("bad utf8");
        assert!(matches!(error, ImportError::Format(_)));
    }

    #[test]
    fn prompted_paths_lose_quotes() {
        assert_eq!(
            clean_prompted_path("  \"C:\\exports\\users.csv\" "),
            PathBuf::from("C:\\exports\\users.csv")
        );
    }
}

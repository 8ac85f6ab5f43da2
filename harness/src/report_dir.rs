//! Report directory persistence: write/read/verify a `SearchReportV1`.
//!
//! # Directory layout
//!
//! ```text
//! <dir>/
//!   search_report.json    — canonical JSON (sorted keys, compact)
//!   report_digest.txt     — ASCII digest string ("sha256:...")
//! ```
//!
//! The directory path is never part of any hash surface.
//!
//! # Fail-closed semantics
//!
//! - Missing file → error
//! - Digest mismatch against the stored report bytes → error
//! - Non-canonical report JSON → error (re-canonicalization must be a
//!   byte-level fixpoint)

use std::fs;
use std::path::Path;

use slipstream_search::canon::{canonical_json_bytes, sha256_digest, DOMAIN_SEARCH_REPORT};
use slipstream_search::report::SearchReportV1;

const REPORT_FILENAME: &str = "search_report.json";
const DIGEST_FILENAME: &str = "report_digest.txt";

/// Error writing a report directory.
#[derive(Debug)]
pub enum ReportDirWriteError {
    /// I/O error during write.
    Io { detail: String },
}

impl std::fmt::Display for ReportDirWriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { detail } => write!(f, "I/O error: {detail}"),
        }
    }
}

impl std::error::Error for ReportDirWriteError {}

/// Error reading or verifying a report directory.
#[derive(Debug)]
pub enum ReportDirReadError {
    /// I/O error during read.
    Io { detail: String },
    /// A required file is missing.
    MissingFile { filename: String },
    /// The stored report is not valid JSON.
    Malformed { detail: String },
    /// The stored bytes are not in canonical form.
    NonCanonical,
    /// The stored digest does not match the stored report bytes.
    DigestMismatch { expected: String, actual: String },
}

impl std::fmt::Display for ReportDirReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { detail } => write!(f, "I/O error: {detail}"),
            Self::MissingFile { filename } => write!(f, "missing file: {filename}"),
            Self::Malformed { detail } => write!(f, "malformed report JSON: {detail}"),
            Self::NonCanonical => write!(f, "stored report bytes are not canonical"),
            Self::DigestMismatch { expected, actual } => {
                write!(f, "digest mismatch: expected {expected}, got {actual}")
            }
        }
    }
}

impl std::error::Error for ReportDirReadError {}

/// Write a report and its digest into `dir`. The directory is created if
/// absent; existing files are overwritten.
///
/// # Errors
///
/// I/O failures only — the report itself always serializes.
pub fn write_report_dir(dir: &Path, report: &SearchReportV1) -> Result<(), ReportDirWriteError> {
    let io = |e: std::io::Error| ReportDirWriteError::Io { detail: e.to_string() };
    fs::create_dir_all(dir).map_err(io)?;
    let bytes = report.to_canonical_json_bytes();
    fs::write(dir.join(REPORT_FILENAME), &bytes).map_err(io)?;
    fs::write(dir.join(DIGEST_FILENAME), report.digest()).map_err(io)?;
    Ok(())
}

/// Read a report directory back, verifying canonicity and the digest.
/// Returns the report as a JSON value.
///
/// # Errors
///
/// Fail-closed on any missing file, malformed or non-canonical content,
/// or digest mismatch.
pub fn read_report_dir(dir: &Path) -> Result<serde_json::Value, ReportDirReadError> {
    let read = |filename: &str| -> Result<Vec<u8>, ReportDirReadError> {
        let path = dir.join(filename);
        if !path.exists() {
            return Err(ReportDirReadError::MissingFile { filename: filename.into() });
        }
        fs::read(&path).map_err(|e| ReportDirReadError::Io { detail: e.to_string() })
    };

    let report_bytes = read(REPORT_FILENAME)?;
    let digest_bytes = read(DIGEST_FILENAME)?;

    let value: serde_json::Value = serde_json::from_slice(&report_bytes)
        .map_err(|e| ReportDirReadError::Malformed { detail: e.to_string() })?;
    if canonical_json_bytes(&value) != report_bytes {
        return Err(ReportDirReadError::NonCanonical);
    }

    let expected = String::from_utf8_lossy(&digest_bytes).trim().to_string();
    let actual = sha256_digest(DOMAIN_SEARCH_REPORT, &report_bytes);
    if expected != actual {
        return Err(ReportDirReadError::DigestMismatch { expected, actual });
    }

    Ok(value)
}

//! Record discovery across the active and archive hierarchies.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::SyncError;
use crate::record::parser::{ParseIssue, RecordParser};
use crate::record::ApplicationRecord;

/// Result of one full scan. Corrupted records (unreadable, or no parsable
/// current status) are reported alongside, never dropped silently.
#[derive(Debug, Default)]
pub struct ScannedRecords {
    pub records: Vec<ApplicationRecord>,
    pub corrupted: Vec<(PathBuf, String)>,
    /// Non-fatal field issues, keyed by record id.
    pub issues: Vec<(String, ParseIssue)>,
}

/// Scan every record exactly once. The two glob patterns can in principle
/// double-match through symlinked trees, so folders are deduplicated by
/// canonical path before parsing. Records come back sorted by id so derived
/// views are stable run to run.
pub fn scan_records(
    applications_root: &Path,
    parser: &RecordParser,
) -> Result<ScannedRecords, SyncError> {
    let patterns = ["active/*/*/status.md", "archive/*/*/*/status.md"];

    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut status_files: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let full = applications_root.join(pattern);
        let full = full.to_string_lossy();
        let matches = glob::glob(&full).map_err(|e| SyncError::Scan {
            root: applications_root.to_path_buf(),
            reason: e.to_string(),
        })?;

        for entry in matches {
            let path = match entry {
                Ok(p) => p,
                Err(e) => {
                    warn!("Skipping unreadable glob entry: {e}");
                    continue;
                }
            };
            let folder = match path.parent() {
                Some(f) => f.to_path_buf(),
                None => continue,
            };
            let key = folder.canonicalize().unwrap_or_else(|_| folder.clone());
            if seen.insert(key) {
                status_files.push(path);
            }
        }
    }

    let mut scanned = ScannedRecords::default();
    for status_file in status_files {
        let folder = status_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| status_file.clone());

        let parsed = match parser.parse_file(&status_file) {
            Ok(parsed) => parsed,
            Err(e) => {
                scanned.corrupted.push((folder, e.to_string()));
                continue;
            }
        };

        let issues = parsed.issues.clone();
        match parsed.into_record(folder.clone()) {
            Ok(record) => {
                debug!("Parsed record '{}' in state {}", record.id(), record.state);
                let id = record.id().to_string();
                scanned
                    .issues
                    .extend(issues.into_iter().map(|i| (id.clone(), i)));
                scanned.records.push(record);
            }
            Err(e) => {
                scanned.corrupted.push((folder, e.to_string()));
            }
        }
    }

    scanned.records.sort_by(|a, b| a.id().cmp(b.id()));
    Ok(scanned)
}

/// Every record folder across both hierarchies, whether or not it holds a
/// parsable status.md. Used by `validate` and the health check's
/// missing-file scan.
pub fn record_folders(applications_root: &Path) -> Result<Vec<PathBuf>, SyncError> {
    let patterns = ["active/*/*", "archive/*/*/*"];

    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut folders = Vec::new();

    for pattern in patterns {
        let full = applications_root.join(pattern);
        let full = full.to_string_lossy();
        let matches = glob::glob(&full).map_err(|e| SyncError::Scan {
            root: applications_root.to_path_buf(),
            reason: e.to_string(),
        })?;

        for path in matches.filter_map(|e| e.ok()) {
            if !path.is_dir() {
                continue;
            }
            let key = path.canonicalize().unwrap_or_else(|_| path.clone());
            if seen.insert(key) {
                folders.push(path);
            }
        }
    }

    folders.sort();
    Ok(folders)
}

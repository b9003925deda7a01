//! Batch validation of record folders: required files present, status
//! parsable, timeline ordered. Optionally scaffolds a drafting status.md
//! for folders that lack one.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use log::{info, warn};

use crate::error::Result;
use crate::record::writer::write_status;
use crate::record::{ApplicationRecord, RecordParser};
use crate::sync::scan::record_folders;

const REQUIRED_FILES: [&str; 3] = ["status.md", "analysis.md", "job-description.md"];

#[derive(Debug, Default)]
pub struct ValidationSummary {
    pub passed: usize,
    /// `(record id, detail)` per folder with missing files or field issues.
    pub warned: Vec<(String, String)>,
    /// `(record id, reason)` per folder whose status cannot be parsed at all.
    pub failed: Vec<(String, String)>,
    /// Ids for which a drafting status.md stub was created.
    pub created: Vec<String>,
}

impl ValidationSummary {
    pub fn checked(&self) -> usize {
        self.passed + self.warned.len() + self.failed.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

pub struct RecordValidator {
    applications_root: PathBuf,
    parser: RecordParser,
}

impl RecordValidator {
    pub fn new<P: Into<PathBuf>>(applications_root: P) -> Self {
        Self {
            applications_root: applications_root.into(),
            parser: RecordParser::new(),
        }
    }

    /// Validate every record folder. With `create_missing`, folders without
    /// a status.md get a minimal drafting record stamped `now`; company and
    /// role are derived from the folder name.
    pub fn validate(&self, create_missing: bool, now: NaiveDateTime) -> Result<ValidationSummary> {
        let mut summary = ValidationSummary::default();

        for folder in record_folders(&self.applications_root)? {
            let id = folder
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| folder.display().to_string());

            let status_path = folder.join("status.md");
            if !status_path.exists() {
                if create_missing {
                    let (company, role) = split_folder_name(&id);
                    let record =
                        ApplicationRecord::new_drafting(folder.clone(), company, role, now);
                    write_status(&record)?;
                    info!("Created missing status.md for '{id}'");
                    summary.created.push(id.clone());
                } else {
                    summary
                        .failed
                        .push((id.clone(), "missing status.md".to_string()));
                    continue;
                }
            }

            let missing: Vec<&str> = REQUIRED_FILES
                .iter()
                .filter(|f| !folder.join(f).exists())
                .copied()
                .collect();

            let parsed = match self.parser.parse_file(&folder.join("status.md")) {
                Ok(parsed) => parsed,
                Err(e) => {
                    summary.failed.push((id, e.to_string()));
                    continue;
                }
            };

            if parsed.state.is_none() {
                warn!("Record '{id}' has no parsable current status");
                summary
                    .failed
                    .push((id, "no parsable Current Status field".to_string()));
                continue;
            }

            let mut details: Vec<String> = Vec::new();
            if !missing.is_empty() {
                details.push(format!("missing {}", missing.join(", ")));
            }
            for issue in &parsed.issues {
                details.push(format!("{}: {}", issue.field, issue.message));
            }
            if !timeline_is_newest_first(&parsed) {
                // Hand-edited notes are allowed, so a shuffled timeline is a
                // warning rather than a failure.
                details.push("timeline not in reverse-chronological order".to_string());
            }

            if details.is_empty() {
                summary.passed += 1;
            } else {
                summary.warned.push((id, details.join("; ")));
            }
        }

        info!(
            "Validation complete: {} passed, {} warned, {} failed, {} created",
            summary.passed,
            summary.warned.len(),
            summary.failed.len(),
            summary.created.len()
        );
        Ok(summary)
    }
}

fn timeline_is_newest_first(parsed: &crate::record::ParsedStatus) -> bool {
    parsed
        .timeline
        .windows(2)
        .all(|pair| pair[0].timestamp >= pair[1].timestamp)
}

/// Derive `(company, role)` from a `{year}-{month}-{company}-{role}` folder
/// name, best effort.
fn split_folder_name(id: &str) -> (Option<String>, Option<String>) {
    let parts: Vec<&str> = id.splitn(4, '-').collect();
    match parts.as_slice() {
        [_, _, company, role] => (Some(company.to_string()), Some(role.to_string())),
        [_, _, company] => (Some(company.to_string()), None),
        _ => (None, None),
    }
}

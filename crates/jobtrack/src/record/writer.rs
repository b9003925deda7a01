//! Serialization of a record back to its `status.md` form.
//!
//! The writer emits exactly the line-anchored format the parser reads, so a
//! parse → write → parse round trip preserves the timeline verbatim.

use std::fmt::Write as _;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::error::RecordError;
use crate::record::model::ApplicationRecord;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Render a record as `status.md` content.
pub fn render_status(record: &ApplicationRecord) -> String {
    let mut out = String::new();

    let company = record.company.as_deref().unwrap_or("Unknown");
    let role = record.role.as_deref().unwrap_or("Unknown");
    let _ = writeln!(out, "# Application Status - {company} - {role}");
    out.push('\n');

    let _ = writeln!(out, "**Current Status:** {}", record.state.as_token());
    if let Some(ts) = record.last_updated {
        let _ = writeln!(out, "**Last Updated:** {}", ts.format(TIMESTAMP_FORMAT));
    }
    if let Some(score) = record.fit_score {
        let _ = writeln!(out, "**Fit Score:** {score}/10");
    }
    if let Some(date) = record.applied_on {
        let _ = writeln!(out, "**Applied On:** {}", date.format(DATE_FORMAT));
    }
    if let Some(date) = record.analyzed_on {
        let _ = writeln!(out, "**Analyzed On:** {}", date.format(DATE_FORMAT));
    }
    if let Some(location) = &record.location {
        let _ = writeln!(out, "**Location:** {location}");
    }
    if let Some(cv) = &record.cv_version {
        let _ = writeln!(out, "**CV Version:** {cv}");
    }
    if let Some(cl) = &record.cover_letter {
        let _ = writeln!(out, "**Cover Letter:** {cl}");
    }

    out.push('\n');
    out.push_str("## Status Timeline\n");

    for entry in &record.timeline {
        out.push('\n');
        let _ = writeln!(
            out,
            "### {} - {}",
            entry.state.heading_label(),
            entry.timestamp.format(TIMESTAMP_FORMAT)
        );
        if let Some(notes) = &entry.notes {
            let _ = writeln!(out, "**Notes:** {notes}");
        }
        if let Some(previous) = entry.previous_state {
            out.push('\n');
            let _ = writeln!(out, "**Previous Status:** {}", previous.as_token());
        }
    }

    out
}

/// Persist a record to `<folder>/status.md`, creating the folder if needed.
pub fn write_status(record: &ApplicationRecord) -> Result<(), RecordError> {
    let path = record.status_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| RecordError::WriteRecord {
            path: path.clone(),
            source: e,
        })?;
    }
    write_status_to(record, &path)
}

pub fn write_status_to(record: &ApplicationRecord, path: &Path) -> Result<(), RecordError> {
    std::fs::write(path, render_status(record)).map_err(|e| RecordError::WriteRecord {
        path: path.to_path_buf(),
        source: e,
    })
}

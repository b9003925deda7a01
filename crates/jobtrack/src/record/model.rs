//! In-memory form of one tracked application and its status history.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};

use crate::state::ApplicationState;

/// One entry of the status timeline. The timeline is append-only and kept
/// newest first; entries are never deleted or reordered.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub state: ApplicationState,
    pub timestamp: NaiveDateTime,
    pub notes: Option<String>,
    pub previous_state: Option<ApplicationState>,
}

/// One tracked job application, backed by a record folder containing
/// `status.md` plus its analysis and artifact files.
#[derive(Debug, Clone)]
pub struct ApplicationRecord {
    /// The backing record folder. Its file name is the record id,
    /// conventionally `{year}-{month}-{company}-{role-slug}`.
    pub folder: PathBuf,
    pub company: Option<String>,
    pub role: Option<String>,
    pub state: ApplicationState,
    pub last_updated: Option<NaiveDateTime>,
    pub fit_score: Option<f64>,
    pub applied_on: Option<NaiveDate>,
    pub analyzed_on: Option<NaiveDate>,
    pub location: Option<String>,
    pub cv_version: Option<String>,
    pub cover_letter: Option<String>,
    /// Newest first.
    pub timeline: Vec<TimelineEntry>,
}

impl ApplicationRecord {
    /// Create a fresh record in the drafting state with a single timeline
    /// entry. Used when a posting is first accepted for tracking and by
    /// `validate --create-missing`.
    pub fn new_drafting(
        folder: PathBuf,
        company: Option<String>,
        role: Option<String>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            folder,
            company,
            role,
            state: ApplicationState::Drafting,
            last_updated: Some(timestamp),
            fit_score: None,
            applied_on: None,
            analyzed_on: Some(timestamp.date()),
            location: None,
            cv_version: None,
            cover_letter: None,
            timeline: vec![TimelineEntry {
                state: ApplicationState::Drafting,
                timestamp,
                notes: Some("Record created".to_string()),
                previous_state: None,
            }],
        }
    }

    /// The stable record id: the backing folder's name.
    pub fn id(&self) -> &str {
        self.folder
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
    }

    pub fn status_path(&self) -> PathBuf {
        self.folder.join("status.md")
    }

    /// Company component of the record id, used for duplicate detection.
    /// Heuristic: third `-`-separated component of `{year}-{month}-{company}-{role}`.
    pub fn company_component(&self) -> Option<&str> {
        let mut parts = self.id().split('-');
        parts.nth(2)
    }

    /// `**CV Version:**` present with a real value.
    pub fn cv_generated(&self) -> bool {
        generated(self.cv_version.as_deref())
    }

    pub fn cover_letter_generated(&self) -> bool {
        generated(self.cover_letter.as_deref())
    }

    /// Whether the folder holds a generated CV artifact (`*_CV_*.pdf`).
    pub fn has_cv_artifact(&self) -> bool {
        has_artifact(&self.folder, "_CV_")
    }

    pub fn entry_for(&self, state: ApplicationState) -> Option<&TimelineEntry> {
        self.timeline.iter().find(|e| e.state == state)
    }

    pub fn applied_date(&self) -> Option<NaiveDate> {
        self.applied_on
            .or_else(|| self.entry_for(ApplicationState::Applied).map(|e| e.timestamp.date()))
    }

    /// Date of the first recorded response after applying: the earliest
    /// interview invitation or rejection in the timeline.
    pub fn first_response_date(&self) -> Option<NaiveDate> {
        self.timeline
            .iter()
            .filter(|e| {
                matches!(
                    e.state,
                    ApplicationState::InterviewInvited | ApplicationState::Rejected
                )
            })
            .map(|e| e.timestamp.date())
            .min()
    }

    /// Whole days between applying and the first response, when both are known.
    pub fn days_to_response(&self) -> Option<i64> {
        let applied = self.applied_date()?;
        let response = self.first_response_date()?;
        Some((response - applied).num_days())
    }

    pub fn has_interview(&self) -> bool {
        self.timeline.iter().any(|e| {
            matches!(
                e.state,
                ApplicationState::InterviewInvited | ApplicationState::InterviewCompleted
            )
        })
    }

    /// The timestamp of the most recent timeline entry, falling back to
    /// `last_updated`. Used to derive the archive quarter.
    pub fn effective_date(&self) -> Option<NaiveDate> {
        self.timeline
            .first()
            .map(|e| e.timestamp.date())
            .or_else(|| self.last_updated.map(|t| t.date()))
    }
}

fn generated(value: Option<&str>) -> bool {
    match value {
        None => false,
        Some(v) => {
            let v = v.trim();
            !v.is_empty() && !v.eq_ignore_ascii_case("not generated") && !v.eq_ignore_ascii_case("no")
        }
    }
}

fn has_artifact(folder: &Path, marker: &str) -> bool {
    let Ok(entries) = std::fs::read_dir(folder) else {
        return false;
    };
    entries.filter_map(|e| e.ok()).any(|e| {
        let name = e.file_name();
        let name = name.to_string_lossy();
        name.contains(marker) && name.to_lowercase().ends_with(".pdf")
    })
}

//! Builder for creating record folders programmatically in tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};

use jobtrack::record::{write_status, ApplicationRecord, TimelineEntry};
use jobtrack::ApplicationState;

/// Builder for an [`ApplicationRecord`] and its backing folder.
pub struct RecordBuilder {
    id: String,
    company: Option<String>,
    role: Option<String>,
    state: ApplicationState,
    last_updated: NaiveDateTime,
    fit_score: Option<f64>,
    applied_on: Option<NaiveDate>,
    location: Option<String>,
    cv_version: Option<String>,
    timeline: Vec<TimelineEntry>,
    with_analysis_files: bool,
}

impl RecordBuilder {
    pub fn new(id: &str) -> Self {
        let (company, role) = {
            let parts: Vec<&str> = id.splitn(4, '-').collect();
            match parts.as_slice() {
                [_, _, company, role] => (Some(company.to_string()), Some(role.to_string())),
                _ => (None, None),
            }
        };
        Self {
            id: id.to_string(),
            company,
            role,
            state: ApplicationState::Drafting,
            last_updated: NaiveDate::from_ymd_opt(2025, 1, 13)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            fit_score: None,
            applied_on: None,
            location: None,
            cv_version: None,
            timeline: Vec::new(),
            with_analysis_files: true,
        }
    }

    pub fn company(mut self, company: &str) -> Self {
        self.company = Some(company.to_string());
        self
    }

    pub fn role(mut self, role: &str) -> Self {
        self.role = Some(role.to_string());
        self
    }

    pub fn state(mut self, state: ApplicationState) -> Self {
        self.state = state;
        self
    }

    pub fn updated(mut self, when: NaiveDateTime) -> Self {
        self.last_updated = when;
        self
    }

    pub fn fit(mut self, score: f64) -> Self {
        self.fit_score = Some(score);
        self
    }

    pub fn applied_on(mut self, date: NaiveDate) -> Self {
        self.applied_on = Some(date);
        self
    }

    pub fn location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    pub fn cv_version(mut self, cv: &str) -> Self {
        self.cv_version = Some(cv.to_string());
        self
    }

    /// Prepend a timeline entry (call oldest-first; entries are stored
    /// newest-first).
    pub fn entry(mut self, state: ApplicationState, when: NaiveDateTime, notes: &str) -> Self {
        let previous_state = self.timeline.first().map(|e: &TimelineEntry| e.state);
        self.timeline.insert(
            0,
            TimelineEntry {
                state,
                timestamp: when,
                notes: Some(notes.to_string()),
                previous_state,
            },
        );
        self
    }

    pub fn without_analysis_files(mut self) -> Self {
        self.with_analysis_files = false;
        self
    }

    pub fn build(self, folder: PathBuf) -> ApplicationRecord {
        let mut timeline = self.timeline;
        if timeline.is_empty() {
            timeline.push(TimelineEntry {
                state: self.state,
                timestamp: self.last_updated,
                notes: Some("Record created".to_string()),
                previous_state: None,
            });
        }
        ApplicationRecord {
            folder,
            company: self.company,
            role: self.role,
            state: self.state,
            last_updated: Some(self.last_updated),
            fit_score: self.fit_score,
            applied_on: self.applied_on,
            analyzed_on: None,
            location: self.location,
            cv_version: self.cv_version,
            cover_letter: None,
            timeline,
        }
    }

    /// Build the record, write its folder under `bucket`, and return it.
    pub fn write_into(self, bucket: &Path) -> ApplicationRecord {
        let folder = bucket.join(&self.id);
        let with_analysis_files = self.with_analysis_files;
        let record = self.build(folder);
        write_status(&record).expect("Failed to write status.md");
        if with_analysis_files {
            std::fs::write(record.folder.join("analysis.md"), "# Analysis\n").unwrap();
            std::fs::write(record.folder.join("job-description.md"), "# Job Description\n")
                .unwrap();
        }
        record
    }
}

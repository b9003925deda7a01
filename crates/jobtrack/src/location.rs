//! Mapping from lifecycle state to expected filesystem location.
//!
//! The resolver is pure: it answers "where would this record live", never
//! whether or how to move it. Directory creation and moves belong to the
//! storage layer.

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};

use crate::record::ApplicationRecord;
use crate::state::ApplicationState;

/// Active pipeline buckets under `applications/active/`.
pub const ACTIVE_BUCKETS: [&str; 3] = ["analyzing", "applied", "interviewing"];

/// Archive subfolders for terminal states under `applications/archive/<quarter>/`.
pub const TERMINAL_BUCKETS: [&str; 3] = ["accepted", "rejected", "withdrawn"];

/// The staging pipeline skeleton for posting files, relative to the root.
pub const STAGING_BUCKETS: [&str; 9] = [
    "staging/0-discovery/manual",
    "staging/0-discovery/automated",
    "staging/1-triage",
    "staging/2-shortlist/high",
    "staging/2-shortlist/medium",
    "staging/2-shortlist/pending-insider-intel",
    "staging/3-applying",
    "staging/archive",
    "insights",
];

/// Archive subfolders for posting files under `staging/archive/`.
pub const STAGING_ARCHIVE_BUCKETS: [&str; 5] =
    ["low-fit", "filtered", "rejected", "withdrawn", "accepted"];

/// Quarterly archive key, e.g. `2025-Q4`.
pub fn quarter_key(date: NaiveDate) -> String {
    format!("{}-Q{}", date.year(), date.month0() / 3 + 1)
}

#[derive(Debug, Clone)]
pub struct LocationResolver {
    applications_root: PathBuf,
}

impl LocationResolver {
    pub fn new<P: AsRef<Path>>(applications_root: P) -> Self {
        Self {
            applications_root: applications_root.as_ref().to_path_buf(),
        }
    }

    pub fn applications_root(&self) -> &Path {
        &self.applications_root
    }

    /// The bucket a record in `state` belongs to. For terminal states the
    /// quarter is derived from `effective_date` (the transition date).
    pub fn bucket_for(&self, state: ApplicationState, effective_date: NaiveDate) -> PathBuf {
        match state {
            ApplicationState::Drafting => self.active("analyzing"),
            ApplicationState::Applied => self.active("applied"),
            // Both interview states and a pending offer are "in interview
            // process" and share the interviewing bucket.
            ApplicationState::InterviewInvited
            | ApplicationState::InterviewCompleted
            | ApplicationState::Offer => self.active("interviewing"),
            ApplicationState::Accepted | ApplicationState::Rejected
            | ApplicationState::Withdrawn => self
                .applications_root
                .join("archive")
                .join(quarter_key(effective_date))
                .join(state.as_token()),
        }
    }

    /// Where the record's backing folder is expected to live.
    pub fn record_home(&self, record: &ApplicationRecord, effective_date: NaiveDate) -> PathBuf {
        self.bucket_for(record.state, effective_date).join(record.id())
    }

    fn active(&self, bucket: &str) -> PathBuf {
        self.applications_root.join("active").join(bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_quarter_key() {
        assert_eq!(quarter_key(date(2025, 1, 15)), "2025-Q1");
        assert_eq!(quarter_key(date(2025, 3, 31)), "2025-Q1");
        assert_eq!(quarter_key(date(2025, 4, 1)), "2025-Q2");
        assert_eq!(quarter_key(date(2025, 11, 20)), "2025-Q4");
        assert_eq!(quarter_key(date(2026, 12, 31)), "2026-Q4");
    }

    #[test]
    fn test_active_states_map_to_active_buckets() {
        let resolver = LocationResolver::new("/data/applications");
        let d = date(2025, 11, 20);

        assert_eq!(
            resolver.bucket_for(ApplicationState::Drafting, d),
            PathBuf::from("/data/applications/active/analyzing")
        );
        assert_eq!(
            resolver.bucket_for(ApplicationState::Applied, d),
            PathBuf::from("/data/applications/active/applied")
        );
        for state in [
            ApplicationState::InterviewInvited,
            ApplicationState::InterviewCompleted,
            ApplicationState::Offer,
        ] {
            assert_eq!(
                resolver.bucket_for(state, d),
                PathBuf::from("/data/applications/active/interviewing")
            );
        }
    }

    #[test]
    fn test_terminal_states_map_to_quarterly_archive() {
        let resolver = LocationResolver::new("/data/applications");

        assert_eq!(
            resolver.bucket_for(ApplicationState::Withdrawn, date(2025, 11, 20)),
            PathBuf::from("/data/applications/archive/2025-Q4/withdrawn")
        );
        assert_eq!(
            resolver.bucket_for(ApplicationState::Accepted, date(2025, 1, 28)),
            PathBuf::from("/data/applications/archive/2025-Q1/accepted")
        );
        assert_eq!(
            resolver.bucket_for(ApplicationState::Rejected, date(2025, 7, 2)),
            PathBuf::from("/data/applications/archive/2025-Q3/rejected")
        );
    }
}

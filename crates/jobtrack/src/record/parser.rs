//! Line-anchored parsing of `status.md` records.
//!
//! Parsing never fails on malformed input: absent or unreadable fields are
//! reported as [`ParseIssue`]s and left `None`, so batch operations can keep
//! going and surface the problem in their report instead of aborting.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::error::RecordError;
use crate::record::model::{ApplicationRecord, TimelineEntry};
use crate::state::ApplicationState;

const TIMELINE_HEADER: &str = "## Status Timeline";

/// A non-fatal data-quality finding from parsing one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    pub field: &'static str,
    pub message: String,
}

impl ParseIssue {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Partial parse result: every field independently optional.
#[derive(Debug, Clone, Default)]
pub struct ParsedStatus {
    pub company: Option<String>,
    pub role: Option<String>,
    pub state: Option<ApplicationState>,
    pub last_updated: Option<NaiveDateTime>,
    pub fit_score: Option<f64>,
    pub applied_on: Option<NaiveDate>,
    pub analyzed_on: Option<NaiveDate>,
    pub location: Option<String>,
    pub cv_version: Option<String>,
    pub cover_letter: Option<String>,
    pub timeline: Vec<TimelineEntry>,
    pub issues: Vec<ParseIssue>,
}

impl ParsedStatus {
    /// Promote to a full record. The only hard requirement is a parsable
    /// `Current Status`; everything else stays optional.
    pub fn into_record(self, folder: PathBuf) -> Result<ApplicationRecord, RecordError> {
        let state = self
            .state
            .ok_or(RecordError::MissingStatus { path: folder.clone() })?;
        Ok(ApplicationRecord {
            folder,
            company: self.company,
            role: self.role,
            state,
            last_updated: self.last_updated,
            fit_score: self.fit_score,
            applied_on: self.applied_on,
            analyzed_on: self.analyzed_on,
            location: self.location,
            cv_version: self.cv_version,
            cover_letter: self.cover_letter,
            timeline: self.timeline,
        })
    }
}

/// Pre-compiled field patterns for the record format.
pub struct RecordParser {
    title: Regex,
    status: Regex,
    last_updated: Regex,
    fit_score: Regex,
    applied_on: Regex,
    analyzed_on: Regex,
    location: Regex,
    cv_version: Regex,
    cover_letter: Regex,
    timeline_heading: Regex,
    notes: Regex,
    previous_status: Regex,
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordParser {
    pub fn new() -> Self {
        // Static patterns; compilation cannot fail.
        Self {
            title: Regex::new(r"(?m)^# Application Status - (.+?) - (.+?)\s*$").unwrap(),
            status: Regex::new(r"(?m)^\*\*Current Status:\*\*\s*(.+?)\s*$").unwrap(),
            last_updated: Regex::new(r"(?m)^\*\*Last Updated:\*\*\s*(.+?)\s*$").unwrap(),
            fit_score: Regex::new(r"(?m)^\*\*Fit Score:\*\*\s*([\d.]+)/10").unwrap(),
            applied_on: Regex::new(r"(?m)^\*\*Applied On:\*\*\s*(.+?)\s*$").unwrap(),
            analyzed_on: Regex::new(r"(?m)^\*\*Analyzed On:\*\*\s*(.+?)\s*$").unwrap(),
            location: Regex::new(r"(?m)^\*\*Location:\*\*\s*(.+?)\s*$").unwrap(),
            cv_version: Regex::new(r"(?m)^\*\*CV Version:\*\*\s*(.+?)\s*$").unwrap(),
            cover_letter: Regex::new(r"(?m)^\*\*Cover Letter:\*\*\s*(.+?)\s*$").unwrap(),
            timeline_heading: Regex::new(
                r"(?m)^### (.+?) - (\d{4}-\d{2}-\d{2})(?: (\d{2}:\d{2}))?\s*$",
            )
            .unwrap(),
            notes: Regex::new(r"(?m)^\*\*Notes:\*\*\s*(.*?)\s*$").unwrap(),
            previous_status: Regex::new(r"(?m)^\*\*Previous Status:\*\*\s*(.+?)\s*$").unwrap(),
        }
    }

    /// Read and parse a record's `status.md`. I/O failure is the only error;
    /// content problems come back as issues inside [`ParsedStatus`].
    pub fn parse_file(&self, path: &Path) -> Result<ParsedStatus, RecordError> {
        let content = std::fs::read_to_string(path).map_err(|e| RecordError::ReadRecord {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(self.parse(&content))
    }

    pub fn parse(&self, content: &str) -> ParsedStatus {
        let mut parsed = ParsedStatus::default();

        // Header fields are matched only above the timeline section so that
        // notes text can never shadow them.
        let (header, timeline) = match content.find(TIMELINE_HEADER) {
            Some(pos) => (&content[..pos], &content[pos..]),
            None => (content, ""),
        };

        if let Some(caps) = self.title.captures(header) {
            parsed.company = Some(caps[1].trim().to_string());
            parsed.role = Some(caps[2].trim().to_string());
        } else {
            parsed
                .issues
                .push(ParseIssue::new("title", "No title line found"));
        }

        match self.status.captures(header) {
            Some(caps) => match ApplicationState::parse_label(&caps[1]) {
                Some(state) => parsed.state = Some(state),
                None => parsed.issues.push(ParseIssue::new(
                    "current_status",
                    format!("Unknown state label '{}'", caps[1].trim()),
                )),
            },
            None => parsed
                .issues
                .push(ParseIssue::new("current_status", "Not specified")),
        }

        match self.last_updated.captures(header) {
            Some(caps) => match parse_timestamp(&caps[1]) {
                Some(ts) => parsed.last_updated = Some(ts),
                None => parsed.issues.push(ParseIssue::new(
                    "last_updated",
                    format!("Unparsable date '{}'", caps[1].trim()),
                )),
            },
            None => parsed
                .issues
                .push(ParseIssue::new("last_updated", "Not specified")),
        }

        if let Some(caps) = self.fit_score.captures(header) {
            match caps[1].parse::<f64>() {
                Ok(score) if (0.0..=10.0).contains(&score) => parsed.fit_score = Some(score),
                _ => parsed.issues.push(ParseIssue::new(
                    "fit_score",
                    format!("Fit score '{}' out of range", &caps[1]),
                )),
            }
        }

        parsed.applied_on = self.parse_date_field(&self.applied_on, header, "applied_on", &mut parsed.issues);
        parsed.analyzed_on =
            self.parse_date_field(&self.analyzed_on, header, "analyzed_on", &mut parsed.issues);

        parsed.location = self
            .location
            .captures(header)
            .map(|caps| caps[1].trim().to_string());
        parsed.cv_version = self
            .cv_version
            .captures(header)
            .map(|caps| caps[1].trim().to_string());
        parsed.cover_letter = self
            .cover_letter
            .captures(header)
            .map(|caps| caps[1].trim().to_string());

        self.parse_timeline(timeline, &mut parsed);

        parsed
    }

    /// Optional date field: absence is fine, malformed content is an issue.
    fn parse_date_field(
        &self,
        pattern: &Regex,
        header: &str,
        field: &'static str,
        issues: &mut Vec<ParseIssue>,
    ) -> Option<NaiveDate> {
        let caps = pattern.captures(header)?;
        let raw = caps[1].trim();
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                issues.push(ParseIssue::new(field, format!("Unparsable date '{raw}'")));
                None
            }
        }
    }

    fn parse_timeline(&self, timeline: &str, parsed: &mut ParsedStatus) {
        let headings: Vec<_> = self.timeline_heading.captures_iter(timeline).collect();
        let spans: Vec<_> = self
            .timeline_heading
            .find_iter(timeline)
            .map(|m| (m.start(), m.end()))
            .collect();

        for (i, caps) in headings.iter().enumerate() {
            let label = caps[1].trim();
            let Some(state) = ApplicationState::parse_label(label) else {
                parsed.issues.push(ParseIssue::new(
                    "timeline",
                    format!("Unknown timeline state label '{label}'"),
                ));
                continue;
            };

            let date = &caps[2];
            let time = caps.get(3).map(|m| m.as_str()).unwrap_or("00:00");
            let Some(timestamp) = parse_timestamp(&format!("{date} {time}")) else {
                parsed.issues.push(ParseIssue::new(
                    "timeline",
                    format!("Unparsable timeline date '{date} {time}'"),
                ));
                continue;
            };

            // The entry body runs from this heading to the next one.
            let body_start = spans[i].1;
            let body_end = spans.get(i + 1).map(|s| s.0).unwrap_or(timeline.len());
            let body = &timeline[body_start..body_end];

            let notes = self
                .notes
                .captures(body)
                .map(|c| c[1].to_string())
                .filter(|n| !n.is_empty());
            let previous_state = self
                .previous_status
                .captures(body)
                .and_then(|c| ApplicationState::parse_label(&c[1]));

            parsed.timeline.push(TimelineEntry {
                state,
                timestamp,
                notes,
                previous_state,
            });
        }

        if let (Some(state), Some(newest)) = (parsed.state, parsed.timeline.first()) {
            if newest.state != state {
                parsed.issues.push(ParseIssue::new(
                    "timeline",
                    format!(
                        "Current status '{}' does not match newest timeline entry '{}'",
                        state, newest.state
                    ),
                ));
            }
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RECORD: &str = "\
# Application Status - TestCo - Product Lead

**Current Status:** interview-invited
**Last Updated:** 2025-01-20 09:00
**Fit Score:** 8.5/10
**Applied On:** 2025-01-14
**Analyzed On:** 2025-01-12
**Location:** London, UK
**CV Version:** 2025-01-13_TestCo_CV_v2.pdf
**Cover Letter:** Not generated

## Status Timeline

### Interview-Invited - 2025-01-20 09:00
**Notes:** Phone screen scheduled for Jan 25, 10am GMT

**Previous Status:** applied

### Applied - 2025-01-14 15:30
**Notes:** Submitted via company careers page

**Previous Status:** drafting

### Drafting - 2025-01-13 10:00
**Notes:** Analysis complete, working on CV
";

    #[test]
    fn test_parse_full_record() {
        let parsed = RecordParser::new().parse(FULL_RECORD);

        assert_eq!(parsed.company.as_deref(), Some("TestCo"));
        assert_eq!(parsed.role.as_deref(), Some("Product Lead"));
        assert_eq!(parsed.state, Some(ApplicationState::InterviewInvited));
        assert_eq!(parsed.fit_score, Some(8.5));
        assert_eq!(
            parsed.applied_on,
            NaiveDate::from_ymd_opt(2025, 1, 14)
        );
        assert_eq!(parsed.location.as_deref(), Some("London, UK"));
        assert!(parsed.issues.is_empty());

        assert_eq!(parsed.timeline.len(), 3);
        assert_eq!(parsed.timeline[0].state, ApplicationState::InterviewInvited);
        assert_eq!(
            parsed.timeline[0].notes.as_deref(),
            Some("Phone screen scheduled for Jan 25, 10am GMT")
        );
        assert_eq!(
            parsed.timeline[0].previous_state,
            Some(ApplicationState::Applied)
        );
        assert_eq!(parsed.timeline[2].state, ApplicationState::Drafting);
        assert_eq!(parsed.timeline[2].previous_state, None);
    }

    #[test]
    fn test_parse_missing_status_is_issue_not_panic() {
        let parsed = RecordParser::new().parse("# Application Status - X - Y\n\nno fields here\n");
        assert_eq!(parsed.state, None);
        assert!(parsed
            .issues
            .iter()
            .any(|i| i.field == "current_status"));

        let err = parsed
            .into_record(PathBuf::from("/tmp/x"))
            .unwrap_err();
        assert!(matches!(err, RecordError::MissingStatus { .. }));
    }

    #[test]
    fn test_parse_unknown_state_label() {
        let content = "**Current Status:** ghosted\n**Last Updated:** 2025-01-14 15:30\n";
        let parsed = RecordParser::new().parse(content);
        assert_eq!(parsed.state, None);
        assert!(parsed
            .issues
            .iter()
            .any(|i| i.message.contains("ghosted")));
    }

    #[test]
    fn test_parse_space_separated_timeline_label() {
        let content = "\
**Current Status:** interview-invited
**Last Updated:** 2025-01-20 09:00

## Status Timeline

### Interview Invited - 2025-01-20 09:00
**Notes:** Recruiter reached out
";
        let parsed = RecordParser::new().parse(content);
        assert_eq!(parsed.timeline.len(), 1);
        assert_eq!(parsed.timeline[0].state, ApplicationState::InterviewInvited);
    }

    #[test]
    fn test_parse_date_only_timeline_entry() {
        let content = "\
**Current Status:** applied
**Last Updated:** 2025-01-14

## Status Timeline

### Applied - 2025-01-14
**Notes:** Submitted
";
        let parsed = RecordParser::new().parse(content);
        assert_eq!(parsed.timeline.len(), 1);
        assert_eq!(
            parsed.timeline[0].timestamp,
            NaiveDate::from_ymd_opt(2025, 1, 14)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_parse_flags_status_timeline_mismatch() {
        let content = "\
**Current Status:** applied
**Last Updated:** 2025-01-20 09:00

## Status Timeline

### Drafting - 2025-01-13 10:00
**Notes:** Still drafting according to timeline
";
        let parsed = RecordParser::new().parse(content);
        assert!(parsed
            .issues
            .iter()
            .any(|i| i.field == "timeline" && i.message.contains("does not match")));
    }

    #[test]
    fn test_parse_fit_score_out_of_range() {
        let content = "**Current Status:** applied\n**Fit Score:** 55/10\n";
        let parsed = RecordParser::new().parse(content);
        assert_eq!(parsed.fit_score, None);
        assert!(parsed.issues.iter().any(|i| i.field == "fit_score"));
    }

    #[test]
    fn test_notes_in_timeline_do_not_shadow_header_fields() {
        let content = "\
# Application Status - RealCo - PM

**Current Status:** applied
**Last Updated:** 2025-01-14 15:30

## Status Timeline

### Applied - 2025-01-14 15:30
**Notes:** Recruiter said **Location:** is flexible
";
        let parsed = RecordParser::new().parse(content);
        assert_eq!(parsed.location, None);
    }
}

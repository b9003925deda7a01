//! System health check: orphan detection, state/location consistency,
//! missing artifacts, staleness, archive and pipeline integrity.
//!
//! Every check accumulates findings and keeps going; a single bad record
//! never aborts the run.

pub mod matcher;

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use log::info;

use crate::config::{Config, TrackerPaths};
use crate::error::Result;
use crate::location::{LocationResolver, STAGING_ARCHIVE_BUCKETS, STAGING_BUCKETS};
use crate::record::{ApplicationRecord, RecordParser};
use crate::state::ApplicationState;
use crate::storage::ensure_directory;
use crate::sync::scan::{record_folders, scan_records};

pub use matcher::{front_matter_source_file, MatchKind, PostingMatcher, MATCH_THRESHOLD};

const POSTING_EXTENSIONS: [&str; 3] = ["mhtml", "html", "md"];
const REQUIRED_RECORD_FILES: [&str; 3] = ["status.md", "analysis.md", "job-description.md"];

/// One health finding, grouped by category in the rendered report.
#[derive(Debug, Clone)]
pub struct Finding {
    pub category: &'static str,
    pub message: String,
}

impl Finding {
    fn new(category: &'static str, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct HealthReport {
    pub issues: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub info: Vec<Finding>,
    pub total_records: usize,
    pub applied_records: usize,
    pub terminal_records: usize,
}

impl HealthReport {
    /// Overall health score and label.
    pub fn score(&self) -> (u8, &'static str) {
        let issues = self.issues.len();
        let warnings = self.warnings.len();
        if issues == 0 && warnings == 0 {
            (100, "Excellent")
        } else if issues == 0 && warnings <= 3 {
            (85, "Good")
        } else if issues <= 2 && warnings <= 5 {
            (70, "Fair")
        } else {
            (50, "Poor")
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.score().0 >= 70
    }

    fn issue(&mut self, category: &'static str, message: impl Into<String>) {
        self.issues.push(Finding::new(category, message));
    }

    fn warning(&mut self, category: &'static str, message: impl Into<String>) {
        self.warnings.push(Finding::new(category, message));
    }

    fn note(&mut self, category: &'static str, message: impl Into<String>) {
        self.info.push(Finding::new(category, message));
    }
}

pub struct HealthChecker {
    paths: TrackerPaths,
    config: Config,
    parser: RecordParser,
    matcher: PostingMatcher,
    resolver: LocationResolver,
}

impl HealthChecker {
    pub fn new(paths: TrackerPaths, config: Config) -> Self {
        let resolver = LocationResolver::new(&paths.applications_root);
        Self {
            paths,
            config,
            parser: RecordParser::new(),
            matcher: PostingMatcher::new(),
            resolver,
        }
    }

    pub fn run(&self, now: NaiveDateTime) -> Result<HealthReport> {
        let mut report = HealthReport::default();

        let scanned = scan_records(&self.paths.applications_root, &self.parser)?;
        for (folder, reason) in &scanned.corrupted {
            report.warning(
                "corrupted_records",
                format!("{}: {reason}", folder.display()),
            );
        }
        let records = scanned.records;

        report.total_records = records.len();
        report.applied_records = records
            .iter()
            .filter(|r| r.state == ApplicationState::Applied)
            .count();
        report.terminal_records = records.iter().filter(|r| r.state.is_terminal()).count();

        self.check_orphaned_postings(&records, &mut report);
        self.check_state_location(&records, &mut report);
        self.check_missing_cvs(&records, &mut report);
        self.check_stale_records(&records, now, &mut report);
        self.check_archive_integrity(&mut report);
        self.check_pipeline_structure(&mut report);
        self.check_duplicates(&records, &mut report);
        self.check_missing_files(&mut report)?;

        let (score, label) = report.score();
        info!(
            "Health check complete: score {score} ({label}), {} issues, {} warnings",
            report.issues.len(),
            report.warnings.len()
        );
        Ok(report)
    }

    /// Posting files in `staging/3-applying/` with no matching record.
    fn check_orphaned_postings(&self, records: &[ApplicationRecord], report: &mut HealthReport) {
        let applying = self.paths.applying_bucket();
        let Ok(entries) = std::fs::read_dir(&applying) else {
            return;
        };

        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() || !is_posting(&path) {
                continue;
            }
            if self.matcher.find_matching_record(&path, records).is_none() {
                report.issue(
                    "orphaned_files",
                    format!(
                        "{} in staging/3-applying/ has no corresponding application record",
                        entry.file_name().to_string_lossy()
                    ),
                );
            }
        }
    }

    /// Records whose physical location disagrees with their state, and
    /// terminal records whose posting file was never archived.
    fn check_state_location(&self, records: &[ApplicationRecord], report: &mut HealthReport) {
        let applying = self.paths.applying_bucket();

        for record in records {
            if let Some(effective) = record.effective_date() {
                let expected = self.resolver.bucket_for(record.state, effective);
                if record.folder.parent() != Some(expected.as_path()) {
                    report.issue(
                        "state_location",
                        format!(
                            "{}: state is '{}' but folder is at {} (expected {})",
                            record.id(),
                            record.state,
                            record.folder.display(),
                            expected.display()
                        ),
                    );
                }
            }

            if !record.state.is_terminal() {
                continue;
            }
            let Some(company) = record.company_component() else {
                continue;
            };
            let Ok(entries) = std::fs::read_dir(&applying) else {
                continue;
            };
            for entry in entries.filter_map(|e| e.ok()) {
                let name = entry.file_name();
                let name = name.to_string_lossy().to_string();
                if entry.path().is_file() && name.contains(company) {
                    report.issue(
                        "state_location",
                        format!(
                            "{}: status is '{}' but posting file '{}' still in staging/3-applying/ \
                             (should be archived)",
                            record.id(),
                            record.state,
                            name
                        ),
                    );
                }
            }
        }
    }

    /// Applied-or-later records must have a CV artifact.
    fn check_missing_cvs(&self, records: &[ApplicationRecord], report: &mut HealthReport) {
        for record in records {
            let applied_or_later = matches!(
                record.state,
                ApplicationState::Applied
                    | ApplicationState::InterviewInvited
                    | ApplicationState::InterviewCompleted
                    | ApplicationState::Offer
            );
            if applied_or_later && !record.has_cv_artifact() && !record.cv_generated() {
                report.issue(
                    "missing_cvs",
                    format!(
                        "{}: status is '{}' but no CV PDF found",
                        record.id(),
                        record.state
                    ),
                );
            }
        }
    }

    fn check_stale_records(
        &self,
        records: &[ApplicationRecord],
        now: NaiveDateTime,
        report: &mut HealthReport,
    ) {
        let staleness = &self.config.staleness;
        let today = now.date();

        for record in records {
            match record.state {
                ApplicationState::Drafting => {
                    let Some(updated) = record.last_updated else {
                        continue;
                    };
                    let days = (today - updated.date()).num_days();
                    if days > staleness.drafting_stale_days {
                        report.warning(
                            "stale_applications",
                            format!(
                                "{}: stuck in 'drafting' for {days} days (>{} days)",
                                record.id(),
                                staleness.drafting_stale_days
                            ),
                        );
                    }
                }
                ApplicationState::Applied => {
                    let Some(applied) = record.applied_date() else {
                        continue;
                    };
                    let days = (today - applied).num_days();
                    if days > staleness.applied_silent_days {
                        report.issue(
                            "long_wait",
                            format!(
                                "{}: waiting {days} days (>{} days, likely silent rejection)",
                                record.id(),
                                staleness.applied_silent_days
                            ),
                        );
                    } else if days > staleness.applied_followup_days {
                        report.warning(
                            "long_wait",
                            format!(
                                "{}: waiting {days} days (>{} days, consider follow-up)",
                                record.id(),
                                staleness.applied_followup_days
                            ),
                        );
                    }
                }
                _ => {}
            }
        }
    }

    fn check_archive_integrity(&self, report: &mut HealthReport) {
        let archive_root = self.paths.staging_archive();
        if !archive_root.exists() {
            report.issue("archive_integrity", "staging/archive/ folder does not exist");
            return;
        }

        for bucket in STAGING_ARCHIVE_BUCKETS {
            if !archive_root.join(bucket).exists() {
                report.warning(
                    "archive_integrity",
                    format!("Archive subfolder {bucket}/ does not exist (created on first use)"),
                );
            }
        }

        if let Ok(entries) = std::fs::read_dir(&archive_root) {
            for entry in entries.filter_map(|e| e.ok()) {
                if entry.path().is_file() {
                    report.warning(
                        "archive_integrity",
                        format!(
                            "File {} in archive/ root (should be in a subfolder)",
                            entry.file_name().to_string_lossy()
                        ),
                    );
                }
            }
        }
    }

    fn check_pipeline_structure(&self, report: &mut HealthReport) {
        for bucket in STAGING_BUCKETS {
            if !self.paths.root.join(bucket).exists() {
                report.warning("pipeline_structure", format!("{bucket}/ does not exist"));
            }
        }
    }

    /// Duplicate detection stays advisory: multiple records for one company
    /// may be legitimate (different roles, different quarters).
    fn check_duplicates(&self, records: &[ApplicationRecord], report: &mut HealthReport) {
        let mut by_company: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for record in records {
            if let Some(company) = record.company_component() {
                by_company.entry(company).or_default().push(record.id());
            }
        }
        for (company, ids) in by_company {
            if ids.len() > 1 {
                report.note(
                    "duplicate_applications",
                    format!("{company}: {} applications ({})", ids.len(), ids.join(", ")),
                );
            }
        }
    }

    fn check_missing_files(&self, report: &mut HealthReport) -> Result<()> {
        for folder in record_folders(&self.paths.applications_root)? {
            let missing: Vec<&str> = REQUIRED_RECORD_FILES
                .iter()
                .filter(|f| !folder.join(f).exists())
                .copied()
                .collect();
            if !missing.is_empty() {
                let id = folder
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| folder.display().to_string());
                report.warning("missing_files", format!("{id}: missing {}", missing.join(", ")));
            }
        }
        Ok(())
    }

    /// Render the report as markdown.
    pub fn render(&self, report: &HealthReport, generated_at: NaiveDateTime) -> String {
        render_report(report, generated_at)
    }

    /// Render and write `insights/health-check-<date>.md`.
    pub fn save(&self, report: &HealthReport, generated_at: NaiveDateTime) -> Result<PathBuf> {
        ensure_directory(&self.paths.insights_root)?;
        let path = self.paths.health_view(generated_at.date());
        std::fs::write(&path, render_report(report, generated_at)).map_err(|e| {
            crate::error::SyncError::WriteView {
                path: path.clone(),
                source: e,
            }
        })?;
        Ok(path)
    }
}

fn is_posting(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| POSTING_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn category_title(category: &str) -> String {
    category
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_findings(out: &mut String, findings: &[Finding], empty_message: &str) {
    use std::fmt::Write as _;

    if findings.is_empty() {
        out.push_str(empty_message);
        out.push('\n');
        return;
    }

    let mut by_category: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for finding in findings {
        by_category
            .entry(finding.category)
            .or_default()
            .push(&finding.message);
    }
    for (category, messages) in by_category {
        let _ = write!(out, "### {}\n\n", category_title(category));
        for message in messages {
            let _ = writeln!(out, "- {message}");
        }
        out.push('\n');
    }
}

fn render_report(report: &HealthReport, generated_at: NaiveDateTime) -> String {
    use std::fmt::Write as _;

    let (score, label) = report.score();
    let issue_count = report.issues.len();
    let warning_count = report.warnings.len();
    let info_count = report.info.len();

    let overall = if label == "Excellent" {
        "Healthy"
    } else if label == "Good" {
        "Needs Attention"
    } else {
        "Action Required"
    };

    let mut out = String::new();
    let _ = write!(
        out,
        "# System Health Check Report\n\n\
         **Generated:** {}\n\
         **Health Score:** {score}/100 ({label})\n\n\
         ---\n\n\
         ## Summary\n\n\
         - **Critical Issues:** {issue_count}\n\
         - **Warnings:** {warning_count}\n\
         - **Informational:** {info_count}\n\n\
         **Overall Status:** {overall}\n\n\
         ---\n\n\
         ## Critical Issues ({issue_count})\n\n",
        generated_at.format("%Y-%m-%d %H:%M"),
    );
    render_findings(&mut out, &report.issues, "None! System is healthy.");

    let _ = write!(out, "\n---\n\n## Warnings ({warning_count})\n\n");
    render_findings(&mut out, &report.warnings, "None! No warnings.");

    let _ = write!(out, "\n---\n\n## Informational ({info_count})\n\n");
    render_findings(&mut out, &report.info, "Nothing to report.");

    out.push_str("\n---\n\n## Recommended Actions\n\n");
    let has = |category: &str, findings: &[Finding]| findings.iter().any(|f| f.category == category);
    if issue_count > 0 {
        out.push_str("**Critical (fix immediately):**\n");
        if has("orphaned_files", &report.issues) {
            out.push_str("1. Move orphaned posting files to their application records or archive them\n");
        }
        if has("state_location", &report.issues) {
            out.push_str("2. Re-run the terminal transition to archive misplaced folders and postings\n");
        }
        if has("missing_cvs", &report.issues) {
            out.push_str("3. Generate missing CVs (a record cannot be 'applied' without one)\n");
        }
        out.push('\n');
    }
    if warning_count > 0 {
        out.push_str("**Recommended (address soon):**\n");
        if has("stale_applications", &report.warnings) {
            out.push_str("1. Review stale drafts: withdraw or finish them\n");
        }
        if has("long_wait", &report.warnings) {
            out.push_str("2. Follow up on applications past the follow-up window\n");
        }
        if has("missing_files", &report.warnings) {
            out.push_str("3. Complete analysis files for incomplete records\n");
        }
        out.push('\n');
    }
    if issue_count == 0 && warning_count == 0 {
        out.push_str("No action required.\n\n");
    }

    let other = report
        .total_records
        .saturating_sub(report.applied_records + report.terminal_records);
    let _ = write!(
        out,
        "---\n\n## System Statistics\n\n\
         - **Total Applications:** {}\n\
         - **Active (Applied):** {}\n\
         - **Terminal States:** {}\n\
         - **Drafting/Other:** {}\n",
        report.total_records, report.applied_records, report.terminal_records, other
    );

    out
}

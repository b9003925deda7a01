//! Health check scenarios across the whole tree.

mod common;

use common::{ts, RecordBuilder, TrackerHarness};
use jobtrack::ApplicationState;

#[test]
fn unmatched_posting_is_orphaned() {
    let harness = TrackerHarness::new();
    RecordBuilder::new("2025-01-Gymshark-EcomLead")
        .write_into(&harness.bucket("active/analyzing"));
    harness.write_posting(
        "3-applying",
        "CompletelyUnrelated-Posting.mhtml",
        "<html>Job</html>",
    );

    let report = harness.health_checker().run(ts(2025, 1, 15, 9, 0)).unwrap();

    assert!(report.issues.iter().any(|f| {
        f.category == "orphaned_files" && f.message.contains("CompletelyUnrelated-Posting.mhtml")
    }));
}

#[test]
fn token_overlap_match_suppresses_orphan_flag() {
    let harness = TrackerHarness::new();
    RecordBuilder::new("2025-01-Spotify-AnalyticsLead")
        .write_into(&harness.bucket("active/analyzing"));
    harness.write_posting(
        "3-applying",
        "Spotify-AnalyticsLead.mhtml",
        "<html>Spotify job</html>",
    );

    let report = harness.health_checker().run(ts(2025, 1, 15, 9, 0)).unwrap();

    assert!(!report.issues.iter().any(|f| f.category == "orphaned_files"));
}

#[test]
fn withdrawn_record_with_active_posting_is_flagged() {
    let harness = TrackerHarness::new();
    let record = RecordBuilder::new("2025-01-TRKKN-HeadAdTech")
        .write_into(&harness.bucket("active/analyzing"));
    harness
        .executor()
        .apply(
            record,
            ApplicationState::Withdrawn,
            Some("Withdrew"),
            ts(2025, 1, 12, 10, 0),
        )
        .unwrap();
    harness.write_posting(
        "3-applying",
        "TRKKN-HeadAdTech.mhtml",
        "<html>TRKKN job</html>",
    );

    let report = harness.health_checker().run(ts(2025, 1, 15, 9, 0)).unwrap();

    assert!(
        report
            .issues
            .iter()
            .any(|f| f.category == "state_location" && f.message.contains("TRKKN")),
        "expected state/location mismatch, got {:?}",
        report.issues
    );
}

#[test]
fn many_findings_push_score_to_poor() {
    let harness = TrackerHarness::new();
    for i in 0..4 {
        harness.write_posting(
            "3-applying",
            &format!("Orphan{i}-NoRecordAnywhere.mhtml"),
            "<html>Job</html>",
        );
    }

    let report = harness.health_checker().run(ts(2025, 1, 15, 9, 0)).unwrap();

    assert_eq!(report.score(), (50, "Poor"));
    assert!(!report.is_healthy());
}

#[test]
fn report_file_lands_in_insights() {
    let harness = TrackerHarness::new();
    let checker = harness.health_checker();
    let report = checker.run(ts(2025, 1, 15, 9, 0)).unwrap();

    let saved = checker.save(&report, ts(2025, 1, 15, 9, 0)).unwrap();

    assert_eq!(
        saved,
        harness.root().join("insights/health-check-2025-01-15.md")
    );
    let content = std::fs::read_to_string(saved).unwrap();
    assert!(content.contains("# System Health Check Report"));
    assert!(content.contains("**Health Score:**"));
}

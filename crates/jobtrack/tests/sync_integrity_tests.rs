//! Derived-view integrity: counts match the record set, regeneration is
//! deterministic, and source records are never mutated.

mod common;

use common::{ts, RecordBuilder, TrackerHarness};
use jobtrack::ApplicationState;

fn seed_mixed_records(harness: &TrackerHarness) {
    for (i, company) in ["Angi", "Kraken", "Hopper"].iter().enumerate() {
        RecordBuilder::new(&format!("2025-01-{company}-PM"))
            .state(ApplicationState::Applied)
            .updated(ts(2025, 1, 10 + i as u32, 14, 0))
            .applied_on(ts(2025, 1, 10 + i as u32, 14, 0).date())
            .entry(
                ApplicationState::Applied,
                ts(2025, 1, 10 + i as u32, 14, 0),
                "Application submitted",
            )
            .write_into(&harness.bucket("active/applied"));
    }

    for company in ["Redcare", "NBCUniversal"] {
        RecordBuilder::new(&format!("2025-01-{company}-Director"))
            .state(ApplicationState::Rejected)
            .updated(ts(2025, 1, 15, 9, 0))
            .entry(ApplicationState::Applied, ts(2025, 1, 10, 14, 0), "Submitted")
            .entry(ApplicationState::Rejected, ts(2025, 1, 15, 9, 0), "Rejection email")
            .write_into(&harness.bucket("archive/2025-Q1/rejected"));
    }

    RecordBuilder::new("2025-01-TRKKN-Head")
        .state(ApplicationState::Withdrawn)
        .updated(ts(2025, 1, 12, 10, 0))
        .entry(
            ApplicationState::Withdrawn,
            ts(2025, 1, 12, 10, 0),
            "Strategic withdrawal",
        )
        .write_into(&harness.bucket("archive/2025-Q1/withdrawn"));
}

#[test]
fn counts_in_derived_views_match_records() {
    let harness = TrackerHarness::new();
    seed_mixed_records(&harness);

    let summary = harness.sync_engine().sync(ts(2025, 1, 16, 8, 0)).unwrap();
    assert_eq!(summary.total, 6);

    let status = harness.read("STATUS.md");
    assert!(status.contains("**Total Applications:** 6"));
    assert!(status.contains("### Applied (3)"));
    assert!(status.contains("### Rejected (2)"));
    assert!(status.contains("### Withdrawn (1)"));

    let dashboard = harness.read("insights/metrics-dashboard.md");
    assert!(dashboard.contains("| **Total Applications Tracked** | 6 |"));
    assert!(dashboard.contains("| **Rejected** | 2 |"));
    assert!(dashboard.contains("| **Withdrawn** | 1 |"));
}

#[test]
fn average_fit_score_over_known_set() {
    let harness = TrackerHarness::new();
    for (i, fit) in [9.0, 8.5, 7.5, 9.5, 7.0].iter().enumerate() {
        RecordBuilder::new(&format!("2025-01-Scored{i}-PM"))
            .fit(*fit)
            .write_into(&harness.bucket("active/analyzing"));
    }

    let summary = harness.sync_engine().sync(ts(2025, 1, 16, 8, 0)).unwrap();

    let avg = summary.average_fit.unwrap();
    assert!((avg - 8.3).abs() < 0.01, "expected 8.3, got {avg}");
    assert!(harness.read("STATUS.md").contains("8.3/10"));
}

#[test]
fn sync_twice_is_byte_identical_for_fixed_timestamp() {
    let harness = TrackerHarness::new();
    seed_mixed_records(&harness);
    let engine = harness.sync_engine();
    let when = ts(2025, 1, 16, 8, 0);

    engine.sync(when).unwrap();
    let status_first = harness.read("STATUS.md");
    let dashboard_first = harness.read("insights/metrics-dashboard.md");

    engine.sync(when).unwrap();
    assert_eq!(harness.read("STATUS.md"), status_first);
    assert_eq!(harness.read("insights/metrics-dashboard.md"), dashboard_first);
}

#[test]
fn sync_never_mutates_source_records() {
    let harness = TrackerHarness::new();
    seed_mixed_records(&harness);

    let record_path = harness.bucket("active/applied/2025-01-Angi-PM/status.md");
    let before = std::fs::read_to_string(&record_path).unwrap();

    harness.sync_engine().sync(ts(2025, 1, 16, 8, 0)).unwrap();

    assert_eq!(std::fs::read_to_string(&record_path).unwrap(), before);
}

#[test]
fn hand_edits_to_derived_views_are_overwritten() {
    let harness = TrackerHarness::new();
    seed_mixed_records(&harness);
    let engine = harness.sync_engine();

    engine.sync(ts(2025, 1, 16, 8, 0)).unwrap();
    std::fs::write(
        harness.root().join("STATUS.md"),
        "# Hand-edited dashboard\n\nthis must not survive\n",
    )
    .unwrap();

    engine.sync(ts(2025, 1, 17, 8, 0)).unwrap();
    let status = harness.read("STATUS.md");
    assert!(!status.contains("must not survive"));
    assert!(status.contains("# Application Status Dashboard"));
}

#[test]
fn corrupted_record_is_reported_and_skipped() {
    let harness = TrackerHarness::new();
    seed_mixed_records(&harness);

    let bad = harness.bucket("active/analyzing/2025-01-Corrupt-PM");
    std::fs::create_dir_all(&bad).unwrap();
    std::fs::write(bad.join("status.md"), "no recognizable fields at all").unwrap();

    let summary = harness.sync_engine().sync(ts(2025, 1, 16, 8, 0)).unwrap();

    assert_eq!(summary.total, 6, "corrupted record excluded from counts");
    assert_eq!(summary.corrupted.len(), 1);
    assert!(summary.corrupted[0].0.ends_with("2025-01-Corrupt-PM"));
}

#[test]
fn manual_notes_in_records_survive_sync() {
    let harness = TrackerHarness::new();
    let record = RecordBuilder::new("2025-01-Notes-PM")
        .write_into(&harness.bucket("active/analyzing"));

    // Operator appends a free-form note below the timeline
    let path = record.status_path();
    let mut content = std::fs::read_to_string(&path).unwrap();
    content.push_str("\n## My Notes\n\nRecruiter is called Sam.\n");
    std::fs::write(&path, &content).unwrap();

    harness.sync_engine().sync(ts(2025, 1, 16, 8, 0)).unwrap();

    assert!(std::fs::read_to_string(&path)
        .unwrap()
        .contains("Recruiter is called Sam."));
}

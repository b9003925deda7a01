//! Rendering of the two derived views. Pure string builders: the caller
//! supplies the generation timestamp so that reruns over an unchanged
//! record set produce identical bytes apart from that header.

use std::fmt::Write as _;

use chrono::NaiveDateTime;

use crate::config::{AccuracyTier, Config, TierConfig};
use crate::record::ApplicationRecord;
use crate::state::ApplicationState;
use crate::sync::metrics::{percentage, recent_records, top_by_fit, Metrics};

const GENERATED_FORMAT: &str = "%Y-%m-%d %H:%M";

fn fit_label(record: &ApplicationRecord) -> String {
    match record.fit_score {
        Some(score) => format!("{score}/10"),
        None => "N/A".to_string(),
    }
}

fn display_name(record: &ApplicationRecord) -> String {
    match (&record.company, &record.role) {
        (Some(company), Some(role)) => format!("{company} - {role}"),
        _ => record.id().to_string(),
    }
}

/// `STATUS.md`: the at-a-glance dashboard.
pub fn render_status_view(
    records: &[ApplicationRecord],
    metrics: &Metrics,
    tiers: &TierConfig,
    generated_at: NaiveDateTime,
) -> String {
    let mut out = String::new();

    let _ = write!(
        out,
        "# Application Status Dashboard\n\n\
         **Last Updated:** {}\n\
         **Total Applications:** {}\n\n\
         ---\n\n\
         ## Quick Stats\n\n\
         | Metric | Count |\n\
         |--------|-------|\n\
         | **Total Applications** | {} |\n\
         | **Analysis Phase** | {} |\n\
         | **Applied** | {} |\n\
         | **In Interview Process** | {} |\n\
         | **Rejected** | {} |\n\
         | **Withdrawn** | {} |\n\
         | **High Priority ({}+ fit)** | {} |\n\
         | **Average Fit Score** | {} |\n\n\
         ---\n\n\
         ## Applications by Status\n\n",
        generated_at.format(GENERATED_FORMAT),
        metrics.total,
        metrics.total,
        metrics.drafting,
        metrics.applied,
        metrics.interviews,
        metrics.rejected,
        metrics.withdrawn,
        tiers.discovery.high,
        metrics.high_priority,
        metrics
            .average_fit
            .map(|avg| format!("{avg}/10"))
            .unwrap_or_else(|| "N/A".to_string()),
    );

    render_state_section(
        &mut out,
        records,
        ApplicationState::Drafting,
        "Analysis Phase",
    );
    render_state_section(&mut out, records, ApplicationState::Applied, "Applied");
    render_state_section(
        &mut out,
        records,
        ApplicationState::InterviewInvited,
        "Interview Invited",
    );
    render_state_section(
        &mut out,
        records,
        ApplicationState::InterviewCompleted,
        "Interview Completed",
    );
    render_state_section(&mut out, records, ApplicationState::Offer, "Offer");
    render_state_section(&mut out, records, ApplicationState::Accepted, "Accepted");
    render_state_section(&mut out, records, ApplicationState::Withdrawn, "Withdrawn");
    render_state_section(&mut out, records, ApplicationState::Rejected, "Rejected");

    let _ = write!(
        out,
        "---\n\n## High Priority Applications ({}+ Fit)\n\n",
        tiers.discovery.high
    );

    let mut high: Vec<_> = records
        .iter()
        .filter(|r| r.fit_score.is_some_and(|s| s >= tiers.discovery.high))
        .collect();
    high.sort_by(|a, b| {
        b.fit_score
            .partial_cmp(&a.fit_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id().cmp(b.id()))
    });

    if high.is_empty() {
        out.push_str("*No high-priority applications currently.*\n");
    } else {
        for record in high {
            let _ = write!(
                out,
                "### {} ({})\n\n\
                 - **Status:** {}\n\
                 - **Location:** {}\n\
                 - **CV Generated:** {}\n\
                 - **Cover Letter:** {}\n\n",
                display_name(record),
                fit_label(record),
                record.state,
                record.location.as_deref().unwrap_or("N/A"),
                if record.cv_generated() || record.has_cv_artifact() {
                    "Yes"
                } else {
                    "No"
                },
                if record.cover_letter_generated() {
                    "Yes"
                } else {
                    "No"
                },
            );
        }
    }

    out
}

fn render_state_section(
    out: &mut String,
    records: &[ApplicationRecord],
    state: ApplicationState,
    title: &str,
) {
    let mut matching: Vec<_> = records.iter().filter(|r| r.state == state).collect();
    if matching.is_empty() {
        return;
    }
    // Best fit first inside each section
    matching.sort_by(|a, b| {
        b.fit_score
            .partial_cmp(&a.fit_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id().cmp(b.id()))
    });

    let _ = write!(out, "### {} ({})\n\n", title, matching.len());
    for record in matching {
        let _ = writeln!(
            out,
            "- **{}** (Fit: {})",
            display_name(record),
            fit_label(record)
        );
        if let Some(updated) = record.last_updated {
            let _ = writeln!(out, "  - Last updated: {}", updated.format("%Y-%m-%d"));
        }
        if let Some(location) = &record.location {
            let _ = writeln!(out, "  - Location: {location}");
        }
    }
    out.push('\n');
}

/// `insights/metrics-dashboard.md`: KPIs, funnel, distribution, activity.
pub fn render_metrics_dashboard(
    records: &[ApplicationRecord],
    metrics: &Metrics,
    config: &Config,
    generated_at: NaiveDateTime,
) -> String {
    let mut out = String::new();
    let tiers = &config.tiers;

    let _ = write!(
        out,
        "# Job Application Metrics Dashboard\n\n\
         **Generated:** {}\n\
         **Data Source:** {} application folders in `{}/`\n\n\
         ---\n\n\
         ## Summary KPIs\n\n\
         | KPI | Value | Notes |\n\
         |-----|-------|-------|\n\
         | **Total Applications Tracked** | {} | All applications in system |\n\
         | **Average Fit Score** | {} | Based on {} scored applications |\n\
         | **High Priority ({}+ fit)** | {} | Applications worth pursuing |\n\
         | **Analysis Phase** | {} | Analyzed but not yet applied |\n\
         | **Applied** | {} | Submitted applications |\n\
         | **In Interview Process** | {} | Active interview pipelines |\n\
         | **Rejected** | {} | Explicit rejections |\n\
         | **Withdrawn** | {} | Self-withdrawn after analysis |\n\n\
         ---\n\n",
        generated_at.format(GENERATED_FORMAT),
        metrics.total,
        config.applications_dir,
        metrics.total,
        metrics
            .average_fit
            .map(|avg| format!("{avg}/10"))
            .unwrap_or_else(|| "N/A".to_string()),
        metrics.scored,
        tiers.discovery.high,
        metrics.high_priority,
        metrics.drafting,
        metrics.applied,
        metrics.interviews,
        metrics.rejected,
        metrics.withdrawn,
    );

    let _ = write!(
        out,
        "## Conversion Funnel\n\n\
         ```\n\
         Applications Analyzed ({})\n    |\n\
         High Priority {}+ fit ({})\n    |\n\
         CVs Generated ({})\n    |\n\
         Applications Submitted ({})\n    |\n\
         Interviews ({})\n\
         ```\n\n\
         **Conversion Rates:**\n\
         - Analysis -> High Priority: {}%\n\
         - High Priority -> Applied: {}%\n\
         - Applied -> Interview: {}%\n\n\
         ---\n\n",
        metrics.total,
        tiers.discovery.high,
        metrics.high_priority,
        metrics.cv_generated,
        metrics.applied,
        metrics.interviews,
        percentage(metrics.high_priority, metrics.total),
        percentage(metrics.applied, metrics.high_priority),
        percentage(metrics.interviews, metrics.applied),
    );

    out.push_str("## Applications by Fit Score\n\n| Score Range | Count | Bar |\n|-------------|-------|-----|\n");
    for (bucket, count) in metrics.fit_distribution.iter().rev() {
        let bar = "#".repeat(*count);
        let _ = writeln!(out, "| {bucket}-{bucket}.9 | {count} | {bar} |");
    }

    out.push_str("\n---\n\n## Applications by Status\n\n| Status | Count |\n|--------|-------|\n");
    let mut status_counts: Vec<_> = metrics.by_state.iter().collect();
    status_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (state, count) in status_counts {
        let _ = writeln!(out, "| {state} | {count} |");
    }

    out.push_str("\n---\n\n## Time to First Response\n\n");
    let mut any_tier = false;
    for tier in [AccuracyTier::High, AccuracyTier::Medium, AccuracyTier::Low] {
        if let Some(avg) = metrics.average_response_days(tier) {
            let n = metrics
                .response_days_by_tier
                .get(&tier)
                .map(Vec::len)
                .unwrap_or(0);
            let _ = writeln!(out, "- **{tier}-fit:** {avg:.1} days average (n={n})");
            any_tier = true;
        }
    }
    if !any_tier {
        out.push_str("*No responses recorded yet.*\n");
    }

    let _ = write!(
        out,
        "\n---\n\n## Recent Activity (Last {} Days)\n\n",
        config.staleness.recent_activity_days
    );
    let recent = recent_records(records, generated_at, config.staleness.recent_activity_days);
    if recent.is_empty() {
        out.push_str("*No activity in the window.*\n");
    } else {
        for (record, days_ago) in recent {
            let _ = writeln!(
                out,
                "- **{}** (Fit: {}) - {} days ago",
                display_name(record),
                fit_label(record),
                days_ago
            );
        }
    }

    out.push_str("\n---\n\n## Top 10 Applications by Fit Score\n\n");
    out.push_str("| Rank | Application | Fit | Status | Location |\n|------|-------------|-----|--------|----------|\n");
    for (i, record) in top_by_fit(records, 10).iter().enumerate() {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            i + 1,
            display_name(record),
            fit_label(record),
            record.state,
            record.location.as_deref().unwrap_or("N/A"),
        );
    }

    out
}

//! Aggregate metrics, computed purely as a function of the current record
//! set. No I/O here.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::config::{AccuracyTier, TierConfig};
use crate::record::ApplicationRecord;
use crate::state::ApplicationState;

#[derive(Debug, Default)]
pub struct Metrics {
    pub total: usize,
    pub by_state: BTreeMap<ApplicationState, usize>,
    /// Records with a parseable fit score.
    pub scored: usize,
    /// Arithmetic mean over scored records only, rounded to 2 decimals.
    pub average_fit: Option<f64>,
    /// Fit at or above the discovery scheme's high cutoff.
    pub high_priority: usize,
    pub cv_generated: usize,
    pub cover_letters: usize,
    /// Funnel stages, derived from the timeline rather than current state so
    /// archived records still count.
    pub applied: usize,
    pub interviews: usize,
    pub rejected: usize,
    pub withdrawn: usize,
    pub drafting: usize,
    /// Count per integer score bucket (8 covers 8.0-8.9).
    pub fit_distribution: BTreeMap<u32, usize>,
    /// Whole days from applied to first response, grouped by accuracy tier.
    pub response_days_by_tier: BTreeMap<AccuracyTier, Vec<i64>>,
}

impl Metrics {
    pub fn count(&self, state: ApplicationState) -> usize {
        self.by_state.get(&state).copied().unwrap_or(0)
    }

    pub fn average_response_days(&self, tier: AccuracyTier) -> Option<f64> {
        let days = self.response_days_by_tier.get(&tier)?;
        if days.is_empty() {
            return None;
        }
        Some(days.iter().sum::<i64>() as f64 / days.len() as f64)
    }
}

pub fn compute_metrics(records: &[ApplicationRecord], tiers: &TierConfig) -> Metrics {
    let mut metrics = Metrics {
        total: records.len(),
        ..Metrics::default()
    };

    let mut fit_sum = 0.0;

    for record in records {
        *metrics.by_state.entry(record.state).or_insert(0) += 1;

        if let Some(score) = record.fit_score {
            metrics.scored += 1;
            fit_sum += score;
            *metrics.fit_distribution.entry(score as u32).or_insert(0) += 1;

            if score >= tiers.discovery.high {
                metrics.high_priority += 1;
            }
            if let Some(days) = record.days_to_response() {
                metrics
                    .response_days_by_tier
                    .entry(tiers.accuracy.classify(score))
                    .or_default()
                    .push(days);
            }
        }

        if record.cv_generated() || record.has_cv_artifact() {
            metrics.cv_generated += 1;
        }
        if record.cover_letter_generated() {
            metrics.cover_letters += 1;
        }

        if record.applied_date().is_some() {
            metrics.applied += 1;
        }
        if record.has_interview() {
            metrics.interviews += 1;
        }
        if record.entry_for(ApplicationState::Rejected).is_some() {
            metrics.rejected += 1;
        }
        if record.entry_for(ApplicationState::Withdrawn).is_some() {
            metrics.withdrawn += 1;
        }
        if record.state == ApplicationState::Drafting {
            metrics.drafting += 1;
        }
    }

    if metrics.scored > 0 {
        metrics.average_fit = Some(round2(fit_sum / metrics.scored as f64));
    }

    metrics
}

/// Records updated within the last `days`, most recent first, paired with
/// how many days ago.
pub fn recent_records<'a>(
    records: &'a [ApplicationRecord],
    now: NaiveDateTime,
    days: i64,
) -> Vec<(&'a ApplicationRecord, i64)> {
    let mut recent: Vec<_> = records
        .iter()
        .filter_map(|r| {
            let updated = r.last_updated?;
            let ago = (now.date() - updated.date()).num_days();
            (0..=days).contains(&ago).then_some((r, ago))
        })
        .collect();
    recent.sort_by_key(|(_, ago)| *ago);
    recent
}

/// Records with a fit score, best first, capped at `limit`.
pub fn top_by_fit(records: &[ApplicationRecord], limit: usize) -> Vec<&ApplicationRecord> {
    let mut scored: Vec<_> = records.iter().filter(|r| r.fit_score.is_some()).collect();
    scored.sort_by(|a, b| {
        b.fit_score
            .partial_cmp(&a.fit_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id().cmp(b.id()))
    });
    scored.truncate(limit);
    scored
}

pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round1(part as f64 / whole as f64 * 100.0)
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

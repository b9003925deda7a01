//! Move scored posting files from the discovery buckets into tier folders.
//!
//! The fit score itself is produced upstream (the analysis step embeds a
//! `**Fit Score:** X/10` line into the posting or its sidecar); this module
//! only consumes it. Unscored files are left where they are and reported.

use std::path::{Path, PathBuf};

use log::{info, warn};
use regex::Regex;
use walkdir::WalkDir;

use crate::config::{DiscoveryTier, DiscoveryTiers};
use crate::error::{Result, StorageError};
use crate::storage::move_entry;

const DISCOVERY_BUCKETS: [&str; 2] = ["0-discovery/manual", "0-discovery/automated"];

/// Destination folder per discovery tier, relative to the staging root.
fn tier_destination(tier: DiscoveryTier) -> &'static str {
    match tier {
        DiscoveryTier::High => "tier1-apply-now",
        DiscoveryTier::Medium => "tier2-research",
        DiscoveryTier::Low => "tier3-maybe",
        DiscoveryTier::Skip => "archive/low-fit",
    }
}

#[derive(Debug, Default)]
pub struct OrganizeOutcome {
    /// `(from, to, score)` per moved file.
    pub moved: Vec<(PathBuf, PathBuf, f64)>,
    /// Files with no parsable fit score, left in place.
    pub unscored: Vec<PathBuf>,
    /// Files skipped because the destination already held a same-named entry.
    pub conflicts: Vec<PathBuf>,
}

impl OrganizeOutcome {
    pub fn moved_to(&self, tier_folder: &str) -> usize {
        self.moved
            .iter()
            .filter(|(_, to, _)| to.parent().is_some_and(|p| p.ends_with(tier_folder)))
            .count()
    }
}

pub struct StagingOrganizer {
    staging_root: PathBuf,
    tiers: DiscoveryTiers,
    fit_score: Regex,
}

impl StagingOrganizer {
    pub fn new<P: AsRef<Path>>(staging_root: P, tiers: DiscoveryTiers) -> Self {
        Self {
            staging_root: staging_root.as_ref().to_path_buf(),
            tiers,
            // Static pattern; compilation cannot fail.
            fit_score: Regex::new(r"(?m)^\*{0,2}Fit Score:?\*{0,2}\s*([\d.]+)/10").unwrap(),
        }
    }

    /// Scan the discovery buckets and move every scored posting into its
    /// tier folder. With `dry_run` the moves are computed and reported but
    /// nothing touches the filesystem.
    pub fn organize(&self, dry_run: bool) -> Result<OrganizeOutcome> {
        let mut outcome = OrganizeOutcome::default();

        for bucket in DISCOVERY_BUCKETS {
            let dir = self.staging_root.join(bucket);
            if !dir.exists() {
                continue;
            }

            for entry in WalkDir::new(&dir)
                .min_depth(1)
                .max_depth(1)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if path.is_dir() || is_sidecar(path) {
                    continue;
                }

                let Some(score) = self.read_fit_score(path) else {
                    outcome.unscored.push(path.to_path_buf());
                    continue;
                };

                let tier = self.tiers.classify(score);
                let destination = self
                    .staging_root
                    .join(tier_destination(tier))
                    .join(entry.file_name());

                if dry_run {
                    info!(
                        "[dry-run] Would move {} -> {} (fit {score}/10)",
                        path.display(),
                        destination.display()
                    );
                    outcome
                        .moved
                        .push((path.to_path_buf(), destination, score));
                    continue;
                }

                match move_entry(path, &destination) {
                    Ok(()) => {
                        info!(
                            "Moved {} -> {} (fit {score}/10)",
                            path.display(),
                            destination.display()
                        );
                        self.move_sidecar(path, &destination);
                        outcome
                            .moved
                            .push((path.to_path_buf(), destination, score));
                    }
                    Err(StorageError::DestinationExists(dst)) => {
                        warn!("Destination {} already exists, skipping", dst.display());
                        outcome.conflicts.push(path.to_path_buf());
                    }
                    Err(other) => return Err(other.into()),
                }
            }
        }

        info!(
            "Organize complete: {} moved, {} unscored, {} conflicts",
            outcome.moved.len(),
            outcome.unscored.len(),
            outcome.conflicts.len()
        );
        Ok(outcome)
    }

    /// The embedded fit score of a posting: either in the file itself or in
    /// a `<stem>.analysis.md` sidecar next to it.
    fn read_fit_score(&self, path: &Path) -> Option<f64> {
        if let Some(score) = self.score_in_file(path) {
            return Some(score);
        }
        self.score_in_file(&sidecar_path(path)?)
    }

    fn score_in_file(&self, path: &Path) -> Option<f64> {
        let content = std::fs::read_to_string(path).ok()?;
        let caps = self.fit_score.captures(&content)?;
        caps[1].parse::<f64>().ok().filter(|s| (0.0..=10.0).contains(s))
    }

    /// A sidecar follows its posting into the tier folder.
    fn move_sidecar(&self, posting: &Path, destination: &Path) {
        let Some(sidecar) = sidecar_path(posting) else {
            return;
        };
        if !sidecar.exists() {
            return;
        }
        let Some(target) = sidecar_path(destination) else {
            return;
        };
        if let Err(e) = move_entry(&sidecar, &target) {
            warn!("Failed to move sidecar {}: {e}", sidecar.display());
        }
    }
}

fn sidecar_path(posting: &Path) -> Option<PathBuf> {
    let stem = posting.file_stem()?.to_str()?;
    Some(posting.with_file_name(format!("{stem}.analysis.md")))
}

fn is_sidecar(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".analysis.md"))
}

//! The transition executor: validate a state change, record it in the
//! timeline, persist the record, and relocate its backing folder.
//!
//! Failure semantics (single-record, interactive): an invalid transition
//! aborts before anything is touched. A missing backing folder or an
//! occupied destination downgrade to warnings so the record content update
//! still lands; the resulting state/location drift is what `health-check`
//! reports and a re-run of the same transition repairs.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use log::{info, warn};

use crate::error::{Result, StorageError};
use crate::location::LocationResolver;
use crate::record::model::{ApplicationRecord, TimelineEntry};
use crate::record::writer::write_status;
use crate::state::{validate_transition, ApplicationState};
use crate::storage::move_entry;

#[derive(Debug)]
pub struct TransitionOutcome {
    pub record: ApplicationRecord,
    /// `(from, to)` when the backing folder was relocated.
    pub moved: Option<(PathBuf, PathBuf)>,
    /// False for an idempotent re-application (no timeline entry added).
    pub changed: bool,
    pub warnings: Vec<String>,
}

pub struct TransitionExecutor {
    resolver: LocationResolver,
}

impl TransitionExecutor {
    pub fn new(resolver: LocationResolver) -> Self {
        Self { resolver }
    }

    /// Apply `to_state` to a record. See module docs for failure semantics.
    pub fn apply(
        &self,
        mut record: ApplicationRecord,
        to_state: ApplicationState,
        note: Option<&str>,
        timestamp: NaiveDateTime,
    ) -> Result<TransitionOutcome> {
        if record.state == to_state {
            return self.reconcile(record, timestamp);
        }

        validate_transition(record.state, to_state)?;

        let mut warnings = Vec::new();
        let old_folder = record.folder.clone();
        let new_home = self
            .resolver
            .bucket_for(to_state, timestamp.date())
            .join(record.id().to_string());

        record.timeline.insert(
            0,
            TimelineEntry {
                state: to_state,
                timestamp,
                notes: note.map(str::to_string),
                previous_state: Some(record.state),
            },
        );
        record.state = to_state;
        record.last_updated = Some(timestamp);
        if to_state == ApplicationState::Applied && record.applied_on.is_none() {
            record.applied_on = Some(timestamp.date());
        }

        if !old_folder.exists() {
            // Nothing to move; persist the updated record at its new home.
            warn!(
                "Backing folder {} not found for '{}'; writing record at new location",
                old_folder.display(),
                record.id()
            );
            warnings.push(format!(
                "Backing folder missing: {} (nothing to move)",
                old_folder.display()
            ));
            record.folder = new_home;
            write_status(&record)?;
            return Ok(TransitionOutcome {
                record,
                moved: None,
                changed: true,
                warnings,
            });
        }

        write_status(&record)?;

        let moved = if old_folder != new_home {
            self.move_folder(&mut record, old_folder, new_home, &mut warnings)?
        } else {
            None
        };

        Ok(TransitionOutcome {
            record,
            moved,
            changed: true,
            warnings,
        })
    }

    /// Re-applying the current state is a no-op, except that a record found
    /// away from its expected bucket is moved there (the documented recovery
    /// path after a crash between persist and move).
    fn reconcile(
        &self,
        mut record: ApplicationRecord,
        timestamp: NaiveDateTime,
    ) -> Result<TransitionOutcome> {
        let effective = record.effective_date().unwrap_or_else(|| timestamp.date());
        let expected = self.resolver.record_home(&record, effective);
        let mut warnings = Vec::new();

        let moved = if record.folder != expected && record.folder.exists() {
            info!(
                "Record '{}' already in state {} but at {}; reconciling location",
                record.id(),
                record.state,
                record.folder.display()
            );
            let old = record.folder.clone();
            self.move_folder(&mut record, old, expected, &mut warnings)?
        } else {
            None
        };

        Ok(TransitionOutcome {
            record,
            moved,
            changed: false,
            warnings,
        })
    }

    fn move_folder(
        &self,
        record: &mut ApplicationRecord,
        from: PathBuf,
        to: PathBuf,
        warnings: &mut Vec<String>,
    ) -> Result<Option<(PathBuf, PathBuf)>> {
        info!(
            "Moving record '{}' from {} to {}",
            record.id(),
            from.display(),
            to.display()
        );
        match move_entry(&from, &to) {
            Ok(()) => {
                info!("Move complete: {}", to.display());
                record.folder = to.clone();
                Ok(Some((from, to)))
            }
            Err(StorageError::DestinationExists(dst)) => {
                warn!(
                    "Destination {} already exists; move skipped for '{}'",
                    dst.display(),
                    record.id()
                );
                warnings.push(format!(
                    "Location conflict: {} already exists, move skipped",
                    dst.display()
                ));
                Ok(None)
            }
            Err(StorageError::MissingSource(src)) => {
                warn!("Source {} vanished before move", src.display());
                warnings.push(format!("Backing folder missing: {} (nothing to move)", src.display()));
                Ok(None)
            }
            Err(other) => Err(other.into()),
        }
    }
}

/// Locate a record folder by id across the active and archive hierarchies.
pub fn locate_record(applications_root: &std::path::Path, record_id: &str) -> Option<PathBuf> {
    let active = applications_root.join("active");
    for bucket in crate::location::ACTIVE_BUCKETS {
        let candidate = active.join(bucket).join(record_id);
        if candidate.is_dir() {
            return Some(candidate);
        }
    }

    // Archive: archive/<quarter>/<state>/<id>
    let archive = applications_root.join("archive");
    let quarters = std::fs::read_dir(&archive).ok()?;
    for quarter in quarters.filter_map(|e| e.ok()) {
        if !quarter.path().is_dir() {
            continue;
        }
        for bucket in crate::location::TERMINAL_BUCKETS {
            let candidate = quarter.path().join(bucket).join(record_id);
            if candidate.is_dir() {
                return Some(candidate);
            }
        }
    }
    None
}

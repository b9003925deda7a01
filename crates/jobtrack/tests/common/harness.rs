//! Test harness: an isolated tracker tree with the full pipeline skeleton.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use jobtrack::storage::init_layout;
use jobtrack::{
    Config, HealthChecker, LocationResolver, RecordValidator, StagingOrganizer, SyncEngine,
    TrackerPaths, TransitionExecutor,
};

pub fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

/// Isolated tracker environment rooted in a temp directory, with the full
/// folder skeleton created up front.
pub struct TrackerHarness {
    temp: TempDir,
    pub config: Config,
    pub paths: TrackerPaths,
}

impl TrackerHarness {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let config = Config::default();
        let paths = TrackerPaths::new(temp.path(), &config);
        init_layout(&paths).expect("Failed to create pipeline skeleton");
        Self {
            temp,
            config,
            paths,
        }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// A bucket under the applications root, e.g. `active/analyzing`.
    pub fn bucket(&self, relative: &str) -> PathBuf {
        self.paths.applications_root.join(relative)
    }

    pub fn executor(&self) -> TransitionExecutor {
        TransitionExecutor::new(LocationResolver::new(&self.paths.applications_root))
    }

    pub fn sync_engine(&self) -> SyncEngine {
        SyncEngine::new(self.paths.clone(), self.config.clone())
    }

    pub fn health_checker(&self) -> HealthChecker {
        HealthChecker::new(self.paths.clone(), self.config.clone())
    }

    pub fn validator(&self) -> RecordValidator {
        RecordValidator::new(self.paths.applications_root.clone())
    }

    pub fn organizer(&self) -> StagingOrganizer {
        StagingOrganizer::new(&self.paths.staging_root, self.config.tiers.discovery.clone())
    }

    /// Drop a posting file into a staging bucket, e.g. `3-applying`.
    pub fn write_posting(&self, staging_bucket: &str, name: &str, content: &str) -> PathBuf {
        let path = self.paths.staging_root.join(staging_bucket).join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn read(&self, relative_to_root: &str) -> String {
        std::fs::read_to_string(self.root().join(relative_to_root))
            .unwrap_or_else(|e| panic!("Failed to read {relative_to_root}: {e}"))
    }
}

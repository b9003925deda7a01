pub mod loader;
pub mod schema;

use std::path::{Path, PathBuf};

pub use loader::{load_config, load_config_from_str};
pub use schema::{
    AccuracyTier, AccuracyTiers, Config, DiscoveryTier, DiscoveryTiers, StalenessConfig,
    TierConfig,
};

/// Absolute locations of the tracker's trees, resolved from the root
/// directory plus the configured relative paths.
#[derive(Debug, Clone)]
pub struct TrackerPaths {
    pub root: PathBuf,
    pub applications_root: PathBuf,
    pub staging_root: PathBuf,
    pub insights_root: PathBuf,
    /// The root-level derived dashboard, `STATUS.md`.
    pub status_view: PathBuf,
}

impl TrackerPaths {
    pub fn new<P: AsRef<Path>>(root: P, config: &Config) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            applications_root: root.join(&config.applications_dir),
            staging_root: root.join(&config.staging_dir),
            insights_root: root.join(&config.insights_dir),
            status_view: root.join("STATUS.md"),
            root,
        }
    }

    pub fn metrics_view(&self) -> PathBuf {
        self.insights_root.join("metrics-dashboard.md")
    }

    pub fn health_view(&self, date: chrono::NaiveDate) -> PathBuf {
        self.insights_root
            .join(format!("health-check-{}.md", date.format("%Y-%m-%d")))
    }

    /// The bucket postings wait in while an application is being drafted
    /// or is out with the company.
    pub fn applying_bucket(&self) -> PathBuf {
        self.staging_root.join("3-applying")
    }

    pub fn staging_archive(&self) -> PathBuf {
        self.staging_root.join("archive")
    }
}

/// Default config file location: `<root>/tracker.json` when present,
/// otherwise the platform config dir (`~/.config/jobtrack/tracker.json`).
pub fn default_config_path(root: &Path) -> Option<PathBuf> {
    let local = root.join("tracker.json");
    if local.exists() {
        return Some(local);
    }
    let global = dirs::config_dir()?.join("jobtrack").join("tracker.json");
    global.exists().then_some(global)
}

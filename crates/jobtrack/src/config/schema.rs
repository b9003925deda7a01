use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_applications_dir")]
    pub applications_dir: String,
    #[serde(default = "default_staging_dir")]
    pub staging_dir: String,
    #[serde(default = "default_insights_dir")]
    pub insights_dir: String,
    #[serde(default)]
    pub staleness: StalenessConfig,
    #[serde(default)]
    pub tiers: TierConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            applications_dir: default_applications_dir(),
            staging_dir: default_staging_dir(),
            insights_dir: default_insights_dir(),
            staleness: StalenessConfig::default(),
            tiers: TierConfig::default(),
        }
    }
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_applications_dir() -> String {
    "applications".to_string()
}

fn default_staging_dir() -> String {
    "staging".to_string()
}

fn default_insights_dir() -> String {
    "insights".to_string()
}

/// Day thresholds for the health check's staleness warnings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StalenessConfig {
    #[serde(default = "default_drafting_stale_days")]
    pub drafting_stale_days: i64,
    #[serde(default = "default_applied_followup_days")]
    pub applied_followup_days: i64,
    #[serde(default = "default_applied_silent_days")]
    pub applied_silent_days: i64,
    #[serde(default = "default_recent_activity_days")]
    pub recent_activity_days: i64,
}

impl Default for StalenessConfig {
    fn default() -> Self {
        Self {
            drafting_stale_days: default_drafting_stale_days(),
            applied_followup_days: default_applied_followup_days(),
            applied_silent_days: default_applied_silent_days(),
            recent_activity_days: default_recent_activity_days(),
        }
    }
}

fn default_drafting_stale_days() -> i64 {
    7
}

fn default_applied_followup_days() -> i64 {
    14
}

fn default_applied_silent_days() -> i64 {
    21
}

fn default_recent_activity_days() -> i64 {
    7
}

/// Two independently configured fit-tier schemes. Different reports use
/// different cutoffs on purpose; they must not be unified.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TierConfig {
    #[serde(default)]
    pub accuracy: AccuracyTiers,
    #[serde(default)]
    pub discovery: DiscoveryTiers,
}

/// Tiering used by the accuracy-evaluation views (time-to-response grouping).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccuracyTiers {
    #[serde(default = "default_accuracy_high")]
    pub high: f64,
    #[serde(default = "default_accuracy_medium")]
    pub medium: f64,
}

impl Default for AccuracyTiers {
    fn default() -> Self {
        Self {
            high: default_accuracy_high(),
            medium: default_accuracy_medium(),
        }
    }
}

fn default_accuracy_high() -> f64 {
    8.5
}

fn default_accuracy_medium() -> f64 {
    7.0
}

impl AccuracyTiers {
    pub fn classify(&self, score: f64) -> AccuracyTier {
        if score >= self.high {
            AccuracyTier::High
        } else if score >= self.medium {
            AccuracyTier::Medium
        } else {
            AccuracyTier::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccuracyTier {
    High,
    Medium,
    Low,
}

impl fmt::Display for AccuracyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccuracyTier::High => "high",
            AccuracyTier::Medium => "medium",
            AccuracyTier::Low => "low",
        })
    }
}

/// Tiering used by bulk-discovery prioritization (`organize`, funnel cutoff).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryTiers {
    #[serde(default = "default_discovery_high")]
    pub high: f64,
    #[serde(default = "default_discovery_medium")]
    pub medium: f64,
    #[serde(default = "default_discovery_low")]
    pub low: f64,
}

impl Default for DiscoveryTiers {
    fn default() -> Self {
        Self {
            high: default_discovery_high(),
            medium: default_discovery_medium(),
            low: default_discovery_low(),
        }
    }
}

fn default_discovery_high() -> f64 {
    8.0
}

fn default_discovery_medium() -> f64 {
    6.0
}

fn default_discovery_low() -> f64 {
    4.0
}

impl DiscoveryTiers {
    pub fn classify(&self, score: f64) -> DiscoveryTier {
        if score >= self.high {
            DiscoveryTier::High
        } else if score >= self.medium {
            DiscoveryTier::Medium
        } else if score >= self.low {
            DiscoveryTier::Low
        } else {
            DiscoveryTier::Skip
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiscoveryTier {
    High,
    Medium,
    Low,
    Skip,
}

impl fmt::Display for DiscoveryTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiscoveryTier::High => "high",
            DiscoveryTier::Medium => "medium",
            DiscoveryTier::Low => "low",
            DiscoveryTier::Skip => "skip",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_tier_boundaries() {
        let tiers = AccuracyTiers::default();
        assert_eq!(tiers.classify(8.5), AccuracyTier::High);
        assert_eq!(tiers.classify(8.49), AccuracyTier::Medium);
        assert_eq!(tiers.classify(7.0), AccuracyTier::Medium);
        assert_eq!(tiers.classify(6.99), AccuracyTier::Low);
    }

    #[test]
    fn test_discovery_tier_boundaries() {
        let tiers = DiscoveryTiers::default();
        assert_eq!(tiers.classify(8.0), DiscoveryTier::High);
        assert_eq!(tiers.classify(7.9), DiscoveryTier::Medium);
        assert_eq!(tiers.classify(6.0), DiscoveryTier::Medium);
        assert_eq!(tiers.classify(4.0), DiscoveryTier::Low);
        assert_eq!(tiers.classify(3.9), DiscoveryTier::Skip);
    }

    #[test]
    fn test_schemes_are_independent() {
        // 8.2 is high priority for discovery but only medium for accuracy.
        let tiers = TierConfig::default();
        assert_eq!(tiers.discovery.classify(8.2), DiscoveryTier::High);
        assert_eq!(tiers.accuracy.classify(8.2), AccuracyTier::Medium);
    }
}

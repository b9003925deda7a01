pub mod config;
pub mod error;
pub mod health;
pub mod location;
pub mod organize;
pub mod record;
pub mod state;
pub mod storage;
pub mod sync;
pub mod transition;
pub mod validate;

pub use config::{default_config_path, load_config, Config, TrackerPaths};
pub use error::{
    ConfigError, RecordError, Result, StorageError, SyncError, TrackerError, TransitionError,
};
pub use health::{HealthChecker, HealthReport};
pub use location::LocationResolver;
pub use organize::StagingOrganizer;
pub use record::{ApplicationRecord, RecordParser, TimelineEntry};
pub use state::{validate_transition, ApplicationState};
pub use sync::SyncEngine;
pub use transition::{locate_record, TransitionExecutor, TransitionOutcome};
pub use validate::RecordValidator;

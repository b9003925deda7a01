use std::path::PathBuf;
use thiserror::Error;

use crate::state::ApplicationState;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    #[error("Transition error: {0}")]
    Transition(#[from] TransitionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Invalid tier scheme '{scheme}': {reason}")]
    InvalidTierScheme { scheme: String, reason: String },
}

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Failed to read record '{path}': {source}")]
    ReadRecord {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write record '{path}': {source}")]
    WriteRecord {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Record '{path}' has no parsable Current Status field")]
    MissingStatus { path: PathBuf },
}

#[derive(Error, Debug)]
pub enum TransitionError {
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: ApplicationState,
        to: ApplicationState,
    },

    #[error("Unknown state label '{0}'")]
    UnknownState(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move '{from}' to '{to}': {source}")]
    MoveEntry {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Destination already exists: {0}")]
    DestinationExists(PathBuf),

    #[error("Source does not exist: {0}")]
    MissingSource(PathBuf),
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to scan records under '{root}': {reason}")]
    Scan { root: PathBuf, reason: String },

    #[error("Failed to write derived view '{path}': {source}")]
    WriteView {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, TrackerError>;

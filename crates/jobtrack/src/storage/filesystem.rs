//! Filesystem primitives for the tracker: idempotent bucket creation and
//! record/posting moves.

use std::path::{Path, PathBuf};

use log::info;

use crate::config::TrackerPaths;
use crate::error::StorageError;
use crate::location::{STAGING_ARCHIVE_BUCKETS, STAGING_BUCKETS};

/// Create a directory if absent. "Create if absent", never "create or fail".
pub fn ensure_directory(path: &Path) -> Result<(), StorageError> {
    std::fs::create_dir_all(path).map_err(|e| StorageError::CreateDirectory {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Move a file or folder from `src` to `dst`. Uses `rename` first (fast,
/// atomic on the same filesystem) and falls back to copy + delete for
/// cross-device moves.
///
/// A pre-existing entry at `dst` is a conflict: the move is refused with
/// [`StorageError::DestinationExists`] rather than silently overwriting.
pub fn move_entry(src: &Path, dst: &Path) -> Result<(), StorageError> {
    if std::fs::symlink_metadata(src).is_err() {
        return Err(StorageError::MissingSource(src.to_path_buf()));
    }
    if std::fs::symlink_metadata(dst).is_ok() {
        return Err(StorageError::DestinationExists(dst.to_path_buf()));
    }
    if let Some(parent) = dst.parent() {
        ensure_directory(parent)?;
    }

    // Fast path: atomic rename
    if std::fs::rename(src, dst).is_ok() {
        return Ok(());
    }

    // Slow path: copy then remove original
    let map_err = |e: std::io::Error| StorageError::MoveEntry {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source: e,
    };
    if src.is_dir() {
        copy_dir_recursive(src, dst).map_err(map_err)?;
        std::fs::remove_dir_all(src).map_err(map_err)?;
    } else {
        std::fs::copy(src, dst).map_err(map_err)?;
        std::fs::remove_file(src).map_err(map_err)?;
    }
    Ok(())
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Create the full pipeline folder skeleton. Idempotent; returns the
/// directories that were newly created.
pub fn init_layout(paths: &TrackerPaths) -> Result<Vec<PathBuf>, StorageError> {
    let mut created = Vec::new();

    let mut wanted: Vec<PathBuf> = STAGING_BUCKETS
        .iter()
        .map(|b| paths.root.join(b))
        .collect();
    for bucket in STAGING_ARCHIVE_BUCKETS {
        wanted.push(paths.staging_root.join("archive").join(bucket));
    }
    for bucket in crate::location::ACTIVE_BUCKETS {
        wanted.push(paths.applications_root.join("active").join(bucket));
    }
    wanted.push(paths.applications_root.join("archive"));

    for dir in wanted {
        if !dir.exists() {
            ensure_directory(&dir)?;
            created.push(dir);
        }
    }

    if !created.is_empty() {
        info!("Created {} pipeline folders", created.len());
    }
    Ok(created)
}

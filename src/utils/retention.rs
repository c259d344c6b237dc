//! Archive retention: keep only the newest N archives per source type

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Delete all but the newest `limit` archives of one source type.
///
/// Archives are the regular files in `archive_dir` whose name starts with
/// `<type_name>_`, ordered by modification time with the file name breaking
/// ties. A zero or negative limit disables pruning, as does an archive count
/// below the limit. Returns the paths that were deleted; individual deletion
/// failures are logged and skipped.
pub fn prune_archives(archive_dir: &Path, type_name: &str, limit: i64) -> Result<Vec<PathBuf>> {
    if limit <= 0 {
        return Ok(Vec::new());
    }

    let prefix = format!("{}_", type_name);
    let mut archives: Vec<_> = fs::read_dir(archive_dir)
        .with_context(|| format!("Failed to read archive directory: {:?}", archive_dir))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_name().to_string_lossy().starts_with(&prefix)
                && entry
                    .file_type()
                    .map(|file_type| file_type.is_file())
                    .unwrap_or(false)
        })
        .collect();

    if (archives.len() as i64) < limit {
        return Ok(Vec::new());
    }

    // Sort oldest first
    archives.sort_by_key(|entry| {
        let modified = entry.metadata().and_then(|meta| meta.modified()).ok();
        (modified, entry.file_name())
    });

    let excess = archives.len() - limit as usize;
    let mut deleted = Vec::new();
    for entry in archives.into_iter().take(excess) {
        let path = entry.path();
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed old archive: {:?}", path);
                deleted.push(path);
            }
            Err(err) => warn!("Failed to remove old archive {:?}: {}", path, err),
        }
    }

    Ok(deleted)
}

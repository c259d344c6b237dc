//! Per-source-type run locking
//!
//! Backup methods mutate the backup root and the archive directory without
//! any coordination of their own, so runs touching the same source type are
//! serialized with an advisory file lock kept inside the backup root itself.

use anyhow::{Context, Result};
use fd_lock::{RwLock, RwLockWriteGuard};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Exclusive hold on one source type's backup run.
///
/// The lock file lives in the directory being backed up into, so processes
/// pointed at different backup roots never contend with each other.
pub struct RunLock {
    guard: Option<RwLockWriteGuard<'static, File>>,
    lock: *mut RwLock<File>,
    path: PathBuf,
}

impl RunLock {
    /// Acquire an exclusive lock for a source type under `lock_dir`.
    /// Fails when another run already holds the lock.
    pub fn acquire(lock_dir: &Path, type_name: &str) -> Result<Self> {
        std::fs::create_dir_all(lock_dir)
            .with_context(|| format!("Failed to create lock directory {}", lock_dir.display()))?;
        let path = lock_dir.join(format!(".{}.lock", type_name));

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)
            .with_context(|| format!("Failed to open lock file {}", path.display()))?;

        // The guard borrows the RwLock it came from, so the RwLock is pinned
        // on the heap and only reclaimed in Drop, after the guard is gone.
        let lock = Box::into_raw(Box::new(RwLock::new(file)));

        // SAFETY: `lock` came from Box::into_raw above and stays valid until
        // Drop reclaims it. The unbounded lifetime on the guard never escapes
        // the RunLock that owns both.
        let guard = match unsafe { &mut *lock }.try_write() {
            Ok(guard) => guard,
            Err(_) => {
                // SAFETY: no guard was handed out, reclaim the allocation.
                unsafe { drop(Box::from_raw(lock)) };
                anyhow::bail!("Source type '{}' is already being backed up", type_name);
            }
        };

        debug!("Acquired run lock {}", path.display());

        Ok(Self {
            guard: Some(guard),
            lock,
            path,
        })
    }

    /// Path of the lock file on disk
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        self.guard.take();
        // SAFETY: the guard borrowing this RwLock was released on the line
        // above, and the pointer came from Box::into_raw in acquire.
        unsafe { drop(Box::from_raw(self.lock)) };

        // Removing the file is best effort; the flock itself is already gone
        if let Err(err) = std::fs::remove_file(&self.path) {
            warn!("Failed to remove lock file {}: {}", self.path.display(), err);
        }
        debug!("Released run lock {}", self.path.display());
    }
}

//! Backup methods and the registry that executes them
//!
//! A method is one way of backing up a single path: mirror it locally,
//! mirror it to the remote target, or snapshot it into a timestamped
//! archive. The registry captures an immutable view of the configuration at
//! construction time and shells out through a [`CommandRunner`].

use crate::config::{Config, RemoteTarget};
use crate::utils::remote::build_remote_path;
use crate::utils::retention::prune_archives;
use crate::utils::runner::CommandRunner;
use anyhow::{Context, Result};
use chrono::Local;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Backup method selectable per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MethodName {
    /// Mirror the path into the local backup root
    LocalSync,
    /// Mirror the path to the remote target over ssh
    RemoteSync,
    /// Write a compressed snapshot into the archives directory
    LocalArchive,
}

impl MethodName {
    pub const ALL: [MethodName; 3] = [
        MethodName::LocalSync,
        MethodName::RemoteSync,
        MethodName::LocalArchive,
    ];

    /// External binaries this method shells out to
    pub fn required_tools(&self) -> &'static [&'static str] {
        match self {
            MethodName::LocalSync => &["rsync"],
            MethodName::RemoteSync => &["ssh", "rsync"],
            MethodName::LocalArchive => &["tar"],
        }
    }

    /// Whether this method requires a `[remote]` table in the config
    pub fn needs_remote(&self) -> bool {
        matches!(self, MethodName::RemoteSync)
    }
}

impl fmt::Display for MethodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MethodName::LocalSync => "local-sync",
            MethodName::RemoteSync => "remote-sync",
            MethodName::LocalArchive => "local-archive",
        };
        write!(f, "{}", name)
    }
}

/// Executes backup methods against a configuration snapshot taken at
/// construction time
pub struct MethodRegistry {
    backup_root: PathBuf,
    archives_dir: PathBuf,
    archive_limit: i64,
    remote: Option<RemoteTarget>,
    runner: Arc<dyn CommandRunner>,
    /// Timestamp shared by every archive this run creates
    run_stamp: String,
}

impl MethodRegistry {
    pub fn new(config: &Config, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            backup_root: config.global.backup_root.clone(),
            archives_dir: config.global.archives_dir(),
            archive_limit: config.global.archive_limit,
            remote: config.remote.clone(),
            runner,
            run_stamp: Local::now().format("%Y%m%d-%H%M%S").to_string(),
        }
    }

    /// Override the run timestamp (used by tests for stable archive names)
    pub fn with_run_stamp(mut self, stamp: &str) -> Self {
        self.run_stamp = stamp.to_string();
        self
    }

    pub fn run_stamp(&self) -> &str {
        &self.run_stamp
    }

    /// Execute one method for one path of a source type, returning the
    /// captured command output on success
    pub async fn run(&self, method: MethodName, type_name: &str, path: &Path) -> Result<String> {
        match method {
            MethodName::LocalSync => self.local_sync(path).await,
            MethodName::RemoteSync => self.remote_sync(type_name, path).await,
            MethodName::LocalArchive => self.local_archive(type_name, path).await,
        }
    }

    async fn local_sync(&self, path: &Path) -> Result<String> {
        info!("Syncing {:?} into {:?}", path, self.backup_root);

        let args = vec![
            "-a".to_string(),
            path.display().to_string(),
            self.backup_root.display().to_string(),
        ];
        self.runner.run("rsync", &args, false).await
    }

    async fn remote_sync(&self, type_name: &str, path: &Path) -> Result<String> {
        let remote = self
            .remote
            .as_ref()
            .context("remote-sync requires a [remote] table in the config")?;

        info!("Syncing {:?} to {}", path, remote.host);

        // Best-effort precondition: the mkdir result is intentionally
        // discarded. rsync surfaces the real error when the destination is
        // unusable.
        let mkdir_args = vec![
            "-p".to_string(),
            build_remote_path(remote, Some(type_name), false),
        ];
        if let Err(err) = self.runner.run("mkdir", &mkdir_args, true).await {
            warn!("Remote mkdir failed (continuing): {}", err);
        }

        let args = vec![
            "-az".to_string(),
            path.display().to_string(),
            build_remote_path(remote, Some(type_name), true),
        ];
        self.runner.run("rsync", &args, false).await
    }

    async fn local_archive(&self, type_name: &str, path: &Path) -> Result<String> {
        std::fs::create_dir_all(&self.archives_dir)
            .with_context(|| format!("Failed to create archive directory: {:?}", self.archives_dir))?;

        let archive_path = self
            .archives_dir
            .join(format!("{}_{}.tar.gz", type_name, self.run_stamp));
        info!("Archiving {:?} as {:?}", path, archive_path);

        let args = vec![
            "-C".to_string(),
            path.display().to_string(),
            "-czf".to_string(),
            archive_path.display().to_string(),
            ".".to_string(),
        ];
        let output = self.runner.run("tar", &args, false).await?;

        // The archive itself succeeded; pruning problems only get logged
        match prune_archives(&self.archives_dir, type_name, self.archive_limit) {
            Ok(deleted) if !deleted.is_empty() => {
                info!("Pruned {} old {} archive(s)", deleted.len(), type_name);
            }
            Ok(_) => {}
            Err(err) => warn!("Archive pruning failed for {}: {}", type_name, err),
        }

        Ok(output)
    }
}

//! Fluent API for building test configurations
//!
//! Provides a builder pattern for creating test configurations with sensible
//! defaults: every directory the config points at exists under one temp dir.

use backup_manager::config::{
    Config, GlobalConfig, NotificationConfig, RemoteTarget, SourcePaths,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Builder for creating test configurations
pub struct ConfigBuilder {
    temp_dir: TempDir,
    global: GlobalConfig,
    remote: Option<RemoteTarget>,
    notifications: NotificationConfig,
    sources: BTreeMap<String, SourcePaths>,
}

impl ConfigBuilder {
    /// Create a new ConfigBuilder with minimal defaults and no sources
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let backup_root = temp_dir.path().join("backup");
        fs::create_dir_all(&backup_root).expect("Failed to create backup root");

        let log_directory = temp_dir.path().join("logs");
        fs::create_dir_all(&log_directory).expect("Failed to create log directory");

        let global = GlobalConfig {
            backup_root,
            archive_limit: 3,
            log_directory,
            log_level: "info".to_string(),
            log_max_files: 5,
        };

        let notifications = NotificationConfig {
            desktop: false,
            file: None,
        };

        Self {
            temp_dir,
            global,
            remote: None,
            notifications,
            sources: BTreeMap::new(),
        }
    }

    /// Create a config with one single-path source named `dev`
    pub fn minimal() -> Self {
        Self::new().add_source("dev")
    }

    /// Add a single-path source; the directory is created with one file in it
    pub fn add_source(mut self, name: &str) -> Self {
        let path = self.make_source_dir(name);
        self.sources.insert(name.to_string(), SourcePaths::Single(path));
        self
    }

    /// Add a multi-path source with `count` directories
    pub fn add_source_with_paths(mut self, name: &str, count: usize) -> Self {
        let paths: Vec<PathBuf> = (0..count)
            .map(|i| self.make_source_dir(&format!("{}-{}", name, i)))
            .collect();
        self.sources.insert(name.to_string(), SourcePaths::Many(paths));
        self
    }

    /// Set the remote target
    pub fn with_remote(mut self, remote: RemoteTarget) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Set the archive retention limit
    pub fn with_archive_limit(mut self, limit: i64) -> Self {
        self.global.archive_limit = limit;
        self
    }

    /// Enable or disable desktop notifications
    pub fn with_desktop_notifications(mut self, desktop: bool) -> Self {
        self.notifications.desktop = desktop;
        self
    }

    /// Route the file notification channel into the temp dir
    pub fn with_notification_file(mut self) -> Self {
        self.notifications.file = Some(self.temp_dir.path().join("notifications.jsonl"));
        self
    }

    /// The backup root the config points at
    pub fn backup_root(&self) -> PathBuf {
        self.global.backup_root.clone()
    }

    /// The archive directory under the backup root
    pub fn archives_dir(&self) -> PathBuf {
        self.global.backup_root.join("archives")
    }

    /// Path of a single-path source added earlier
    pub fn source_path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join("sources").join(name)
    }

    /// Build the config, dropping the temp directory with the builder's caller
    pub fn build(self) -> Config {
        Config {
            global: self.global,
            remote: self.remote,
            notifications: self.notifications,
            sources: self.sources,
        }
    }

    /// Keep the temp directory (don't delete on drop)
    pub fn persist(self) -> (Config, TempDir) {
        let config = Config {
            global: self.global,
            remote: self.remote,
            notifications: self.notifications,
            sources: self.sources,
        };
        (config, self.temp_dir)
    }

    fn make_source_dir(&self, name: &str) -> PathBuf {
        let path = self.temp_dir.path().join("sources").join(name);
        fs::create_dir_all(&path).expect("Failed to create source dir");
        fs::write(path.join("data.txt"), format!("content of {}", name))
            .expect("Failed to seed source dir");
        path
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

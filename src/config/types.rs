use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub global: GlobalConfig,
    #[serde(default)]
    pub remote: Option<RemoteTarget>,
    #[serde(default)]
    pub notifications: NotificationConfig,
    pub sources: BTreeMap<String, SourcePaths>,
}

impl Config {
    /// Resolved path of the file notification channel.
    pub fn notification_file(&self) -> PathBuf {
        self.notifications
            .file
            .clone()
            .unwrap_or_else(|| self.global.log_directory.join("notifications.jsonl"))
    }
}

/// Global configuration settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalConfig {
    /// Destination directory for local sync and archives
    pub backup_root: PathBuf,

    /// Archives kept per source type; zero or negative disables pruning
    #[serde(default = "default_archive_limit")]
    pub archive_limit: i64,

    /// Logging configuration
    #[serde(default = "default_log_directory")]
    pub log_directory: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_max_files")]
    pub log_max_files: u32,
}

impl GlobalConfig {
    /// Directory that archive backups are written into.
    pub fn archives_dir(&self) -> PathBuf {
        self.backup_root.join("archives")
    }
}

/// Remote sync destination (the `[remote]` table)
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RemoteTarget {
    #[serde(default)]
    pub user: Option<String>,
    pub host: String,
    #[serde(default)]
    pub dir: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

/// Paths backed up under one source type: a single path or a list
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SourcePaths {
    Single(PathBuf),
    Many(Vec<PathBuf>),
}

impl SourcePaths {
    pub fn paths(&self) -> &[PathBuf] {
        match self {
            SourcePaths::Single(path) => std::slice::from_ref(path),
            SourcePaths::Many(paths) => paths,
        }
    }
}

/// Notification sink configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    /// Whether to send desktop notifications via notify-send
    #[serde(default = "default_desktop")]
    pub desktop: bool,

    /// File the file channel appends JSON records to
    /// (defaults to `<log_directory>/notifications.jsonl`)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            desktop: default_desktop(),
            file: None,
        }
    }
}

// Default value functions

fn default_archive_limit() -> i64 { 3 }
fn default_log_directory() -> PathBuf { PathBuf::from("~/logs") }
fn default_log_level() -> String { "info".to_string() }
fn default_log_max_files() -> u32 { 10 }
fn default_desktop() -> bool { true }

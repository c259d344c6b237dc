//! Test fixtures and sample data
//!
//! Provides pre-built test data and templates for testing.

use backup_manager::config::RemoteTarget;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// A fully populated remote target
pub fn sample_remote() -> RemoteTarget {
    RemoteTarget {
        user: Some("vee".to_string()),
        host: "nas.local".to_string(),
        dir: Some("/srv/backup".to_string()),
        port: Some(2222),
    }
}

/// A remote target with only a host configured
pub fn bare_remote(host: &str) -> RemoteTarget {
    RemoteTarget {
        user: None,
        host: host.to_string(),
        dir: None,
        port: None,
    }
}

/// Seed archive files for one source type, oldest first.
///
/// Each stamp becomes `<type>_<stamp>.tar.gz` with a modification time one
/// second later than the previous file, so the listing order is unambiguous.
pub fn seed_archives(archive_dir: &Path, type_name: &str, stamps: &[&str]) -> Vec<PathBuf> {
    fs::create_dir_all(archive_dir).expect("Failed to create archive dir");

    let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    stamps
        .iter()
        .enumerate()
        .map(|(i, stamp)| {
            let path = archive_dir.join(format!("{}_{}.tar.gz", type_name, stamp));
            fs::write(&path, "archive").expect("Failed to write archive");
            let file = fs::OpenOptions::new()
                .write(true)
                .open(&path)
                .expect("Failed to reopen archive");
            file.set_modified(base + Duration::from_secs(i as u64))
                .expect("Failed to set mtime");
            path
        })
        .collect()
}

/// Archive file names in an archive directory, lexically sorted
pub fn archive_names(archive_dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(archive_dir)
        .expect("Failed to read archive dir")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

/// Minimal valid config TOML template (`{root}` placeholder)
pub fn minimal_config_toml() -> &'static str {
    r#"
[global]
backup_root = "{root}/backup"
log_directory = "{root}/logs"

[sources]
dev = "{root}/dev"
"#
}

/// Config template with a remote target and a multi-path source
pub fn full_config_toml() -> &'static str {
    r#"
[global]
backup_root = "{root}/backup"
archive_limit = 5
log_directory = "{root}/logs"
log_level = "debug"

[remote]
user = "vee"
host = "nas.local"
dir = "/srv/backup"
port = 2222

[notifications]
desktop = false
file = "{root}/notifications.jsonl"

[sources]
dev = "{root}/dev"
docs = ["{root}/docs", "{root}/notes"]
"#
}

/// Substitute `{root}` in a config template
pub fn render_config(template: &str, root: &Path) -> String {
    template.replace("{root}", &root.display().to_string())
}

//! Unit tests for configuration loading and validation

use backup_manager::config::load_config;
use std::fs;
use test_utils::{
    full_config_toml, minimal_config_toml, render_config, ConfigBuilder, TestContext,
};

#[test]
fn test_config_round_trips_through_toml() {
    let builder = ConfigBuilder::minimal().add_source_with_paths("docs", 2);
    let (config, temp_dir) = builder.persist();

    // Write config to file
    let config_path = temp_dir.path().join("config.toml");
    let toml_str = toml::to_string_pretty(&config).unwrap();
    fs::write(&config_path, toml_str).unwrap();

    // Load and verify
    let loaded = load_config(&config_path).unwrap();
    assert_eq!(loaded.global.backup_root, config.global.backup_root);
    assert_eq!(loaded.global.archive_limit, config.global.archive_limit);
    assert!(loaded.sources.contains_key("dev"));
    assert_eq!(loaded.sources["docs"].paths().len(), 2);
}

#[test]
fn test_minimal_template_loads_with_defaults() {
    let ctx = TestContext::new();
    let contents = render_config(minimal_config_toml(), ctx.temp_dir());
    let config_path = ctx.create_file("config.toml", &contents);

    let config = load_config(&config_path).unwrap();

    assert_eq!(config.global.archive_limit, 3);
    assert_eq!(config.global.log_level, "info");
    assert!(config.remote.is_none());
    assert!(config.notifications.desktop);
}

#[test]
fn test_full_template_loads_every_section() {
    let ctx = TestContext::new();
    let contents = render_config(full_config_toml(), ctx.temp_dir());
    let config_path = ctx.create_file("config.toml", &contents);

    let config = load_config(&config_path).unwrap();

    assert_eq!(config.global.archive_limit, 5);
    let remote = config.remote.as_ref().unwrap();
    assert_eq!(remote.user.as_deref(), Some("vee"));
    assert_eq!(remote.port, Some(2222));
    assert!(!config.notifications.desktop);
    assert_eq!(config.sources.len(), 2);
}

#[test]
fn test_single_and_many_source_paths() {
    let ctx = TestContext::new();
    let contents = render_config(full_config_toml(), ctx.temp_dir());
    let config_path = ctx.create_file("config.toml", &contents);

    let config = load_config(&config_path).unwrap();

    assert_eq!(config.sources["dev"].paths().len(), 1);
    assert_eq!(config.sources["docs"].paths().len(), 2);
}

#[test]
fn test_empty_remote_user_normalized_to_none() {
    let ctx = TestContext::new();
    let config_path = ctx.create_file(
        "config.toml",
        r#"
[global]
backup_root = "/backup"

[remote]
user = ""
host = "nas.local"
dir = ""

[sources]
dev = "/home/vee/dev"
"#,
    );

    let config = load_config(&config_path).unwrap();
    let remote = config.remote.as_ref().unwrap();
    assert_eq!(remote.user, None);
    assert_eq!(remote.dir, None);
}

#[test]
fn test_rejects_zero_remote_port() {
    let ctx = TestContext::new();
    let config_path = ctx.create_file(
        "config.toml",
        r#"
[global]
backup_root = "/backup"

[remote]
host = "nas.local"
port = 0

[sources]
dev = "/home/vee/dev"
"#,
    );

    assert!(load_config(&config_path).is_err());
}

#[test]
fn test_rejects_config_without_sources_table() {
    let ctx = TestContext::new();
    let config_path = ctx.create_file(
        "config.toml",
        r#"
[global]
backup_root = "/backup"
"#,
    );

    assert!(load_config(&config_path).is_err());
}

#[test]
fn test_rejects_empty_file() {
    let ctx = TestContext::new();
    let config_path = ctx.create_file("config.toml", "");

    assert!(load_config(&config_path).is_err());
}

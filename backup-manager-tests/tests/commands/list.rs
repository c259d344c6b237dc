//! Tests for the 'list' command
//!
//! The list command enumerates configured source types and the fixed set of
//! backup methods.

use test_utils::{ConfigBuilder, MethodName};

#[test]
fn test_all_sources_are_listed() {
    let config = ConfigBuilder::minimal()
        .add_source("docs")
        .add_source("music")
        .build();

    assert_eq!(config.sources.len(), 3);
    assert!(config.sources.contains_key("dev"));
    assert!(config.sources.contains_key("docs"));
    assert!(config.sources.contains_key("music"));
}

#[test]
fn test_sources_iterate_in_name_order() {
    let config = ConfigBuilder::new()
        .add_source("zulu")
        .add_source("alpha")
        .build();

    let names: Vec<&String> = config.sources.keys().collect();
    assert_eq!(names, vec!["alpha", "zulu"]);
}

#[test]
fn test_method_set_is_fixed() {
    assert_eq!(MethodName::ALL.len(), 3);

    let rendered: Vec<String> = MethodName::ALL.iter().map(|m| m.to_string()).collect();
    assert_eq!(rendered, vec!["local-sync", "remote-sync", "local-archive"]);
}

#[test]
fn test_methods_declare_their_tools() {
    assert_eq!(MethodName::LocalSync.required_tools(), &["rsync"]);
    assert_eq!(MethodName::RemoteSync.required_tools(), &["ssh", "rsync"]);
    assert_eq!(MethodName::LocalArchive.required_tools(), &["tar"]);

    assert!(MethodName::RemoteSync.needs_remote());
    assert!(!MethodName::LocalSync.needs_remote());
    assert!(!MethodName::LocalArchive.needs_remote());
}

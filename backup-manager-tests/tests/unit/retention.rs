//! Unit tests for archive retention

use backup_manager::utils::retention::prune_archives;
use rstest::rstest;
use tempfile::TempDir;
use test_utils::{archive_names, seed_archives};

/// Stamps for a run of daily archives, oldest first
fn daily_stamps(count: usize) -> Vec<String> {
    (1..=count)
        .map(|day| format!("202401{:02}-000000", day))
        .collect()
}

#[rstest]
#[case(0, 3)]
#[case(2, 3)]
#[case(3, 3)]
#[case(4, 3)]
#[case(10, 3)]
#[case(5, 1)]
fn test_deletes_exactly_the_excess(#[case] count: usize, #[case] limit: i64) {
    let temp_dir = TempDir::new().unwrap();
    let stamps = daily_stamps(count);
    let stamp_refs: Vec<&str> = stamps.iter().map(String::as_str).collect();
    seed_archives(temp_dir.path(), "dev", &stamp_refs);

    let deleted = prune_archives(temp_dir.path(), "dev", limit).unwrap();

    // Under the limit nothing is pruned, at or over it only the excess is
    assert_eq!(deleted.len(), count.saturating_sub(limit as usize));
}

#[rstest]
#[case(0)]
#[case(-1)]
#[case(-100)]
fn test_non_positive_limit_never_deletes(#[case] limit: i64) {
    let temp_dir = TempDir::new().unwrap();
    seed_archives(
        temp_dir.path(),
        "dev",
        &["20240101-000000", "20240102-000000", "20240103-000000"],
    );

    let deleted = prune_archives(temp_dir.path(), "dev", limit).unwrap();

    assert!(deleted.is_empty());
    assert_eq!(archive_names(temp_dir.path()).len(), 3);
}

#[test]
fn test_survivors_are_the_most_recent() {
    let temp_dir = TempDir::new().unwrap();
    let stamps = daily_stamps(5);
    let stamp_refs: Vec<&str> = stamps.iter().map(String::as_str).collect();
    seed_archives(temp_dir.path(), "dev", &stamp_refs);

    prune_archives(temp_dir.path(), "dev", 3).unwrap();

    assert_eq!(
        archive_names(temp_dir.path()),
        vec![
            "dev_20240103-000000.tar.gz",
            "dev_20240104-000000.tar.gz",
            "dev_20240105-000000.tar.gz",
        ]
    );
}

#[test]
fn test_prune_keys_off_the_type_prefix() {
    let temp_dir = TempDir::new().unwrap();
    seed_archives(
        temp_dir.path(),
        "dev",
        &["20240101-000000", "20240102-000000", "20240103-000000", "20240104-000000"],
    );
    seed_archives(temp_dir.path(), "docs", &["20240101-000000"]);

    let deleted = prune_archives(temp_dir.path(), "dev", 3).unwrap();

    assert_eq!(deleted.len(), 1);
    // The other source type's archive is untouched
    assert!(archive_names(temp_dir.path()).contains(&"docs_20240101-000000.tar.gz".to_string()));
}

#[test]
fn test_repeated_prune_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let stamps = daily_stamps(6);
    let stamp_refs: Vec<&str> = stamps.iter().map(String::as_str).collect();
    seed_archives(temp_dir.path(), "dev", &stamp_refs);

    let first = prune_archives(temp_dir.path(), "dev", 3).unwrap();
    let second = prune_archives(temp_dir.path(), "dev", 3).unwrap();

    assert_eq!(first.len(), 3);
    // At the limit now, nothing left to delete
    assert!(second.is_empty());
    assert_eq!(archive_names(temp_dir.path()).len(), 3);
}

#[test]
fn test_listing_failure_surfaces_as_error() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("absent");

    assert!(prune_archives(&missing, "dev", 3).is_err());
}

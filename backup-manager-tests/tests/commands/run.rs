//! Tests for the 'run' command
//!
//! The run command fans backup methods out over source paths and aggregates
//! the outcomes per batch. Everything here goes through MockRunner, so no
//! external tool is ever spawned.

use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use test_utils::{
    sample_remote, Channels, ConfigBuilder, Dispatcher, MemorySink, MethodName, MethodRegistry,
    MockResponse, MockRunner,
};

fn dispatcher_from(
    builder: ConfigBuilder,
    runner: MockRunner,
    sink: MemorySink,
) -> (Dispatcher, TempDir) {
    let (config, temp_dir) = builder.persist();
    let registry = Arc::new(MethodRegistry::new(&config, Arc::new(runner)));
    (Dispatcher::new(config, registry, Arc::new(sink)), temp_dir)
}

#[tokio::test]
async fn test_mixed_batch_summarizes_each_outcome_once() {
    let builder = ConfigBuilder::new().add_source_with_paths("docs", 3);
    let paths = vec![
        builder.source_path("docs-0"),
        builder.source_path("docs-1"),
        builder.source_path("docs-2"),
    ];

    let runner = MockRunner::new().expect_arg(
        "docs-1",
        MockResponse::Failure {
            stderr: "rsync: permission denied".to_string(),
            exit_code: 23,
        },
    );
    let sink = MemorySink::new();
    let (dispatcher, _temp_dir) = dispatcher_from(builder, runner, sink.clone());

    let outcome = dispatcher
        .start_method("docs", paths.clone(), MethodName::LocalSync)
        .await
        .unwrap();

    assert_eq!(outcome.succeeded, 2);
    assert_eq!(outcome.failed, 1);

    // One started event, then exactly one summary per outcome kind
    let sent = sink.get_sent();
    assert_eq!(sent.len(), 3);

    let success = sent
        .iter()
        .find(|event| event.title == "Succeeded docs backup")
        .unwrap();
    assert!(success.body.contains(&paths[0].display().to_string()));
    assert!(success.body.contains(&paths[2].display().to_string()));
    assert!(!success.body.contains(&paths[1].display().to_string()));

    let failure = sent
        .iter()
        .find(|event| event.title == "Failed docs backup")
        .unwrap();
    assert!(failure.body.contains(&paths[1].display().to_string()));
}

#[tokio::test]
async fn test_batch_summary_waits_for_every_path() {
    let builder = ConfigBuilder::new().add_source_with_paths("docs", 3);
    let paths = vec![
        builder.source_path("docs-0"),
        builder.source_path("docs-1"),
        builder.source_path("docs-2"),
    ];

    // The first path finishes long after the others
    let runner = MockRunner::new().with_delay("docs-0", Duration::from_millis(80));
    let sink = MemorySink::new();
    let (dispatcher, _temp_dir) = dispatcher_from(builder, runner, sink.clone());

    let handle = dispatcher.start_method("docs", paths, MethodName::LocalSync);

    tokio::time::sleep(Duration::from_millis(20)).await;
    // Two paths have settled by now, but no summary may fire yet
    assert_eq!(sink.titles(), vec!["Start docs backup"]);

    handle.await.unwrap();

    let titles = sink.titles();
    assert_eq!(titles.len(), 2);
    assert_eq!(titles[1], "Succeeded docs backup");
}

#[tokio::test]
async fn test_single_path_skips_batch_bookkeeping() {
    let builder = ConfigBuilder::minimal();
    let path = builder.source_path("dev");

    let sink = MemorySink::new();
    let (dispatcher, _temp_dir) = dispatcher_from(builder, MockRunner::new(), sink.clone());

    dispatcher
        .start_method("dev", vec![path], MethodName::LocalSync)
        .await
        .unwrap();

    let sent = sink.get_sent();
    assert_eq!(sent.len(), 2);
    // No aggregated path list in the single-path summary
    assert_eq!(sent[1].body, "Method: local-sync");
    assert_eq!(sent[1].channels, Channels::ALL);
}

#[tokio::test]
async fn test_remote_sync_attempts_sync_after_mkdir_failure() {
    let builder = ConfigBuilder::minimal().with_remote(sample_remote());
    let path = builder.source_path("dev");

    let runner = MockRunner::new().expect(
        "mkdir",
        MockResponse::Failure {
            stderr: "mkdir: cannot create directory: Permission denied".to_string(),
            exit_code: 1,
        },
    );
    let sink = MemorySink::new();
    let (dispatcher, _temp_dir) = dispatcher_from(builder, runner.clone(), sink.clone());

    let outcome = dispatcher
        .start_method("dev", vec![path.clone()], MethodName::RemoteSync)
        .await
        .unwrap();

    // The sync ran with the same arguments it would have used after a
    // successful mkdir
    assert_eq!(outcome.succeeded, 1);
    let calls = runner.get_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].program, "mkdir");
    assert_eq!(calls[1].program, "rsync");
    assert_eq!(
        calls[1].args,
        vec![
            "-az".to_string(),
            path.display().to_string(),
            "vee@nas.local:/srv/backup/dev".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_run_selection_aggregates_across_batches() {
    let builder = ConfigBuilder::minimal().add_source_with_paths("docs", 2);

    let runner = MockRunner::new();
    let sink = MemorySink::new();
    let (dispatcher, _temp_dir) = dispatcher_from(builder, runner.clone(), sink.clone());

    let summary = dispatcher
        .run_selection(
            &["dev".to_string(), "docs".to_string()],
            &[MethodName::LocalSync],
        )
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.failed, 0);
    assert!(summary.all_succeeded());
    assert_eq!(runner.call_count("rsync"), 3);
}

#[tokio::test]
async fn test_run_selection_counts_failures_without_aborting() {
    let builder = ConfigBuilder::minimal().add_source_with_paths("docs", 2);

    let runner = MockRunner::new().expect_arg(
        "docs-0",
        MockResponse::Failure {
            stderr: "disk full".to_string(),
            exit_code: 11,
        },
    );
    let sink = MemorySink::new();
    let (dispatcher, _temp_dir) = dispatcher_from(builder, runner, sink.clone());

    let summary = dispatcher
        .run_selection(
            &["dev".to_string(), "docs".to_string()],
            &[MethodName::LocalSync],
        )
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert!(!summary.all_succeeded());

    // Both batches still reported
    let titles = sink.titles();
    assert!(titles.contains(&"Succeeded dev backup".to_string()));
    assert!(titles.contains(&"Failed docs backup".to_string()));
}

#[tokio::test]
async fn test_run_selection_rejects_unknown_type_upfront() {
    let builder = ConfigBuilder::minimal();

    let runner = MockRunner::new();
    let sink = MemorySink::new();
    let (dispatcher, _temp_dir) = dispatcher_from(builder, runner.clone(), sink.clone());

    let err = dispatcher
        .run_selection(&["absent".to_string()], &[MethodName::LocalSync])
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Unknown source type"));
    assert!(runner.get_calls().is_empty());
    assert!(sink.get_sent().is_empty());
}

#[tokio::test]
async fn test_local_archive_batch_prunes_after_success() {
    let builder = ConfigBuilder::minimal().with_archive_limit(3);
    let archives_dir = builder.archives_dir();
    test_utils::seed_archives(
        &archives_dir,
        "dev",
        &[
            "20240101-000000",
            "20240102-000000",
            "20240103-000000",
            "20240104-000000",
        ],
    );

    let runner = MockRunner::new();
    let sink = MemorySink::new();
    let (dispatcher, _temp_dir) = dispatcher_from(builder, runner.clone(), sink.clone());

    let summary = dispatcher
        .run_selection(&["dev".to_string()], &[MethodName::LocalArchive])
        .await
        .unwrap();

    assert!(summary.all_succeeded());
    assert_eq!(runner.call_count("tar"), 1);

    // The excess beyond the limit is gone, oldest first
    let names = test_utils::archive_names(&archives_dir);
    assert_eq!(
        names,
        vec![
            "dev_20240102-000000.tar.gz",
            "dev_20240103-000000.tar.gz",
            "dev_20240104-000000.tar.gz",
        ]
    );
}

//! Dispatch and aggregation: fan a backup method out over the paths of a
//! source type, then report each batch with at most one success and one
//! failure summary

use crate::config::Config;
use crate::managers::notification::{Channels, NotificationSink};
use crate::methods::{MethodName, MethodRegistry};
use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Progress of one fan-out over the paths of a source type
#[derive(Debug)]
pub struct Batch {
    total: usize,
    succeeded: Vec<PathBuf>,
    failed: Vec<PathBuf>,
}

impl Batch {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Record one path outcome
    pub fn record(&mut self, path: PathBuf, succeeded: bool) {
        if succeeded {
            self.succeeded.push(path);
        } else {
            self.failed.push(path);
        }
    }

    /// Whether every path has reported back
    pub fn is_settled(&self) -> bool {
        self.succeeded.len() + self.failed.len() == self.total
    }

    /// Paths that succeeded, in completion order
    pub fn succeeded(&self) -> &[PathBuf] {
        &self.succeeded
    }

    /// Paths that failed, in completion order
    pub fn failed(&self) -> &[PathBuf] {
        &self.failed
    }
}

/// Final tally of one dispatched batch
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub type_name: String,
    pub method: MethodName,
    pub succeeded: usize,
    pub failed: usize,
}

/// Aggregate path counts across every batch of a run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Launches backup batches and aggregates their outcomes
pub struct Dispatcher {
    config: Config,
    registry: Arc<MethodRegistry>,
    sink: Arc<dyn NotificationSink>,
}

impl Dispatcher {
    pub fn new(config: Config, registry: Arc<MethodRegistry>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            config,
            registry,
            sink,
        }
    }

    /// Start one batch: every path of a source type through one method.
    ///
    /// The started event is sent before this returns; the per-path
    /// invocations run on a spawned task. The handle yields the final tally,
    /// and dropping it does not cancel the batch.
    pub fn start_method(
        &self,
        type_name: &str,
        paths: Vec<PathBuf>,
        method: MethodName,
    ) -> JoinHandle<BatchOutcome> {
        notify(
            &self.sink,
            &format!("Start {} backup", type_name),
            &format!("Method: {}", method),
            Channels::CLI,
        );

        let registry = Arc::clone(&self.registry);
        let sink = Arc::clone(&self.sink);
        let type_name = type_name.to_string();

        tokio::spawn(async move { drive_batch(registry, sink, type_name, paths, method).await })
    }

    /// Dispatch every requested method for every requested source type and
    /// wait for all batches to settle.
    ///
    /// Unknown source types and remote methods without a `[remote]` table are
    /// rejected before anything is dispatched. Path failures are folded into
    /// the summary instead of aborting the run.
    pub async fn run_selection(
        &self,
        types: &[String],
        methods: &[MethodName],
    ) -> Result<RunSummary> {
        let mut selection = Vec::new();
        for type_name in types {
            match self.config.sources.get(type_name) {
                Some(paths) => selection.push((type_name.clone(), paths.paths().to_vec())),
                None => anyhow::bail!("Unknown source type: {}", type_name),
            }
        }

        if self.config.remote.is_none() {
            if let Some(method) = methods.iter().find(|method| method.needs_remote()) {
                anyhow::bail!("Method {} requires a [remote] table in the config", method);
            }
        }

        let mut handles = Vec::new();
        for (type_name, paths) in &selection {
            for method in methods {
                handles.push(self.start_method(type_name, paths.clone(), *method));
            }
        }

        let mut summary = RunSummary::default();
        for handle in handles {
            match handle.await {
                Ok(outcome) => {
                    summary.succeeded += outcome.succeeded;
                    summary.failed += outcome.failed;
                }
                Err(err) => {
                    // A lost batch task counts as one failure
                    error!("Batch task failed: {}", err);
                    summary.failed += 1;
                }
            }
        }

        self.sink.flush().await;

        info!(
            "Run summary: {} path(s) succeeded, {} failed",
            summary.succeeded, summary.failed
        );

        Ok(summary)
    }
}

/// Send a notification, downgrading delivery problems to warnings
fn notify(sink: &Arc<dyn NotificationSink>, title: &str, body: &str, channels: Channels) {
    if let Err(err) = sink.send(title, body, channels) {
        warn!("Failed to send notification: {}", err);
    }
}

/// Run every path of a batch to completion and emit the settlement summaries
async fn drive_batch(
    registry: Arc<MethodRegistry>,
    sink: Arc<dyn NotificationSink>,
    type_name: String,
    paths: Vec<PathBuf>,
    method: MethodName,
) -> BatchOutcome {
    // Single-path batches settle directly, without batch bookkeeping
    if paths.len() == 1 {
        let path = &paths[0];
        let body = format!("Method: {}", method);
        return match registry.run(method, &type_name, path).await {
            Ok(_) => {
                notify(
                    &sink,
                    &format!("Succeeded {} backup", type_name),
                    &body,
                    Channels::ALL,
                );
                BatchOutcome {
                    type_name,
                    method,
                    succeeded: 1,
                    failed: 0,
                }
            }
            Err(err) => {
                error!("{} backup failed for {:?}: {}", type_name, path, err);
                notify(
                    &sink,
                    &format!("Failed {} backup", type_name),
                    &body,
                    Channels::ALL,
                );
                BatchOutcome {
                    type_name,
                    method,
                    succeeded: 0,
                    failed: 1,
                }
            }
        };
    }

    let mut batch = Batch::new(paths.len());

    let mut invocations: FuturesUnordered<_> = paths
        .into_iter()
        .map(|path| {
            let registry = Arc::clone(&registry);
            let type_name = type_name.clone();
            async move {
                let result = registry.run(method, &type_name, &path).await;
                (path, result)
            }
        })
        .collect();

    // Outcomes arrive in process completion order, not configuration order
    while !batch.is_settled() {
        match invocations.next().await {
            Some((path, Ok(_))) => batch.record(path, true),
            Some((path, Err(err))) => {
                error!("{} backup failed for {:?}: {}", type_name, path, err);
                batch.record(path, false);
            }
            None => break,
        }
    }

    summarize(&sink, &type_name, method, &batch);

    BatchOutcome {
        type_name,
        method,
        succeeded: batch.succeeded().len(),
        failed: batch.failed().len(),
    }
}

/// Emit at most one success and one failure summary for a settled batch
fn summarize(sink: &Arc<dyn NotificationSink>, type_name: &str, method: MethodName, batch: &Batch) {
    if !batch.succeeded().is_empty() {
        notify(
            sink,
            &format!("Succeeded {} backup", type_name),
            &format!("Method: {}, paths: {}", method, join_paths(batch.succeeded())),
            Channels::ALL,
        );
    }
    if !batch.failed().is_empty() {
        notify(
            sink,
            &format!("Failed {} backup", type_name),
            &format!("Method: {}, paths: {}", method, join_paths(batch.failed())),
            Channels::ALL,
        );
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

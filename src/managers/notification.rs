//! Notification fan-out across the cli, desktop, and file channels
//!
//! Every event carries a channel mask: zero selects every channel, any other
//! value selects the channels whose bits are set. Desktop delivery shells out
//! to notify-send without waiting for it; `flush` drains those in-flight
//! deliveries before process exit.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Local;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::utils::runner::CommandRunner;

/// Channel selection bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channels(pub u8);

impl Channels {
    /// Every channel
    pub const ALL: Channels = Channels(0);
    pub const CLI: Channels = Channels(1);
    pub const DESKTOP: Channels = Channels(2);
    pub const FILE: Channels = Channels(4);

    /// Whether the mask selects the given channel
    pub fn contains(&self, channel: Channels) -> bool {
        self.0 == 0 || self.0 & channel.0 == channel.0
    }
}

impl std::ops::BitOr for Channels {
    type Output = Channels;

    fn bitor(self, rhs: Channels) -> Channels {
        Channels(self.0 | rhs.0)
    }
}

/// Delivery boundary for notification events, mockable in tests
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver an event to every channel the mask selects
    fn send(&self, title: &str, body: &str, channels: Channels) -> Result<()>;

    /// Wait for in-flight deliveries to finish
    async fn flush(&self);
}

/// Real sink: stdout lines, notify-send subprocesses, and a JSON-lines file
pub struct Notifier {
    desktop: bool,
    file: PathBuf,
    runner: Arc<dyn CommandRunner>,
    /// In-flight desktop notification tasks
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl Notifier {
    pub fn new(desktop: bool, file: PathBuf, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            desktop,
            file,
            runner,
            pending: Mutex::new(Vec::new()),
        }
    }

    fn send_desktop(&self, title: &str, body: &str) {
        let runner = Arc::clone(&self.runner);
        let args = vec![title.to_string(), body.to_string()];
        let handle = tokio::spawn(async move {
            if let Err(err) = runner.run("notify-send", &args, false).await {
                warn!("notify-send failed: {}", err);
            }
        });
        self.pending.lock().unwrap().push(handle);
    }

    fn send_file(&self, title: &str, body: &str) -> Result<()> {
        if let Some(parent) = self.file.parent() {
            fs::create_dir_all(parent)?;
        }

        let record = serde_json::json!({
            "time": Local::now().to_rfc3339(),
            "title": title,
            "body": body,
        });

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file)?;
        writeln!(file, "{}", record)?;
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for Notifier {
    fn send(&self, title: &str, body: &str, channels: Channels) -> Result<()> {
        if channels.contains(Channels::CLI) {
            println!("{}: {}", title, body);
        }
        if self.desktop && channels.contains(Channels::DESKTOP) {
            self.send_desktop(title, body);
        }
        if channels.contains(Channels::FILE) {
            self.send_file(title, body)?;
        }
        Ok(())
    }

    async fn flush(&self) {
        let pending = std::mem::take(&mut *self.pending.lock().unwrap());
        for handle in pending {
            if let Err(err) = handle.await {
                warn!("Desktop notification task failed: {}", err);
            }
        }
    }
}

/// A recording sink for tests. Available for use in external test crates.
#[allow(dead_code)]
pub mod mock {
    use super::*;

    /// One recorded notification event
    #[derive(Clone, Debug)]
    pub struct SentNotification {
        pub title: String,
        pub body: String,
        pub channels: Channels,
    }

    /// Sink that records events in memory
    #[derive(Clone, Default)]
    pub struct MemorySink {
        pub sent: Arc<Mutex<Vec<SentNotification>>>,
    }

    impl MemorySink {
        pub fn new() -> Self {
            Self::default()
        }

        /// Get all recorded events
        pub fn get_sent(&self) -> Vec<SentNotification> {
            self.sent.lock().unwrap().clone()
        }

        /// Get the recorded titles in delivery order
        pub fn titles(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|event| event.title.clone())
                .collect()
        }
    }

    #[async_trait]
    impl NotificationSink for MemorySink {
        fn send(&self, title: &str, body: &str, channels: Channels) -> Result<()> {
            self.sent.lock().unwrap().push(SentNotification {
                title: title.to_string(),
                body: body.to_string(),
                channels,
            });
            Ok(())
        }

        async fn flush(&self) {}
    }
}

//! Test utilities for backup-manager
//!
//! This crate provides shared test utilities, mock re-exports,
//! and helper functions for testing the backup-manager application.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_utils::{ConfigBuilder, MockRunner, MemorySink};
//!
//! #[test]
//! fn my_test() {
//!     let builder = ConfigBuilder::minimal().add_source("docs");
//!     let (config, _temp_dir) = builder.persist();
//!     // ... test code
//! }
//! ```

pub mod config_builder;
pub mod fixtures;
pub mod test_context;

// Re-export commonly used items
pub use config_builder::ConfigBuilder;
pub use fixtures::*;
pub use test_context::{ResultAssertions, TestContext};

// Re-export types from the main crate for convenience
pub use backup_manager::config::{
    Config, GlobalConfig, NotificationConfig, RemoteTarget, SourcePaths,
};
pub use backup_manager::managers::dispatch::{BatchOutcome, Dispatcher, RunSummary};
pub use backup_manager::managers::notification::{Channels, NotificationSink};
pub use backup_manager::methods::{MethodName, MethodRegistry};

// Re-export mock implementations from the main crate
pub use backup_manager::managers::notification::mock::{MemorySink, SentNotification};
pub use backup_manager::utils::runner::mock::{CommandCall, MockResponse, MockRunner};
pub use backup_manager::utils::runner::CommandRunner;

/// Common test result type
pub type TestResult<T = ()> = anyhow::Result<T>;

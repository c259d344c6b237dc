//! Backup Manager Library
//!
//! This library orchestrates local backups: it dispatches backup methods
//! (local sync, remote sync, local archive) over configured source paths
//! through external tools and aggregates the outcomes per batch.

pub mod config;
pub mod managers;
pub mod methods;
pub mod utils;

// Re-export commonly used types
pub use config::{load_config, Config, RemoteTarget};
pub use managers::dispatch::{BatchOutcome, Dispatcher, RunSummary};
pub use managers::logging::{init_console_logging, init_logging, LogGuard, LoggingConfig};
pub use managers::notification::{Channels, NotificationSink, Notifier};
pub use methods::{MethodName, MethodRegistry};

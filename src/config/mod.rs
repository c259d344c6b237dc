//! Configuration module for backup-manager
//!
//! This module handles loading, normalizing, and validating configuration
//! from TOML files.
//!
//! ## Example Usage
//!
//! ```no_run
//! use backup_manager::config;
//!
//! # fn main() -> Result<(), config::ConfigError> {
//! let config = config::load_config("backup-config.toml")?;
//! for (name, paths) in &config.sources {
//!     println!("Source: {}, Paths: {:?}", name, paths.paths());
//! }
//! # Ok(())
//! # }
//! ```

mod loader;
mod types;

pub use loader::{load_config, ConfigError, Result};
pub use types::*;

/// Expand tilde (~) in path
pub fn expand_tilde(path: &std::path::Path) -> std::path::PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

use super::expand_tilde;
use super::types::*;
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Load, normalize, and validate configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = fs::read_to_string(path)?;
    let mut config: Config = toml::from_str(&contents)?;
    normalize_config(&mut config);
    validate_config(&config)?;
    Ok(config)
}

/// Expand tildes and strip empty optional fields so later stages never see
/// `Some("")`
fn normalize_config(config: &mut Config) {
    config.global.backup_root = expand_tilde(&config.global.backup_root);
    config.global.log_directory = expand_tilde(&config.global.log_directory);

    if let Some(file) = config.notifications.file.take() {
        config.notifications.file = Some(expand_tilde(&file));
    }

    if let Some(remote) = config.remote.as_mut() {
        remote.user = remote.user.take().filter(|user| !user.is_empty());
        remote.dir = remote.dir.take().filter(|dir| !dir.is_empty());
    }

    for paths in config.sources.values_mut() {
        match paths {
            SourcePaths::Single(path) => *path = expand_tilde(path),
            SourcePaths::Many(list) => {
                for path in list.iter_mut() {
                    *path = expand_tilde(path);
                }
            }
        }
    }
}

/// Validate the configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.global.backup_root.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "backup_root must not be empty".to_string(),
        ));
    }

    // Validate sources
    if config.sources.is_empty() {
        return Err(ConfigError::ValidationError(
            "No sources defined".to_string(),
        ));
    }

    for (name, paths) in &config.sources {
        if name.is_empty() {
            return Err(ConfigError::ValidationError(
                "Source types must have a name".to_string(),
            ));
        }
        if paths.paths().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "Source '{}' has an empty path list",
                name
            )));
        }
    }

    // Validate the remote table when present
    if let Some(remote) = &config.remote {
        if remote.host.is_empty() {
            return Err(ConfigError::ValidationError(
                "Remote host must not be empty".to_string(),
            ));
        }
        if remote.port == Some(0) {
            return Err(ConfigError::ValidationError(
                "Remote port must not be zero".to_string(),
            ));
        }
    }

    Ok(())
}

use anyhow::Result;
use backup_manager::config::{self, Config};
use backup_manager::managers::dispatch::Dispatcher;
use backup_manager::managers::notification::Notifier;
use backup_manager::managers::logging;
use backup_manager::methods::{MethodName, MethodRegistry};
use backup_manager::utils::locker::RunLock;
use backup_manager::utils::retention::prune_archives;
use backup_manager::utils::runner::{CommandRunner, RealRunner};
use backup_manager::utils::tools;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "backup-manager")]
#[command(about = "Backup orchestration tool driving rsync, ssh, and tar", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "~/.config/backup-manager/config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run backups for the selected source types
    Run {
        /// Source types to back up
        #[arg(required = true)]
        types: Vec<String>,

        /// Backup methods to apply per source type
        #[arg(short, long = "method", value_enum, required = true)]
        methods: Vec<MethodName>,
    },

    /// List configured source types and available methods
    List,

    /// Validate configuration file
    Validate,

    /// Prune old archives beyond the retention limit
    Prune {
        /// Source types to prune (defaults to all configured types)
        #[arg(short = 't', long = "type")]
        types: Vec<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = config::expand_tilde(&cli.config);

    // Validate doesn't need file logging - use simple console logging
    if let Some(Commands::Validate) = &cli.command {
        logging::init_console_logging();
        return handle_validate(&config_path);
    }

    // Load and validate configuration
    let config = config::load_config(&config_path)?;

    // Setup logging with file rotation (must keep guard alive)
    let logging_config = logging::LoggingConfig::from_config(
        &config.global.log_directory,
        &config.global.log_level,
        config.global.log_max_files,
    );
    let _log_guard = logging::init_logging(&logging_config)?;

    // If no command specified, show the configured sources and methods
    let command = cli.command.unwrap_or(Commands::List);

    match command {
        Commands::Run { types, methods } => handle_run(config, types, methods).await,
        Commands::List => {
            handle_list(&config);
            Ok(())
        }
        Commands::Prune { types } => handle_prune(&config, types),
        Commands::Validate => unreachable!("handled before logging setup"),
    }
}

async fn handle_run(config: Config, types: Vec<String>, methods: Vec<MethodName>) -> Result<()> {
    // Refuse to start when a required external tool is missing
    let missing = tools::missing_tools(&methods);
    if !missing.is_empty() {
        eprintln!("⚠️  Required tools not found in PATH: {}", missing.join(", "));
        eprintln!();
        eprintln!("The selected methods shell out to these programs.");
        eprintln!("Install them with your package manager and try again.");
        std::process::exit(1);
    }

    if config.notifications.desktop && !tools::notify_send_exists() {
        tracing::warn!("notify-send not found in PATH; desktop notifications will fail");
    }

    // One lock per source type so concurrent runs cannot race on the
    // backup root or the archive directory
    let mut locks = Vec::new();
    for type_name in &types {
        locks.push(RunLock::acquire(&config.global.backup_root, type_name)?);
    }

    let runner: Arc<dyn CommandRunner> = Arc::new(RealRunner::new(config.remote.clone()));
    let sink = Arc::new(Notifier::new(
        config.notifications.desktop,
        config.notification_file(),
        Arc::clone(&runner),
    ));
    let registry = Arc::new(MethodRegistry::new(&config, runner));
    let dispatcher = Dispatcher::new(config, registry, sink);

    let summary = dispatcher.run_selection(&types, &methods).await?;

    if !summary.all_succeeded() {
        eprintln!("{} path(s) failed to back up", summary.failed);
        std::process::exit(1);
    }

    println!("✓ All backups completed successfully");
    Ok(())
}

fn handle_list(config: &Config) {
    println!("Source types");
    for (name, paths) in &config.sources {
        for path in paths.paths() {
            println!("  {} - {}", name, path.display());
        }
    }
    println!();

    println!("Methods");
    for method in MethodName::ALL {
        println!("  {}", method);
    }
}

fn handle_validate(config_path: &Path) -> Result<()> {
    match config::load_config(config_path) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!("  Backup root: {}", config.global.backup_root.display());
            println!("  Source types: {}", config.sources.len());
            println!("  Archive limit: {}", config.global.archive_limit);
            match &config.remote {
                Some(remote) => println!("  Remote: {}", remote.host),
                None => println!("  Remote: not configured"),
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("✗ Configuration is invalid: {}", err);
            std::process::exit(1);
        }
    }
}

fn handle_prune(config: &Config, types: Vec<String>) -> Result<()> {
    let types: Vec<String> = if types.is_empty() {
        config.sources.keys().cloned().collect()
    } else {
        for type_name in &types {
            if !config.sources.contains_key(type_name) {
                anyhow::bail!("Unknown source type: {}", type_name);
            }
        }
        types
    };

    let archives_dir = config.global.archives_dir();
    if !archives_dir.exists() {
        println!("No archives directory at {}", archives_dir.display());
        return Ok(());
    }

    for type_name in &types {
        let _lock = RunLock::acquire(&config.global.backup_root, type_name)?;
        let deleted = prune_archives(&archives_dir, type_name, config.global.archive_limit)?;
        println!("{}: pruned {} archive(s)", type_name, deleted.len());
    }

    Ok(())
}

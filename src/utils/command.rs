//! Utilities for spawning external commands and capturing their output

use crate::config::RemoteTarget;
use crate::utils::remote::endpoint;
use anyhow::{Context, Result};
use std::process::Stdio;
use tracing::{debug, error};

/// Run a command on the local machine to completion and return its captured
/// stdout. No deadline is applied; the future resolves when the child exits.
pub async fn run_local(program: &str, args: &[String]) -> Result<String> {
    let mut cmd = tokio::process::Command::new(program);
    cmd.args(args);
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    debug!("Running command: {} {}", program, args.join(" "));

    let output = cmd
        .output()
        .await
        .with_context(|| format!("Failed to execute {}", program))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!("Command failed: {} {}", program, args.join(" "));
        error!("Stderr: {}", stderr);
        anyhow::bail!(
            "Command failed with exit code {:?}: {}",
            output.status.code(),
            stderr.trim()
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.is_empty() {
        debug!("Command output: {}", stdout);
    }

    Ok(stdout.to_string())
}

/// Reframe a command so it executes on the remote host: the original program
/// and arguments collapse into one shell line passed to ssh.
pub fn remote_invocation(
    target: &RemoteTarget,
    program: &str,
    args: &[String],
) -> (String, Vec<String>) {
    let mut ssh_args = Vec::new();
    if let Some(port) = target.port {
        ssh_args.push("-p".to_string());
        ssh_args.push(port.to_string());
    }
    ssh_args.push(endpoint(target));

    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    ssh_args.push(line);

    ("ssh".to_string(), ssh_args)
}

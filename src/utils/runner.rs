//! Command execution abstraction for testability
//!
//! This module provides a trait-based abstraction over subprocess execution,
//! enabling dependency injection and mocking for tests. The `remote` flag
//! reframes a command through ssh for the configured remote target.

use crate::config::RemoteTarget;
use crate::utils::command::{remote_invocation, run_local};
use anyhow::Result;
use async_trait::async_trait;

/// Abstraction for command execution, enabling mocking in tests
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion and return its captured stdout.
    /// With `remote` set, the command executes on the remote host instead.
    async fn run(&self, program: &str, args: &[String], remote: bool) -> Result<String>;
}

/// Default implementation using real subprocess calls
#[derive(Debug, Clone, Default)]
pub struct RealRunner {
    remote: Option<RemoteTarget>,
}

impl RealRunner {
    pub fn new(remote: Option<RemoteTarget>) -> Self {
        Self { remote }
    }
}

#[async_trait]
impl CommandRunner for RealRunner {
    async fn run(&self, program: &str, args: &[String], remote: bool) -> Result<String> {
        if !remote {
            return run_local(program, args).await;
        }

        match &self.remote {
            Some(target) => {
                let (ssh, ssh_args) = remote_invocation(target, program, args);
                run_local(&ssh, &ssh_args).await
            }
            None => anyhow::bail!("No remote target configured for remote command: {}", program),
        }
    }
}

/// A mock runner for testing that records calls and returns configured
/// responses. Available for use in external test crates.
#[allow(dead_code)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Recorded command invocation
    #[derive(Clone, Debug)]
    pub struct CommandCall {
        pub program: String,
        pub args: Vec<String>,
        pub remote: bool,
    }

    impl CommandCall {
        /// Whether any argument contains the given fragment
        pub fn has_arg(&self, fragment: &str) -> bool {
            self.args.iter().any(|arg| arg.contains(fragment))
        }
    }

    /// Response configuration for mock
    #[derive(Clone, Debug)]
    pub enum MockResponse {
        Success { stdout: String },
        Failure { stderr: String, exit_code: i32 },
    }

    impl Default for MockResponse {
        fn default() -> Self {
            MockResponse::Success {
                stdout: String::new(),
            }
        }
    }

    /// Mock runner for testing
    #[derive(Clone, Default)]
    pub struct MockRunner {
        /// Recorded command invocations
        pub calls: Arc<Mutex<Vec<CommandCall>>>,
        /// Pre-configured responses: program name -> response
        responses: Arc<Mutex<HashMap<String, MockResponse>>>,
        /// Responses keyed by argument fragment, checked before program names
        arg_responses: Arc<Mutex<Vec<(String, MockResponse)>>>,
        /// Default response when no specific response is configured
        default_response: Arc<Mutex<MockResponse>>,
        /// Artificial completion delays keyed by argument fragment
        delays: Arc<Mutex<Vec<(String, Duration)>>>,
    }

    impl MockRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Configure a response for a specific program
        pub fn expect(self, program: &str, response: MockResponse) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(program.to_string(), response);
            self
        }

        /// Configure a response for any call whose arguments contain the
        /// fragment (lets one path of a batch fail while others succeed)
        pub fn expect_arg(self, fragment: &str, response: MockResponse) -> Self {
            self.arg_responses
                .lock()
                .unwrap()
                .push((fragment.to_string(), response));
            self
        }

        /// Set the default response for unconfigured programs
        pub fn with_default_response(self, response: MockResponse) -> Self {
            *self.default_response.lock().unwrap() = response;
            self
        }

        /// Delay completion of any call whose arguments contain the fragment
        pub fn with_delay(self, fragment: &str, delay: Duration) -> Self {
            self.delays
                .lock()
                .unwrap()
                .push((fragment.to_string(), delay));
            self
        }

        /// Get all recorded calls
        pub fn get_calls(&self) -> Vec<CommandCall> {
            self.calls.lock().unwrap().clone()
        }

        /// Check if a program was called
        pub fn was_called(&self, program: &str) -> bool {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .any(|call| call.program == program)
        }

        /// Get number of calls to a specific program
        pub fn call_count(&self, program: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|call| call.program == program)
                .count()
        }

        fn record_call(&self, program: &str, args: &[String], remote: bool) {
            self.calls.lock().unwrap().push(CommandCall {
                program: program.to_string(),
                args: args.to_vec(),
                remote,
            });
        }

        fn get_response(&self, program: &str, args: &[String]) -> MockResponse {
            let arg_responses = self.arg_responses.lock().unwrap();
            for (fragment, response) in arg_responses.iter() {
                if args.iter().any(|arg| arg.contains(fragment.as_str())) {
                    return response.clone();
                }
            }
            drop(arg_responses);

            self.responses
                .lock()
                .unwrap()
                .get(program)
                .cloned()
                .unwrap_or_else(|| self.default_response.lock().unwrap().clone())
        }

        fn get_delay(&self, args: &[String]) -> Option<Duration> {
            let delays = self.delays.lock().unwrap();
            delays
                .iter()
                .find(|(fragment, _)| args.iter().any(|arg| arg.contains(fragment.as_str())))
                .map(|(_, delay)| *delay)
        }
    }

    #[async_trait]
    impl CommandRunner for MockRunner {
        async fn run(&self, program: &str, args: &[String], remote: bool) -> Result<String> {
            self.record_call(program, args, remote);

            if let Some(delay) = self.get_delay(args) {
                tokio::time::sleep(delay).await;
            }

            match self.get_response(program, args) {
                MockResponse::Success { stdout } => Ok(stdout),
                MockResponse::Failure { stderr, exit_code } => anyhow::bail!(
                    "Command failed with exit code {:?}: {}",
                    Some(exit_code),
                    stderr
                ),
            }
        }
    }
}

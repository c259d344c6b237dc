//! External tool preflight checks

use crate::methods::MethodName;
use std::collections::BTreeSet;

/// Collect the external tools the given methods shell out to
pub fn required_tools(methods: &[MethodName]) -> BTreeSet<&'static str> {
    let mut required = BTreeSet::new();
    for method in methods {
        required.extend(method.required_tools());
    }
    required
}

/// Return the required tools that are missing from PATH
pub fn missing_tools(methods: &[MethodName]) -> Vec<String> {
    required_tools(methods)
        .into_iter()
        .filter(|tool| which::which(tool).is_err())
        .map(String::from)
        .collect()
}

/// Whether the desktop notification helper is available
pub fn notify_send_exists() -> bool {
    which::which("notify-send").is_ok()
}

pub mod command;
pub mod locker;
pub mod remote;
pub mod retention;

// Trait-based abstraction for testability
pub mod runner;

pub mod tools;

// Re-export commonly used types and traits (used by test crate)
#[allow(unused_imports)]
pub use runner::{CommandRunner, RealRunner};

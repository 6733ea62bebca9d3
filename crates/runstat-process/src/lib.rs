//! # Runstat Process
//!
//! Single-use child-process handle: launch a program, block until it
//! terminates, then query its termination status and resource usage.
//!
//! This crate provides:
//! - Process spawning with optional stdio binding
//! - A blocking reap over `wait4(2)` that captures exit/signal status
//!   and rusage accounting in one step
//! - State-checked queries that fail deterministically before the
//!   records exist, instead of answering with stale or zero data
//! - A single buffered stdin/stdout/stderr exchange
//!
//! Spawning uses `std::process`; reaping goes straight to `wait4(2)`,
//! so the crate is Unix-only.

pub mod command;
pub mod errors;
pub mod reap;

// Re-export main types
pub use command::*;
pub use errors::*;
pub use reap::*;

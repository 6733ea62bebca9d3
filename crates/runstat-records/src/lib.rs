//! # Runstat Records
//!
//! Value types describing a reaped child process:
//! - Termination status decoding (exit code, fatal signal, job-control
//!   stop/continue, core dump, trap cause)
//! - Resource-usage accounting (CPU time, memory, faults, I/O blocks,
//!   IPC messages, signals, context switches)
//!
//! Both records are plain values filled in exactly once by a `wait4(2)`
//! call and never mutated afterwards. Decoding goes through the
//! platform's own `W*` macros, so there is a single source of truth for
//! every derived field.

pub mod rusage;
pub mod wait_status;

pub use rusage::ResourceUsage;
pub use wait_status::WaitStatus;

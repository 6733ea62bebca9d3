//! Error types for process lifecycle and status queries.
//!
//! Every way a query can fail is a variant of one closed enum, so
//! callers can match on the exact condition instead of comparing
//! against shared error values.

use thiserror::Error;

/// Result type alias for process-handle operations.
pub type CmdResult<T> = std::result::Result<T, CmdError>;

/// Error type for process-handle operations.
///
/// The first two variants order the lifecycle: a query fails with
/// `NotStarted` until the child has been spawned and with `NotFinished`
/// until it has been reaped. The `Not*` shape variants mean the child
/// terminated, but not in the way the accessor asks about. The `*Set`
/// variants reject a buffered exchange over a stream that is already
/// bound. `Spawn` and `Wait` carry the originating OS error unchanged.
#[derive(Debug, Error)]
pub enum CmdError {
    /// The child process has not been started yet.
    #[error("Process not started")]
    NotStarted,

    /// The child process is running and has not been reaped yet.
    #[error("Process not finished")]
    NotFinished,

    /// The child terminated, but not by a signal.
    #[error("Process not signaled")]
    NotSignaled,

    /// The child terminated, but not by exiting normally.
    #[error("Process not exited")]
    NotExited,

    /// The recorded status is not a job-control stop.
    #[error("Process not stopped")]
    NotStopped,

    /// The child is stopped, but not by a trap with a cause.
    #[error("Process not trapped")]
    NotTrapped,

    /// Stdin is already bound and cannot be bound again.
    #[error("Stdin already set")]
    StdinSet,

    /// Stdout is already bound and cannot be bound again.
    #[error("Stdout already set")]
    StdoutSet,

    /// Stderr is already bound and cannot be bound again.
    #[error("Stderr already set")]
    StderrSet,

    /// The handle is single-use and its child was already spawned.
    #[error("Process already started")]
    AlreadyStarted,

    /// Spawning the program failed.
    #[error("Process spawn failed: {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The blocking reap failed; the OS error passes through unchanged.
    #[error("Process wait failed")]
    Wait {
        #[source]
        source: std::io::Error,
    },

    /// I/O error while pumping an exchange stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CmdError {
    /// Creates a Spawn error.
    pub fn spawn_failed(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    /// Creates a Wait error.
    pub fn wait_failed(source: std::io::Error) -> Self {
        Self::Wait { source }
    }
}

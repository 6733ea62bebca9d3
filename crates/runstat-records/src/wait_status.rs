//! Termination-status decoding.
//!
//! Wraps the raw integer status word filled in by `wait4(2)` and decodes
//! it on demand through the platform's `W*` macros.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw termination status of a reaped child process.
///
/// A status word describes exactly one of four shapes: the process
/// exited with a code, was terminated by a signal, was stopped by a
/// signal (job control), or was resumed (job control). Plain blocking
/// waits only ever observe the first two; the stop/continue shapes are
/// decoded all the same because the platform word can encode them.
///
/// Detail getters return `None` when the status is not in the matching
/// shape, so a caller never sees a placeholder value standing in for
/// "not applicable".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitStatus(i32);

impl WaitStatus {
    /// Wraps a raw status word as returned by `wait4(2)`.
    pub fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// The undecoded status word.
    pub fn into_raw(self) -> i32 {
        self.0
    }

    /// True if the process exited normally.
    pub fn exited(&self) -> bool {
        libc::WIFEXITED(self.0)
    }

    /// Exit code of a normally exited process.
    pub fn exit_status(&self) -> Option<i32> {
        if self.exited() {
            Some(libc::WEXITSTATUS(self.0))
        } else {
            None
        }
    }

    /// True if the process was terminated by a signal.
    pub fn signaled(&self) -> bool {
        libc::WIFSIGNALED(self.0)
    }

    /// Number of the signal that terminated the process.
    pub fn signal(&self) -> Option<i32> {
        if self.signaled() {
            Some(libc::WTERMSIG(self.0))
        } else {
            None
        }
    }

    /// True if a terminating signal produced a core dump.
    pub fn core_dumped(&self) -> bool {
        self.signaled() && libc::WCOREDUMP(self.0)
    }

    /// True if the process is stopped by a signal (job control).
    pub fn stopped(&self) -> bool {
        libc::WIFSTOPPED(self.0)
    }

    /// Number of the signal that stopped the process.
    pub fn stop_signal(&self) -> Option<i32> {
        if self.stopped() {
            Some(libc::WSTOPSIG(self.0))
        } else {
            None
        }
    }

    /// True if a stopped process was resumed by `SIGCONT` (job control).
    pub fn continued(&self) -> bool {
        libc::WIFCONTINUED(self.0)
    }

    /// Cause of a `SIGTRAP` stop, when one is present.
    ///
    /// On Linux, a traced child stopped by `SIGTRAP` carries the ptrace
    /// event that produced the stop in the high bits of the status word;
    /// a plain trap reports cause 0. A stop by any other signal has no
    /// trap cause. Non-Linux platforms never report one.
    pub fn trap_cause(&self) -> Option<i32> {
        #[cfg(target_os = "linux")]
        {
            if self.stop_signal() == Some(libc::SIGTRAP) {
                return Some((self.0 >> 16) & 0xff);
            }
        }
        None
    }
}

fn signal_name(signal: i32) -> String {
    match nix::sys::signal::Signal::try_from(signal) {
        Ok(sig) => sig.as_str().to_string(),
        Err(_) => format!("signal {}", signal),
    }
}

impl fmt::Display for WaitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = self.exit_status() {
            write!(f, "exit status {}", code)
        } else if let Some(signal) = self.signal() {
            write!(f, "terminated by {}", signal_name(signal))?;
            if self.core_dumped() {
                write!(f, " (core dumped)")?;
            }
            Ok(())
        } else if let Some(signal) = self.stop_signal() {
            write!(f, "stopped by {}", signal_name(signal))
        } else if self.continued() {
            write!(f, "continued")
        } else {
            write!(f, "wait status {:#x}", self.0)
        }
    }
}

// The raw-word layouts below are Linux's; the decoding functions under
// test are the platform macros themselves, so shapes that a blocking
// wait can never return (stops, continues, trap causes) are exercised
// from hand-built words on Linux only.
#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    fn exited_raw(code: i32) -> i32 {
        (code & 0xff) << 8
    }

    fn signaled_raw(signal: i32, core: bool) -> i32 {
        signal | if core { 0x80 } else { 0 }
    }

    fn stopped_raw(signal: i32) -> i32 {
        0x7f | (signal << 8)
    }

    #[test]
    fn test_exited_shape() {
        let status = WaitStatus::from_raw(exited_raw(0));
        assert!(status.exited());
        assert_eq!(status.exit_status(), Some(0));
        assert!(!status.signaled());
        assert_eq!(status.signal(), None);
        assert!(!status.stopped());
        assert!(!status.continued());
        assert!(!status.core_dumped());
    }

    #[test]
    fn test_nonzero_exit_code() {
        let status = WaitStatus::from_raw(exited_raw(42));
        assert_eq!(status.exit_status(), Some(42));
        assert_eq!(status.to_string(), "exit status 42");
    }

    #[test]
    fn test_signaled_shape() {
        let status = WaitStatus::from_raw(signaled_raw(libc::SIGKILL, false));
        assert!(status.signaled());
        assert_eq!(status.signal(), Some(libc::SIGKILL));
        assert!(!status.exited());
        assert_eq!(status.exit_status(), None);
        assert!(!status.core_dumped());
        assert_eq!(status.to_string(), "terminated by SIGKILL");
    }

    #[test]
    fn test_core_dump_flag() {
        let status = WaitStatus::from_raw(signaled_raw(libc::SIGSEGV, true));
        assert!(status.signaled());
        assert!(status.core_dumped());
        assert_eq!(status.to_string(), "terminated by SIGSEGV (core dumped)");
    }

    #[test]
    fn test_stopped_shape() {
        let status = WaitStatus::from_raw(stopped_raw(libc::SIGSTOP));
        assert!(status.stopped());
        assert_eq!(status.stop_signal(), Some(libc::SIGSTOP));
        assert!(!status.exited());
        assert!(!status.signaled());
        // SIGSTOP is not SIGTRAP, so no trap cause exists.
        assert_eq!(status.trap_cause(), None);
    }

    #[test]
    fn test_plain_trap_has_cause_zero() {
        let status = WaitStatus::from_raw(stopped_raw(libc::SIGTRAP));
        assert!(status.stopped());
        assert_eq!(status.stop_signal(), Some(libc::SIGTRAP));
        assert_eq!(status.trap_cause(), Some(0));
    }

    #[test]
    fn test_ptrace_event_in_trap_cause() {
        // PTRACE_EVENT_EXEC = 4, reported in bits 16..24 of the word.
        let raw = stopped_raw(libc::SIGTRAP) | (4 << 16);
        let status = WaitStatus::from_raw(raw);
        assert_eq!(status.trap_cause(), Some(4));
    }

    #[test]
    fn test_continued_shape() {
        let status = WaitStatus::from_raw(0xffff);
        assert!(status.continued());
        assert!(!status.exited());
        assert!(!status.signaled());
        assert!(!status.stopped());
        assert_eq!(status.to_string(), "continued");
    }

    #[test]
    fn test_raw_round_trip() {
        let raw = exited_raw(7);
        assert_eq!(WaitStatus::from_raw(raw).into_raw(), raw);
    }

    #[test]
    fn test_unknown_signal_number_renders_numerically() {
        // Realtime signals have no name in the portable signal set.
        let status = WaitStatus::from_raw(signaled_raw(60, false));
        assert_eq!(status.signal(), Some(60));
        assert_eq!(status.to_string(), "terminated by signal 60");
    }
}

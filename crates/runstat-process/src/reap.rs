//! Blocking reap primitive.
//!
//! One thin wrapper over `wait4(2)`, which is the only wait variant
//! that reports resource usage alongside the termination status.

use runstat_records::{ResourceUsage, WaitStatus};
use std::io;
use tracing::debug;

/// Blocks until the child with the given pid terminates, then returns
/// its termination status and resource usage as one atomically filled
/// pair.
///
/// Options are fixed at 0: job-control stops and continues are not
/// reported, and the call does not return until the child is gone.
/// Errors pass through as raw OS errors; `ECHILD` means the pid is not
/// an unreaped child of this process (typically because it was already
/// reaped).
pub fn wait4(pid: u32) -> io::Result<(WaitStatus, ResourceUsage)> {
    let mut raw_status: libc::c_int = 0;
    let mut raw_rusage: libc::rusage = unsafe { std::mem::zeroed() };

    let reaped = unsafe {
        libc::wait4(
            pid as libc::pid_t,
            &mut raw_status,
            0,
            &mut raw_rusage,
        )
    };
    if reaped == -1 {
        return Err(io::Error::last_os_error());
    }

    let status = WaitStatus::from_raw(raw_status);
    debug!("Reaped pid {}: {}", reaped, status);
    Ok((status, ResourceUsage::from(raw_rusage)))
}

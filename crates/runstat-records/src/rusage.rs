//! Resource-usage accounting for reaped processes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Resource accounting for a terminated process and the children it
/// reaped, as filled in by `wait4(2)`.
///
/// CPU times are converted from the kernel's `timeval` pairs; the
/// remaining counters keep the kernel's own units. In particular
/// `max_rss` is platform-defined (kilobytes on Linux, bytes on macOS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceUsage {
    /// CPU time spent in user mode.
    pub user_time: Duration,
    /// CPU time spent in kernel mode.
    pub system_time: Duration,
    /// Maximum resident set size, in platform-defined units.
    pub max_rss: i64,
    /// Integral shared memory size.
    pub ix_rss: i64,
    /// Integral unshared data size.
    pub id_rss: i64,
    /// Integral unshared stack size.
    pub is_rss: i64,
    /// Page reclaims (soft page faults).
    pub min_flt: i64,
    /// Page faults requiring I/O (hard page faults).
    pub maj_flt: i64,
    /// Number of swaps.
    pub n_swap: i64,
    /// Block input operations.
    pub in_block: i64,
    /// Block output operations.
    pub ou_block: i64,
    /// IPC messages sent.
    pub msg_snd: i64,
    /// IPC messages received.
    pub msg_rcv: i64,
    /// Signals delivered.
    pub n_signals: i64,
    /// Voluntary context switches.
    pub n_vcsw: i64,
    /// Involuntary context switches.
    pub n_ivcsw: i64,
}

fn duration_from_timeval(tv: libc::timeval) -> Duration {
    Duration::from_secs(tv.tv_sec as u64) + Duration::from_micros(tv.tv_usec as u64)
}

impl From<libc::rusage> for ResourceUsage {
    fn from(ru: libc::rusage) -> Self {
        Self {
            user_time: duration_from_timeval(ru.ru_utime),
            system_time: duration_from_timeval(ru.ru_stime),
            max_rss: ru.ru_maxrss as i64,
            ix_rss: ru.ru_ixrss as i64,
            id_rss: ru.ru_idrss as i64,
            is_rss: ru.ru_isrss as i64,
            min_flt: ru.ru_minflt as i64,
            maj_flt: ru.ru_majflt as i64,
            n_swap: ru.ru_nswap as i64,
            in_block: ru.ru_inblock as i64,
            ou_block: ru.ru_oublock as i64,
            msg_snd: ru.ru_msgsnd as i64,
            msg_rcv: ru.ru_msgrcv as i64,
            n_signals: ru.ru_nsignals as i64,
            n_vcsw: ru.ru_nvcsw as i64,
            n_ivcsw: ru.ru_nivcsw as i64,
        }
    }
}

impl fmt::Display for ResourceUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "user {:?}, system {:?}, max rss {}",
            self.user_time, self.system_time, self.max_rss
        )
    }
}

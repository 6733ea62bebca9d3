//! Child-process handle with state-checked status and usage queries.

use crate::errors::{CmdError, CmdResult};
use crate::reap;
use runstat_records::{ResourceUsage, WaitStatus};
use std::fmt;
use std::io::{self, Read, Write};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Record pair captured by the reap, written exactly once.
#[derive(Debug, Clone, Copy)]
struct Reaped {
    status: WaitStatus,
    rusage: ResourceUsage,
}

/// A single-use handle over one child process.
///
/// The handle moves through three states: unstarted, running, and
/// terminated. [`start`](Cmd::start) performs the first transition,
/// [`wait`](Cmd::wait) the second; termination is final. Every status
/// and usage query checks the state before answering: before `start`
/// it fails with [`CmdError::NotStarted`], between `start` and `wait`
/// with [`CmdError::NotFinished`], and only after a successful `wait`
/// does it read the immutable records the reap produced.
///
/// # Examples
///
/// ```no_run
/// use runstat_process::Cmd;
///
/// # fn main() -> runstat_process::CmdResult<()> {
/// let mut cmd = Cmd::new("ls").arg("-l");
/// cmd.run()?;
/// println!("exit status: {}", cmd.exit_status()?);
/// println!("user time:   {:?}", cmd.utime()?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Cmd {
    program: String,
    args: Vec<String>,
    stdin: Option<Stdio>,
    stdout: Option<Stdio>,
    stderr: Option<Stdio>,
    stdin_set: bool,
    stdout_set: bool,
    stderr_set: bool,
    child: Option<Child>,
    reaped: Option<Reaped>,
}

impl Cmd {
    /// Creates an unstarted handle for the given program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            stdout: None,
            stderr: None,
            stdin_set: false,
            stdout_set: false,
            stderr_set: false,
            child: None,
            reaped: None,
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Binds the child's stdin. Unbound streams are inherited from the
    /// parent. Has no effect once the child has been started.
    pub fn stdin(mut self, cfg: impl Into<Stdio>) -> Self {
        self.stdin = Some(cfg.into());
        self.stdin_set = true;
        self
    }

    /// Binds the child's stdout. Unbound streams are inherited from the
    /// parent. Has no effect once the child has been started.
    pub fn stdout(mut self, cfg: impl Into<Stdio>) -> Self {
        self.stdout = Some(cfg.into());
        self.stdout_set = true;
        self
    }

    /// Binds the child's stderr. Unbound streams are inherited from the
    /// parent. Has no effect once the child has been started.
    pub fn stderr(mut self, cfg: impl Into<Stdio>) -> Self {
        self.stderr = Some(cfg.into());
        self.stderr_set = true;
        self
    }

    /// Spawns the child process.
    ///
    /// The handle is single-use: a second `start` fails with
    /// [`CmdError::AlreadyStarted`]. A failed spawn leaves the handle
    /// unstarted.
    pub fn start(&mut self) -> CmdResult<()> {
        if self.child.is_some() {
            return Err(CmdError::AlreadyStarted);
        }

        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(cfg) = self.stdin.take() {
            command.stdin(cfg);
        }
        if let Some(cfg) = self.stdout.take() {
            command.stdout(cfg);
        }
        if let Some(cfg) = self.stderr.take() {
            command.stderr(cfg);
        }

        let child = command
            .spawn()
            .map_err(|e| CmdError::spawn_failed(&self.program, e))?;
        debug!("Started {} as pid {}", self.program, child.id());
        self.child = Some(child);
        Ok(())
    }

    /// Blocks until the child terminates and records its termination
    /// status and resource usage.
    ///
    /// Fails with [`CmdError::NotStarted`] before `start`. OS wait
    /// errors pass through unchanged inside [`CmdError::Wait`]; in
    /// particular a second `wait` surfaces the kernel's `ECHILD`, and
    /// the records from the first reap stay untouched.
    pub fn wait(&mut self) -> CmdResult<()> {
        let pid = self.pid()?;
        let (status, rusage) = reap::wait4(pid).map_err(CmdError::wait_failed)?;
        debug!("Pid {} terminated: {}", pid, status);
        self.reaped = Some(Reaped { status, rusage });
        Ok(())
    }

    /// Starts the child and waits for it to terminate.
    pub fn run(&mut self) -> CmdResult<()> {
        self.start()?;
        self.wait()
    }

    /// OS process id of the started child.
    pub fn pid(&self) -> CmdResult<u32> {
        match &self.child {
            Some(child) => Ok(child.id()),
            None => Err(CmdError::NotStarted),
        }
    }

    /// Performs one buffered stdin/stdout/stderr exchange with the
    /// child and returns its captured `(stdout, stderr)`.
    ///
    /// All three streams are bound to pipes, the child is started, the
    /// input is written to its stdin (which is then closed to signal
    /// end of input) while both output streams are drained, and the
    /// child is reaped. Writing and draining run concurrently, so the
    /// exchange completes even when input or output exceeds the OS
    /// pipe buffer. A child that exits without consuming its input is
    /// tolerated.
    ///
    /// Fails with [`CmdError::StdinSet`], [`CmdError::StdoutSet`] or
    /// [`CmdError::StderrSet`] (checked in that order) when a stream
    /// was already bound, by an earlier exchange or manually; nothing
    /// is spawned in that case. Captured output is converted lossily,
    /// so non-UTF-8 output does not fail the exchange.
    pub fn communicate(&mut self, input: &str) -> CmdResult<(String, String)> {
        if self.stdin_set {
            return Err(CmdError::StdinSet);
        }
        if self.stdout_set {
            return Err(CmdError::StdoutSet);
        }
        if self.stderr_set {
            return Err(CmdError::StderrSet);
        }

        self.stdin = Some(Stdio::piped());
        self.stdout = Some(Stdio::piped());
        self.stderr = Some(Stdio::piped());
        self.stdin_set = true;
        self.stdout_set = true;
        self.stderr_set = true;

        self.start()?;
        let child = self.child.as_mut().ok_or(CmdError::NotStarted)?;
        let mut stdin_pipe = child.stdin.take().ok_or_else(|| missing("stdin"))?;
        let mut stdout_pipe = child.stdout.take().ok_or_else(|| missing("stdout"))?;
        let mut stderr_pipe = child.stderr.take().ok_or_else(|| missing("stderr"))?;

        let (stdout_buf, stderr_buf) =
            thread::scope(|scope| -> io::Result<(Vec<u8>, Vec<u8>)> {
                let writer = scope.spawn(move || -> io::Result<()> {
                    // The pipe closes when stdin_pipe drops, signaling
                    // end of input. A child that exits without reading
                    // breaks the pipe; that is not an error here.
                    match stdin_pipe.write_all(input.as_bytes()) {
                        Err(e) if e.kind() != io::ErrorKind::BrokenPipe => Err(e),
                        _ => Ok(()),
                    }
                });
                let stderr_reader = scope.spawn(move || -> io::Result<Vec<u8>> {
                    let mut buf = Vec::new();
                    stderr_pipe.read_to_end(&mut buf)?;
                    Ok(buf)
                });

                let mut stdout_buf = Vec::new();
                stdout_pipe.read_to_end(&mut stdout_buf)?;

                join_pump(writer)?;
                let stderr_buf = join_pump(stderr_reader)?;
                Ok((stdout_buf, stderr_buf))
            })?;

        self.wait()?;
        Ok((
            String::from_utf8_lossy(&stdout_buf).into_owned(),
            String::from_utf8_lossy(&stderr_buf).into_owned(),
        ))
    }

    fn reaped_record(&self) -> CmdResult<&Reaped> {
        if self.child.is_none() {
            return Err(CmdError::NotStarted);
        }
        self.reaped.as_ref().ok_or(CmdError::NotFinished)
    }

    /// Termination status of the reaped child.
    pub fn status(&self) -> CmdResult<WaitStatus> {
        Ok(self.reaped_record()?.status)
    }

    /// True if the child was terminated by a signal.
    pub fn signaled(&self) -> CmdResult<bool> {
        Ok(self.status()?.signaled())
    }

    /// Number of the signal that terminated the child.
    pub fn signal(&self) -> CmdResult<i32> {
        self.status()?.signal().ok_or(CmdError::NotSignaled)
    }

    /// True if the child exited normally.
    pub fn exited(&self) -> CmdResult<bool> {
        Ok(self.status()?.exited())
    }

    /// Exit code of the normally exited child.
    pub fn exit_status(&self) -> CmdResult<i32> {
        self.status()?.exit_status().ok_or(CmdError::NotExited)
    }

    /// True if the recorded status is a job-control continue.
    pub fn continued(&self) -> CmdResult<bool> {
        Ok(self.status()?.continued())
    }

    /// True if the terminating signal produced a core dump.
    pub fn core_dumped(&self) -> CmdResult<bool> {
        Ok(self.status()?.core_dumped())
    }

    /// True if the recorded status is a job-control stop.
    pub fn stopped(&self) -> CmdResult<bool> {
        Ok(self.status()?.stopped())
    }

    /// Number of the signal that stopped the child.
    pub fn stop_signal(&self) -> CmdResult<i32> {
        self.status()?.stop_signal().ok_or(CmdError::NotStopped)
    }

    /// Cause of a `SIGTRAP` stop.
    ///
    /// Fails with [`CmdError::NotStopped`] when the status is not a
    /// stop at all, and with [`CmdError::NotTrapped`] when the stop
    /// carries no trap cause (a non-`SIGTRAP` stop signal, or a
    /// platform without trap causes). A plain trap reports cause 0.
    pub fn trap_cause(&self) -> CmdResult<i32> {
        let status = self.status()?;
        if !status.stopped() {
            return Err(CmdError::NotStopped);
        }
        status.trap_cause().ok_or(CmdError::NotTrapped)
    }

    /// Resource usage of the reaped child.
    pub fn rusage(&self) -> CmdResult<&ResourceUsage> {
        Ok(&self.reaped_record()?.rusage)
    }

    /// CPU time the child spent in user mode.
    pub fn utime(&self) -> CmdResult<Duration> {
        Ok(self.rusage()?.user_time)
    }

    /// CPU time the child spent in kernel mode.
    pub fn stime(&self) -> CmdResult<Duration> {
        Ok(self.rusage()?.system_time)
    }

    /// Maximum resident set size, in platform-defined units.
    pub fn max_rss(&self) -> CmdResult<i64> {
        Ok(self.rusage()?.max_rss)
    }

    /// Integral shared memory size.
    pub fn ix_rss(&self) -> CmdResult<i64> {
        Ok(self.rusage()?.ix_rss)
    }

    /// Integral unshared data size.
    pub fn id_rss(&self) -> CmdResult<i64> {
        Ok(self.rusage()?.id_rss)
    }

    /// Integral unshared stack size.
    pub fn is_rss(&self) -> CmdResult<i64> {
        Ok(self.rusage()?.is_rss)
    }

    /// Soft page faults.
    pub fn min_flt(&self) -> CmdResult<i64> {
        Ok(self.rusage()?.min_flt)
    }

    /// Hard page faults.
    pub fn maj_flt(&self) -> CmdResult<i64> {
        Ok(self.rusage()?.maj_flt)
    }

    /// Number of swaps.
    pub fn n_swap(&self) -> CmdResult<i64> {
        Ok(self.rusage()?.n_swap)
    }

    /// Block input operations.
    pub fn in_block(&self) -> CmdResult<i64> {
        Ok(self.rusage()?.in_block)
    }

    /// Block output operations.
    pub fn ou_block(&self) -> CmdResult<i64> {
        Ok(self.rusage()?.ou_block)
    }

    /// IPC messages sent.
    pub fn msg_snd(&self) -> CmdResult<i64> {
        Ok(self.rusage()?.msg_snd)
    }

    /// IPC messages received.
    pub fn msg_rcv(&self) -> CmdResult<i64> {
        Ok(self.rusage()?.msg_rcv)
    }

    /// Signals delivered.
    pub fn n_signals(&self) -> CmdResult<i64> {
        Ok(self.rusage()?.n_signals)
    }

    /// Voluntary context switches.
    pub fn n_vcsw(&self) -> CmdResult<i64> {
        Ok(self.rusage()?.n_vcsw)
    }

    /// Involuntary context switches.
    pub fn n_ivcsw(&self) -> CmdResult<i64> {
        Ok(self.rusage()?.n_ivcsw)
    }
}

impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

fn missing(stream: &str) -> CmdError {
    CmdError::Io(io::Error::new(
        io::ErrorKind::Other,
        format!("{} pipe missing after spawn", stream),
    ))
}

fn join_pump<T>(handle: thread::ScopedJoinHandle<'_, io::Result<T>>) -> io::Result<T> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(io::Error::new(
            io::ErrorKind::Other,
            "stream pump thread panicked",
        )),
    }
}

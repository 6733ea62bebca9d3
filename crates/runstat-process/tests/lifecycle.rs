//! Live-process lifecycle tests against ubiquitous system binaries.

use runstat_process::{Cmd, CmdError};

#[test]
fn test_successful_exit() {
    let mut cmd = Cmd::new("true");
    cmd.run().unwrap();

    assert!(cmd.pid().unwrap() > 0);
    assert!(cmd.exited().unwrap());
    assert_eq!(cmd.exit_status().unwrap(), 0);
    assert!(!cmd.signaled().unwrap());
    assert!(matches!(cmd.signal(), Err(CmdError::NotSignaled)));
    assert!(!cmd.stopped().unwrap());
    assert!(matches!(cmd.stop_signal(), Err(CmdError::NotStopped)));
    assert!(matches!(cmd.trap_cause(), Err(CmdError::NotStopped)));
    assert!(!cmd.core_dumped().unwrap());
    assert!(!cmd.continued().unwrap());
}

#[test]
fn test_failing_exit_code() {
    let mut cmd = Cmd::new("false");
    cmd.run().unwrap();

    assert!(cmd.exited().unwrap());
    assert_eq!(cmd.exit_status().unwrap(), 1);
    assert!(!cmd.signaled().unwrap());
}

#[test]
fn test_running_child_is_not_finished() {
    let mut cmd = Cmd::new("sleep").arg("1");
    cmd.start().unwrap();

    assert!(cmd.pid().unwrap() > 0);
    assert!(matches!(cmd.status(), Err(CmdError::NotFinished)));
    assert!(matches!(cmd.exited(), Err(CmdError::NotFinished)));
    assert!(matches!(cmd.signaled(), Err(CmdError::NotFinished)));
    assert!(matches!(cmd.rusage(), Err(CmdError::NotFinished)));
    assert!(matches!(cmd.utime(), Err(CmdError::NotFinished)));

    cmd.wait().unwrap();
    assert!(cmd.exited().unwrap());
    assert_eq!(cmd.exit_status().unwrap(), 0);
}

#[test]
fn test_killed_child_reports_signal() {
    let mut cmd = Cmd::new("sleep").arg("30");
    cmd.start().unwrap();
    let pid = cmd.pid().unwrap();

    nix::sys::signal::kill(
        nix::unistd::Pid::from_raw(pid as i32),
        nix::sys::signal::Signal::SIGKILL,
    )
    .unwrap();
    cmd.wait().unwrap();

    assert!(cmd.signaled().unwrap());
    assert_eq!(cmd.signal().unwrap(), libc::SIGKILL);
    assert!(!cmd.exited().unwrap());
    assert!(matches!(cmd.exit_status(), Err(CmdError::NotExited)));

    // Exactly one termination shape holds.
    let shapes = [
        cmd.exited().unwrap(),
        cmd.signaled().unwrap(),
        cmd.stopped().unwrap(),
    ];
    assert_eq!(shapes.iter().filter(|&&held| held).count(), 1);
}

#[test]
fn test_spawn_failure_leaves_handle_unstarted() {
    let mut cmd = Cmd::new("/nonexistent/no-such-binary");
    assert!(matches!(cmd.run(), Err(CmdError::Spawn { .. })));

    // The failed start never produced a child to wait for or query.
    assert!(matches!(cmd.wait(), Err(CmdError::NotStarted)));
    assert!(matches!(cmd.status(), Err(CmdError::NotStarted)));
    assert!(matches!(cmd.pid(), Err(CmdError::NotStarted)));
}

#[test]
fn test_double_start_rejected() {
    let mut cmd = Cmd::new("sleep").arg("1");
    cmd.start().unwrap();
    assert!(matches!(cmd.start(), Err(CmdError::AlreadyStarted)));
    cmd.wait().unwrap();
}

#[test]
fn test_second_wait_surfaces_echild() {
    let mut cmd = Cmd::new("true");
    cmd.run().unwrap();

    match cmd.wait() {
        Err(CmdError::Wait { source }) => {
            assert_eq!(source.raw_os_error(), Some(libc::ECHILD));
        }
        other => panic!("expected a wait error, got {:?}", other),
    }

    // The records from the first reap stay untouched.
    assert!(cmd.exited().unwrap());
    assert_eq!(cmd.exit_status().unwrap(), 0);
}

#[test]
fn test_queries_rederive_identically() {
    let mut cmd = Cmd::new("sh").args(["-c", "exit 7"]);
    cmd.run().unwrap();

    assert_eq!(cmd.exit_status().unwrap(), 7);
    assert_eq!(cmd.status().unwrap(), cmd.status().unwrap());

    let first = (cmd.utime().unwrap(), cmd.stime().unwrap());
    let second = (cmd.utime().unwrap(), cmd.stime().unwrap());
    assert_eq!(first, second);

    let usage = cmd.rusage().unwrap();
    assert_eq!(usage.user_time, first.0);
    assert_eq!(usage.system_time, first.1);
}

#[test]
fn test_rusage_counters_plausible() {
    let mut cmd = Cmd::new("ls").arg("/").stdout(std::process::Stdio::null());
    cmd.run().unwrap();

    let usage = cmd.rusage().unwrap();
    assert!(usage.max_rss > 0);
    assert!(usage.min_flt > 0);
    assert!(usage.user_time + usage.system_time < std::time::Duration::from_secs(5));
    assert_eq!(cmd.max_rss().unwrap(), usage.max_rss);
    assert!(cmd.n_vcsw().unwrap() >= 0);
}

#[test]
fn test_concurrent_handles_are_independent() {
    let threads: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let mut cmd = Cmd::new("sh").args(["-c", &format!("exit {}", i)]);
                cmd.run().unwrap();
                cmd.exit_status().unwrap()
            })
        })
        .collect();

    for (i, handle) in threads.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), i as i32);
    }
}

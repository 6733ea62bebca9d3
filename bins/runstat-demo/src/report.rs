//! The shared status/usage sweep, valid at any lifecycle stage.

use anyhow::Result;
use runstat_process::{Cmd, CmdResult};
use std::fmt;
use tracing::info;

/// Logs every query the handle answers, failures included, so the
/// state checking is visible before start, while running, and after
/// the reap.
pub fn report(cmd: &Cmd) {
    info!("pid:          {}", self::display(cmd.pid()));
    info!("status:       {}", self::display(cmd.status()));
    info!("exited:       {}", self::display(cmd.exited()));
    info!("exit status:  {}", self::display(cmd.exit_status()));
    info!("signaled:     {}", self::display(cmd.signaled()));
    info!("signal:       {}", self::display(cmd.signal()));
    info!("core dumped:  {}", self::display(cmd.core_dumped()));
    info!("stopped:      {}", self::display(cmd.stopped()));
    info!("stop signal:  {}", self::display(cmd.stop_signal()));
    info!("trap cause:   {}", self::display(cmd.trap_cause()));
    info!("continued:    {}", self::display(cmd.continued()));
    info!("user time:    {}", debug_display(cmd.utime()));
    info!("system time:  {}", debug_display(cmd.stime()));
    info!("max rss:      {}", self::display(cmd.max_rss()));
    info!("ix rss:       {}", self::display(cmd.ix_rss()));
    info!("id rss:       {}", self::display(cmd.id_rss()));
    info!("is rss:       {}", self::display(cmd.is_rss()));
    info!("minor faults: {}", self::display(cmd.min_flt()));
    info!("major faults: {}", self::display(cmd.maj_flt()));
    info!("swaps:        {}", self::display(cmd.n_swap()));
    info!("blocks in:    {}", self::display(cmd.in_block()));
    info!("blocks out:   {}", self::display(cmd.ou_block()));
    info!("msgs sent:    {}", self::display(cmd.msg_snd()));
    info!("msgs rcvd:    {}", self::display(cmd.msg_rcv()));
    info!("signals:      {}", self::display(cmd.n_signals()));
    info!("vol ctx sw:   {}", self::display(cmd.n_vcsw()));
    info!("invol ctx sw: {}", self::display(cmd.n_ivcsw()));
}

/// JSON rendering of the final record pair.
pub fn json_summary(cmd: &Cmd) -> Result<String> {
    let status = cmd.status()?;
    let usage = cmd.rusage()?;
    let value = serde_json::json!({
        "command": cmd.to_string(),
        "pid": cmd.pid()?,
        "status": {
            "raw": status.into_raw(),
            "exited": status.exited(),
            "exit_status": status.exit_status(),
            "signaled": status.signaled(),
            "signal": status.signal(),
            "core_dumped": status.core_dumped(),
        },
        "rusage": usage,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

fn display<T: fmt::Display>(result: CmdResult<T>) -> String {
    match result {
        Ok(value) => value.to_string(),
        Err(e) => format!("({})", e),
    }
}

fn debug_display<T: fmt::Debug>(result: CmdResult<T>) -> String {
    match result {
        Ok(value) => format!("{:?}", value),
        Err(e) => format!("({})", e),
    }
}

use anyhow::Result;
use clap::Parser;
use tracing::info;

use runstat_process::Cmd;

mod report;

/// Runstat demo - launch a command, wait for it, and report its
/// termination status and resource usage at each lifecycle stage.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Print the final records as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Command to run (program followed by its arguments); a built-in
    /// sample set runs when omitted
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    initialize_logging(args.debug)?;

    if args.command.is_empty() {
        run_samples(args.json)
    } else {
        run_command(&args.command, args.json)
    }
}

/// The built-in walk: a chatty success, a failure, and a slow exit.
fn run_samples(json: bool) -> Result<()> {
    let samples: [&[&str]; 3] = [&["ls", "-l", "-t"], &["false"], &["sleep", "1"]];
    for sample in samples {
        let argv: Vec<String> = sample.iter().map(|s| s.to_string()).collect();
        run_command(&argv, json)?;
    }
    Ok(())
}

fn run_command(argv: &[String], json: bool) -> Result<()> {
    let (program, rest) = match argv.split_first() {
        Some(parts) => parts,
        None => anyhow::bail!("No command given"),
    };
    let mut cmd = Cmd::new(program).args(rest.iter().cloned());
    info!("Command: {}", cmd);

    info!("--- before start ---");
    report::report(&cmd);

    cmd.start()?;
    info!("--- started, before wait ---");
    report::report(&cmd);

    cmd.wait()?;
    info!("--- after wait ---");
    report::report(&cmd);

    if json {
        println!("{}", report::json_summary(&cmd)?);
    }
    Ok(())
}

fn initialize_logging(debug: bool) -> Result<()> {
    let level = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .init();

    Ok(())
}

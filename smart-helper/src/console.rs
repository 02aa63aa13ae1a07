//! Running a console from the command line
//!
//! Two clocks are supported. In virtual mode the console is stepped
//! directly, so `--duration 600` returns instantly with ten simulated
//! minutes of activity. Otherwise it runs on a [`SessionHandle`] in real
//! time until the duration passes or Ctrl-C is pressed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use smart_helper_core::{
    AdminSession, CommandOutcome, HelperSession, SessionHandle, Simulation,
};

use crate::{render, script};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Output format for snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// A simulation the CLI knows how to script and print
pub trait Console: Simulation {
    fn parse(line: &str, snapshot: &Self::Snapshot) -> Result<Self::Command>;
    fn render(snapshot: &Self::Snapshot) -> String;
    fn to_json(snapshot: &Self::Snapshot) -> Result<String>;
}

impl Console for HelperSession {
    fn parse(line: &str, snapshot: &Self::Snapshot) -> Result<Self::Command> {
        script::parse_helper(line, snapshot)
    }

    fn render(snapshot: &Self::Snapshot) -> String {
        render::helper(snapshot)
    }

    fn to_json(snapshot: &Self::Snapshot) -> Result<String> {
        Ok(serde_json::to_string_pretty(snapshot)?)
    }
}

impl Console for AdminSession {
    fn parse(line: &str, snapshot: &Self::Snapshot) -> Result<Self::Command> {
        script::parse_admin(line, snapshot)
    }

    fn render(snapshot: &Self::Snapshot) -> String {
        render::admin(snapshot)
    }

    fn to_json(snapshot: &Self::Snapshot) -> Result<String> {
        Ok(serde_json::to_string_pretty(snapshot)?)
    }
}

/// How a console run is driven and reported
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Total run length; real-time runs without one stop on Ctrl-C
    pub duration: Option<Duration>,
    pub virtual_time: bool,
    /// Command lines applied in order once the console is ready
    pub exec: Vec<String>,
    /// When the command lines run, relative to the console opening
    pub exec_at: Duration,
    /// Print a snapshot this often during a real-time run
    pub watch: Option<Duration>,
    pub tick: Duration,
    pub format: OutputFormat,
}

/// Run `session` to completion and print its final snapshot
pub fn run<S: Console>(session: S, options: &RunOptions) -> Result<()> {
    tracing::info!(
        console = S::NAME,
        virtual_time = options.virtual_time,
        commands = options.exec.len(),
        "console run starting"
    );

    let snapshot = if options.virtual_time {
        run_virtual(session, options)?
    } else {
        run_realtime(session, options)?
    };
    print_snapshot::<S>(&snapshot, options.format)
}

fn print_snapshot<S: Console>(snapshot: &S::Snapshot, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", S::render(snapshot)),
        OutputFormat::Json => println!("{}", S::to_json(snapshot)?),
    }
    Ok(())
}

fn report(line: &str, outcome: &CommandOutcome) {
    match outcome {
        CommandOutcome::Applied => eprintln!("{}: applied", line),
        CommandOutcome::Ignored(reason) => eprintln!("{}: ignored ({})", line, reason),
    }
}

fn run_virtual<S: Console>(mut session: S, options: &RunOptions) -> Result<S::Snapshot> {
    let end = options.duration.unwrap_or(Duration::ZERO).max(options.exec_at);

    session.advance_to(options.exec_at);
    for line in &options.exec {
        let command = S::parse(line, &session.snapshot())
            .with_context(|| format!("invalid {} command `{}`", S::NAME, line))?;
        let outcome = session.apply(command);
        report(line, &outcome);
    }

    session.advance_to(end);
    Ok(session.snapshot())
}

fn run_realtime<S: Console>(session: S, options: &RunOptions) -> Result<S::Snapshot> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nShutting down...");
        r.store(false, Ordering::SeqCst);
    })
    .context("failed to set Ctrl-C handler")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(async {
        let opened = tokio::time::Instant::now();
        let (handle, task) = SessionHandle::spawn(session, options.tick);

        tokio::time::sleep(options.exec_at).await;
        for line in &options.exec {
            let snapshot = handle.snapshot().await?;
            let command = S::parse(line, &snapshot)
                .with_context(|| format!("invalid {} command `{}`", S::NAME, line))?;
            let outcome = handle.apply(command).await?;
            report(line, &outcome);
        }

        let deadline = options.duration.map(|d| opened + d);
        let mut last_print = tokio::time::Instant::now();
        while running.load(Ordering::SeqCst) {
            let now = tokio::time::Instant::now();
            if deadline.is_some_and(|d| now >= d) {
                break;
            }
            if let Some(every) = options.watch {
                if now.duration_since(last_print) >= every {
                    print_snapshot::<S>(&handle.snapshot().await?, options.format)?;
                    last_print = now;
                }
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }

        let snapshot = handle.snapshot().await?;
        handle.shutdown().await?;
        task.await.context("console task failed")?;
        tracing::info!(console = S::NAME, "console run finished");
        Ok::<_, anyhow::Error>(snapshot)
    })
}

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use procwatch::Watcher;
use procwatch::sinks::{DesktopSink, EmailSink};
use procwatch_core::{NotificationSink, WatcherConfig};
use procwatch_system::SystemProbe;

/// Watch a process and notify when it completes via various communication
/// protocols.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "Watch a process and notify when it completes \
via various communication protocols.\n\n\
[+] indicates the argument may be specified multiple times, for example:\n  \
procwatch -p 1234 -p 4258 -c myapp -c 'exec\\d+' --to person1@domain.com --to person2@someplace.com")]
struct Args {
    /// Process ID(s) to watch [+]
    #[arg(short, long, value_name = "PID")]
    pid: Vec<u32>,

    /// Watch all processes matching the command name (RegEx pattern) [+]
    #[arg(short, long, value_name = "COMMAND_PATTERN")]
    command: Vec<String>,

    /// Watch for new processes that match --command (run forever)
    #[arg(short, long)]
    watch_new: bool,

    /// Email address to send to [+]
    #[arg(long, value_name = "EMAIL_ADDRESS")]
    to: Vec<String>,

    /// Send desktop notification
    #[arg(short, long)]
    notify: bool,

    /// How often to check on processes, in seconds
    #[arg(short, long, default_value_t = 15.0, value_name = "SECONDS")]
    interval: f64,

    /// Don't print anything to stdout
    #[arg(short, long)]
    quiet: bool,

    /// SMTP relay used for email notifications
    #[arg(long, default_value = "localhost", value_name = "HOST")]
    smtp_relay: String,

    /// SMTP relay port used for email notifications
    #[arg(long, default_value_t = 25, value_name = "PORT")]
    smtp_port: u16,

    /// Sender address for email notifications
    #[arg(long, default_value = "procwatch@localhost", value_name = "EMAIL_ADDRESS")]
    smtp_from: String,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Just print help and exit if no arguments specified.
    if std::env::args().len() == 1 {
        println!("No arguments given, printing help:\n");
        Args::command().print_help()?;
        println!();
        return Ok(());
    }

    let args = Args::parse();
    initialize_logging(args.debug)?;

    let config = WatcherConfig::builder()
        .pids(args.pid.iter().copied())
        .patterns(args.command.iter().cloned())
        .watch_new(args.watch_new)
        .interval_secs(args.interval)
        .quiet(args.quiet)
        .build()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    let sinks = build_sinks(&args).await?;
    let probe = Arc::new(SystemProbe::new());
    let mut watcher = Watcher::new(config, probe, sinks)?;

    watcher
        .resolve_initial()
        .await
        .context("failed to resolve watch targets")?;

    // An interrupt cancels the loop at its next scheduling point; the loop
    // itself exits once nothing remains to watch.
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("interrupt signal received");
                signal_cancel.cancel();
            }
            Err(e) => error!(error = %e, "failed to listen for interrupt signal"),
        }
    });

    watcher.run(cancel).await;
    Ok(())
}

/// Build the requested notification sinks. Any sink that cannot be set up
/// fails the run here, before the loop starts.
async fn build_sinks(args: &Args) -> Result<Vec<Arc<dyn NotificationSink>>> {
    let mut sinks: Vec<Arc<dyn NotificationSink>> = Vec::new();

    if !args.to.is_empty() {
        let sink = EmailSink::new(&args.smtp_relay, args.smtp_port, &args.smtp_from, &args.to)
            .await
            .context("could not set up the email channel (required by --to)")?;
        sinks.push(Arc::new(sink));
    }

    if args.notify {
        let sink = DesktopSink::new()
            .context("could not set up the desktop notification channel (required by --notify)")?;
        sinks.push(Arc::new(sink));
    }

    Ok(sinks)
}

fn initialize_logging(debug: bool) -> Result<()> {
    let level = if debug { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    Ok(())
}

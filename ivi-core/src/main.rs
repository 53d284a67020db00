//! IVI shell (ivi-shell) - Main entry point
//!
//! Line-oriented driver console for the infotainment core. Reads one command
//! per line from stdin and prints the response; anything that is not a shell
//! command is handed to the voice assistant.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ivi_common::config::{resolve_data_folder, TomlConfig};
use ivi_core::catalog::Catalogs;
use ivi_core::shell::{self, ShellCommand};
use ivi_core::{Hub, HubHandle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for ivi-shell
#[derive(Parser, Debug)]
#[command(name = "ivi-shell")]
#[command(about = "Interactive console for the IVI orchestration core")]
#[command(version)]
struct Args {
    /// Config file (TOML)
    #[arg(short, long, env = "IVI_CONFIG")]
    config: Option<PathBuf>,

    /// Folder holding catalog JSON files; built-in samples when omitted
    #[arg(short, long)]
    data_folder: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,
}

fn init_tracing(config: &TomlConfig, cli_level: Option<&str>) -> Result<()> {
    let level = cli_level.unwrap_or(&config.logging.level);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("ivi_core={level},ivi_common={level}").into());

    let (file_layer, stderr_layer) = match &config.logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file));
            (Some(layer), None)
        }
        None => (
            None,
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();
    Ok(())
}

fn print_lines(lines: &[String]) {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for line in lines {
        let _ = writeln!(out, "{}", line);
    }
}

fn prompt() {
    let mut out = std::io::stdout();
    let _ = write!(out, "ivi> ");
    let _ = out.flush();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config, args.log_level.as_deref())?;

    info!(
        "Starting ivi-shell {} (git {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let data_folder = resolve_data_folder(args.data_folder.as_deref(), &config);
    let catalogs = Catalogs::load(data_folder.as_deref()).context("Failed to load catalogs")?;
    let hub = Hub::new(catalogs, &config).context("Failed to initialize hub")?;
    let handle = HubHandle::new(hub);

    // Event log
    let mut events = handle.subscribe().await;
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => debug!("event {}", event.name()),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Event log lagged, {} events dropped", n)
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    print_lines(&["Type 'help' for commands, 'quit' to exit.".to_string()]);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt();
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            result = signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!("Ctrl+C handler failed: {}", e);
                }
                info!("Received Ctrl+C, shutting down");
                break;
            }
        };
        let Some(line) = line else {
            break;
        };

        let command = match ShellCommand::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                print_lines(&[format!("error: {}", e)]);
                continue;
            }
        };
        if command == ShellCommand::Quit {
            break;
        }

        match shell::execute(&handle, command).await {
            Ok(output) => print_lines(&output),
            Err(e) => print_lines(&[format!("error: {}", e)]),
        }
    }

    info!("Shell exited");
    Ok(())
}

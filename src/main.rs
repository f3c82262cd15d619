mod config;
mod logging;
mod message_log;
mod protocol;
mod server;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde_json::json;
use tokio::io::BufReader;
use tracing::{error, info};

use config::{DEFAULT_HOVER_DELAY_MS, DEFAULT_TIMEOUT_DELAY_MS, ServerConfig, ServerMode};
use logging::{LogConfig, init_logging};
use message_log::{Direction, MessageLog};
use protocol::MessageWriter;
use server::Server;

/// CLI arguments for the mock LSP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server behavior mode
    #[arg(long, value_enum, default_value_t = ServerMode::Normal)]
    mode: ServerMode,

    /// JSONL log path for incoming/outgoing protocol messages
    #[arg(long, value_name = "FILE", default_value = "/tmp/mock-lsp-server.log")]
    log: PathBuf,

    /// Delay for hover responses outside timeout mode (milliseconds)
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_HOVER_DELAY_MS)]
    hover_delay_ms: u64,

    /// Delay for hover responses in timeout mode (milliseconds)
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_TIMEOUT_DELAY_MS)]
    timeout_delay_ms: u64,

    /// Emit a work-done progress sequence right after `initialized`
    #[arg(long)]
    startup_progress: bool,

    /// Diagnostic log level (overrides RUST_LOG)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Diagnostic log file (overrides MOCK_LSP_LOG_FILE; defaults to stderr)
    #[arg(long, value_name = "FILE")]
    trace_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let log_config =
        LogConfig::from_env().with_overrides(args.log_level.clone(), args.trace_file.clone());
    if let Err(err) = init_logging(log_config) {
        eprintln!("Failed to initialize logging: {err}");
        std::process::exit(1);
    }

    let message_log = match MessageLog::open(&args.log) {
        Ok(log) => Arc::new(log),
        Err(err) => {
            eprintln!("Failed to open message log {}: {err}", args.log.display());
            std::process::exit(1);
        }
    };

    let config = ServerConfig {
        mode: args.mode,
        hover_delay: Duration::from_millis(args.hover_delay_ms),
        timeout_delay: Duration::from_millis(args.timeout_delay_ms),
        startup_progress: args.startup_progress,
    };

    info!(mode = ?config.mode, log = %args.log.display(), "mock LSP server listening on stdio");

    let server = Server::new(config, MessageWriter::stdout(), Arc::clone(&message_log));
    let mut reader = BufReader::new(tokio::io::stdin());

    tokio::select! {
        result = server.run(&mut reader) => match result {
            Ok(()) => info!("read loop finished; exiting"),
            Err(err) => {
                message_log.record(Direction::Error, &json!({ "error": err.to_string() }), None);
                error!(error = %err, "fatal protocol error");
                std::process::exit(1);
            }
        },
        _ = tokio::signal::ctrl_c() => info!("interrupted; exiting"),
    }
}

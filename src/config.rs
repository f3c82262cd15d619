//! Immutable run configuration
//!
//! Read once at startup; the mode and delays never change for the
//! lifetime of the process.

use std::time::Duration;

use clap::ValueEnum;

/// Default hover delay outside timeout mode (milliseconds).
pub const DEFAULT_HOVER_DELAY_MS: u64 = 1500;

/// Default hover delay in timeout mode (milliseconds).
///
/// Long enough that a client with an ordinary request timeout gives up
/// before the response arrives.
pub const DEFAULT_TIMEOUT_DELAY_MS: u64 = 12_000;

/// Simulated server behavior, fixed at process start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ServerMode {
    /// Respond normally, with a short hover delay.
    Normal,
    /// Respond normally, but delay hover long enough to trip client
    /// request timeouts.
    Timeout,
    /// Terminate with a non-zero status when `initialize` arrives.
    CrashInit,
    /// Never respond to `initialize`.
    IgnoreInit,
}

/// Server configuration assembled from the command line.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub mode: ServerMode,
    pub hover_delay: Duration,
    pub timeout_delay: Duration,
    pub startup_progress: bool,
}

impl ServerConfig {
    /// Hover delay selected by the operating mode.
    pub fn effective_hover_delay(&self) -> Duration {
        match self.mode {
            ServerMode::Timeout => self.timeout_delay,
            _ => self.hover_delay,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            mode: ServerMode::Normal,
            hover_delay: Duration::from_millis(DEFAULT_HOVER_DELAY_MS),
            timeout_delay: Duration::from_millis(DEFAULT_TIMEOUT_DELAY_MS),
            startup_progress: false,
        }
    }
}

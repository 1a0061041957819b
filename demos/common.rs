//! Shared utilities for demos.
//!
//! Provides common functionality used across all demos:
//! - Command-line argument parsing
//! - Logging initialization

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use tracing_subscriber::EnvFilter;

// ============================================================================
// Constants
// ============================================================================

/// Default Marionette host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default Marionette port (`firefox --marionette`).
pub const DEFAULT_PORT: u16 = 2828;

// ============================================================================
// Types
// ============================================================================

/// Command-line arguments for demos.
#[derive(Debug, Clone)]
pub struct Args {
    pub debug: bool,
    pub host: String,
    pub port: u16,
}

impl Args {
    /// Parse command-line arguments.
    ///
    /// Accepts `--debug`, `--host=<host>` and `--port=<port>`.
    pub fn parse() -> Self {
        let args: Vec<String> = std::env::args().collect();

        let value = |name: &str| {
            args.iter()
                .find_map(|a| a.strip_prefix(name).map(str::to_string))
        };

        Self {
            debug: args.iter().any(|a| a == "--debug"),
            host: value("--host=").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: value("--port=")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        }
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Initialize tracing/logging.
pub fn init_logging(debug: bool) {
    let filter = if debug {
        "marionette_transport=trace"
    } else {
        "marionette_transport=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

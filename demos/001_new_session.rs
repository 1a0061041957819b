//! Handshake, session creation and a few raw commands.
//!
//! Demonstrates:
//! - Connecting and reading the server greeting
//! - Creating a session and reading its capabilities
//! - Sending commands and reading reply values
//! - Deleting the session and closing the socket
//!
//! Start Firefox with `firefox --marionette` first.
//!
//! Usage:
//!   cargo run --example 001_new_session
//!   cargo run --example 001_new_session -- --debug
//!   cargo run --example 001_new_session -- --port=2829

mod common;

// ============================================================================
// Imports
// ============================================================================

use common::Args;
use marionette_transport::{Connection, Result};
use serde_json::json;

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    println!("=== 001: New Session ===\n");

    // ========================================================================
    // Connect
    // ========================================================================

    println!("[1] Connecting to {}:{}...", args.host, args.port);

    let mut connection = Connection::connect(&args.host, args.port).await?;
    let greeting = connection.greeting();

    println!(
        "    ✓ {} speaks protocol {} ({:?} dialect)\n",
        greeting.application_type,
        greeting.protocol_version,
        connection.dialect()
    );

    // ========================================================================
    // Session
    // ========================================================================

    println!("[2] Creating session...");

    let response = connection
        .send("WebDriver:NewSession", json!({"capabilities": {}}))
        .await?;

    let capabilities = connection.session().capabilities();
    println!(
        "    ✓ Session {} (message {}, {} bytes)",
        connection
            .session_id()
            .map(|id| id.as_str())
            .unwrap_or("<none>"),
        response.message_id_or_zero(),
        response.size
    );
    println!(
        "    Browser: {} {}\n",
        capabilities.get_str("browserName").unwrap_or("?"),
        capabilities.get_str("browserVersion").unwrap_or("?")
    );

    // ========================================================================
    // Commands
    // ========================================================================

    println!("[3] Navigating...");

    connection
        .send("WebDriver:Navigate", json!({"url": "https://example.com"}))
        .await?;
    let title = connection.send("WebDriver:GetTitle", json!({})).await?;

    println!("    ✓ Title: {}\n", title.get_string("value"));

    // ========================================================================
    // Teardown
    // ========================================================================

    println!("[4] Deleting session...");

    connection
        .send("WebDriver:DeleteSession", json!({}))
        .await?;
    connection.close().await?;

    println!("    ✓ Done");
    Ok(())
}

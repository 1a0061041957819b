//! Telling remote failures apart from transport failures.
//!
//! Demonstrates:
//! - A failing command returning a driver error
//! - The connection staying usable afterwards
//! - Inspecting the untranslated reply with `send_raw`
//!
//! Start Firefox with `firefox --marionette` first.
//!
//! Usage:
//!   cargo run --example 002_driver_error
//!   cargo run --example 002_driver_error -- --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use anyhow::{Context, bail};
use common::Args;
use marionette_transport::{Connection, ConnectionOptions, Outcome};
use serde_json::json;

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e:#}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    println!("=== 002: Driver Errors ===\n");

    let options = ConnectionOptions::new()
        .with_connect_timeout(Duration::from_secs(5))
        .with_read_timeout(Duration::from_secs(30));

    let mut connection = Connection::connect_with(&args.host, args.port, options)
        .await
        .context("connecting to Marionette")?;

    connection
        .send("WebDriver:NewSession", json!({"capabilities": {}}))
        .await
        .context("creating session")?;

    // ========================================================================
    // Failing Command
    // ========================================================================

    println!("[1] Looking up a missing element...");

    let lookup = json!({"using": "css selector", "value": "#does-not-exist"});

    match connection.send("WebDriver:FindElement", lookup.clone()).await {
        Ok(_) => bail!("element unexpectedly found"),
        Err(e) if !e.is_driver_error() => return Err(e).context("transport failed"),
        Err(e) => {
            if let Some(driver) = e.driver_error() {
                println!("    ✓ {}: {}", driver.status, driver.message);
            }
        }
    }

    println!("    Connection usable: {}\n", connection.is_usable());

    // ========================================================================
    // Raw Reply
    // ========================================================================

    println!("[2] Same lookup, untranslated...");

    let raw = connection
        .send_raw("WebDriver:FindElement", lookup)
        .await
        .context("sending raw command")?;

    match raw.outcome {
        Outcome::Success(value) => println!("    Value: {value}"),
        Outcome::Failure(driver) => println!(
            "    ✓ Failure in {} byte reply (stack trace: {})",
            raw.size,
            if driver.stacktrace.is_some() { "yes" } else { "no" }
        ),
    }

    connection
        .send("WebDriver:DeleteSession", json!({}))
        .await
        .context("deleting session")?;
    connection.close().await?;

    println!("\n    ✓ Done");
    Ok(())
}

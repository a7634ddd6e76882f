//! # Quote
//!
//! Prices a JSON calculation request against the configured code store and
//! prints the JSON result.
//!
//! ## Usage
//! ```bash
//! # Apply the request's codes
//! cargo run -p discount-db --bin quote -- request.json
//!
//! # Read the request from stdin, apply every eligible code instead
//! cat request.json | cargo run -p discount-db --bin quote -- --max
//!
//! # Only check whether the request's codes may be combined
//! cargo run -p discount-db --bin quote -- --check-combination request.json
//! ```
//!
//! Logs go to stderr (`RUST_LOG`, default `info`); stdout carries only JSON.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::sync::Arc;

use discount_core::{CalculationRequest, DiscountCalculator};
use discount_db::{AppConfig, Database};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Calculate,
    Maximum,
    CheckCombination,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let mut mode = Mode::Calculate;
    let mut input: Option<String> = None;
    let mut config = AppConfig::load()?;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--max" => mode = Mode::Maximum,
            "--check-combination" => mode = Mode::CheckCombination,
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.db_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Usage: quote [OPTIONS] [REQUEST.json]");
                println!();
                println!("Reads the request from REQUEST.json, or stdin when omitted.");
                println!();
                println!("Options:");
                println!("      --max                 Apply every eligible code (ignores the request's codes)");
                println!("      --check-combination   Print whether the request's codes can be combined");
                println!("  -d, --db <PATH>           Database file path (default: $DISCOUNT_DB_PATH)");
                println!("  -h, --help                Show this help message");
                return Ok(());
            }
            other => input = Some(other.to_string()),
        }
        i += 1;
    }

    let raw = match input.as_deref() {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let request: CalculationRequest = serde_json::from_str(&raw)?;

    let db = Database::new(config.db_config()).await?;
    let calculator =
        DiscountCalculator::new(Arc::new(db.codes())).with_config(config.calculator.clone());
    info!(?mode, codes = request.discount_codes.len(), "Pricing request");

    let output = match mode {
        Mode::Calculate => serde_json::to_value(calculator.calculate(&request).await?)?,
        Mode::Maximum => serde_json::to_value(calculator.get_maximum_discount(&request).await?)?,
        Mode::CheckCombination => {
            let can_combine = calculator
                .validate_combination(&request.discount_codes)
                .await?;
            serde_json::json!({
                "discount_codes": request.discount_codes,
                "can_be_combined": can_combine,
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    db.close().await;
    Ok(())
}

/// Initializes logging to stderr.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show each stage decision
/// - Default: INFO level, sqlx at WARN
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

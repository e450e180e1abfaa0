//! research-cli: equity research report for one symbol.
//!
//! Fetches two years of daily closes and annual fundamentals from Financial
//! Modeling Prep, overlays short/long moving-average crossover signals on the
//! price trend, and prints the valuation, profitability, cash flow and EPS
//! panels.
//!
//! Usage:
//!   cargo run -p research-cli -- --symbol AMZN
//!   cargo run -p research-cli -- --symbol MSFT --short-window 20 --long-window 50
//!   cargo run -p research-cli -- --symbol AAPL --format json > aapl.json

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use fmp_client::FmpClient;
use research_orchestrator::ResearchOrchestrator;

mod config;
mod render;

use config::{Args, ResearchConfig};

fn init_tracing() {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "research_cli=info,research_orchestrator=info,fmp_client=warn".into())
    };

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    // Logs go to stderr so report output on stdout stays clean
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter())
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let config = ResearchConfig::from_args(
        args,
        std::env::var("FMP_API_KEY").ok(),
        Utc::now().date_naive(),
    )?;

    let orchestrator = ResearchOrchestrator::with_fmp(FmpClient::new(config.api_key.clone()));

    match orchestrator.run(&config.request).await {
        Ok(research) => {
            let stdout = std::io::stdout();
            render::render(&research, config.format, stdout.lock())?;
            Ok(())
        }
        Err(e) => {
            tracing::error!("Research for {} failed: {}", config.request.symbol, e);
            eprintln!("An error occurred: {}", e);
            eprintln!("Please check your API key and ensure you have access to the required data.");
            std::process::exit(1);
        }
    }
}

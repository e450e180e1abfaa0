use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use clap::{Parser, ValueEnum};
use research_orchestrator::{ResearchRequest, DEFAULT_LOOKBACK_DAYS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Equity research report: price trend with moving-average crossover
/// signals plus annual fundamentals, using data from Financial Modeling Prep.
#[derive(Parser, Debug)]
#[command(name = "research-cli", version)]
pub struct Args {
    /// Financial Modeling Prep API key; falls back to FMP_API_KEY
    #[arg(long)]
    pub api_key: Option<String>,

    /// Ticker symbol
    #[arg(short, long, default_value = "AMZN")]
    pub symbol: String,

    /// Short-term MA period
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub short_window: u32,

    /// Long-term MA period
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..=200))]
    pub long_window: u32,

    /// First day of price history (YYYY-MM-DD), default two years before --to
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day of price history (YYYY-MM-DD), default today
    #[arg(long)]
    pub to: Option<NaiveDate>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone)]
pub struct ResearchConfig {
    pub api_key: String,
    pub request: ResearchRequest,
    pub format: OutputFormat,
}

impl ResearchConfig {
    /// The --api-key flag wins over the environment
    pub fn from_args(args: Args, env_api_key: Option<String>, today: NaiveDate) -> Result<Self> {
        let api_key = args
            .api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| env_api_key.filter(|k| !k.trim().is_empty()))
            .context("No API key: pass --api-key or set FMP_API_KEY")?;

        let mut request = ResearchRequest::new(
            &args.symbol,
            args.short_window as usize,
            args.long_window as usize,
            today,
        );
        if args.from.is_some() || args.to.is_some() {
            let end = args.to.unwrap_or(today);
            let start = args
                .from
                .unwrap_or(end - Duration::days(DEFAULT_LOOKBACK_DAYS));
            request = request.with_range(start, end);
        }
        request.validate().context("Invalid research parameters")?;

        Ok(Self {
            api_key,
            request,
            format: args.format,
        })
    }
}

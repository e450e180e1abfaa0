use chrono::Utc;
use fmp_client::FmpClient;
use fundamental_analysis::{FundamentalAnalysisEngine, FundamentalSnapshot};
use research_core::{
    Crossover, FundamentalsProvider, Fundamentals, PriceHistoryProvider, ReportSection,
    ResearchError, ResearchReport,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use technical_analysis::{PriceTrend, PriceTrendAnalyzer, TrendStance};

pub mod request;
pub use request::{ResearchRequest, DEFAULT_LOOKBACK_DAYS};

pub const REPORT_TITLE: &str = "Equity Research";
pub const PRICE_TREND: &str = "Price Trend with Buy/Sell Signals";

/// Everything produced for one symbol: the page plus the raw series behind it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquityResearch {
    pub report: ResearchReport,
    pub price_trend: PriceTrend,
    pub fundamentals: FundamentalSnapshot,
    pub latest_crossover: Option<Crossover>,
    pub stance: TrendStance,
}

pub struct ResearchOrchestrator {
    price_provider: Arc<dyn PriceHistoryProvider>,
    fundamentals_provider: Arc<dyn FundamentalsProvider>,
    fundamental_analyzer: FundamentalAnalysisEngine,
}

impl ResearchOrchestrator {
    pub fn new(
        price_provider: Arc<dyn PriceHistoryProvider>,
        fundamentals_provider: Arc<dyn FundamentalsProvider>,
    ) -> Self {
        Self {
            price_provider,
            fundamental_analyzer: FundamentalAnalysisEngine::new(),
            fundamentals_provider,
        }
    }

    /// Prices and fundamentals both from Financial Modeling Prep
    pub fn with_fmp(client: FmpClient) -> Self {
        let client = Arc::new(client);
        Self::new(client.clone(), client)
    }

    async fn fetch_fundamentals(&self, symbol: &str) -> Result<Fundamentals, ResearchError> {
        let provider = &self.fundamentals_provider;
        let (ratios, metrics, income, cash_flow) = tokio::try_join!(
            provider.financial_ratios(symbol),
            provider.key_metrics(symbol),
            provider.income_statements(symbol),
            provider.cash_flow_statements(symbol),
        )?;

        Ok(Fundamentals {
            ratios,
            metrics,
            income,
            cash_flow,
        })
    }

    /// Fetch, compute and lay out the full report for one symbol
    pub async fn run(&self, request: &ResearchRequest) -> Result<EquityResearch, ResearchError> {
        request.validate()?;
        let analyzer = PriceTrendAnalyzer::new(request.short_window, request.long_window)?;
        let symbol = request.symbol.as_str();

        tracing::info!(
            "Starting research for {} ({} to {}, MA {}/{})",
            symbol,
            request.start,
            request.end,
            request.short_window,
            request.long_window
        );

        let (prices, fundamentals) = tokio::try_join!(
            self.price_provider.price_history(symbol, request.start, request.end),
            self.fetch_fundamentals(symbol),
        )?;

        if prices.is_empty() {
            return Err(ResearchError::InsufficientData(format!(
                "No price history for {} between {} and {}",
                symbol, request.start, request.end
            )));
        }

        let price_trend = analyzer.analyze(&prices)?;
        let latest_crossover = price_trend.latest_crossover();
        let stance = price_trend.stance();
        let snapshot = self.fundamental_analyzer.snapshot(&fundamentals);

        tracing::info!(
            "{}: {} closes, {} crossovers, {}",
            symbol,
            prices.len(),
            price_trend.crossovers().len(),
            stance.to_label()
        );

        let mut sections = vec![
            ReportSection::new(format!("Stock - {}", symbol)),
            ReportSection::new(PRICE_TREND).with_panel(price_trend.to_panel()),
        ];
        sections.extend(self.fundamental_analyzer.sections(&fundamentals));

        let report = ResearchReport {
            title: REPORT_TITLE.to_string(),
            symbol: symbol.to_string(),
            generated_at: Utc::now(),
            sections,
        };

        Ok(EquityResearch {
            report,
            price_trend,
            fundamentals: snapshot,
            latest_crossover,
            stance,
        })
    }
}

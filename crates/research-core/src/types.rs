use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily closing price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Ticker symbols are letters, digits, `.` and `-` (`AMZN`, `BRK-B`, `RDS.A`)
pub fn is_valid_symbol(symbol: &str) -> bool {
    !symbol.is_empty()
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}

/// Rolling mean aligned index-for-index with its price series.
/// `None` marks positions where the window has not filled yet.
pub type MovingAverageSeries = Vec<Option<f64>>;

/// Per-index crossover flags aligned with the price series
pub type SignalSeries = Vec<bool>;

/// Annual financial ratios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRatios {
    pub date: NaiveDate,
    pub price_to_book: Option<f64>,
    pub price_to_sales: Option<f64>,
    /// Fraction, not percent (0.21 = 21%)
    pub return_on_equity: Option<f64>,
    pub gross_profit_margin: Option<f64>,
    pub net_profit_margin: Option<f64>,
}

/// Annual key metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMetrics {
    pub date: NaiveDate,
    pub debt_to_equity: Option<f64>,
}

/// Annual income statement (only the fields the report uses)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub date: NaiveDate,
    pub eps: Option<f64>,
    pub eps_diluted: Option<f64>,
}

/// Annual cash flow statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowStatement {
    pub date: NaiveDate,
    pub operating: Option<f64>,
    pub investing: Option<f64>,
    pub financing: Option<f64>,
}

/// Everything the fundamentals provider returns for one symbol.
/// Each list is most-recent-first, as delivered by the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fundamentals {
    pub ratios: Vec<FinancialRatios>,
    pub metrics: Vec<KeyMetrics>,
    pub income: Vec<IncomeStatement>,
    pub cash_flow: Vec<CashFlowStatement>,
}

/// Which way the short average crossed the long one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossoverKind {
    Buy,
    Sell,
}

impl CrossoverKind {
    pub fn to_label(&self) -> &'static str {
        match self {
            CrossoverKind::Buy => "Buy",
            CrossoverKind::Sell => "Sell",
        }
    }
}

/// A single crossover event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Crossover {
    pub date: NaiveDate,
    pub close: f64,
    pub kind: CrossoverKind,
}

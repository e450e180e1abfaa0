use chrono::NaiveDate;
use research_core::{
    CashFlowStatement, ChartPoint, ChartSeries, FinancialRatios, Fundamentals, IncomeStatement,
    KeyMetrics, ReportPanel, ReportSection, SeriesKind,
};
use serde::{Deserialize, Serialize};

pub const FINANCIAL_RATIOS: &str = "Financial Ratios";
pub const PROFITABILITY_RATIOS: &str = "Profitability Ratios";
pub const CASH_FLOW_AND_EARNINGS: &str = "Cash Flow and Earnings";

/// Latest reported figure for every headline metric
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundamentalSnapshot {
    pub price_to_book: Option<f64>,
    pub price_to_sales: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub gross_profit_margin: Option<f64>,
    pub net_profit_margin: Option<f64>,
    pub eps: Option<f64>,
    pub eps_diluted: Option<f64>,
}

/// Most recent record by reporting date
fn latest<T>(records: &[T], date: fn(&T) -> NaiveDate) -> Option<&T> {
    records.iter().max_by_key(|r| date(r))
}

/// Oldest-first points for a chart, whatever order the provider used
fn chronological<T>(
    records: &[T],
    date: fn(&T) -> NaiveDate,
    value: fn(&T) -> Option<f64>,
) -> Vec<ChartPoint> {
    let mut points: Vec<ChartPoint> = records
        .iter()
        .map(|r| ChartPoint::new(date(r), value(r)))
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

fn format_ratio(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "n/a".to_string(),
    }
}

/// Provider reports fractions; show them as percentages
fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "n/a".to_string(),
    }
}

fn format_dollars(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("${:.2}", v),
        None => "n/a".to_string(),
    }
}

fn ratio_date(r: &FinancialRatios) -> NaiveDate {
    r.date
}

fn metrics_date(m: &KeyMetrics) -> NaiveDate {
    m.date
}

fn income_date(i: &IncomeStatement) -> NaiveDate {
    i.date
}

fn cash_flow_date(c: &CashFlowStatement) -> NaiveDate {
    c.date
}

/// Builds the valuation, profitability, cash flow and EPS panels
pub struct FundamentalAnalysisEngine;

impl Default for FundamentalAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FundamentalAnalysisEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn snapshot(&self, fundamentals: &Fundamentals) -> FundamentalSnapshot {
        let ratios = latest(&fundamentals.ratios, ratio_date);
        let metrics = latest(&fundamentals.metrics, metrics_date);
        let income = latest(&fundamentals.income, income_date);

        FundamentalSnapshot {
            price_to_book: ratios.and_then(|r| r.price_to_book),
            price_to_sales: ratios.and_then(|r| r.price_to_sales),
            return_on_equity: ratios.and_then(|r| r.return_on_equity),
            debt_to_equity: metrics.and_then(|m| m.debt_to_equity),
            gross_profit_margin: ratios.and_then(|r| r.gross_profit_margin),
            net_profit_margin: ratios.and_then(|r| r.net_profit_margin),
            eps: income.and_then(|i| i.eps),
            eps_diluted: income.and_then(|i| i.eps_diluted),
        }
    }

    /// Report sections in page order
    pub fn sections(&self, fundamentals: &Fundamentals) -> Vec<ReportSection> {
        let snapshot = self.snapshot(fundamentals);
        vec![
            self.financial_ratios_section(fundamentals, &snapshot),
            self.profitability_section(fundamentals, &snapshot),
            self.cash_flow_and_earnings_section(fundamentals, &snapshot),
        ]
    }

    fn single_line_panel(
        title: &str,
        y_label: &str,
        points: Vec<ChartPoint>,
        current: String,
        explanation: &str,
    ) -> ReportPanel {
        ReportPanel::new(title, y_label)
            .with_series(ChartSeries::new(y_label, SeriesKind::MarkedLine, points))
            .with_caption(current)
            .with_caption(explanation)
    }

    pub fn financial_ratios_section(
        &self,
        fundamentals: &Fundamentals,
        snapshot: &FundamentalSnapshot,
    ) -> ReportSection {
        let ratios = &fundamentals.ratios;

        ReportSection::new(FINANCIAL_RATIOS)
            .with_panel(Self::single_line_panel(
                "Price to Book Ratio",
                "P/B Ratio",
                chronological(ratios, ratio_date, |r| r.price_to_book),
                format!("Current P/B Ratio: {}", format_ratio(snapshot.price_to_book)),
                "The Price to Book Ratio is calculated by dividing the company's stock price per share by its book value per share.",
            ))
            .with_panel(Self::single_line_panel(
                "Price to Sales Ratio",
                "P/S Ratio",
                chronological(ratios, ratio_date, |r| r.price_to_sales),
                format!("Current P/S Ratio: {}", format_ratio(snapshot.price_to_sales)),
                "The Price to Sales Ratio is calculated by dividing the company's market cap by its total sales.",
            ))
            .with_panel(Self::single_line_panel(
                "Return on Equity",
                "ROE",
                chronological(ratios, ratio_date, |r| r.return_on_equity),
                format!("Current ROE: {}", format_percent(snapshot.return_on_equity)),
                "Return on Equity (ROE) measures a company's profitability in relation to shareholders' equity.",
            ))
            .with_panel(Self::single_line_panel(
                "Debt to Equity Ratio",
                "D/E Ratio",
                chronological(&fundamentals.metrics, metrics_date, |m| m.debt_to_equity),
                format!("Current D/E Ratio: {}", format_ratio(snapshot.debt_to_equity)),
                "The Debt to Equity Ratio measures a company's financial leverage.",
            ))
    }

    pub fn profitability_section(
        &self,
        fundamentals: &Fundamentals,
        snapshot: &FundamentalSnapshot,
    ) -> ReportSection {
        let ratios = &fundamentals.ratios;

        ReportSection::new(PROFITABILITY_RATIOS)
            .with_panel(Self::single_line_panel(
                "Gross Profit Margin",
                "Gross Profit Margin",
                chronological(ratios, ratio_date, |r| r.gross_profit_margin),
                format!(
                    "Current Gross Profit Margin: {}",
                    format_percent(snapshot.gross_profit_margin)
                ),
                "Gross Profit Margin is the percentage of revenue left after subtracting the cost of goods sold.",
            ))
            .with_panel(Self::single_line_panel(
                "Net Profit Margin",
                "Net Profit Margin",
                chronological(ratios, ratio_date, |r| r.net_profit_margin),
                format!(
                    "Current Net Profit Margin: {}",
                    format_percent(snapshot.net_profit_margin)
                ),
                "Net Profit Margin is the percentage of revenue left after all expenses have been deducted from sales.",
            ))
    }

    pub fn cash_flow_and_earnings_section(
        &self,
        fundamentals: &Fundamentals,
        snapshot: &FundamentalSnapshot,
    ) -> ReportSection {
        let cash_flow = &fundamentals.cash_flow;
        let income = &fundamentals.income;

        let cash_flow_panel = ReportPanel::new("Cash Flow", "Cash Flow")
            .with_series(ChartSeries::new(
                "Operating",
                SeriesKind::Line,
                chronological(cash_flow, cash_flow_date, |c| c.operating),
            ))
            .with_series(ChartSeries::new(
                "Investing",
                SeriesKind::Line,
                chronological(cash_flow, cash_flow_date, |c| c.investing),
            ))
            .with_series(ChartSeries::new(
                "Financing",
                SeriesKind::Line,
                chronological(cash_flow, cash_flow_date, |c| c.financing),
            ))
            .with_caption("This chart shows the company's cash flows from operating, investing, and financing activities over time.");

        let eps_panel = ReportPanel::new("Earnings per Share", "EPS")
            .with_series(ChartSeries::new(
                "EPS",
                SeriesKind::Line,
                chronological(income, income_date, |i| i.eps),
            ))
            .with_series(ChartSeries::new(
                "Diluted EPS",
                SeriesKind::Line,
                chronological(income, income_date, |i| i.eps_diluted),
            ))
            .with_caption(format!("Current EPS: {}", format_dollars(snapshot.eps)))
            .with_caption(format!(
                "Current Diluted EPS: {}",
                format_dollars(snapshot.eps_diluted)
            ))
            .with_caption("Earnings per Share (EPS) is the portion of a company's profit allocated to each outstanding share of common stock.");

        ReportSection::new(CASH_FLOW_AND_EARNINGS)
            .with_panel(cash_flow_panel)
            .with_panel(eps_panel)
    }
}

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    CashFlowStatement, FinancialRatios, IncomeStatement, KeyMetrics, PricePoint, ReportPanel,
    ResearchError,
};

/// Source of daily closing prices
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Closing prices in `[from, to]`, ascending by date with no duplicates
    async fn price_history(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, ResearchError>;
}

/// Source of annual fundamentals. Every list is most-recent-first.
#[async_trait]
pub trait FundamentalsProvider: Send + Sync {
    async fn financial_ratios(&self, symbol: &str) -> Result<Vec<FinancialRatios>, ResearchError>;

    async fn key_metrics(&self, symbol: &str) -> Result<Vec<KeyMetrics>, ResearchError>;

    async fn income_statements(&self, symbol: &str) -> Result<Vec<IncomeStatement>, ResearchError>;

    async fn cash_flow_statements(
        &self,
        symbol: &str,
    ) -> Result<Vec<CashFlowStatement>, ResearchError>;
}

/// Anything that can lay out a report page
pub trait RenderSurface {
    fn title(&mut self, title: &str) -> std::io::Result<()>;

    /// Highlighted section banner
    fn header(&mut self, header: &str) -> std::io::Result<()>;

    fn panel(&mut self, panel: &ReportPanel) -> std::io::Result<()>;

    fn finish(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

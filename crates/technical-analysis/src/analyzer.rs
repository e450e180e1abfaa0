use research_core::{
    ChartPoint, ChartSeries, Crossover, CrossoverKind, MovingAverageSeries, PricePoint,
    ReportPanel, ResearchError, SeriesKind, SignalSeries,
};
use serde::{Deserialize, Serialize};

use crate::{generate_signals, moving_average};

/// Where the short average sits relative to the long one at the last
/// point where both are defined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendStance {
    ShortAbove,
    ShortBelow,
    Converged,
    Undetermined,
}

impl TrendStance {
    pub fn to_label(&self) -> &'static str {
        match self {
            TrendStance::ShortAbove => "Short MA above long MA",
            TrendStance::ShortBelow => "Short MA below long MA",
            TrendStance::Converged => "Short MA equal to long MA",
            TrendStance::Undetermined => "Not enough history",
        }
    }
}

/// Moving-average crossover over a daily close series
#[derive(Debug, Clone, Copy)]
pub struct PriceTrendAnalyzer {
    short_window: usize,
    long_window: usize,
}

impl PriceTrendAnalyzer {
    /// Both windows must be at least 1. Their ordering is not checked here;
    /// passing the long window first flips the meaning of buy and sell.
    pub fn new(short_window: usize, long_window: usize) -> Result<Self, ResearchError> {
        if short_window == 0 || long_window == 0 {
            return Err(ResearchError::InvalidWindow(format!(
                "windows must be at least 1 (short {}, long {})",
                short_window, long_window
            )));
        }
        Ok(Self {
            short_window,
            long_window,
        })
    }

    pub fn short_window(&self) -> usize {
        self.short_window
    }

    pub fn long_window(&self) -> usize {
        self.long_window
    }

    pub fn analyze(&self, prices: &[PricePoint]) -> Result<PriceTrend, ResearchError> {
        let short_ma = moving_average(prices, self.short_window)?;
        let long_ma = moving_average(prices, self.long_window)?;
        let signals = generate_signals(prices, &short_ma, &long_ma);

        Ok(PriceTrend {
            short_window: self.short_window,
            long_window: self.long_window,
            prices: prices.to_vec(),
            short_ma,
            long_ma,
            buy_signals: signals.buy,
            sell_signals: signals.sell,
        })
    }
}

/// Prices with both averages and their crossover flags, all index-aligned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTrend {
    pub short_window: usize,
    pub long_window: usize,
    pub prices: Vec<PricePoint>,
    pub short_ma: MovingAverageSeries,
    pub long_ma: MovingAverageSeries,
    pub buy_signals: SignalSeries,
    pub sell_signals: SignalSeries,
}

impl PriceTrend {
    /// All crossover events in date order
    pub fn crossovers(&self) -> Vec<Crossover> {
        self.prices
            .iter()
            .enumerate()
            .filter_map(|(i, p)| {
                let flag = |series: &SignalSeries| series.get(i).copied().unwrap_or(false);
                let kind = if flag(&self.buy_signals) {
                    CrossoverKind::Buy
                } else if flag(&self.sell_signals) {
                    CrossoverKind::Sell
                } else {
                    return None;
                };
                Some(Crossover {
                    date: p.date,
                    close: p.close,
                    kind,
                })
            })
            .collect()
    }

    pub fn latest_crossover(&self) -> Option<Crossover> {
        self.crossovers().pop()
    }

    pub fn stance(&self) -> TrendStance {
        let last_pair = self
            .short_ma
            .iter()
            .zip(&self.long_ma)
            .rev()
            .find_map(|(s, l)| Some(((*s)?, (*l)?)));

        match last_pair {
            Some((s, l)) if s > l => TrendStance::ShortAbove,
            Some((s, l)) if s < l => TrendStance::ShortBelow,
            Some(_) => TrendStance::Converged,
            None => TrendStance::Undetermined,
        }
    }

    fn line(&self, label: String, values: impl Iterator<Item = Option<f64>>) -> ChartSeries {
        let points = self
            .prices
            .iter()
            .zip(values)
            .map(|(p, v)| ChartPoint::new(p.date, v))
            .collect();
        ChartSeries::new(label, SeriesKind::Line, points)
    }

    fn markers(&self, label: &str, kind: SeriesKind, flags: &[bool]) -> ChartSeries {
        let points = self
            .prices
            .iter()
            .zip(flags)
            .filter(|(_, &hit)| hit)
            .map(|(p, _)| ChartPoint::new(p.date, Some(p.close)))
            .collect();
        ChartSeries::new(label, kind, points)
    }

    /// Close line, both averages as lines, crossovers as markers on the close
    pub fn to_panel(&self) -> ReportPanel {
        ReportPanel::new(
            format!(
                "Closing Price with {}-day and {}-day MA",
                self.short_window, self.long_window
            ),
            "Price",
        )
        .with_series(self.line(
            "Closing Price".to_string(),
            self.prices.iter().map(|p| Some(p.close)),
        ))
        .with_series(self.line(
            format!("{}-day MA", self.short_window),
            self.short_ma.iter().copied(),
        ))
        .with_series(self.line(
            format!("{}-day MA", self.long_window),
            self.long_ma.iter().copied(),
        ))
        .with_series(self.markers("Buy Signal", SeriesKind::BuyMarkers, &self.buy_signals))
        .with_series(self.markers("Sell Signal", SeriesKind::SellMarkers, &self.sell_signals))
        .with_caption(format!(
            "This chart shows the stock's closing price along with {}-day and {}-day moving averages for the selected period.",
            self.short_window, self.long_window
        ))
        .with_caption(format!(
            "Buy signals are generated when the {}-day MA crosses above the {}-day MA, and sell signals when it crosses below.",
            self.short_window, self.long_window
        ))
    }
}

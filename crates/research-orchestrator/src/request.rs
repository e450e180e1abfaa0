use chrono::{Duration, NaiveDate};
use research_core::{is_valid_symbol, ResearchError};
use serde::{Deserialize, Serialize};

/// Price history covers the last two years unless a range is given
pub const DEFAULT_LOOKBACK_DAYS: i64 = 2 * 365;

/// One user-initiated report run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchRequest {
    pub symbol: String,
    pub short_window: usize,
    pub long_window: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ResearchRequest {
    pub fn new(symbol: &str, short_window: usize, long_window: usize, today: NaiveDate) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            short_window,
            long_window,
            start: today - Duration::days(DEFAULT_LOOKBACK_DAYS),
            end: today,
        }
    }

    pub fn with_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Rejects a short window that is not strictly shorter than the long one,
    /// since swapping them would silently invert buy and sell.
    pub fn validate(&self) -> Result<(), ResearchError> {
        if self.symbol.is_empty() {
            return Err(ResearchError::InvalidData("symbol must not be empty".to_string()));
        }
        if !is_valid_symbol(&self.symbol) {
            return Err(ResearchError::InvalidData(format!(
                "symbol {:?} may only contain letters, digits, '.' and '-'",
                self.symbol
            )));
        }
        if self.short_window == 0 || self.long_window == 0 {
            return Err(ResearchError::InvalidWindow(format!(
                "windows must be at least 1 (short {}, long {})",
                self.short_window, self.long_window
            )));
        }
        if self.short_window >= self.long_window {
            return Err(ResearchError::InvalidWindow(format!(
                "short window ({}) must be smaller than long window ({})",
                self.short_window, self.long_window
            )));
        }
        if self.start > self.end {
            return Err(ResearchError::InvalidData(format!(
                "start date {} is after end date {}",
                self.start, self.end
            )));
        }
        Ok(())
    }
}

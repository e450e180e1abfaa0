use research_core::{PricePoint, SignalSeries};
use serde::{Deserialize, Serialize};

/// Buy and sell flags, one of each per price point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossoverSignals {
    pub buy: SignalSeries,
    pub sell: SignalSeries,
}

impl CrossoverSignals {
    pub fn buy_indices(&self) -> Vec<usize> {
        flagged(&self.buy)
    }

    pub fn sell_indices(&self) -> Vec<usize> {
        flagged(&self.sell)
    }
}

fn flagged(series: &[bool]) -> Vec<usize> {
    series
        .iter()
        .enumerate()
        .filter_map(|(i, &hit)| hit.then_some(i))
        .collect()
}

fn value_at(series: &[Option<f64>], i: usize) -> Option<f64> {
    series.get(i).copied().flatten()
}

/// Mark the points where the short average crosses the long one.
///
/// Buy at `i` when short moved from at-or-below long at `i - 1` to strictly
/// above at `i`; sell is the mirror image. Index 0 never fires, and neither
/// does any index where one of the four values is missing. Averages shorter
/// than `prices` are read as missing past their end.
pub fn generate_signals(
    prices: &[PricePoint],
    short_ma: &[Option<f64>],
    long_ma: &[Option<f64>],
) -> CrossoverSignals {
    let len = prices.len();
    let mut buy = vec![false; len];
    let mut sell = vec![false; len];

    for i in 1..len {
        let (Some(short), Some(long), Some(prev_short), Some(prev_long)) = (
            value_at(short_ma, i),
            value_at(long_ma, i),
            value_at(short_ma, i - 1),
            value_at(long_ma, i - 1),
        ) else {
            continue;
        };

        buy[i] = short > long && prev_short <= prev_long;
        sell[i] = short < long && prev_short >= prev_long;
    }

    CrossoverSignals { buy, sell }
}

use research_core::{MovingAverageSeries, PricePoint, ResearchError};

/// Simple moving average of closing prices.
///
/// The output has one entry per input point. The first `window - 1` entries
/// are `None`, so a window longer than the series yields nothing but `None`.
/// A zero window is rejected rather than clamped.
pub fn moving_average(
    prices: &[PricePoint],
    window: usize,
) -> Result<MovingAverageSeries, ResearchError> {
    if window == 0 {
        return Err(ResearchError::InvalidWindow(
            "moving average window must be at least 1".to_string(),
        ));
    }

    let closes: Vec<f64> = prices.iter().map(|p| p.close).collect();
    Ok(rolling_mean(&closes, window))
}

/// Trailing mean over `window` values, `None` until the window fills.
///
/// A window that holds one repeated value yields that value exactly, so flat
/// stretches give identical averages for every window length.
pub fn rolling_mean(data: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut result = Vec::with_capacity(data.len());
    // length of the run of equal values ending at i
    let mut run = 0usize;
    for i in 0..data.len() {
        run = if i > 0 && data[i] == data[i - 1] { run + 1 } else { 1 };
        if window == 0 || i + 1 < window {
            result.push(None);
            continue;
        }
        if run >= window {
            result.push(Some(data[i]));
            continue;
        }
        let sum: f64 = data[i + 1 - window..=i].iter().sum();
        result.push(Some(sum / window as f64));
    }
    result
}

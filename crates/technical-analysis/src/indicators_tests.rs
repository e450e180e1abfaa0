#[cfg(test)]
mod tests {
    use super::super::crossover::*;
    use super::super::indicators::*;
    use approx::assert_relative_eq;
    use chrono::{Datelike, NaiveDate, Weekday};
    use research_core::{PricePoint, ResearchError};

    // Trading days only: skip weekends so dates are not contiguous
    fn price_series(closes: &[f64]) -> Vec<PricePoint> {
        let mut date = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let mut points = Vec::with_capacity(closes.len());
        for &close in closes {
            points.push(PricePoint::new(date, close));
            date += chrono::Duration::days(1);
            while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                date += chrono::Duration::days(1);
            }
        }
        points
    }

    // Deterministic wavy prices for property-style checks
    fn wavy_prices(n: usize, phase: f64) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                100.0 + 8.0 * (t * 0.37 + phase).sin() + 3.0 * (t * 1.13).cos()
            })
            .collect()
    }

    #[test]
    fn test_moving_average_basic() {
        let prices = price_series(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let result = moving_average(&prices, 3).unwrap();

        assert_eq!(result.len(), 5);
        assert_eq!(result[0], None);
        assert_eq!(result[1], None);
        assert_relative_eq!(result[2].unwrap(), 2.0); // (1+2+3)/3
        assert_relative_eq!(result[3].unwrap(), 3.0); // (2+3+4)/3
        assert_relative_eq!(result[4].unwrap(), 4.0); // (3+4+5)/3
    }

    #[test]
    fn test_moving_average_window_one_is_identity() {
        let closes = [44.34, 44.09, 44.15, 43.61, 44.33];
        let result = moving_average(&price_series(&closes), 1).unwrap();

        for (ma, close) in result.iter().zip(closes) {
            assert_relative_eq!(ma.unwrap(), close);
        }
    }

    #[test]
    fn test_moving_average_zero_window() {
        let prices = price_series(&[1.0, 2.0]);
        let result = moving_average(&prices, 0);

        assert!(matches!(result, Err(ResearchError::InvalidWindow(_))));
    }

    #[test]
    fn test_moving_average_zero_window_on_empty_input() {
        assert!(moving_average(&[], 0).is_err());
    }

    #[test]
    fn test_moving_average_insufficient_data() {
        for window in 1..8 {
            for n in 0..window {
                let prices = price_series(&wavy_prices(n, 0.0));
                let result = moving_average(&prices, window).unwrap();

                assert_eq!(result.len(), n);
                assert!(result.iter().all(|v| v.is_none()), "n={} window={}", n, window);
            }
        }
    }

    #[test]
    fn test_moving_average_window_equal_to_length() {
        let prices = price_series(&[2.0, 4.0, 6.0, 8.0]);
        let result = moving_average(&prices, 4).unwrap();

        assert!(result[..3].iter().all(|v| v.is_none()));
        assert_relative_eq!(result[3].unwrap(), 5.0);
    }

    #[test]
    fn test_moving_average_constant_series() {
        let prices = price_series(&[42.5; 30]);
        for window in [1, 2, 5, 10, 30] {
            let result = moving_average(&prices, window).unwrap();
            for value in result.iter().flatten() {
                assert_relative_eq!(*value, 42.5, epsilon = 1e-9);
            }
            assert_eq!(result.iter().flatten().count(), 30 - window + 1);
        }
    }

    #[test]
    fn test_moving_average_constant_series_is_exact() {
        // none of these closes has an exact binary representation
        for close in [0.1, 0.3, 101.37, 187.23] {
            let prices = price_series(&[close; 25]);
            for window in 1..=10 {
                let result = moving_average(&prices, window).unwrap();
                for value in &result[window - 1..] {
                    assert_eq!(*value, Some(close), "close {} window {}", close, window);
                }
            }
        }
    }

    #[test]
    fn test_rolling_mean_exact_once_window_is_flat() {
        let result = rolling_mean(&[0.2, 0.1, 0.1, 0.1, 0.1], 3);

        assert!(result[..2].iter().all(Option::is_none));
        assert!(result[2].is_some());
        assert_eq!(result[3], Some(0.1));
        assert_eq!(result[4], Some(0.1));
    }

    #[test]
    fn test_moving_average_deterministic() {
        let prices = price_series(&wavy_prices(120, 0.4));
        let first = moving_average(&prices, 7).unwrap();
        let second = moving_average(&prices, 7).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_moving_average_real_prices() {
        let closes = [
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
        ];
        let result = moving_average(&price_series(&closes), 5).unwrap();

        let expected_first = (44.34 + 44.09 + 44.15 + 43.61 + 44.33) / 5.0;
        assert_relative_eq!(result[4].unwrap(), expected_first, epsilon = 1e-9);
        let expected_last = (44.83 + 45.10 + 45.42 + 45.84 + 46.08) / 5.0;
        assert_relative_eq!(result[9].unwrap(), expected_last, epsilon = 1e-9);
    }

    #[test]
    fn test_rolling_mean_zero_window_is_all_missing() {
        assert_eq!(rolling_mean(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn test_signals_rising_scenario() {
        let prices = price_series(&[10.0, 10.0, 10.0, 10.0, 10.0, 12.0, 14.0, 16.0, 18.0, 20.0]);
        let short = moving_average(&prices, 2).unwrap();
        let long = moving_average(&prices, 4).unwrap();
        let signals = generate_signals(&prices, &short, &long);

        // short 11.0 vs long 10.5 at index 5, both 10.0 the day before
        assert_eq!(signals.buy_indices(), vec![5]);
        assert!(signals.sell_indices().is_empty());
    }

    #[test]
    fn test_signals_falling_scenario() {
        let prices = price_series(&[20.0, 20.0, 20.0, 20.0, 20.0, 18.0, 16.0, 14.0, 12.0, 10.0]);
        let short = moving_average(&prices, 2).unwrap();
        let long = moving_average(&prices, 4).unwrap();
        let signals = generate_signals(&prices, &short, &long);

        assert_eq!(signals.sell_indices(), vec![5]);
        assert!(signals.buy_indices().is_empty());
    }

    #[test]
    fn test_signals_strictly_falling_from_start() {
        // short is already below long when long first becomes defined
        let prices = price_series(&[20.0, 18.0, 16.0, 14.0, 12.0, 10.0, 8.0]);
        let short = moving_average(&prices, 2).unwrap();
        let long = moving_average(&prices, 4).unwrap();
        let signals = generate_signals(&prices, &short, &long);

        assert!(signals.buy_indices().is_empty());
        assert!(signals.sell_indices().is_empty());
    }

    #[test]
    fn test_signals_flat_series() {
        let prices = price_series(&[15.0; 25]);
        let short = moving_average(&prices, 2).unwrap();
        let long = moving_average(&prices, 4).unwrap();
        let signals = generate_signals(&prices, &short, &long);

        assert!(signals.buy.iter().all(|b| !b));
        assert!(signals.sell.iter().all(|s| !s));
    }

    #[test]
    fn test_signals_flat_series_inexact_close() {
        let prices = price_series(&[101.37; 40]);
        let short = moving_average(&prices, 10).unwrap();
        let long = moving_average(&prices, 20).unwrap();

        assert_eq!(short[19..], long[19..]);
        let signals = generate_signals(&prices, &short, &long);
        assert!(signals.buy_indices().is_empty());
        assert!(signals.sell_indices().is_empty());
    }

    #[test]
    fn test_signals_rise_then_flat_has_no_sell() {
        let prices = price_series(&[0.07, 0.08, 0.09, 0.1, 0.1, 0.1, 0.1, 0.1]);
        let short = moving_average(&prices, 2).unwrap();
        let long = moving_average(&prices, 3).unwrap();

        // both averages settle on the flat close once their windows are flat
        assert_eq!(short[4..], [Some(0.1); 4]);
        assert_eq!(long[5..], [Some(0.1); 3]);

        let signals = generate_signals(&prices, &short, &long);
        assert!(signals.sell_indices().is_empty());
        assert!(signals.buy_indices().is_empty());
    }

    #[test]
    fn test_signals_swapped_windows_invert_meaning() {
        let prices = price_series(&[10.0, 10.0, 10.0, 10.0, 10.0, 12.0, 14.0, 16.0, 18.0, 20.0]);
        let short = moving_average(&prices, 2).unwrap();
        let long = moving_average(&prices, 4).unwrap();
        let signals = generate_signals(&prices, &long, &short);

        assert_eq!(signals.sell_indices(), vec![5]);
        assert!(signals.buy_indices().is_empty());
    }

    #[test]
    fn test_signals_never_both_and_never_at_start() {
        for phase in [0.0, 0.7, 1.9, 3.1] {
            let prices = price_series(&wavy_prices(200, phase));
            for (s, l) in [(1, 2), (2, 4), (3, 10), (5, 20), (10, 5)] {
                let short = moving_average(&prices, s).unwrap();
                let long = moving_average(&prices, l).unwrap();
                let signals = generate_signals(&prices, &short, &long);

                assert_eq!(signals.buy.len(), prices.len());
                assert_eq!(signals.sell.len(), prices.len());
                assert!(!signals.buy[0]);
                assert!(!signals.sell[0]);
                for i in 0..prices.len() {
                    assert!(
                        !(signals.buy[i] && signals.sell[i]),
                        "both signals at {} (phase {}, {}/{})",
                        i,
                        phase,
                        s,
                        l
                    );
                }
            }
        }
    }

    #[test]
    fn test_signals_alternate_on_wavy_prices() {
        let prices = price_series(&wavy_prices(300, 0.2));
        let short = moving_average(&prices, 3).unwrap();
        let long = moving_average(&prices, 12).unwrap();
        let signals = generate_signals(&prices, &short, &long);

        let mut events: Vec<(usize, bool)> = signals
            .buy_indices()
            .into_iter()
            .map(|i| (i, true))
            .chain(signals.sell_indices().into_iter().map(|i| (i, false)))
            .collect();
        events.sort();

        assert!(events.len() >= 2);
        // no touching days in this series, so buy and sell must alternate
        for pair in events.windows(2) {
            assert_ne!(pair[0].1, pair[1].1);
        }
    }

    #[test]
    fn test_signals_no_data_before_windows_fill() {
        let prices = price_series(&wavy_prices(50, 1.0));
        let short = moving_average(&prices, 5).unwrap();
        let long = moving_average(&prices, 20).unwrap();
        let signals = generate_signals(&prices, &short, &long);

        // long MA first defined at 19, so 20 is the first index with a prior pair
        assert!(signals.buy[..20].iter().all(|b| !b));
        assert!(signals.sell[..20].iter().all(|s| !s));
    }
}

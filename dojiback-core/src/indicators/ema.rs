//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (span + 1)
//! Seed: EMA[0] = x[0] (no SMA warmup, no bias adjustment).
//! Lookback: 0. The caller decides how many bars to skip before trusting it.

/// Streaming EMA accumulator.
#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    alpha: f64,
    prev: Option<f64>,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        assert!(span >= 1, "EMA span must be >= 1");
        Self {
            span,
            alpha: 2.0 / (span as f64 + 1.0),
            prev: None,
        }
    }

    pub fn span(&self) -> usize {
        self.span
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Feed the next value and return the updated average.
    pub fn next(&mut self, value: f64) -> f64 {
        let ema = match self.prev {
            None => value,
            Some(prev) => self.alpha * value + (1.0 - self.alpha) * prev,
        };
        self.prev = Some(ema);
        ema
    }
}

/// EMA over a pre-extracted series.
pub fn ema_of_series(values: &[f64], span: usize) -> Vec<f64> {
    let mut ema = Ema::new(span);
    values.iter().map(|&v| ema.next(v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn ema_span_1_equals_input() {
        let result = ema_of_series(&[100.0, 200.0, 300.0], 1);
        assert_eq!(result, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn ema_3_known_values() {
        // alpha = 2/(3+1) = 0.5, seed = first value
        // EMA[0] = 10
        // EMA[1] = 0.5*11 + 0.5*10 = 10.5
        // EMA[2] = 0.5*12 + 0.5*10.5 = 11.25
        // EMA[3] = 0.5*13 + 0.5*11.25 = 12.125
        let result = ema_of_series(&[10.0, 11.0, 12.0, 13.0], 3);
        assert_approx(result[0], 10.0, DEFAULT_EPSILON);
        assert_approx(result[1], 10.5, DEFAULT_EPSILON);
        assert_approx(result[2], 11.25, DEFAULT_EPSILON);
        assert_approx(result[3], 12.125, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_100_alpha() {
        let ema = Ema::new(100);
        assert_approx(ema.alpha(), 2.0 / 101.0, DEFAULT_EPSILON);
        assert_eq!(ema.span(), 100);
    }

    #[test]
    fn ema_of_constant_series_is_constant() {
        let result = ema_of_series(&[42.0; 50], 10);
        assert!(result.iter().all(|&v| v == 42.0));
    }

    #[test]
    fn ema_empty_series() {
        assert!(ema_of_series(&[], 100).is_empty());
    }

    #[test]
    #[should_panic(expected = "EMA span must be >= 1")]
    fn ema_rejects_zero_span() {
        Ema::new(0);
    }

    #[test]
    fn streaming_matches_batch() {
        let values: Vec<f64> = (0..30).map(|i| (i as f64 * 0.3).cos() * 5.0 + 50.0).collect();
        let batch = ema_of_series(&values, 7);
        let mut ema = Ema::new(7);
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(ema.next(v), batch[i]);
        }
    }
}

//! Seeded random-walk minute bars for demos, tests and benchmarks.
//!
//! Not market data. Results on synthetic bars are tagged with the
//! `synthetic:<n>:<seed>` source in the backtest result.

use chrono::{Duration, TimeZone};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use dojiback_core::domain::Bar;

/// `n` one-minute bars starting 2024-01-01 09:15 IST.
///
/// The same `(n, seed)` always gives the same bars.
pub fn generate_bars(n: usize, seed: u64) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = chrono_tz::Asia::Kolkata
        .with_ymd_and_hms(2024, 1, 1, 9, 15, 0)
        .single()
        .map(|dt| dt.fixed_offset())
        .unwrap_or_default();

    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0_f64;
    for i in 0..n {
        let step: f64 = rng.gen_range(-0.002..0.002);
        let open = price;
        let close = price * (1.0 + step);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.001));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.001));
        let volume = rng.gen_range(500..5_000u32) as f64;

        bars.push(Bar {
            timestamp: start + Duration::minutes(i as i64),
            open,
            high,
            low,
            close,
            volume,
        });
        price = close;
    }
    bars
}

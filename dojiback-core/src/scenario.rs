//! Deterministic bar-series builder that plants entry patterns.
//!
//! Each method appends raw bars chosen against the running Heiken-Ashi chain,
//! so the derived candles land exactly where the pattern predicates look:
//! wickless pullback candles have `high == open` (or `low == open`) bit for
//! bit, and the doji bar carries peak volume. Used by tests, benchmarks and
//! demo runs.

use chrono::{DateTime, Duration, FixedOffset};

use crate::domain::{Bar, Direction, HeikenAshiBar, Outcome};
use crate::engine::bracket;
use crate::indicators::HeikenAshi;

const PULLBACK_DEPTH: f64 = 0.5;
const DOJI_HALF_RANGE: f64 = 1.0;
const DRIFT_HALF_RANGE: f64 = 0.1;
const PEAK_VOLUME_MULTIPLE: f64 = 5.0;

/// Bracket of the most recently planted entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantedEntry {
    pub index: usize,
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_price: f64,
    pub take_profit_price: f64,
}

impl PlantedEntry {
    fn risk(&self) -> f64 {
        (self.entry_price - self.stop_price).abs()
    }
}

#[derive(Debug, Clone)]
pub struct ScenarioBuilder {
    start: DateTime<FixedOffset>,
    interval: Duration,
    start_price: f64,
    base_volume: f64,
    bars: Vec<Bar>,
    ha: HeikenAshi,
    last: Option<HeikenAshiBar>,
    entries: Vec<PlantedEntry>,
}

impl ScenarioBuilder {
    pub fn new(start: DateTime<FixedOffset>, interval: Duration) -> Self {
        Self {
            start,
            interval,
            start_price: 100.0,
            base_volume: 1000.0,
            bars: Vec::new(),
            ha: HeikenAshi::new(),
            last: None,
            entries: Vec::new(),
        }
    }

    pub fn start_price(mut self, price: f64) -> Self {
        self.start_price = price;
        self
    }

    /// Number of bars so far; also the index the next bar will get.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Entries planted so far, in order.
    pub fn entries(&self) -> &[PlantedEntry] {
        &self.entries
    }

    /// `n` bars stepping `step` per bar in `direction`.
    ///
    /// The candles keep a wick on the trend's far side, so they never form a
    /// clean pullback.
    pub fn trend(mut self, direction: Direction, n: usize, step: f64) -> Self {
        let s = match direction {
            Direction::Long => step.abs(),
            Direction::Short => -step.abs(),
        };
        for _ in 0..n {
            let level = self.level();
            let close = level + s;
            let high = level.max(close) + 0.1 * step.abs();
            let low = level.min(close) - 0.1 * step.abs();
            self.push(level, high, low, close, self.base_volume);
        }
        self
    }

    /// Two counter-trend candles with no wick on the trend side.
    pub fn pullback(mut self, direction: Direction) -> Self {
        for _ in 0..2 {
            let level = self.level();
            match direction {
                Direction::Long => {
                    let body = level - PULLBACK_DEPTH;
                    self.push(body, level, level - 2.0 * PULLBACK_DEPTH, body, self.base_volume);
                }
                Direction::Short => {
                    let body = level + PULLBACK_DEPTH;
                    self.push(body, level + 2.0 * PULLBACK_DEPTH, level, body, self.base_volume);
                }
            }
        }
        self
    }

    /// A doji on peak volume. Preceded by `pullback` inside a trend, this is
    /// the entry bar.
    pub fn doji(mut self) -> Self {
        let level = self.level();
        self.push(
            level,
            level + DOJI_HALF_RANGE,
            level - DOJI_HALF_RANGE,
            level,
            self.base_volume * PEAK_VOLUME_MULTIPLE,
        );
        self
    }

    /// Pullback followed by the doji; records the bracket the engine will use.
    pub fn entry(self, direction: Direction) -> Self {
        let mut this = self.pullback(direction).doji();
        if let Some(candle) = this.last {
            let risk = match direction {
                Direction::Long => candle.close - candle.low,
                Direction::Short => candle.high - candle.close,
            };
            let (stop_price, take_profit_price) = bracket(direction, candle.close, risk);
            this.entries.push(PlantedEntry {
                index: this.bars.len() - 1,
                direction,
                entry_price: candle.close,
                stop_price,
                take_profit_price,
            });
        }
        this
    }

    /// `n` quiet bars well inside any planted bracket.
    pub fn drift(mut self, n: usize) -> Self {
        for _ in 0..n {
            let level = self.level();
            self.push(
                level,
                level + DRIFT_HALF_RANGE,
                level - DRIFT_HALF_RANGE,
                level,
                self.base_volume,
            );
        }
        self
    }

    /// One bar that resolves the last planted entry with `outcome`.
    pub fn resolve(mut self, outcome: Outcome) -> Self {
        let Some(entry) = self.entries.last().copied() else {
            return self;
        };
        let level = self.level();
        let r = entry.risk().max(DOJI_HALF_RANGE);
        let near = 0.25 * r;
        let (high, low) = match (entry.direction, outcome) {
            (Direction::Long, Outcome::Win) => (entry.take_profit_price + r, level - near),
            (Direction::Long, Outcome::Loss) => (level + near, entry.stop_price - r),
            (Direction::Short, Outcome::Win) => (level + near, entry.take_profit_price - r),
            (Direction::Short, Outcome::Loss) => (entry.stop_price + r, level - near),
        };
        self.push(level, high, low, level, self.base_volume);
        self
    }

    /// One bar spanning both stop and target of the last planted entry.
    pub fn straddle(mut self) -> Self {
        let Some(entry) = self.entries.last().copied() else {
            return self;
        };
        let level = self.level();
        let r = entry.risk().max(DOJI_HALF_RANGE);
        let top = entry.stop_price.max(entry.take_profit_price) + r;
        let bottom = entry.stop_price.min(entry.take_profit_price) - r;
        self.push(level, top, bottom, level, self.base_volume);
        self
    }

    pub fn build(self) -> Vec<Bar> {
        self.bars
    }

    /// Heiken-Ashi open the next bar will get.
    fn level(&self) -> f64 {
        match self.last {
            Some(prev) => (prev.open + prev.close) / 2.0,
            None => self.start_price,
        }
    }

    fn push(&mut self, open: f64, high: f64, low: f64, close: f64, volume: f64) {
        let bar = Bar {
            timestamp: self.start + self.interval * self.bars.len() as i32,
            open,
            high,
            low,
            close,
            volume,
        };
        self.last = Some(self.ha.next(&bar));
        self.bars.push(bar);
    }
}

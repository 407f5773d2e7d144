//! Domain types for dojiback

pub mod bar;
pub mod candle;
pub mod trade;

pub use bar::Bar;
pub use candle::HeikenAshiBar;
pub use trade::{Direction, Outcome, TradeRecord};

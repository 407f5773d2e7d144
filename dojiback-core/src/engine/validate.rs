//! Input precondition checks run before the forward pass.
//!
//! The forward pass itself never fails. Anything that would make its output
//! meaningless (non-finite prices, negative volume, time going backwards) is
//! rejected here so the run fails fast instead of producing nonsense trades.

use thiserror::Error;

use crate::domain::Bar;

/// Errors that reject a run before any bar is simulated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("malformed input at bar {index}: {reason}")]
    MalformedInput { index: usize, reason: String },

    #[error("invalid engine config: {0}")]
    InvalidConfig(String),
}

/// Check every bar's fields and the timestamp ordering.
///
/// Equal consecutive timestamps are allowed (non-decreasing order).
pub fn validate_bars(bars: &[Bar]) -> Result<(), EngineError> {
    for (index, bar) in bars.iter().enumerate() {
        if bar.has_non_finite_price() {
            return Err(EngineError::MalformedInput {
                index,
                reason: "price field is NaN or infinite".into(),
            });
        }
        if !bar.has_valid_volume() {
            return Err(EngineError::MalformedInput {
                index,
                reason: format!("volume {} is negative or not finite", bar.volume),
            });
        }
        if index > 0 && bar.timestamp < bars[index - 1].timestamp {
            return Err(EngineError::MalformedInput {
                index,
                reason: format!(
                    "timestamp {} is earlier than previous bar {}",
                    bar.timestamp,
                    bars[index - 1].timestamp
                ),
            });
        }
    }
    Ok(())
}

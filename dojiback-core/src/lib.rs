//! dojiback core — domain types, indicators, pattern predicates, trade state machine.
//!
//! This crate contains the backtesting engine and nothing that does I/O:
//! - Domain types (bars, Heiken-Ashi candles, trade records)
//! - Heiken-Ashi transform and EMA trend filter, computed in one forward pass
//! - Pullback and high-volume doji predicates
//! - Single-position trade state machine with a 1:1 stop/target bracket
//! - A deterministic scenario builder for planting patterns in test series

pub mod domain;
pub mod engine;
pub mod indicators;
pub mod patterns;
pub mod scenario;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types that cross run boundaries are Send + Sync,
    /// so independent runs can execute on separate threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::HeikenAshiBar>();
        require_sync::<domain::HeikenAshiBar>();
        require_send::<domain::TradeRecord>();
        require_sync::<domain::TradeRecord>();

        require_send::<indicators::IndicatorSet>();
        require_sync::<indicators::IndicatorSet>();

        require_send::<engine::EngineConfig>();
        require_sync::<engine::EngineConfig>();
        require_send::<engine::RunResult>();
        require_sync::<engine::RunResult>();
        require_send::<engine::SimState>();
        require_sync::<engine::SimState>();
        require_send::<engine::EngineError>();
        require_sync::<engine::EngineError>();
    }

    /// Architecture contract: the step function takes state by value and
    /// borrows its inputs immutably, so a step cannot touch another run.
    #[test]
    fn step_signature_is_pure() {
        fn _check(
            state: engine::SimState,
            ctx: &engine::StepContext<'_>,
        ) -> (engine::SimState, engine::Transition) {
            engine::step(state, ctx, 0)
        }
    }
}

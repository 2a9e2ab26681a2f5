//! Signal generation — fuses indicators with external readings into BUY/SELL/HOLD.
//!
//! Signals never see backtest state. The one-bar execution lag is applied by the
//! backtest, not here.

pub mod engine;
pub mod external;
pub mod thresholds;

pub use engine::{classify, generate_signals, SignalCounts, SignaledSeries};
pub use external::{ExternalSignals, ResolvedSignals, SignalField};
pub use thresholds::{ThresholdConfig, ThresholdError};

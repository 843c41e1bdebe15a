//! Deterministic backtesting engine for a single-position RSI/MACD strategy.
//!
//! The engine consumes an already-materialized price/volume/timestamp series,
//! simulates the strategy bar by bar and reduces the resulting trade list and
//! equity trajectory to aggregate performance statistics. A grid-search
//! optimizer drives many independent runs over a parameter space and keeps
//! the combination with the best Sharpe ratio.
//!
//! The crate performs no network, filesystem or wall-clock access; given the
//! same inputs, output is bit-for-bit reproducible.

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod indicators;
pub mod models;
pub mod optimizer;
pub mod performance;
pub mod report;

pub use config::StrategyConfig;
pub use engine::{run_backtest, StrategyEngine, MIN_DATA_POINTS};
pub use error::BacktestError;
pub use events::{EventSink, LogSink, MemorySink, NullSink};
pub use models::{BacktestResult, HistoricalData, Trade, TradeSide, TradeStatus};
pub use optimizer::optimize_parameters;
pub use report::generate_report;

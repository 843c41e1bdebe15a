use crate::error::BacktestError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Volume assumed for every bar when the caller supplies none.
pub const DEFAULT_BAR_VOLUME: f64 = 1000.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TradeSide {
    Long,
    Short,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Long => "LONG",
            TradeSide::Short => "SHORT",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TradeStatus {
    Open,
    Closed,
    StoppedOut,
    TakeProfit,
    TimeExit,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Open => "OPEN",
            TradeStatus::Closed => "CLOSED",
            TradeStatus::StoppedOut => "STOPPED_OUT",
            TradeStatus::TakeProfit => "TAKE_PROFIT",
            TradeStatus::TimeExit => "TIME_EXIT",
        }
    }
}

/// One simulated position. Stop and take levels are fixed at entry and never
/// revised; pnl fields are filled exactly once, on close.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    pub position_size: f64,
    pub side: TradeSide,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub pnl: Option<f64>,
    pub pnl_percent: Option<f64>,
    pub status: TradeStatus,
}

impl Trade {
    pub fn open(
        entry_time: DateTime<Utc>,
        entry_price: f64,
        position_size: f64,
        side: TradeSide,
        stop_loss: f64,
        take_profit: f64,
    ) -> Self {
        Self {
            entry_time,
            exit_time: None,
            entry_price,
            exit_price: None,
            position_size,
            side,
            stop_loss,
            take_profit,
            pnl: None,
            pnl_percent: None,
            status: TradeStatus::Open,
        }
    }

    /// Closes the position and returns the realized pnl.
    pub fn close(&mut self, exit_time: DateTime<Utc>, exit_price: f64, status: TradeStatus) -> f64 {
        let pnl = match self.side {
            TradeSide::Long => (exit_price - self.entry_price) * self.position_size,
            TradeSide::Short => (self.entry_price - exit_price) * self.position_size,
        };
        let exposure = self.entry_price * self.position_size;
        self.exit_time = Some(exit_time);
        self.exit_price = Some(exit_price);
        self.pnl = Some(pnl);
        self.pnl_percent = Some(if exposure > 0.0 {
            pnl / exposure * 100.0
        } else {
            0.0
        });
        self.status = status;
        pnl
    }
}

/// Ordered input series. Volumes and timestamps are optional; when omitted the
/// engine substitutes a constant volume and a deterministic minute-spaced
/// timestamp series anchored at the Unix epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalData {
    pub close_prices: Vec<f64>,
    #[serde(default)]
    pub volumes: Option<Vec<f64>>,
    #[serde(default)]
    pub timestamps: Option<Vec<DateTime<Utc>>>,
}

impl HistoricalData {
    pub fn from_closes(close_prices: Vec<f64>) -> Self {
        Self {
            close_prices,
            volumes: None,
            timestamps: None,
        }
    }

    pub fn validate(&self, min_data_points: usize) -> Result<(), BacktestError> {
        let n = self.close_prices.len();
        if n < min_data_points {
            return Err(BacktestError::InsufficientData {
                required: min_data_points,
                actual: n,
            });
        }
        if let Some(volumes) = &self.volumes {
            if volumes.len() != n {
                return Err(BacktestError::MisalignedSeries {
                    series: "volumes",
                    expected: n,
                    actual: volumes.len(),
                });
            }
        }
        if let Some(timestamps) = &self.timestamps {
            if timestamps.len() != n {
                return Err(BacktestError::MisalignedSeries {
                    series: "timestamps",
                    expected: n,
                    actual: timestamps.len(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn resolved_volumes(&self) -> Cow<'_, [f64]> {
        match &self.volumes {
            Some(volumes) => Cow::Borrowed(volumes.as_slice()),
            None => Cow::Owned(vec![DEFAULT_BAR_VOLUME; self.close_prices.len()]),
        }
    }

    pub(crate) fn resolved_timestamps(&self) -> Cow<'_, [DateTime<Utc>]> {
        match &self.timestamps {
            Some(timestamps) => Cow::Borrowed(timestamps.as_slice()),
            None => Cow::Owned(
                (0..self.close_prices.len() as i64)
                    .map(|i| DateTime::UNIX_EPOCH + Duration::minutes(i))
                    .collect(),
            ),
        }
    }
}

/// Aggregate output of one backtest run. Created once by the metrics
/// calculator and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub total_pnl: f64,
    pub total_pnl_percent: f64,
    pub max_drawdown: f64,
    pub max_drawdown_percent: f64,
    pub sharpe_ratio: f64,
    pub profit_factor: f64,
    pub average_trade: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<f64>,
    pub drawdown_curve: Vec<f64>,
}

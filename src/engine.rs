use crate::config::StrategyConfig;
use crate::error::BacktestError;
use crate::events::EventSink;
use crate::indicators::{
    self, MACD_FAST_PERIOD, MACD_SIGNAL_PERIOD, MACD_SLOW_PERIOD, RSI_PERIOD,
};
use crate::models::{BacktestResult, HistoricalData, Trade, TradeSide, TradeStatus};
use crate::performance::PerformanceCalculator;
use chrono::{DateTime, Duration, Utc};

/// Minimum number of close prices required for a run.
pub const MIN_DATA_POINTS: usize = 100;

/// Bars skipped at the start of the series before any evaluation.
const WARMUP_BARS: usize = 20;

/// Absolute volume floor a bar must exceed to confirm an entry.
const VOLUME_FLOOR: f64 = 1000.0;

/// Positions held longer than this are closed on the next evaluated bar.
const MAX_HOLD_HOURS: i64 = 24;

/// Walks the price series bar by bar with a single open-position slot,
/// applying entry and exit rules from the injected configuration.
pub struct StrategyEngine<'a> {
    config: StrategyConfig,
    sink: &'a dyn EventSink,
}

impl<'a> StrategyEngine<'a> {
    pub fn new(config: StrategyConfig, sink: &'a dyn EventSink) -> Self {
        Self { config, sink }
    }

    pub fn run(&self, data: &HistoricalData) -> Result<BacktestResult, BacktestError> {
        data.validate(MIN_DATA_POINTS)?;
        let volumes = data.resolved_volumes();
        let timestamps = data.resolved_timestamps();

        self.sink.info(&format!(
            "running backtest over {} bars",
            data.close_prices.len()
        ));

        let (trades, equity_curve) = self.simulate(&data.close_prices, &volumes, &timestamps);
        Ok(PerformanceCalculator::calculate(
            trades,
            equity_curve,
            self.config.initial_capital,
        ))
    }

    fn simulate(
        &self,
        prices: &[f64],
        volumes: &[f64],
        timestamps: &[DateTime<Utc>],
    ) -> (Vec<Trade>, Vec<f64>) {
        let config = &self.config;
        let max_hold = Duration::hours(MAX_HOLD_HOURS);
        let mut capital = config.initial_capital;
        let mut equity_curve = vec![capital];
        let mut trades: Vec<Trade> = Vec::new();
        let mut open_position: Option<Trade> = None;

        for i in WARMUP_BARS..prices.len() {
            let window = &prices[..=i];
            let rsi = indicators::calculate_rsi(window, RSI_PERIOD);
            let (macd, macd_signal) = indicators::calculate_macd(
                window,
                MACD_FAST_PERIOD,
                MACD_SLOW_PERIOD,
                MACD_SIGNAL_PERIOD,
            );
            let price = prices[i];
            let now = timestamps[i];

            if let Some(mut trade) = open_position.take() {
                match exit_status(&trade, price, now, max_hold) {
                    Some(status) => {
                        capital += trade.close(now, price, status);
                        equity_curve.push(capital);
                        trades.push(trade);
                    }
                    None => open_position = Some(trade),
                }
            }

            if open_position.is_none() {
                if let Some(side) = self.entry_side(rsi, macd, macd_signal, volumes[i]) {
                    let position_size = capital * config.position_size_pct / price;
                    let (stop_loss, take_profit) = match side {
                        TradeSide::Long => (
                            price * (1.0 - config.stop_loss_pct),
                            price * (1.0 + config.take_profit_pct),
                        ),
                        TradeSide::Short => (
                            price * (1.0 + config.stop_loss_pct),
                            price * (1.0 - config.take_profit_pct),
                        ),
                    };
                    open_position = Some(Trade::open(
                        now,
                        price,
                        position_size,
                        side,
                        stop_loss,
                        take_profit,
                    ));
                }
            }

            // Flat bars append the unchanged capital, so the equity curve
            // carries one point per evaluated bar plus one per close.
            if open_position.is_none() {
                equity_curve.push(capital);
            }
        }

        if let Some(mut trade) = open_position {
            let last = prices.len() - 1;
            capital += trade.close(timestamps[last], prices[last], TradeStatus::Closed);
            equity_curve.push(capital);
            trades.push(trade);
        }

        (trades, equity_curve)
    }

    fn entry_side(&self, rsi: f64, macd: f64, macd_signal: f64, volume: f64) -> Option<TradeSide> {
        if volume <= VOLUME_FLOOR {
            return None;
        }
        let bullish_cross = macd > macd_signal + self.config.macd_signal_threshold;
        let bearish_cross = macd < macd_signal - self.config.macd_signal_threshold;
        if rsi < self.config.rsi_oversold && bullish_cross {
            Some(TradeSide::Long)
        } else if rsi > self.config.rsi_overbought && bearish_cross {
            Some(TradeSide::Short)
        } else {
            None
        }
    }
}

/// Fixed exit priority: stop loss, then take profit, then the hold horizon.
fn exit_status(
    trade: &Trade,
    price: f64,
    now: DateTime<Utc>,
    max_hold: Duration,
) -> Option<TradeStatus> {
    let stop_hit = match trade.side {
        TradeSide::Long => price <= trade.stop_loss,
        TradeSide::Short => price >= trade.stop_loss,
    };
    if stop_hit {
        return Some(TradeStatus::StoppedOut);
    }

    let take_hit = match trade.side {
        TradeSide::Long => price >= trade.take_profit,
        TradeSide::Short => price <= trade.take_profit,
    };
    if take_hit {
        return Some(TradeStatus::TakeProfit);
    }

    if now - trade.entry_time > max_hold {
        return Some(TradeStatus::TimeExit);
    }

    None
}

/// Validates the input series, simulates the strategy and reduces the outcome
/// to a [`BacktestResult`].
pub fn run_backtest(
    config: &StrategyConfig,
    data: &HistoricalData,
    sink: &dyn EventSink,
) -> Result<BacktestResult, BacktestError> {
    StrategyEngine::new(config.clone(), sink).run(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn trade(side: TradeSide, entry: f64, stop: f64, take: f64) -> Trade {
        let entry_time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Trade::open(entry_time, entry, 10.0, side, stop, take)
    }

    #[test]
    fn stop_loss_takes_priority_over_time_exit() {
        let t = trade(TradeSide::Long, 100.0, 98.0, 104.0);
        let late = t.entry_time + Duration::hours(30);
        assert_eq!(
            exit_status(&t, 97.5, late, Duration::hours(24)),
            Some(TradeStatus::StoppedOut)
        );
    }

    #[test]
    fn take_profit_takes_priority_over_time_exit() {
        let t = trade(TradeSide::Short, 100.0, 102.0, 96.0);
        let late = t.entry_time + Duration::hours(30);
        assert_eq!(
            exit_status(&t, 95.0, late, Duration::hours(24)),
            Some(TradeStatus::TakeProfit)
        );
    }

    #[test]
    fn hold_horizon_is_strictly_greater_than_24_hours() {
        let t = trade(TradeSide::Long, 100.0, 98.0, 104.0);
        let exactly = t.entry_time + Duration::hours(24);
        assert_eq!(exit_status(&t, 100.5, exactly, Duration::hours(24)), None);

        let over = exactly + Duration::minutes(1);
        assert_eq!(
            exit_status(&t, 100.5, over, Duration::hours(24)),
            Some(TradeStatus::TimeExit)
        );
    }

    #[test]
    fn short_side_levels_are_mirrored() {
        let t = trade(TradeSide::Short, 100.0, 102.0, 96.0);
        let now = t.entry_time + Duration::hours(1);
        assert_eq!(
            exit_status(&t, 102.0, now, Duration::hours(24)),
            Some(TradeStatus::StoppedOut)
        );
        assert_eq!(exit_status(&t, 100.0, now, Duration::hours(24)), None);
    }

    #[test]
    fn entry_requires_volume_above_the_floor() {
        let engine = StrategyEngine::new(StrategyConfig::default(), &crate::events::NullSink);
        // Oversold with a bullish cross, but volume at the floor exactly.
        assert_eq!(engine.entry_side(20.0, 1.0, 0.5, 1000.0), None);
        assert_eq!(
            engine.entry_side(20.0, 1.0, 0.5, 1000.5),
            Some(TradeSide::Long)
        );
        assert_eq!(
            engine.entry_side(80.0, -1.0, -0.5, 1500.0),
            Some(TradeSide::Short)
        );
        // Divergence inside the threshold band is not a cross.
        assert_eq!(engine.entry_side(20.0, 0.55, 0.5, 1500.0), None);
    }
}

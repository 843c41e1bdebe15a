use crate::models::{BacktestResult, Trade};
use statrs::statistics::Statistics;

/// Trading periods per year used for annualization.
const TRADING_DAYS: f64 = 252.0;

/// Annual risk-free rate subtracted from per-step returns.
const RISK_FREE_RATE: f64 = 0.02;

pub struct PerformanceCalculator;

impl PerformanceCalculator {
    /// Reduces a finished run to aggregate statistics. With zero trades every
    /// count and ratio is 0 and the equity curve is passed through unchanged.
    pub fn calculate(
        trades: Vec<Trade>,
        equity_curve: Vec<f64>,
        initial_capital: f64,
    ) -> BacktestResult {
        if trades.is_empty() {
            return BacktestResult {
                total_trades: 0,
                winning_trades: 0,
                losing_trades: 0,
                win_rate: 0.0,
                total_pnl: 0.0,
                total_pnl_percent: 0.0,
                max_drawdown: 0.0,
                max_drawdown_percent: 0.0,
                sharpe_ratio: 0.0,
                profit_factor: 0.0,
                average_trade: 0.0,
                best_trade: 0.0,
                worst_trade: 0.0,
                trades,
                equity_curve,
                drawdown_curve: Vec::new(),
            };
        }

        let realized: Vec<f64> = trades.iter().filter_map(|t| t.pnl).collect();
        let winning_trades = realized.iter().filter(|&&pnl| pnl > 0.0).count();
        let losing_trades = realized.iter().filter(|&&pnl| pnl < 0.0).count();
        let total_trades = trades.len();
        let win_rate = winning_trades as f64 / total_trades as f64;

        let total_pnl: f64 = realized.iter().sum();
        let total_pnl_percent = if initial_capital > 0.0 {
            total_pnl / initial_capital * 100.0
        } else {
            0.0
        };

        let (best_trade, worst_trade, average_trade) = if realized.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            let best = realized.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let worst = realized.iter().copied().fold(f64::INFINITY, f64::min);
            let average = total_pnl / realized.len() as f64;
            (best, worst, average)
        };

        let drawdown_curve = Self::drawdown_curve(&equity_curve);
        let max_drawdown = drawdown_curve
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        let max_drawdown = if max_drawdown.is_finite() {
            max_drawdown
        } else {
            0.0
        };
        // Normalized by the global maximum of the equity curve, not the peak
        // at the time of the trough.
        let global_peak = equity_curve.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let max_drawdown_percent = if global_peak.is_finite() && global_peak > 0.0 {
            max_drawdown / global_peak * 100.0
        } else {
            0.0
        };

        let sharpe_ratio = Self::sharpe_ratio(&equity_curve, RISK_FREE_RATE);
        let profit_factor = Self::profit_factor(&realized);

        BacktestResult {
            total_trades,
            winning_trades,
            losing_trades,
            win_rate,
            total_pnl,
            total_pnl_percent,
            max_drawdown,
            max_drawdown_percent,
            sharpe_ratio,
            profit_factor,
            average_trade,
            best_trade,
            worst_trade,
            trades,
            equity_curve,
            drawdown_curve,
        }
    }

    /// Running-peak relative drawdown per equity point; every value is <= 0.
    pub fn drawdown_curve(equity_curve: &[f64]) -> Vec<f64> {
        let Some(&first) = equity_curve.first() else {
            return Vec::new();
        };

        let mut peak = first;
        let mut curve = Vec::with_capacity(equity_curve.len());
        for &value in equity_curve {
            if value > peak {
                peak = value;
            }
            curve.push((value - peak) / peak);
        }
        curve
    }

    /// Annualized mean excess return over its own dispersion. Per-step excess
    /// is the simple equity return minus `annual_rate / 252`; 0 with fewer
    /// than two equity points or zero dispersion.
    pub fn sharpe_ratio(equity_curve: &[f64], annual_risk_free_rate: f64) -> f64 {
        if equity_curve.len() < 2 {
            return 0.0;
        }

        let per_step_rate = annual_risk_free_rate / TRADING_DAYS;
        let excess_returns: Vec<f64> = equity_curve
            .windows(2)
            .map(|window| {
                let step_return = if window[0] > 0.0 {
                    (window[1] - window[0]) / window[0]
                } else {
                    0.0
                };
                step_return - per_step_rate
            })
            .collect();

        let mean = excess_returns.clone().mean();
        let std_dev = excess_returns.population_std_dev();
        if std_dev == 0.0 || !std_dev.is_finite() {
            return 0.0;
        }

        mean / std_dev * TRADING_DAYS.sqrt()
    }

    /// Gross profit over gross loss magnitude; +inf when profitable with no
    /// losing trades, 0 when there is neither profit nor loss.
    pub fn profit_factor(realized_pnls: &[f64]) -> f64 {
        let gross_profit: f64 = realized_pnls.iter().filter(|&&pnl| pnl > 0.0).sum();
        let gross_loss: f64 = realized_pnls
            .iter()
            .filter(|&&pnl| pnl < 0.0)
            .sum::<f64>()
            .abs();

        if gross_loss == 0.0 {
            if gross_profit > 0.0 {
                f64::INFINITY
            } else {
                0.0
            }
        } else {
            gross_profit / gross_loss
        }
    }
}

//! Stateless indicator functions over a price window ending at the current
//! bar. All functions are pure; callers pass the full history available at
//! the bar under evaluation, so there is no look-ahead by construction.

pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST_PERIOD: usize = 12;
pub const MACD_SLOW_PERIOD: usize = 26;
pub const MACD_SIGNAL_PERIOD: usize = 9;

const RSI_NEUTRAL: f64 = 50.0;

/// Momentum oscillator over the last `period` price changes, bounded 0..=100.
/// Uses a simple average of gains and losses, not Wilder smoothing. Returns
/// the neutral value while fewer than `period + 1` prices are available and
/// 100 when the window contains no losses.
pub fn calculate_rsi(prices: &[f64], period: usize) -> f64 {
    if period == 0 || prices.len() < period + 1 {
        return RSI_NEUTRAL;
    }

    let mut gain_sum = 0.0_f64;
    let mut loss_sum = 0.0_f64;
    for i in (prices.len() - period)..prices.len() {
        let delta = prices[i] - prices[i - 1];
        if delta > 0.0 {
            gain_sum += delta;
        } else {
            loss_sum += -delta;
        }
    }

    let avg_gain = gain_sum / period as f64;
    let avg_loss = loss_sum / period as f64;
    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// Point exponential moving average: seeded with the first price and folded
/// forward over the whole slice. Falls back to the last price while the slice
/// is shorter than `period` (0 when empty).
pub fn calculate_ema(prices: &[f64], period: usize) -> f64 {
    let Some(&first) = prices.first() else {
        return 0.0;
    };
    if prices.len() < period {
        return *prices.last().unwrap_or(&0.0);
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut ema = first;
    for &price in &prices[1..] {
        ema = price * multiplier + ema * (1.0 - multiplier);
    }
    ema
}

/// Trend-convergence oscillator: returns `(macd, signal)` for the last bar.
///
/// The macd line is `EMA(fast) - EMA(slow)` over the whole slice. The signal
/// line is the EMA of the macd value re-derived at every bar from index
/// `slow` onward; that reconstruction is maintained here with incremental EMA
/// state, which produces values identical to recomputing both EMAs over each
/// growing prefix (every prefix long enough to reach the reconstruction is
/// past both fallback windows, so the folds coincide). While fewer than
/// `signal` reconstructed values exist the signal line equals the macd line.
pub fn calculate_macd(
    prices: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> (f64, f64) {
    let macd_line = calculate_ema(prices, fast_period) - calculate_ema(prices, slow_period);
    if prices.len() <= slow_period {
        return (macd_line, macd_line);
    }

    let fast_multiplier = 2.0 / (fast_period as f64 + 1.0);
    let slow_multiplier = 2.0 / (slow_period as f64 + 1.0);
    let mut fast_ema = prices[0];
    let mut slow_ema = prices[0];
    let mut macd_history = Vec::with_capacity(prices.len() - slow_period);
    for (i, &price) in prices.iter().enumerate().skip(1) {
        fast_ema = price * fast_multiplier + fast_ema * (1.0 - fast_multiplier);
        slow_ema = price * slow_multiplier + slow_ema * (1.0 - slow_multiplier);
        if i >= slow_period {
            macd_history.push(fast_ema - slow_ema);
        }
    }

    let signal_line = if macd_history.len() >= signal_period {
        calculate_ema(&macd_history, signal_period)
    } else {
        macd_line
    };

    (macd_line, signal_line)
}

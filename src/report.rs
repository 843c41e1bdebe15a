use crate::models::{BacktestResult, Trade};
use serde_json::{json, Value};

/// Renders a result into a display-oriented structure: percentages and
/// currency to two decimals, per-trade rows with ISO-8601 timestamps. Pure
/// projection; the numeric result is untouched.
pub fn generate_report(result: &BacktestResult) -> Value {
    json!({
        "summary": {
            "total_trades": result.total_trades,
            "win_rate": format!("{:.2}%", result.win_rate * 100.0),
            "total_return": format!("{:.2}%", result.total_pnl_percent),
            "sharpe_ratio": format!("{:.2}", result.sharpe_ratio),
            "max_drawdown": format!("{:.2}%", result.max_drawdown_percent),
        },
        "performance": {
            "total_pnl": format!("${:.2}", result.total_pnl),
            "average_trade": format!("${:.2}", result.average_trade),
            "best_trade": format!("${:.2}", result.best_trade),
            "worst_trade": format!("${:.2}", result.worst_trade),
            "profit_factor": format!("{:.2}", result.profit_factor),
        },
        "risk_metrics": {
            "sharpe_ratio": result.sharpe_ratio,
            "max_drawdown": result.max_drawdown,
            "max_drawdown_percent": result.max_drawdown_percent,
            "winning_trades": result.winning_trades,
            "losing_trades": result.losing_trades,
        },
        "trade_analysis": {
            "trades": result.trades.iter().map(trade_row).collect::<Vec<Value>>(),
        },
    })
}

fn trade_row(trade: &Trade) -> Value {
    json!({
        "entry_time": trade.entry_time.to_rfc3339(),
        "exit_time": trade.exit_time.map(|t| t.to_rfc3339()),
        "side": trade.side.as_str(),
        "entry_price": format!("${:.2}", trade.entry_price),
        "exit_price": trade.exit_price.map(|p| format!("${:.2}", p)),
        "pnl": trade.pnl.map(|p| format!("${:.2}", p)),
        "status": trade.status.as_str(),
    })
}

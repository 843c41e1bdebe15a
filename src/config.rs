use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Strategy parameters. Every field has a default so partial configurations
/// merge cleanly; unrecognized keys in a parameter map are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub initial_capital: f64,
    pub position_size_pct: f64,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub macd_signal_threshold: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            position_size_pct: 0.1,
            stop_loss_pct: 0.02,
            take_profit_pct: 0.04,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            macd_signal_threshold: 0.1,
        }
    }
}

impl StrategyConfig {
    /// Overlays a flat parameter map on the defaults.
    pub fn from_parameters(parameters: &HashMap<String, f64>) -> Self {
        let mut config = Self::default();
        for (name, &value) in parameters {
            match name.as_str() {
                "initial_capital" => config.initial_capital = value,
                "position_size_pct" => config.position_size_pct = value,
                "stop_loss_pct" => config.stop_loss_pct = value,
                "take_profit_pct" => config.take_profit_pct = value,
                "rsi_oversold" => config.rsi_oversold = value,
                "rsi_overbought" => config.rsi_overbought = value,
                "macd_signal_threshold" => config.macd_signal_threshold = value,
                _ => {}
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = StrategyConfig::default();
        assert_eq!(config.initial_capital, 10_000.0);
        assert_eq!(config.position_size_pct, 0.1);
        assert_eq!(config.stop_loss_pct, 0.02);
        assert_eq!(config.take_profit_pct, 0.04);
        assert_eq!(config.rsi_oversold, 30.0);
        assert_eq!(config.rsi_overbought, 70.0);
        assert_eq!(config.macd_signal_threshold, 0.1);
    }

    #[test]
    fn from_parameters_merges_and_ignores_unknown_keys() {
        let mut parameters = HashMap::new();
        parameters.insert("rsi_oversold".to_string(), 25.0);
        parameters.insert("sharpe_ratio".to_string(), 1.5);
        parameters.insert("bogus".to_string(), -1.0);

        let config = StrategyConfig::from_parameters(&parameters);
        assert_eq!(config.rsi_oversold, 25.0);
        assert_eq!(config.rsi_overbought, 70.0);
        assert_eq!(config.initial_capital, 10_000.0);
    }

    #[test]
    fn deserializes_partial_document_with_defaults() {
        let config: StrategyConfig =
            serde_json::from_str(r#"{"stop_loss_pct": 0.03, "unknown_key": 7}"#)
                .expect("valid config document");
        assert_eq!(config.stop_loss_pct, 0.03);
        assert_eq!(config.take_profit_pct, 0.04);
    }
}

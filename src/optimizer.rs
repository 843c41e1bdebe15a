use crate::config::StrategyConfig;
use crate::engine::run_backtest;
use crate::events::EventSink;
use crate::models::HistoricalData;
use rayon::prelude::*;
use std::collections::HashMap;

/// Best-so-far sentinel; any real run beats it.
const SHARPE_SENTINEL: f64 = -999.0;

struct CombinationOutcome {
    parameters: HashMap<String, f64>,
    sharpe_ratio: f64,
    win_rate: f64,
    profit_factor: f64,
}

/// Brute-force grid search over the Cartesian product of candidate values.
///
/// Every combination is merged onto the base configuration and evaluated as an
/// independent run; combinations whose run fails are reported through the sink
/// and skipped. Returns the best combination found, extended with the
/// `sharpe_ratio`, `win_rate` and `profit_factor` it achieved, or an empty map
/// when no combination succeeded.
pub fn optimize_parameters(
    data: &HistoricalData,
    param_ranges: &HashMap<String, Vec<f64>>,
    sink: &dyn EventSink,
) -> HashMap<String, f64> {
    let combinations = parameter_combinations(param_ranges);
    sink.info(&format!(
        "optimizing over {} parameter combinations",
        combinations.len()
    ));

    // Runs share no mutable state, so combinations fan out freely. Collecting
    // preserves combination order, which keeps the best-so-far scan (and its
    // first-wins tie-breaking) identical to a sequential search.
    let outcomes: Vec<Option<CombinationOutcome>> = combinations
        .into_par_iter()
        .map(|parameters| {
            let config = StrategyConfig::from_parameters(&parameters);
            match run_backtest(&config, data, sink) {
                Ok(result) => Some(CombinationOutcome {
                    parameters,
                    sharpe_ratio: result.sharpe_ratio,
                    win_rate: result.win_rate,
                    profit_factor: result.profit_factor,
                }),
                Err(error) => {
                    sink.warn(&format!(
                        "parameter combination {} failed: {}",
                        parameter_signature(&parameters),
                        error
                    ));
                    None
                }
            }
        })
        .collect();

    let mut best_params = HashMap::new();
    let mut best_sharpe = SHARPE_SENTINEL;
    for outcome in outcomes.into_iter().flatten() {
        if outcome.sharpe_ratio > best_sharpe {
            best_sharpe = outcome.sharpe_ratio;
            best_params = outcome.parameters;
            best_params.insert("sharpe_ratio".to_string(), outcome.sharpe_ratio);
            best_params.insert("win_rate".to_string(), outcome.win_rate);
            best_params.insert("profit_factor".to_string(), outcome.profit_factor);
        }
    }
    best_params
}

/// Full Cartesian product in deterministic order: names sorted, the last name
/// cycling fastest. An empty range map yields the single empty combination; a
/// name with no candidate values yields none at all.
fn parameter_combinations(param_ranges: &HashMap<String, Vec<f64>>) -> Vec<HashMap<String, f64>> {
    let mut ordered: Vec<(&String, &Vec<f64>)> = param_ranges.iter().collect();
    ordered.sort_by(|a, b| a.0.cmp(b.0));

    let mut combinations = vec![HashMap::new()];
    for (name, values) in ordered {
        let mut expanded = Vec::with_capacity(combinations.len() * values.len());
        for combination in &combinations {
            for &value in values {
                let mut next = combination.clone();
                next.insert(name.clone(), value);
                expanded.push(next);
            }
        }
        combinations = expanded;
    }
    combinations
}

fn parameter_signature(parameters: &HashMap<String, f64>) -> String {
    let mut sorted: Vec<_> = parameters.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let parts: Vec<String> = sorted
        .into_iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect();
    format!("{{{}}}", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;

    #[test]
    fn combinations_cover_the_product_in_sorted_order() {
        let mut ranges = HashMap::new();
        ranges.insert("b".to_string(), vec![3.0, 4.0]);
        ranges.insert("a".to_string(), vec![1.0, 2.0]);

        let combos = parameter_combinations(&ranges);
        assert_eq!(combos.len(), 4);
        let as_pairs: Vec<(f64, f64)> = combos.iter().map(|c| (c["a"], c["b"])).collect();
        assert_eq!(
            as_pairs,
            vec![(1.0, 3.0), (1.0, 4.0), (2.0, 3.0), (2.0, 4.0)]
        );
    }

    #[test]
    fn empty_candidate_list_produces_no_combinations() {
        let mut ranges = HashMap::new();
        ranges.insert("a".to_string(), Vec::new());
        ranges.insert("b".to_string(), vec![1.0]);
        assert!(parameter_combinations(&ranges).is_empty());
    }

    #[test]
    fn empty_range_map_evaluates_the_base_configuration_once() {
        let combos = parameter_combinations(&HashMap::new());
        assert_eq!(combos.len(), 1);
        assert!(combos[0].is_empty());
    }

    #[test]
    fn failing_combinations_are_logged_and_skipped() {
        let data = HistoricalData::from_closes(vec![100.0; 50]);
        let mut ranges = HashMap::new();
        ranges.insert("rsi_oversold".to_string(), vec![20.0, 30.0]);

        let sink = MemorySink::new();
        let best = optimize_parameters(&data, &ranges, &sink);
        assert!(best.is_empty());
        assert_eq!(sink.warnings().len(), 2);
        assert!(sink.warnings()[0].contains("insufficient historical data"));
    }

    #[test]
    fn signature_is_stable_and_sorted() {
        let mut parameters = HashMap::new();
        parameters.insert("z".to_string(), 1.0);
        parameters.insert("a".to_string(), 2.5);
        assert_eq!(parameter_signature(&parameters), "{a=2.5, z=1}");
    }
}

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BacktestError {
    #[error("insufficient historical data: got {actual} close prices, need at least {required}")]
    InsufficientData { required: usize, actual: usize },

    #[error("{series} series has {actual} entries but close_prices has {expected}")]
    MisalignedSeries {
        series: &'static str,
        expected: usize,
        actual: usize,
    },
}

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Moving average window must be at least 1, got {0}")]
    InvalidWindow(usize),

    #[error("BARSLAST requires a boolean series, got a {found} series")]
    TypeConstraint { found: &'static str },

    #[error("Not enough history: {required} bars required, {available} available")]
    InsufficientHistory { required: usize, available: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConditionError {
    #[error("Condition at {incoming} is not after the last recorded timestamp {last}")]
    NonIncreasingTimestamp {
        last: DateTime<Utc>,
        incoming: DateTime<Utc>,
    },

    #[error("Unknown condition '{0}'")]
    UnknownCondition(String),

    #[error("Condition column '{0}' was not loaded")]
    MissingColumn(String),
}

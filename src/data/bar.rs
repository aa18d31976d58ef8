use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum BarError {
    #[error("Invalid close price: {0} (must be positive)")]
    NonPositiveClose(f64),
    #[error("Negative volume: {0}")]
    NegativeVolume(f64),
}

//one sampled trading period as delivered by the data feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub close: f64,
    pub volume: Option<f64>,
    pub symbol: String,
}

impl Bar {
    //creates a new Bar with validation
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        close: f64,
        volume: Option<f64>,
        symbol: String,
    ) -> Result<Self, BarError> {
        if close.is_nan() || close <= 0.0 {
            return Err(BarError::NonPositiveClose(close));
        }

        if let Some(v) = volume {
            if v < 0.0 {
                return Err(BarError::NegativeVolume(v));
            }
        }

        Ok(Bar {
            timestamp,
            open,
            close,
            volume,
            symbol,
        })
    }

    //close-only bar, open is set to close
    pub fn from_close(timestamp: DateTime<Utc>, close: f64, symbol: &str) -> Result<Self, BarError> {
        Bar::new(timestamp, close, close, None, symbol.to_string())
    }
}

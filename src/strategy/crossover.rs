use crate::indicator::{latest_moving_average, moving_average, IndicatorError};
use crate::strategy::StrategyError;
use serde::{Deserialize, Serialize};

//direction of a moving average crossing at one bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cross {
    //short average moved from at-or-below the long average to above it
    Golden,
    //short average moved from at-or-above the long average to below it
    Death,
    NoCross,
}

//crossing boundary: previous bar uses <= / >=, current bar uses strict > / <
//golden and death therefore never hold together
pub fn classify(prev_short: f64, prev_long: f64, short: f64, long: f64) -> Cross {
    if prev_short <= prev_long && short > long {
        Cross::Golden
    } else if prev_short >= prev_long && short < long {
        Cross::Death
    } else {
        Cross::NoCross
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossSnapshot {
    pub short_ma: f64,
    pub long_ma: f64,
    pub prev_short_ma: f64,
    pub prev_long_ma: f64,
    pub cross: Cross,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Evaluation {
    //not enough bars for all four averages, the caller skips this bar
    NotReady { required: usize, available: usize },
    Ready(CrossSnapshot),
}

impl Evaluation {
    pub fn is_ready(&self) -> bool {
        matches!(self, Evaluation::Ready(_))
    }

    pub fn cross(&self) -> Option<Cross> {
        match self {
            Evaluation::Ready(snapshot) => Some(snapshot.cross),
            Evaluation::NotReady { .. } => None,
        }
    }

    pub fn into_result(self) -> Result<CrossSnapshot, IndicatorError> {
        match self {
            Evaluation::Ready(snapshot) => Ok(snapshot),
            Evaluation::NotReady {
                required,
                available,
            } => Err(IndicatorError::InsufficientHistory {
                required,
                available,
            }),
        }
    }
}

//dual moving average crossover detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossoverEvaluator {
    short_window: usize,
    long_window: usize,
}

impl CrossoverEvaluator {
    pub fn new(short_window: usize, long_window: usize) -> Result<Self, StrategyError> {
        if short_window == 0 {
            return Err(StrategyError::InvalidParameters(
                "short window must be at least 1".to_string(),
            ));
        }
        if short_window >= long_window {
            return Err(StrategyError::InvalidParameters(format!(
                "short window ({}) must be less than long window ({})",
                short_window, long_window
            )));
        }

        Ok(CrossoverEvaluator {
            short_window,
            long_window,
        })
    }

    pub fn short_window(&self) -> usize {
        self.short_window
    }

    pub fn long_window(&self) -> usize {
        self.long_window
    }

    //bars needed before the previous long average is defined
    pub fn required_bars(&self) -> usize {
        self.long_window + 1
    }

    //crossing state at the last close
    pub fn evaluate(&self, closes: &[f64]) -> Evaluation {
        let n = closes.len();
        let not_ready = Evaluation::NotReady {
            required: self.required_bars(),
            available: n,
        };
        if n < self.required_bars() {
            return not_ready;
        }

        let previous = &closes[..n - 1];
        let averages = (
            latest_moving_average(previous, self.short_window),
            latest_moving_average(previous, self.long_window),
            latest_moving_average(closes, self.short_window),
            latest_moving_average(closes, self.long_window),
        );

        match averages {
            (Some(prev_short_ma), Some(prev_long_ma), Some(short_ma), Some(long_ma)) => {
                tracing::debug!(short_ma, long_ma, prev_short_ma, prev_long_ma, "averages");
                Evaluation::Ready(CrossSnapshot {
                    short_ma,
                    long_ma,
                    prev_short_ma,
                    prev_long_ma,
                    cross: classify(prev_short_ma, prev_long_ma, short_ma, long_ma),
                })
            }
            _ => not_ready,
        }
    }

    //crossing state at every index, None where the averages are not ready
    pub fn cross_series(&self, closes: &[f64]) -> Vec<Option<Cross>> {
        //windows are validated in new so neither call can fail
        let (short, long) = match (
            moving_average(closes, self.short_window),
            moving_average(closes, self.long_window),
        ) {
            (Ok(short), Ok(long)) => (short, long),
            _ => return vec![None; closes.len()],
        };

        (0..closes.len())
            .map(|i| {
                if i == 0 {
                    return None;
                }
                match (short[i - 1], long[i - 1], short[i], long[i]) {
                    (Some(ps), Some(pl), Some(s), Some(l)) => Some(classify(ps, pl, s, l)),
                    _ => None,
                }
            })
            .collect()
    }
}

use crate::data::bar::Bar;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum HistoryError {
    #[error("Bar at {incoming} is not after the last retained bar at {last}")]
    OutOfOrder {
        last: DateTime<Utc>,
        incoming: DateTime<Utc>,
    },
}

//trailing window of bars (ring buffer with limited lookback)
#[derive(Debug, Clone)]
pub struct BarHistory {
    bars: VecDeque<Bar>,
    max_len: usize,
}

impl BarHistory {
    pub fn new(max_len: usize) -> Self {
        let max_len = max_len.max(1);
        BarHistory {
            bars: VecDeque::with_capacity(max_len),
            max_len,
        }
    }

    //appends a bar, evicting the oldest one once the window is full
    pub fn push(&mut self, bar: Bar) -> Result<(), HistoryError> {
        if let Some(last) = self.bars.back() {
            if bar.timestamp <= last.timestamp {
                return Err(HistoryError::OutOfOrder {
                    last: last.timestamp,
                    incoming: bar.timestamp,
                });
            }
        }

        if self.bars.len() >= self.max_len {
            self.bars.pop_front();
        }
        self.bars.push_back(bar);
        Ok(())
    }

    //returns the most recent bar
    pub fn last_bar(&self) -> Option<&Bar> {
        self.bars.back()
    }

    //close prices of the retained window, oldest first
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn bar(day: i64, close: f64) -> Bar {
        let ts = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap() + Duration::days(day);
        Bar::from_close(ts, close, "SHFE.cu1902").unwrap()
    }

    #[test]
    fn keeps_only_trailing_window() {
        let mut history = BarHistory::new(3);
        for day in 0..5 {
            history.push(bar(day, 100.0 + day as f64)).unwrap();
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.closes(), vec![102.0, 103.0, 104.0]);
        assert_eq!(history.last_bar().unwrap().close, 104.0);
    }

    #[test]
    fn rejects_duplicate_and_older_timestamps() {
        let mut history = BarHistory::new(10);
        history.push(bar(2, 10.0)).unwrap();

        assert!(matches!(
            history.push(bar(2, 11.0)),
            Err(HistoryError::OutOfOrder { .. })
        ));
        assert!(history.push(bar(1, 11.0)).is_err());
        assert_eq!(history.closes(), vec![10.0]);
    }
}

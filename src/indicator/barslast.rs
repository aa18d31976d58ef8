use crate::indicator::error::{ConditionError, IndicatorError};
use crate::indicator::series::{ConditionSeries, SeriesValues};
use chrono::{DateTime, Utc};

//returned when no prior true value exists in the available history
pub const NOT_FOUND: i64 = -1;

//number of periods since the condition was last true, not counting the current bar
//the scan starts at current_index - 1, so a result is either >= 1 or NOT_FOUND
pub fn barslast(conditions: &[bool], current_index: usize) -> i64 {
    if conditions.len() < 2 || current_index >= conditions.len() {
        return NOT_FOUND;
    }

    conditions[..current_index]
        .iter()
        .rposition(|&c| c)
        .map(|last_true| (current_index - last_true) as i64)
        .unwrap_or(NOT_FOUND)
}

//barslast evaluated at the most recent bar
pub fn barslast_latest(conditions: &[bool]) -> i64 {
    match conditions.len() {
        0 => NOT_FOUND,
        n => barslast(conditions, n - 1),
    }
}

//type-checked barslast at the most recent value of a loaded column
pub fn barslast_values(values: &SeriesValues) -> Result<i64, IndicatorError> {
    match values {
        SeriesValues::Bool(conditions) => Ok(barslast_latest(conditions)),
        other => Err(IndicatorError::TypeConstraint {
            found: other.type_name(),
        }),
    }
}

//barslast at every position of a loaded column in one pass
pub fn barslast_series(values: &SeriesValues) -> Result<Vec<i64>, IndicatorError> {
    let conditions = match values {
        SeriesValues::Bool(conditions) => conditions,
        other => {
            return Err(IndicatorError::TypeConstraint {
                found: other.type_name(),
            })
        }
    };

    let mut last_true: Option<usize> = None;
    let mut out = Vec::with_capacity(conditions.len());

    for (i, &value) in conditions.iter().enumerate() {
        out.push(last_true.map_or(NOT_FOUND, |j| (i - j) as i64));
        if value {
            last_true = Some(i);
        }
    }

    Ok(out)
}

//incremental barslast over a timestamp-indexed condition history
//keeps a cursor on the last true position, updates never rescan the history
//with retention set, each eviction shifts the retained entries (linear in the retention)
#[derive(Debug, Clone, Default)]
pub struct BarslastEngine {
    series: ConditionSeries,
    last_true: Option<usize>,
    retention: Option<usize>,
    current: Option<i64>,
}

impl BarslastEngine {
    pub fn new() -> Self {
        BarslastEngine::default()
    }

    //keeps at most max_len conditions, older ones are evicted
    pub fn with_retention(max_len: usize) -> Self {
        BarslastEngine {
            retention: Some(max_len.max(1)),
            ..BarslastEngine::default()
        }
    }

    //records the condition for a new bar and returns barslast at that bar
    pub fn update(&mut self, timestamp: DateTime<Utc>, value: bool) -> Result<i64, ConditionError> {
        self.series.push(timestamp, value)?;

        if let Some(max_len) = self.retention {
            while self.series.len() > max_len {
                self.series.pop_front();
                self.last_true = self.last_true.and_then(|j| j.checked_sub(1));
            }
        }

        let index = self.series.len() - 1;
        let result = self
            .last_true
            .map_or(NOT_FOUND, |j| (index - j) as i64);

        if value {
            self.last_true = Some(index);
        }
        self.current = Some(result);

        Ok(result)
    }

    //barslast at any retained bar, None if the timestamp is unknown
    pub fn barslast_at(&self, timestamp: &DateTime<Utc>) -> Option<i64> {
        let index = self.series.index_of(timestamp)?;
        Some(barslast(&self.series.values(), index))
    }

    //value returned by the last update
    pub fn current(&self) -> Option<i64> {
        self.current
    }

    pub fn series(&self) -> &ConditionSeries {
        &self.series
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    #[test]
    fn no_prior_true_is_not_found() {
        assert_eq!(barslast(&[false, false, false], 2), NOT_FOUND);
        //a true at the current bar does not count
        assert_eq!(barslast(&[false, false, true], 2), NOT_FOUND);
        //trues after the current index are ignored
        assert_eq!(barslast(&[false, false, true], 1), NOT_FOUND);
    }

    #[test]
    fn counts_back_to_previous_true() {
        assert_eq!(barslast(&[false, false, true, false], 3), 1);
        assert_eq!(barslast(&[true, false, false, false], 3), 3);
        assert_eq!(barslast(&[true, true, false, true], 3), 2);
    }

    #[test]
    fn short_sequences_are_not_found() {
        assert_eq!(barslast(&[], 0), NOT_FOUND);
        assert_eq!(barslast(&[true], 0), NOT_FOUND);
        assert_eq!(barslast_latest(&[true]), NOT_FOUND);
        assert_eq!(barslast_latest(&[]), NOT_FOUND);
    }

    #[test]
    fn out_of_range_index_is_not_found() {
        assert_eq!(barslast(&[true, false], 5), NOT_FOUND);
    }

    #[test]
    fn integer_series_violates_type_constraint() {
        let values = SeriesValues::Int(vec![1, 0, 1]);
        assert_eq!(
            barslast_values(&values),
            Err(IndicatorError::TypeConstraint { found: "integer" })
        );
        assert!(barslast_series(&values).is_err());
        assert!(barslast_values(&SeriesValues::Float(vec![1.0])).is_err());
    }

    #[test]
    fn typed_entry_points_match_pure_scan() {
        let conditions = vec![false, true, false, false, true, false];
        let values = SeriesValues::Bool(conditions.clone());

        assert_eq!(barslast_values(&values), Ok(barslast_latest(&conditions)));

        let expected: Vec<i64> = (0..conditions.len())
            .map(|i| barslast(&conditions, i))
            .collect();
        assert_eq!(barslast_series(&values).unwrap(), expected);
    }

    #[test]
    fn engine_matches_rescan() {
        let conditions = [false, true, false, false, true, true, false, false];
        let mut engine = BarslastEngine::new();

        for (i, &value) in conditions.iter().enumerate() {
            let got = engine.update(day(i as i64), value).unwrap();
            assert_eq!(got, barslast(&conditions[..=i], i), "index {}", i);
        }

        assert_eq!(engine.current(), Some(2));
        assert_eq!(engine.barslast_at(&day(3)), Some(2));
        assert_eq!(engine.barslast_at(&day(99)), None);
    }

    #[test]
    fn engine_rejects_non_increasing_timestamps() {
        let mut engine = BarslastEngine::new();
        engine.update(day(1), true).unwrap();

        assert!(engine.update(day(1), false).is_err());
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn retention_evicts_old_trues() {
        let mut engine = BarslastEngine::with_retention(3);

        assert_eq!(engine.update(day(0), true).unwrap(), NOT_FOUND);
        assert_eq!(engine.update(day(1), false).unwrap(), 1);
        assert_eq!(engine.update(day(2), false).unwrap(), 2);
        //the true at day 0 has been evicted
        assert_eq!(engine.update(day(3), false).unwrap(), NOT_FOUND);
        assert_eq!(engine.len(), 3);
    }
}

use crate::indicator::error::ConditionError;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;

//boolean history aligned 1:1 with a bar sequence
//the index map gives lookups by timestamp and by position
#[derive(Debug, Clone, Default)]
pub struct ConditionSeries {
    values: IndexMap<DateTime<Utc>, bool>,
}

impl ConditionSeries {
    pub fn new() -> Self {
        ConditionSeries {
            values: IndexMap::new(),
        }
    }

    //appends a value, timestamps must be strictly increasing
    //returns the position of the new entry
    pub fn push(&mut self, timestamp: DateTime<Utc>, value: bool) -> Result<usize, ConditionError> {
        if let Some((&last, _)) = self.values.last() {
            if timestamp <= last {
                return Err(ConditionError::NonIncreasingTimestamp {
                    last,
                    incoming: timestamp,
                });
            }
        }

        let (index, _) = self.values.insert_full(timestamp, value);
        Ok(index)
    }

    pub fn index_of(&self, timestamp: &DateTime<Utc>) -> Option<usize> {
        self.values.get_index_of(timestamp)
    }

    pub fn get(&self, timestamp: &DateTime<Utc>) -> Option<bool> {
        self.values.get(timestamp).copied()
    }

    pub fn value_at(&self, index: usize) -> Option<bool> {
        self.values.get_index(index).map(|(_, &v)| v)
    }

    pub fn timestamp_at(&self, index: usize) -> Option<DateTime<Utc>> {
        self.values.get_index(index).map(|(&ts, _)| ts)
    }

    //drops the oldest entry, the remaining entries shift down one position
    pub fn pop_front(&mut self) -> Option<(DateTime<Utc>, bool)> {
        self.values.shift_remove_index(0)
    }

    pub fn values(&self) -> Vec<bool> {
        self.values.values().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DateTime<Utc>, &bool)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

//a dynamically typed column as read from a tabular file
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesValues {
    Bool(Vec<bool>),
    Int(Vec<i64>),
    Float(Vec<f64>),
    Text(Vec<String>),
}

impl SeriesValues {
    //picks the narrowest type every cell parses as: bool, then int, then float, else text
    pub fn infer(raw: &[String]) -> Self {
        if let Some(bools) = raw.iter().map(|s| parse_bool(s)).collect::<Option<Vec<_>>>() {
            return SeriesValues::Bool(bools);
        }
        if let Ok(ints) = raw.iter().map(|s| s.parse::<i64>()).collect::<Result<Vec<_>, _>>() {
            return SeriesValues::Int(ints);
        }
        if let Ok(floats) = raw.iter().map(|s| s.parse::<f64>()).collect::<Result<Vec<_>, _>>() {
            return SeriesValues::Float(floats);
        }
        SeriesValues::Text(raw.to_vec())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            SeriesValues::Bool(_) => "bool",
            SeriesValues::Int(_) => "integer",
            SeriesValues::Float(_) => "float",
            SeriesValues::Text(_) => "text",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SeriesValues::Bool(v) => v.len(),
            SeriesValues::Int(v) => v.len(),
            SeriesValues::Float(v) => v.len(),
            SeriesValues::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

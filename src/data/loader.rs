use crate::data::bar::Bar;
use crate::indicator::{ConditionSeries, IndicatorError, SeriesValues};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CsvRecord {
    timestamp: String,
    #[serde(default)]
    open: Option<f64>,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
    symbol: String,
}

//accepts rfc3339 timestamps or plain trading dates (yyyy-mm-dd, midnight utc)
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .context(format!("Failed to parse timestamp '{}'", raw))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .context(format!("Invalid trading date '{}'", raw))?;
    Ok(midnight.and_utc())
}

//loads bars from a csv file
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Bar>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(format!("Failed to open CSV file: {:?}", path))?;

    let mut bars = Vec::new();

    for (index, result) in reader.deserialize().enumerate() {
        let record: CsvRecord =
            result.context(format!("Failed to parse CSV record at line {}", index + 2))?;

        let timestamp = parse_timestamp(&record.timestamp)
            .context(format!("Bad timestamp at line {}", index + 2))?;

        let bar = Bar::new(
            timestamp,
            record.open.unwrap_or(record.close),
            record.close,
            record.volume,
            record.symbol,
        )
        .context(format!("Invalid bar at line {}", index + 2))?;

        bars.push(bar);
    }

    //stable sort keeps file order among equal timestamps so the dedup below keeps the last row
    bars.sort_by(|a, b| (&a.symbol, a.timestamp).cmp(&(&b.symbol, b.timestamp)));
    let bars = dedup_keep_last(bars);

    Ok(bars)
}

//collapses rows sharing symbol and timestamp, keeping the last one
fn dedup_keep_last(bars: Vec<Bar>) -> Vec<Bar> {
    let before = bars.len();
    let mut out: Vec<Bar> = Vec::with_capacity(before);

    for bar in bars {
        match out.last_mut() {
            Some(last) if last.symbol == bar.symbol && last.timestamp == bar.timestamp => {
                *last = bar;
            }
            _ => out.push(bar),
        }
    }

    if out.len() != before {
        tracing::warn!(
            dropped = before - out.len(),
            "duplicate bar timestamps found, kept the last row of each"
        );
    }

    out
}

//filters bars by symbol
pub fn filter_by_symbol(bars: &[Bar], symbol: &str) -> Vec<Bar> {
    bars.iter()
        .filter(|bar| bar.symbol == symbol)
        .cloned()
        .collect()
}

//keeps bars whose trading date lies within [start, end], open ends are unbounded
pub fn filter_by_date_range(
    bars: &[Bar],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<Bar> {
    bars.iter()
        .filter(|bar| {
            let date = bar.timestamp.date_naive();
            !start.is_some_and(|s| date < s) && !end.is_some_and(|e| date > e)
        })
        .cloned()
        .collect()
}

//reads a single named column and infers its value type
pub fn load_column<P: AsRef<Path>>(path: P, column: &str) -> Result<SeriesValues> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(format!("Failed to open CSV file: {:?}", path))?;

    let position = reader
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| anyhow::anyhow!("Column '{}' not found in {:?}", column, path))?;

    let mut raw = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.context(format!("Failed to read CSV record at line {}", index + 2))?;
        raw.push(record.get(position).unwrap_or_default().to_string());
    }

    Ok(SeriesValues::infer(&raw))
}

//reads a boolean condition column keyed by timestamp
//with a symbol given, rows of other symbols are skipped when the file has a symbol column
pub fn load_condition_column<P: AsRef<Path>>(
    path: P,
    column: &str,
    symbol: Option<&str>,
) -> Result<ConditionSeries> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(format!("Failed to open CSV file: {:?}", path))?;

    let headers = reader.headers().context("Failed to read CSV header")?.clone();
    let find = |name: &str| headers.iter().position(|h| h == name);

    let timestamp_pos =
        find("timestamp").ok_or_else(|| anyhow::anyhow!("No timestamp column in {:?}", path))?;
    let value_pos = find(column)
        .ok_or_else(|| anyhow::anyhow!("Column '{}' not found in {:?}", column, path))?;
    let symbol_pos = find("symbol");

    let mut timestamps = Vec::new();
    let mut raw = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.context(format!("Failed to read CSV record at line {}", index + 2))?;

        if let (Some(wanted), Some(pos)) = (symbol, symbol_pos) {
            if record.get(pos) != Some(wanted) {
                continue;
            }
        }

        let timestamp = parse_timestamp(record.get(timestamp_pos).unwrap_or_default())
            .context(format!("Bad timestamp at line {}", index + 2))?;
        timestamps.push(timestamp);
        raw.push(record.get(value_pos).unwrap_or_default().to_string());
    }

    let values = match SeriesValues::infer(&raw) {
        SeriesValues::Bool(values) => values,
        other => {
            return Err(IndicatorError::TypeConstraint {
                found: other.type_name(),
            }
            .into())
        }
    };

    let mut rows: Vec<_> = timestamps.into_iter().zip(values).collect();
    rows.sort_by_key(|(timestamp, _)| *timestamp);

    let mut series = ConditionSeries::new();
    for (i, &(timestamp, value)) in rows.iter().enumerate() {
        //later rows win for a repeated timestamp
        if rows.get(i + 1).is_some_and(|(next, _)| *next == timestamp) {
            continue;
        }
        series.push(timestamp, value)?;
    }

    Ok(series)
}

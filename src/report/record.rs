use crate::strategy::crossover::Cross;
use crate::strategy::TradeAction;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

//one row of the per-bar report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarRecord {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub balance: f64,
    //lot count a signal on this bar would trade
    pub position: i64,
    pub cross: Option<Cross>,
    //primary condition value at this bar
    pub condition: bool,
    pub barslast: i64,
    //barslast of the extra conditions, in configured order
    pub extra_barslast: Vec<i64>,
    pub trade: Option<TradeAction>,
}

impl BarRecord {
    pub fn trade_description(&self) -> String {
        self.trade.map(|t| t.to_string()).unwrap_or_default()
    }
}

//writes records as datetime,price,balance,position,barslast,trade plus one column per extra condition
pub fn write_records_csv<P: AsRef<Path>>(
    records: &[BarRecord],
    extra_names: &[String],
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .context(format!("Failed to create CSV file: {:?}", path))?;

    let mut header = vec![
        "datetime".to_string(),
        "price".to_string(),
        "balance".to_string(),
        "position".to_string(),
        "barslast".to_string(),
        "trade".to_string(),
    ];
    header.extend(extra_names.iter().map(|name| format!("barslast_{}", name)));
    writer.write_record(&header)?;

    for record in records {
        let mut row = vec![
            record.timestamp.to_rfc3339(),
            record.price.to_string(),
            format!("{:.2}", record.balance),
            record.position.to_string(),
            record.barslast.to_string(),
            record.trade_description(),
        ];
        row.extend(record.extra_barslast.iter().map(|v| v.to_string()));
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn writes_header_and_rows() {
        let ts = Utc.with_ymd_and_hms(2023, 1, 3, 0, 0, 0).unwrap();
        let records = vec![
            BarRecord {
                timestamp: ts,
                price: 3748.0,
                balance: 1_000_000.0,
                position: 5,
                cross: Some(Cross::Golden),
                condition: true,
                barslast: -1,
                extra_barslast: vec![3],
                trade: Some(TradeAction::OpenLong { lots: 5 }),
            },
            BarRecord {
                timestamp: ts + chrono::Duration::days(1),
                price: 3750.5,
                balance: 1_000_000.0,
                position: 5,
                cross: Some(Cross::NoCross),
                condition: false,
                barslast: 1,
                extra_barslast: vec![4],
                trade: None,
            },
        ];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("barslast_results.csv");
        write_records_csv(&records, &["death_cross".to_string()], &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines[0],
            "datetime,price,balance,position,barslast,trade,barslast_death_cross"
        );
        assert_eq!(
            lines[1],
            "2023-01-03T00:00:00+00:00,3748,1000000.00,5,-1,open long 5 lots,3"
        );
        assert_eq!(
            lines[2],
            "2023-01-04T00:00:00+00:00,3750.5,1000000.00,5,1,,4"
        );
    }
}

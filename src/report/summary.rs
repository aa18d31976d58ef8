use crate::indicator::NOT_FOUND;
use crate::report::record::BarRecord;
use crate::strategy::crossover::Cross;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

//summary of one strategy run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub symbol: String,
    pub strategy: String,
    pub condition: String,
    pub bars_processed: usize,
    pub bars_evaluated: usize,
    pub golden_crosses: usize,
    pub death_crosses: usize,
    pub orders_issued: usize,
    pub final_target: i64,
    pub condition_hits: usize,
    //bars between consecutive condition hits
    pub mean_interval: f64,
    pub interval_std_dev: f64,
    pub max_interval: i64,
    pub last_barslast: i64,
}

impl SummaryMetrics {
    pub fn from_records(
        symbol: &str,
        strategy: &str,
        condition: &str,
        records: &[BarRecord],
    ) -> Self {
        let bars_evaluated = records.iter().filter(|r| r.cross.is_some()).count();
        let golden_crosses = count_cross(records, Cross::Golden);
        let death_crosses = count_cross(records, Cross::Death);

        let trades: Vec<_> = records.iter().filter_map(|r| r.trade).collect();
        let final_target = trades.last().map(|t| t.target()).unwrap_or(0);

        //barslast at a hit bar is the distance back to the previous hit
        let hits: Vec<&BarRecord> = records.iter().filter(|r| r.condition).collect();
        let intervals: Vec<f64> = hits
            .iter()
            .filter(|r| r.barslast != NOT_FOUND)
            .map(|r| r.barslast as f64)
            .collect();

        let (mean_interval, interval_std_dev) = interval_stats(&intervals);
        let max_interval = intervals.iter().fold(0.0f64, |a, &b| a.max(b)) as i64;

        SummaryMetrics {
            symbol: symbol.to_string(),
            strategy: strategy.to_string(),
            condition: condition.to_string(),
            bars_processed: records.len(),
            bars_evaluated,
            golden_crosses,
            death_crosses,
            orders_issued: trades.len(),
            final_target,
            condition_hits: hits.len(),
            mean_interval,
            interval_std_dev,
            max_interval,
            last_barslast: records.last().map(|r| r.barslast).unwrap_or(NOT_FOUND),
        }
    }

    //prints metrics in a formatted table
    pub fn pretty_print_table(&self) {
        let mut table = Table::new();

        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        let rows = [
            ("Symbol", self.symbol.clone()),
            ("Strategy", self.strategy.clone()),
            ("Condition", self.condition.clone()),
            ("Bars Processed", self.bars_processed.to_string()),
            ("Bars Evaluated", self.bars_evaluated.to_string()),
            ("Golden Crosses", self.golden_crosses.to_string()),
            ("Death Crosses", self.death_crosses.to_string()),
            ("Target Orders", self.orders_issued.to_string()),
            ("Final Target (lots)", self.final_target.to_string()),
            ("Condition Hits", self.condition_hits.to_string()),
            ("Mean Bars Between Hits", format!("{:.2}", self.mean_interval)),
            ("Std Dev Bars Between Hits", format!("{:.2}", self.interval_std_dev)),
            ("Max Bars Between Hits", self.max_interval.to_string()),
            ("Last BARSLAST", self.last_barslast.to_string()),
        ];

        for (name, value) in rows {
            table.add_row(Row::new(vec![Cell::new(name), Cell::new(&value)]));
        }

        table.printstd();
    }
}

fn count_cross(records: &[BarRecord], cross: Cross) -> usize {
    records.iter().filter(|r| r.cross == Some(cross)).count()
}

fn interval_stats(intervals: &[f64]) -> (f64, f64) {
    match intervals.len() {
        0 => (0.0, 0.0),
        1 => (intervals[0], 0.0),
        _ => (intervals.mean(), intervals.std_dev()),
    }
}

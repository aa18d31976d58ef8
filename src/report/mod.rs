pub mod record;
pub mod summary;

pub use record::{write_records_csv, BarRecord};
pub use summary::SummaryMetrics;

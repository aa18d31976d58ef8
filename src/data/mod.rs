pub mod bar;
pub mod history;
pub mod loader;

pub use bar::{Bar, BarError};
pub use history::{BarHistory, HistoryError};
pub use loader::{
    filter_by_date_range, filter_by_symbol, load_column, load_condition_column, load_csv,
    parse_timestamp,
};

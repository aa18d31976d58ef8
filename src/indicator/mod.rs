pub mod barslast;
pub mod error;
pub mod moving_average;
pub mod series;

pub use barslast::{
    barslast, barslast_latest, barslast_series, barslast_values, BarslastEngine, NOT_FOUND,
};
pub use error::{ConditionError, IndicatorError};
pub use moving_average::{latest_moving_average, moving_average, sma};
pub use series::{ConditionSeries, SeriesValues};

//bars-since-last-condition analysis and dual moving average crossover evaluation for futures contracts

pub mod config;
pub mod data;
pub mod engine;
pub mod indicator;
pub mod instrument;
pub mod report;
pub mod session;
pub mod strategy;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ContractConfig, MaParams, StrategyConfig};
    pub use crate::data::{
        filter_by_date_range, filter_by_symbol, load_column, load_condition_column, load_csv, Bar,
        BarHistory,
    };
    pub use crate::engine::{RunError, RunResult, RunnerConfig, StrategyRunner};
    pub use crate::indicator::barslast::{
        barslast, barslast_latest, barslast_series, barslast_values, BarslastEngine, NOT_FOUND,
    };
    pub use crate::indicator::{moving_average, ConditionSeries, IndicatorError, SeriesValues};
    pub use crate::instrument::FuturesContract;
    pub use crate::report::{write_records_csv, BarRecord, SummaryMetrics};
    pub use crate::session::{
        AccountSnapshot, FeedEvent, ReplaySession, SessionError, SessionGuard, TargetOrder,
        TradingSession,
    };
    pub use crate::strategy::{
        condition::ConditionKind,
        crossover::{Cross, CrossoverEvaluator, Evaluation},
        dual_ma::DualMaStrategy,
        sizing::{DeathCrossAction, SizingMode},
        Decision, Strategy, StrategyContext, TradeAction,
    };
}

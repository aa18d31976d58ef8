pub mod runner;

pub use runner::{RunError, RunResult, RunnerConfig, StrategyRunner};

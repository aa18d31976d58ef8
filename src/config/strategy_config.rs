use crate::data::load_condition_column;
use crate::engine::RunnerConfig;
use crate::indicator::ConditionSeries;
use crate::instrument::{ContractError, FuturesContract};
use crate::strategy::condition::ConditionKind;
use crate::strategy::dual_ma::DualMaStrategy;
use crate::strategy::sizing::{DeathCrossAction, SizingMode};
use crate::strategy::StrategyError;
use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

//contract configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContractConfig {
    pub symbol: String,
    pub multiplier: f64,
}

impl ContractConfig {
    //converts to a FuturesContract
    pub fn to_futures_contract(&self) -> Result<FuturesContract, ContractError> {
        FuturesContract::new(&self.symbol, self.multiplier)
    }
}

//dual moving average parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaParams {
    pub short_window: usize,
    pub long_window: usize,
}

impl Default for MaParams {
    fn default() -> Self {
        MaParams {
            short_window: 12,
            long_window: 26,
        }
    }
}

//complete run configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StrategyConfig {
    //data
    pub data_path: PathBuf,

    //inclusive trading date range, open ends are unbounded
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,

    //contract specification
    pub contract: ContractConfig,

    //strategy
    pub ma: MaParams,
    pub initial_capital: f64,
    pub sizing: SizingMode,
    pub death_cross_action: DeathCrossAction,

    //conditions
    pub condition: ConditionKind,
    pub extra_conditions: Vec<ConditionKind>,
    pub condition_retention: Option<usize>,
    //csv holding column conditions, defaults to the data file
    pub condition_path: Option<PathBuf>,

    //bars kept for the moving averages, defaults to long window + 2
    pub window: Option<usize>,
    pub report_every: usize,

    //optional output path
    pub output_csv: Option<PathBuf>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            data_path: PathBuf::from("data.csv"),
            start: None,
            end: None,
            contract: ContractConfig {
                symbol: "DCE.m2401".to_string(),
                multiplier: 10.0,
            },
            ma: MaParams::default(),
            initial_capital: 1_000_000.0,
            sizing: SizingMode::EquityFraction { ratio: 0.2 },
            death_cross_action: DeathCrossAction::Reverse,
            condition: ConditionKind::GoldenCross,
            extra_conditions: Vec::new(),
            condition_retention: None,
            condition_path: None,
            window: None,
            report_every: 50,
            output_csv: None,
        }
    }
}

impl StrategyConfig {
    //load configuration from a JSON file
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .context(format!("Failed to read config file {:?}", path))?;
        let config: StrategyConfig = serde_json::from_str(&contents)
            .context(format!("Failed to parse config file {:?}", path))?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).context(format!("Failed to write config file {:?}", path))?;
        Ok(())
    }

    pub fn build_strategy(&self) -> Result<DualMaStrategy, StrategyError> {
        DualMaStrategy::new(
            self.ma.short_window,
            self.ma.long_window,
            self.sizing,
            self.death_cross_action,
        )
    }

    //column conditions are left unresolved, see load_condition_columns
    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            window: self.window.unwrap_or(self.ma.long_window + 2),
            primary: self.condition.clone(),
            extra: self.extra_conditions.clone(),
            report_every: self.report_every,
            condition_retention: self.condition_retention,
            columns: HashMap::new(),
        }
    }

    //loads every boolean column named by the primary or extra conditions
    pub fn load_condition_columns(&self) -> anyhow::Result<HashMap<String, ConditionSeries>> {
        let path = self.condition_path.as_ref().unwrap_or(&self.data_path);
        let mut columns = HashMap::new();

        for kind in std::iter::once(&self.condition).chain(&self.extra_conditions) {
            if let Some(name) = kind.column() {
                if columns.contains_key(name) {
                    continue;
                }
                let symbol = Some(self.contract.symbol.as_str());
                let series = load_condition_column(path, name, symbol)
                    .context(format!("Failed to load condition column '{}'", name))?;
                columns.insert(name.to_string(), series);
            }
        }

        Ok(columns)
    }

    pub fn date_range_is_valid(&self) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= end,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip_through_file() {
        let config = StrategyConfig {
            extra_conditions: vec![ConditionKind::DeathCross, ConditionKind::CloseEquals(3748.0)],
            sizing: SizingMode::Fixed { lots: 1 },
            ..StrategyConfig::default()
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        config.to_json_file(&path).unwrap();

        assert_eq!(StrategyConfig::from_json_file(&path).unwrap(), config);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: StrategyConfig = serde_json::from_str(
            r#"{
                "contract": { "symbol": "SHFE.cu1902", "multiplier": 5.0 },
                "ma": { "short_window": 5, "long_window": 20 },
                "sizing": { "mode": "fixed", "lots": 1 },
                "death_cross_action": "flatten"
            }"#,
        )
        .unwrap();

        assert_eq!(config.contract.symbol, "SHFE.cu1902");
        assert_eq!(config.initial_capital, 1_000_000.0);
        assert_eq!(config.condition, ConditionKind::GoldenCross);
        assert_eq!(config.death_cross_action, DeathCrossAction::Flatten);
        assert_eq!(config.runner_config().window, 22);
        assert!(config.build_strategy().is_ok());
        assert_eq!(config.contract.to_futures_contract().unwrap().exchange, "SHFE");
    }

    #[test]
    fn date_range_from_json() {
        let config: StrategyConfig =
            serde_json::from_str(r#"{ "start": "2023-01-01", "end": "2023-12-31" }"#).unwrap();

        assert_eq!(config.start, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(config.end, NaiveDate::from_ymd_opt(2023, 12, 31));
        assert!(config.date_range_is_valid());

        let reversed = StrategyConfig {
            start: config.end,
            end: config.start,
            ..StrategyConfig::default()
        };
        assert!(!reversed.date_range_is_valid());
        assert!(StrategyConfig::default().date_range_is_valid());
    }

    #[test]
    fn loads_columns_named_by_conditions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(
            &path,
            "timestamp,close,symbol,signal\n\
             2023-01-03,3748,DCE.m2401,true\n\
             2023-01-03,68000,SHFE.cu1902,false\n",
        )
        .unwrap();

        let config = StrategyConfig {
            data_path: path,
            condition: ConditionKind::Column("signal".to_string()),
            extra_conditions: vec![
                ConditionKind::GoldenCross,
                ConditionKind::Column("signal".to_string()),
            ],
            ..StrategyConfig::default()
        };

        let columns = config.load_condition_columns().unwrap();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns["signal"].values(), vec![true]);

        let missing = StrategyConfig {
            extra_conditions: vec![ConditionKind::Column("volume_spike".to_string())],
            ..config
        };
        assert!(missing.load_condition_columns().is_err());
    }

    #[test]
    fn invalid_windows_fail_to_build() {
        let config = StrategyConfig {
            ma: MaParams {
                short_window: 26,
                long_window: 12,
            },
            ..StrategyConfig::default()
        };
        assert!(config.build_strategy().is_err());
    }
}

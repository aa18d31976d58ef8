pub mod condition;
pub mod crossover;
pub mod dual_ma;
pub mod sizing;

use crate::data::BarHistory;
use crate::instrument::FuturesContract;
use crossover::{CrossoverEvaluator, Evaluation};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyError {
    #[error("Strategy received invalid parameters: {0}")]
    InvalidParameters(String),
}

//strategy interface, called once per new bar
pub trait Strategy {
    //decides on a target position for the latest bar in the window
    fn on_bar(&mut self, context: &StrategyContext) -> Decision;

    //returns the strategy name
    fn name(&self) -> &str;

    //moving average windows the strategy trades on
    fn evaluator(&self) -> &CrossoverEvaluator;
}

//read-only view handed to a strategy for one bar
pub struct StrategyContext<'a> {
    //trailing window of bars, latest last
    pub history: &'a BarHistory,

    //account equity at the time of the bar
    pub equity: f64,

    pub contract: &'a FuturesContract,
}

impl<'a> StrategyContext<'a> {
    pub fn new(history: &'a BarHistory, equity: f64, contract: &'a FuturesContract) -> Self {
        StrategyContext {
            history,
            equity,
            contract,
        }
    }

    //close prices of the window
    pub fn closes(&self) -> Vec<f64> {
        self.history.closes()
    }

    //close of the latest bar
    pub fn last_close(&self) -> Option<f64> {
        self.history.last_bar().map(|b| b.close)
    }
}

//a directional change requested from the order collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    OpenLong { lots: i64 },
    OpenShort { lots: i64 },
    Flatten,
}

impl TradeAction {
    //signed target position in lots
    pub fn target(&self) -> i64 {
        match *self {
            TradeAction::OpenLong { lots } => lots,
            TradeAction::OpenShort { lots } => -lots,
            TradeAction::Flatten => 0,
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::OpenLong { lots } => write!(f, "open long {} lots", lots),
            TradeAction::OpenShort { lots } => write!(f, "open short {} lots", lots),
            TradeAction::Flatten => write!(f, "flatten"),
        }
    }
}

//outcome of evaluating one bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub evaluation: Evaluation,
    //lot count a signal on this bar would trade
    pub lots: i64,
    pub action: Option<TradeAction>,
}

use crate::data::BarHistory;
use crate::indicator::{BarslastEngine, ConditionError, ConditionSeries};
use crate::report::{BarRecord, SummaryMetrics};
use crate::session::{SessionError, SessionGuard, TradingSession};
use crate::strategy::condition::ConditionKind;
use crate::strategy::crossover::CrossoverEvaluator;
use crate::strategy::{Strategy, StrategyContext};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Condition(#[from] ConditionError),
}

//result of a run
#[derive(Debug, Clone)]
pub struct RunResult {
    pub summary: SummaryMetrics,
    pub records: Vec<BarRecord>,
}

//configuration for the evaluation loop
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    //bars kept for the moving averages
    pub window: usize,
    //condition reported in the barslast column
    pub primary: ConditionKind,
    //further conditions tracked alongside the primary one
    pub extra: Vec<ConditionKind>,
    //log all condition distances every n bars, 0 disables
    pub report_every: usize,
    //cap on retained condition history, None keeps everything
    pub condition_retention: Option<usize>,
    //loaded boolean columns backing column conditions, keyed by column name
    pub columns: HashMap<String, ConditionSeries>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            window: 28,
            primary: ConditionKind::GoldenCross,
            extra: Vec::new(),
            report_every: 50,
            condition_retention: None,
            columns: HashMap::new(),
        }
    }
}

struct TrackedCondition {
    kind: ConditionKind,
    column: Option<ConditionSeries>,
    engine: BarslastEngine,
}

impl TrackedCondition {
    fn new(
        kind: ConditionKind,
        retention: Option<usize>,
        columns: &HashMap<String, ConditionSeries>,
    ) -> Result<Self, ConditionError> {
        let column = match kind.column() {
            Some(name) => Some(
                columns
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ConditionError::MissingColumn(name.to_string()))?,
            ),
            None => None,
        };

        let engine = match retention {
            Some(n) => BarslastEngine::with_retention(n),
            None => BarslastEngine::new(),
        };

        Ok(TrackedCondition {
            kind,
            column,
            engine,
        })
    }

    //a timestamp missing from a column counts as false
    fn value(
        &self,
        timestamp: &DateTime<Utc>,
        closes: &[f64],
        evaluator: &CrossoverEvaluator,
    ) -> bool {
        match &self.column {
            Some(column) => column.get(timestamp).unwrap_or(false),
            None => self.kind.evaluate(closes, evaluator),
        }
    }
}

//drives a strategy over the bars of a trading session, one bar at a time
pub struct StrategyRunner {
    strategy: Box<dyn Strategy>,
    evaluator: CrossoverEvaluator,
    history: BarHistory,
    primary: TrackedCondition,
    extra: Vec<TrackedCondition>,
    report_every: usize,
}

impl StrategyRunner {
    //conditions share the moving average windows the strategy trades on
    pub fn new(strategy: Box<dyn Strategy>, config: RunnerConfig) -> Result<Self, RunError> {
        let evaluator = *strategy.evaluator();

        //the window must hold enough bars for the previous long average
        let window = config.window.max(evaluator.required_bars());
        let retention = config.condition_retention;

        let primary = TrackedCondition::new(config.primary, retention, &config.columns)?;
        let extra = config
            .extra
            .into_iter()
            .map(|kind| TrackedCondition::new(kind, retention, &config.columns))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(StrategyRunner {
            strategy,
            evaluator,
            history: BarHistory::new(window),
            primary,
            extra,
            report_every: config.report_every,
        })
    }

    //names of the extra conditions, in report column order
    pub fn extra_names(&self) -> Vec<String> {
        self.extra.iter().map(|c| c.kind.name()).collect()
    }

    //processes bars until the feed signals the end of the data
    //any session error stops the loop, the guard still releases the session
    pub fn run<T: TradingSession>(
        &mut self,
        guard: &mut SessionGuard<T>,
    ) -> Result<RunResult, RunError> {
        let symbol = guard.contract().symbol.clone();
        let mut records = Vec::new();
        let mut stream = guard.bars();

        while let Some(next) = stream.next() {
            let bar = next?;
            let session = stream.session();

            if let Err(e) = self.history.push(bar.clone()) {
                tracing::warn!(error = %e, "skipping bar");
                continue;
            }

            let equity = session.account().equity;
            let decision = {
                let context = StrategyContext::new(&self.history, equity, session.contract());
                self.strategy.on_bar(&context)
            };

            let closes = self.history.closes();
            let condition = self.primary.value(&bar.timestamp, &closes, &self.evaluator);
            let barslast = self.primary.engine.update(bar.timestamp, condition)?;

            let mut extra_barslast = Vec::with_capacity(self.extra.len());
            for tracked in &mut self.extra {
                let value = tracked.value(&bar.timestamp, &closes, &self.evaluator);
                extra_barslast.push(tracked.engine.update(bar.timestamp, value)?);
            }

            if let Some(action) = decision.action {
                session.set_target_position(action.target())?;
            }

            let record = BarRecord {
                timestamp: bar.timestamp,
                price: bar.close,
                balance: equity,
                position: decision.lots,
                cross: decision.evaluation.cross(),
                condition,
                barslast,
                extra_barslast,
                trade: decision.action,
            };

            tracing::info!(
                time = %record.timestamp,
                price = record.price,
                balance = record.balance,
                lots = record.position,
                barslast = record.barslast,
                trade = %record.trade_description(),
                "bar"
            );

            records.push(record);

            if self.report_every > 0 && records.len() % self.report_every == 0 {
                self.log_conditions(records.len());
            }
        }

        guard.close();

        let summary = SummaryMetrics::from_records(
            &symbol,
            self.strategy.name(),
            &self.primary.kind.name(),
            &records,
        );

        Ok(RunResult { summary, records })
    }

    fn log_conditions(&self, bar_count: usize) {
        for tracked in std::iter::once(&self.primary).chain(&self.extra) {
            tracing::info!(
                bar_count,
                condition = %tracked.kind,
                barslast = tracked.engine.current().unwrap_or(crate::indicator::NOT_FOUND),
                "condition distance"
            );
        }
    }
}

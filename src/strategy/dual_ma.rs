use crate::strategy::crossover::{Cross, CrossoverEvaluator};
use crate::strategy::sizing::{DeathCrossAction, SizingMode};
use crate::strategy::{Decision, Strategy, StrategyContext, StrategyError, TradeAction};

//dual moving average strategy
//golden cross goes long, death cross flattens or reverses to short
#[derive(Debug, Clone)]
pub struct DualMaStrategy {
    evaluator: CrossoverEvaluator,
    sizing: SizingMode,
    death_action: DeathCrossAction,
}

impl DualMaStrategy {
    pub fn new(
        short_window: usize,
        long_window: usize,
        sizing: SizingMode,
        death_action: DeathCrossAction,
    ) -> Result<Self, StrategyError> {
        if let SizingMode::EquityFraction { ratio } = sizing {
            if !(ratio > 0.0 && ratio <= 1.0) {
                return Err(StrategyError::InvalidParameters(format!(
                    "invest ratio must be in (0, 1], got {}",
                    ratio
                )));
            }
        }

        Ok(DualMaStrategy {
            evaluator: CrossoverEvaluator::new(short_window, long_window)?,
            sizing,
            death_action,
        })
    }

    fn action_for(&self, cross: Cross, lots: i64) -> Option<TradeAction> {
        match cross {
            Cross::Golden => Some(TradeAction::OpenLong { lots }),
            Cross::Death => match self.death_action {
                DeathCrossAction::Flatten => Some(TradeAction::Flatten),
                DeathCrossAction::Reverse => Some(TradeAction::OpenShort { lots }),
            },
            Cross::NoCross => None,
        }
    }
}

impl Strategy for DualMaStrategy {
    fn on_bar(&mut self, context: &StrategyContext) -> Decision {
        let closes = context.closes();
        let evaluation = self.evaluator.evaluate(&closes);

        let lots = context
            .last_close()
            .map(|price| self.sizing.lots(context.equity, price, context.contract))
            .unwrap_or(0);

        let action = evaluation
            .cross()
            .and_then(|cross| self.action_for(cross, lots));

        Decision {
            evaluation,
            lots,
            action,
        }
    }

    fn name(&self) -> &str {
        "Dual MA Crossover"
    }

    fn evaluator(&self) -> &CrossoverEvaluator {
        &self.evaluator
    }
}

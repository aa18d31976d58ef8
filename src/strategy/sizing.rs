use crate::instrument::FuturesContract;
use serde::{Deserialize, Serialize};

//how many lots a crossing signal trades
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SizingMode {
    //invest a fraction of current equity, rounded down to whole lots
    EquityFraction { ratio: f64 },
    Fixed { lots: u32 },
}

impl Default for SizingMode {
    fn default() -> Self {
        SizingMode::EquityFraction { ratio: 0.2 }
    }
}

impl SizingMode {
    //lot count for the given equity and price, never negative
    pub fn lots(&self, equity: f64, price: f64, contract: &FuturesContract) -> i64 {
        match *self {
            SizingMode::Fixed { lots } => lots as i64,
            SizingMode::EquityFraction { ratio } => {
                let lot_value = contract.notional_value(price, 1);
                let positive = |x: f64| x > 0.0;
                if !(positive(lot_value) && positive(equity) && positive(ratio)) {
                    return 0;
                }
                (equity * ratio / lot_value).floor() as i64
            }
        }
    }
}

//what a death cross does to the position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCrossAction {
    //close the long, target 0
    Flatten,
    //go short the same size a golden cross would buy
    #[default]
    Reverse,
}

impl DeathCrossAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "flatten" | "flat" | "close" => Some(DeathCrossAction::Flatten),
            "reverse" | "short" => Some(DeathCrossAction::Reverse),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equity_fraction_rounds_down() {
        let contract = FuturesContract::dce_soybean_meal("m2401");
        let sizing = SizingMode::default();

        //1_000_000 * 0.2 / (3748 * 10) = 5.33
        assert_eq!(sizing.lots(1_000_000.0, 3748.0, &contract), 5);
        assert_eq!(sizing.lots(1_000_000.0, 12.0, &contract), 1666);
    }

    #[test]
    fn degenerate_inputs_size_to_zero() {
        let contract = FuturesContract::dce_soybean_meal("m2401");
        let sizing = SizingMode::EquityFraction { ratio: 0.2 };

        assert_eq!(sizing.lots(1_000_000.0, 0.0, &contract), 0);
        assert_eq!(sizing.lots(-5.0, 3748.0, &contract), 0);
        assert_eq!(sizing.lots(f64::NAN, 3748.0, &contract), 0);
    }

    #[test]
    fn fixed_ignores_equity() {
        let contract = FuturesContract::shfe_copper("cu1902");
        assert_eq!(SizingMode::Fixed { lots: 1 }.lots(0.0, 68000.0, &contract), 1);
    }

    #[test]
    fn parses_death_cross_action() {
        assert_eq!(DeathCrossAction::parse("FLAT"), Some(DeathCrossAction::Flatten));
        assert_eq!(DeathCrossAction::parse("short"), Some(DeathCrossAction::Reverse));
        assert_eq!(DeathCrossAction::parse("hold"), None);
    }
}

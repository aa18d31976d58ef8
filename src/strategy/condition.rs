use crate::indicator::{latest_moving_average, moving_average, ConditionError};
use crate::strategy::crossover::{Cross, CrossoverEvaluator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

//boolean conditions fed into barslast
//values that cannot be computed yet count as false
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    GoldenCross,
    DeathCross,
    CloseAboveLong,
    ShortAboveLong,
    CloseEquals(f64),
    //precomputed boolean column, aligned to bars by timestamp
    Column(String),
}

impl ConditionKind {
    //column-friendly name
    pub fn name(&self) -> String {
        match self {
            ConditionKind::GoldenCross => "golden_cross".to_string(),
            ConditionKind::DeathCross => "death_cross".to_string(),
            ConditionKind::CloseAboveLong => "close_above_long".to_string(),
            ConditionKind::ShortAboveLong => "short_above_long".to_string(),
            ConditionKind::CloseEquals(price) => format!("close_eq_{}", price),
            ConditionKind::Column(column) => column.clone(),
        }
    }

    //name of the loaded column backing this condition, if any
    pub fn column(&self) -> Option<&str> {
        match self {
            ConditionKind::Column(column) => Some(column),
            _ => None,
        }
    }

    //condition at the last close of the window
    //column conditions have no price rule and are looked up by timestamp instead
    pub fn evaluate(&self, closes: &[f64], evaluator: &CrossoverEvaluator) -> bool {
        let short = evaluator.short_window();
        let long = evaluator.long_window();

        match self {
            ConditionKind::GoldenCross => evaluator.evaluate(closes).cross() == Some(Cross::Golden),
            ConditionKind::DeathCross => evaluator.evaluate(closes).cross() == Some(Cross::Death),
            ConditionKind::CloseAboveLong => {
                match (closes.last(), latest_moving_average(closes, long)) {
                    (Some(&close), Some(long_ma)) => close > long_ma,
                    _ => false,
                }
            }
            ConditionKind::ShortAboveLong => match (
                latest_moving_average(closes, short),
                latest_moving_average(closes, long),
            ) {
                (Some(short_ma), Some(long_ma)) => short_ma > long_ma,
                _ => false,
            },
            ConditionKind::CloseEquals(price) => closes.last() == Some(price),
            ConditionKind::Column(_) => false,
        }
    }

    //condition at every index of a close series
    pub fn series(&self, closes: &[f64], evaluator: &CrossoverEvaluator) -> Vec<bool> {
        let averages = |window: usize| {
            moving_average(closes, window).unwrap_or_else(|_| vec![None; closes.len()])
        };

        match self {
            ConditionKind::GoldenCross => evaluator
                .cross_series(closes)
                .into_iter()
                .map(|c| c == Some(Cross::Golden))
                .collect(),
            ConditionKind::DeathCross => evaluator
                .cross_series(closes)
                .into_iter()
                .map(|c| c == Some(Cross::Death))
                .collect(),
            ConditionKind::CloseAboveLong => closes
                .iter()
                .zip(averages(evaluator.long_window()))
                .map(|(&close, long_ma)| long_ma.is_some_and(|l| close > l))
                .collect(),
            ConditionKind::ShortAboveLong => averages(evaluator.short_window())
                .into_iter()
                .zip(averages(evaluator.long_window()))
                .map(|pair| matches!(pair, (Some(s), Some(l)) if s > l))
                .collect(),
            ConditionKind::CloseEquals(price) => closes.iter().map(|c| c == price).collect(),
            ConditionKind::Column(_) => vec![false; closes.len()],
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionKind::CloseEquals(price) => write!(f, "close_eq:{}", price),
            ConditionKind::Column(column) => write!(f, "column:{}", column),
            other => write!(f, "{}", other.name()),
        }
    }
}

impl FromStr for ConditionKind {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let unknown = || ConditionError::UnknownCondition(s.to_string());
        let price = |raw: &str| {
            raw.trim()
                .parse::<f64>()
                .map(ConditionKind::CloseEquals)
                .map_err(|_| unknown())
        };

        //parameterised forms, column names keep their case
        if let Some((prefix, arg)) = trimmed.split_once(':') {
            return match prefix.to_lowercase().as_str() {
                "close_eq" => price(arg),
                "column" if !arg.trim().is_empty() => {
                    Ok(ConditionKind::Column(arg.trim().to_string()))
                }
                _ => Err(unknown()),
            };
        }

        let lowered = trimmed.to_lowercase();
        if let Some(raw) = lowered.strip_prefix("close_eq_") {
            return price(raw);
        }

        match lowered.as_str() {
            "golden" | "golden_cross" => Ok(ConditionKind::GoldenCross),
            "death" | "death_cross" => Ok(ConditionKind::DeathCross),
            "close_above_long" => Ok(ConditionKind::CloseAboveLong),
            "short_above_long" => Ok(ConditionKind::ShortAboveLong),
            _ => Err(unknown()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluator() -> CrossoverEvaluator {
        CrossoverEvaluator::new(2, 4).unwrap()
    }

    fn closes() -> Vec<f64> {
        vec![
            10.0, 10.0, 10.0, 10.0, 10.0, 12.0, 14.0, 13.0, 11.0, 9.0, 8.0, 9.0, 12.0, 12.0,
        ]
    }

    #[test]
    fn parses_names() {
        assert_eq!("golden".parse::<ConditionKind>(), Ok(ConditionKind::GoldenCross));
        assert_eq!("DEATH_CROSS".parse::<ConditionKind>(), Ok(ConditionKind::DeathCross));
        assert_eq!(
            "close_eq:3748".parse::<ConditionKind>(),
            Ok(ConditionKind::CloseEquals(3748.0))
        );
        assert!(matches!(
            "close_eq:abc".parse::<ConditionKind>(),
            Err(ConditionError::UnknownCondition(_))
        ));
        assert!("volume_spike".parse::<ConditionKind>().is_err());
        assert_eq!(
            "column:MySignal".parse::<ConditionKind>(),
            Ok(ConditionKind::Column("MySignal".to_string()))
        );
        assert!("column:".parse::<ConditionKind>().is_err());
    }

    #[test]
    fn display_parses_back() {
        let kinds = [
            ConditionKind::GoldenCross,
            ConditionKind::DeathCross,
            ConditionKind::CloseAboveLong,
            ConditionKind::ShortAboveLong,
            ConditionKind::CloseEquals(3748.0),
            ConditionKind::CloseEquals(3748.5),
            ConditionKind::Column("signal".to_string()),
        ];

        for kind in kinds {
            assert_eq!(kind.to_string().parse::<ConditionKind>(), Ok(kind.clone()));
        }

        //report column names of price conditions parse too
        assert_eq!(
            ConditionKind::CloseEquals(3748.0).name().parse::<ConditionKind>(),
            Ok(ConditionKind::CloseEquals(3748.0))
        );
        assert_eq!(ConditionKind::CloseEquals(3748.0).to_string(), "close_eq:3748");
    }

    #[test]
    fn column_conditions_have_no_price_rule() {
        let kind = ConditionKind::Column("signal".to_string());
        assert_eq!(kind.column(), Some("signal"));
        assert_eq!(kind.name(), "signal");
        assert!(!kind.evaluate(&[10.0, 12.0], &evaluator()));
        assert_eq!(kind.series(&[10.0, 12.0], &evaluator()), vec![false, false]);
        assert_eq!(ConditionKind::GoldenCross.column(), None);
    }

    #[test]
    fn series_agrees_with_latest_evaluation() {
        let closes = closes();
        let kinds = [
            ConditionKind::GoldenCross,
            ConditionKind::DeathCross,
            ConditionKind::CloseAboveLong,
            ConditionKind::ShortAboveLong,
            ConditionKind::CloseEquals(12.0),
        ];

        for kind in &kinds {
            let series = kind.series(&closes, &evaluator());
            assert_eq!(series.len(), closes.len());
            for i in 0..closes.len() {
                assert_eq!(
                    series[i],
                    kind.evaluate(&closes[..=i], &evaluator()),
                    "{} at {}",
                    kind,
                    i
                );
            }
        }
    }

    #[test]
    fn not_ready_values_are_false() {
        let closes = [10.0, 12.0];
        assert!(!ConditionKind::CloseAboveLong.evaluate(&closes, &evaluator()));
        assert!(!ConditionKind::GoldenCross.evaluate(&closes, &evaluator()));
        assert!(ConditionKind::CloseEquals(12.0).evaluate(&closes, &evaluator()));
    }

    #[test]
    fn golden_and_death_never_both_true() {
        let closes = closes();
        let golden = ConditionKind::GoldenCross.series(&closes, &evaluator());
        let death = ConditionKind::DeathCross.series(&closes, &evaluator());

        assert!(golden.iter().any(|&g| g));
        assert!(death.iter().any(|&d| d));
        assert!(golden.iter().zip(&death).all(|(&g, &d)| !(g && d)));
    }
}

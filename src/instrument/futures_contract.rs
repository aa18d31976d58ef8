use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("Contract multiplier for {symbol} must be positive, got {multiplier}")]
    InvalidMultiplier { symbol: String, multiplier: f64 },
    #[error("Empty contract symbol")]
    EmptySymbol,
}

//represents a futures contract specification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FuturesContract {
    //full symbol (eg DCE.m2401, SHFE.cu1902)
    pub symbol: String,

    //exchange prefix of the symbol, empty when the symbol has none
    pub exchange: String,

    //instrument code after the exchange prefix (eg m2401)
    pub code: String,

    //contract multiplier (units of the underlying per lot)
    pub multiplier: f64,
}

impl FuturesContract {
    //creates a contract from an EXCHANGE.code symbol and its multiplier
    pub fn new(symbol: &str, multiplier: f64) -> Result<Self, ContractError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(ContractError::EmptySymbol);
        }
        if multiplier.is_nan() || multiplier <= 0.0 {
            return Err(ContractError::InvalidMultiplier {
                symbol: symbol.to_string(),
                multiplier,
            });
        }

        let (exchange, code) = match symbol.split_once('.') {
            Some((exchange, code)) => (exchange.to_string(), code.to_string()),
            None => (String::new(), symbol.to_string()),
        };

        Ok(FuturesContract {
            symbol: symbol.to_string(),
            exchange,
            code,
            multiplier,
        })
    }

    //calculates the notional value of a position
    pub fn notional_value(&self, price: f64, quantity: i64) -> f64 {
        price * self.multiplier * quantity.unsigned_abs() as f64
    }

    //helper for dalian soybean meal (10 tonnes per lot)
    pub fn dce_soybean_meal(code: &str) -> Self {
        FuturesContract {
            symbol: format!("DCE.{}", code),
            exchange: "DCE".to_string(),
            code: code.to_string(),
            multiplier: 10.0,
        }
    }

    //helper for shanghai copper (5 tonnes per lot)
    pub fn shfe_copper(code: &str) -> Self {
        FuturesContract {
            symbol: format!("SHFE.{}", code),
            exchange: "SHFE".to_string(),
            code: code.to_string(),
            multiplier: 5.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_exchange_prefix() {
        let contract = FuturesContract::new("DCE.m2401", 10.0).unwrap();
        assert_eq!(contract.exchange, "DCE");
        assert_eq!(contract.code, "m2401");
        assert_eq!(contract, FuturesContract::dce_soybean_meal("m2401"));

        let bare = FuturesContract::new("cu1902", 5.0).unwrap();
        assert_eq!(bare.exchange, "");
        assert_eq!(bare.code, "cu1902");
    }

    #[test]
    fn rejects_missing_multiplier() {
        assert!(matches!(
            FuturesContract::new("SHFE.cu1902", 0.0),
            Err(ContractError::InvalidMultiplier { .. })
        ));
        assert_eq!(FuturesContract::new("  ", 5.0), Err(ContractError::EmptySymbol));
    }

    #[test]
    fn notional_ignores_direction() {
        let contract = FuturesContract::shfe_copper("cu1902");
        assert_eq!(contract.notional_value(68000.0, -2), 680000.0);
    }
}

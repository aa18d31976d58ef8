use crate::data::Bar;
use crate::instrument::FuturesContract;
use crate::session::{AccountSnapshot, FeedEvent, SessionError, TradingSession};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//a target position request as received by the replay session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetOrder {
    pub timestamp: DateTime<Utc>,
    pub lots: i64,
}

//replays recorded bars and logs target positions
//equity stays at its starting value, fills are not simulated
pub struct ReplaySession {
    bars: std::vec::IntoIter<Bar>,
    contract: FuturesContract,
    equity: f64,
    orders: Vec<TargetOrder>,
    current_target: i64,
    last_timestamp: Option<DateTime<Utc>>,
    closed: bool,
}

impl ReplaySession {
    pub fn new(bars: Vec<Bar>, contract: FuturesContract, equity: f64) -> Self {
        ReplaySession {
            bars: bars.into_iter(),
            contract,
            equity,
            orders: Vec::new(),
            current_target: 0,
            last_timestamp: None,
            closed: false,
        }
    }

    //every target position requested so far
    pub fn orders(&self) -> &[TargetOrder] {
        &self.orders
    }

    pub fn current_target(&self) -> i64 {
        self.current_target
    }
}

impl TradingSession for ReplaySession {
    fn next_event(&mut self) -> Result<FeedEvent, SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }

        match self.bars.next() {
            Some(bar) => {
                self.last_timestamp = Some(bar.timestamp);
                Ok(FeedEvent::Bar(bar))
            }
            None => Ok(FeedEvent::End),
        }
    }

    fn account(&self) -> AccountSnapshot {
        AccountSnapshot {
            equity: self.equity,
        }
    }

    fn contract(&self) -> &FuturesContract {
        &self.contract
    }

    fn set_target_position(&mut self, lots: i64) -> Result<(), SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        let timestamp = self
            .last_timestamp
            .ok_or_else(|| SessionError::Order("no bar has been delivered yet".to_string()))?;

        tracing::debug!(%timestamp, lots, previous = self.current_target, "target position");
        self.orders.push(TargetOrder { timestamp, lots });
        self.current_target = lots;
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session() -> ReplaySession {
        let ts = Utc.with_ymd_and_hms(2023, 1, 3, 0, 0, 0).unwrap();
        let bar = Bar::from_close(ts, 3748.0, "DCE.m2401").unwrap();
        ReplaySession::new(vec![bar], FuturesContract::dce_soybean_meal("m2401"), 1_000_000.0)
    }

    #[test]
    fn records_targets_against_last_bar() {
        let mut session = session();
        assert!(matches!(
            session.set_target_position(5),
            Err(SessionError::Order(_))
        ));

        let bar = match session.next_event().unwrap() {
            FeedEvent::Bar(bar) => bar,
            FeedEvent::End => panic!("expected a bar"),
        };
        session.set_target_position(5).unwrap();
        session.set_target_position(-5).unwrap();

        assert_eq!(session.current_target(), -5);
        assert_eq!(session.orders().len(), 2);
        assert_eq!(session.orders()[0].timestamp, bar.timestamp);
        assert_eq!(session.next_event(), Ok(FeedEvent::End));
    }

    #[test]
    fn equity_is_fixed() {
        let mut session = session();
        let _ = session.next_event();
        session.set_target_position(5).unwrap();
        assert_eq!(session.account().equity, 1_000_000.0);
    }

    #[test]
    fn closed_session_rejects_everything() {
        let mut session = session();
        session.close();
        assert_eq!(session.next_event(), Err(SessionError::Closed));
        assert_eq!(session.set_target_position(1), Err(SessionError::Closed));
    }
}

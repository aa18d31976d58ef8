pub mod replay;

use crate::data::Bar;
use crate::instrument::FuturesContract;
use std::ops::{Deref, DerefMut};
use thiserror::Error;

pub use replay::{ReplaySession, TargetOrder};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Session is closed")]
    Closed,
    #[error("Market data feed error: {0}")]
    Feed(String),
    #[error("Order rejected: {0}")]
    Order(String),
}

//one notification from the market data feed
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Bar(Bar),
    //no more data, the feed is exhausted
    End,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountSnapshot {
    pub equity: f64,
}

//external trading platform: delivers bars, reports the account, accepts target positions
pub trait TradingSession {
    //blocks until the next bar or the end of the data
    fn next_event(&mut self) -> Result<FeedEvent, SessionError>;

    fn account(&self) -> AccountSnapshot;

    fn contract(&self) -> &FuturesContract;

    //requests a signed target position in lots
    fn set_target_position(&mut self, lots: i64) -> Result<(), SessionError>;

    //releases the session, must be safe to call more than once
    fn close(&mut self);

    fn is_closed(&self) -> bool;
}

//owns an open session and closes it on every exit path
pub struct SessionGuard<S: TradingSession> {
    session: S,
}

impl<S: TradingSession> SessionGuard<S> {
    pub fn open(session: S) -> Self {
        tracing::info!(symbol = %session.contract().symbol, "session opened");
        SessionGuard { session }
    }

    //bars in delivery order, ends at the end-of-data event
    pub fn bars(&mut self) -> BarStream<'_, S> {
        BarStream {
            session: &mut self.session,
            finished: false,
        }
    }

    pub fn close(&mut self) {
        if !self.session.is_closed() {
            self.session.close();
            tracing::info!("session closed");
        }
    }
}

impl<S: TradingSession> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: TradingSession> DerefMut for SessionGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: TradingSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        self.close();
    }
}

//iterator over new-bar events of a session
//yields the feed error once and then stops
pub struct BarStream<'a, S: TradingSession> {
    session: &'a mut S,
    finished: bool,
}

impl<'a, S: TradingSession> BarStream<'a, S> {
    //the underlying session, for account queries and orders between bars
    pub fn session(&mut self) -> &mut S {
        self.session
    }
}

impl<'a, S: TradingSession> Iterator for BarStream<'a, S> {
    type Item = Result<Bar, SessionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.session.next_event() {
            Ok(FeedEvent::Bar(bar)) => Some(Ok(bar)),
            Ok(FeedEvent::End) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use std::cell::Cell;
    use std::rc::Rc;

    fn bars(n: usize) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| Bar::from_close(start + Duration::days(i as i64), 100.0, "DCE.m2401").unwrap())
            .collect()
    }

    fn replay(n: usize) -> ReplaySession {
        ReplaySession::new(bars(n), FuturesContract::dce_soybean_meal("m2401"), 1_000_000.0)
    }

    #[test]
    fn stream_stops_at_end_of_data() {
        let mut guard = SessionGuard::open(replay(3));
        let delivered: Vec<Bar> = guard.bars().collect::<Result<_, _>>().unwrap();

        assert_eq!(delivered.len(), 3);
        //the end event is sticky
        assert_eq!(guard.next_event(), Ok(FeedEvent::End));
    }

    //records close calls through a shared flag so drop can be observed
    struct ProbeSession {
        contract: FuturesContract,
        closes: Rc<Cell<usize>>,
    }

    impl TradingSession for ProbeSession {
        fn next_event(&mut self) -> Result<FeedEvent, SessionError> {
            Err(SessionError::Feed("connection lost".to_string()))
        }

        fn account(&self) -> AccountSnapshot {
            AccountSnapshot { equity: 0.0 }
        }

        fn contract(&self) -> &FuturesContract {
            &self.contract
        }

        fn set_target_position(&mut self, _lots: i64) -> Result<(), SessionError> {
            Ok(())
        }

        fn close(&mut self) {
            self.closes.set(self.closes.get() + 1);
        }

        fn is_closed(&self) -> bool {
            self.closes.get() > 0
        }
    }

    #[test]
    fn guard_closes_on_drop_after_feed_error() {
        let closes = Rc::new(Cell::new(0));
        {
            let mut guard = SessionGuard::open(ProbeSession {
                contract: FuturesContract::shfe_copper("cu1902"),
                closes: Rc::clone(&closes),
            });
            let first = guard.bars().next();
            assert!(matches!(first, Some(Err(SessionError::Feed(_)))));
        }
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn explicit_close_is_idempotent() {
        let mut guard = SessionGuard::open(replay(1));
        guard.close();
        assert!(guard.is_closed());
        assert_eq!(guard.next_event(), Err(SessionError::Closed));
        guard.close();
    }

    #[test]
    fn stream_yields_error_once() {
        let mut guard = SessionGuard::open(replay(2));
        guard.close();

        let mut stream = guard.bars();
        assert_eq!(stream.next(), Some(Err(SessionError::Closed)));
        assert_eq!(stream.next(), None);
    }
}

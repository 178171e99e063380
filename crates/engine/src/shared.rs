//! Shared session for hosts that drive and observe from different threads
//!
//! Every call takes the one session lock for its whole duration, so a step
//! and a snapshot never interleave.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::{BoardSnapshot, EngineConfig, EngineError};
use crate::session::{ClickOutcome, Session, Stats};
use crate::types::{EventBatch, Phase, Pos, SwapResult};

#[derive(Debug, Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<Session>>,
}

impl SharedSession {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Ok(Self::from_session(Session::new(config)?))
    }

    pub fn from_session(session: Session) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub fn advance(&self) -> EventBatch {
        self.inner.lock().advance()
    }

    pub fn attempt_swap(&self, from: Pos, to: Pos) -> SwapResult {
        self.inner.lock().attempt_swap(from, to)
    }

    pub fn click(&self, pos: Pos) -> ClickOutcome {
        self.inner.lock().click(pos)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.inner.lock().snapshot()
    }

    /// Refresh `out` without allocating a new snapshot
    pub fn snapshot_into(&self, out: &mut BoardSnapshot) {
        self.inner.lock().snapshot_into(out);
    }

    pub fn hint(&self) -> Option<(Pos, Pos)> {
        self.inner.lock().hint()
    }

    pub fn score(&self) -> u64 {
        self.inner.lock().score()
    }

    pub fn stats(&self) -> Stats {
        self.inner.lock().stats()
    }

    pub fn phase(&self) -> Phase {
        self.inner.lock().phase()
    }

    pub fn is_game_over(&self) -> bool {
        self.inner.lock().is_game_over()
    }

    pub fn reset(&self) {
        self.inner.lock().reset();
    }

    /// Run `f` with exclusive access to the session
    pub fn with<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        f(&mut *self.inner.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clones_share_one_session() {
        let shared = SharedSession::new(EngineConfig::default().with_seed(77)).unwrap();
        let other = shared.clone();

        let (from, to) = shared.hint().unwrap();
        assert!(other.attempt_swap(from, to).is_accepted());
        assert_eq!(shared.phase(), Phase::Matching);
    }

    #[test]
    fn test_driver_and_observer_threads() {
        let shared = SharedSession::new(EngineConfig::new(6, 6).with_seed(5)).unwrap();
        let (from, to) = shared.hint().unwrap();
        assert!(shared.attempt_swap(from, to).is_accepted());

        let driver = {
            let shared = shared.clone();
            thread::spawn(move || {
                let mut steps = 0;
                while shared.phase().is_resolving() && steps < 10_000 {
                    shared.advance();
                    steps += 1;
                }
            })
        };
        let observer = {
            let shared = shared.clone();
            thread::spawn(move || {
                let mut snap = BoardSnapshot::default();
                for _ in 0..100 {
                    shared.snapshot_into(&mut snap);
                    assert_eq!(snap.width, 6);
                    assert!(snap.pieces.len() <= 36);
                }
            })
        };

        driver.join().unwrap();
        observer.join().unwrap();
        assert!(!shared.phase().is_resolving());
        assert!(shared.score() >= 30);
    }
}

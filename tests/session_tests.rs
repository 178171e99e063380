//! Session tests - click flow, score bookkeeping and the shared wrapper

use std::thread;

use match3::core::{Engine, EngineConfig};
use match3::engine::{ClickOutcome, Session, SharedSession};
use match3::types::Color::{self, Blue as B, Green as G, Purple as P, Red as R, Yellow as Y};
use match3::types::{Phase, Pos, SwapResult};

fn session(rows: &[&[Color]]) -> Session {
    let rows: Vec<Vec<Color>> = rows.iter().map(|r| r.to_vec()).collect();
    let engine = Engine::from_layout(&rows, EngineConfig::default().with_seed(21)).unwrap();
    let mut session = Session::from_engine(engine);
    resolve(&mut session);
    session
}

fn resolve(session: &mut Session) {
    while session.phase().is_resolving() {
        session.advance();
    }
}

const HORIZONTAL: &[&[Color]] = &[&[G, Y, P, G], &[P, G, Y, P], &[R, R, G, R], &[Y, P, Y, G]];

#[test]
fn test_click_select_then_swap() {
    let mut s = session(HORIZONTAL);
    assert_eq!(s.click(Pos::new(3, 2)), ClickOutcome::Selected(Pos::new(3, 2)));
    assert_eq!(
        s.click(Pos::new(2, 2)),
        ClickOutcome::Swapped {
            from: Pos::new(3, 2),
            to: Pos::new(2, 2),
        }
    );

    resolve(&mut s);
    assert!(s.score() >= 30);
    assert_eq!(s.stats().moves, 1);
    assert!(s.stats().pieces_cleared >= 3);
    assert!(s.engine().selected().is_none());
}

#[test]
fn test_click_refused_neighbour_reselects() {
    let mut s = session(HORIZONTAL);
    s.click(Pos::new(0, 0));
    assert_eq!(
        s.click(Pos::new(1, 0)),
        ClickOutcome::Reselected {
            pos: Pos::new(1, 0),
            reason: SwapResult::RejectedNoMatch,
        }
    );
    assert_eq!(s.phase(), Phase::AwaitingSwap);
    assert_eq!(s.engine().selected(), Some(Pos::new(1, 0)));

    // Clicking the selection again is offered and refused as not adjacent.
    assert_eq!(
        s.click(Pos::new(1, 0)),
        ClickOutcome::Reselected {
            pos: Pos::new(1, 0),
            reason: SwapResult::RejectedNotAdjacent,
        }
    );
    assert_eq!(s.stats().moves, 0);
    assert_eq!(s.score(), 0);
}

#[test]
fn test_score_matches_event_sum_over_a_game() {
    let mut s = Session::new(EngineConfig::new(6, 6).with_seed(404)).unwrap();
    let mut from_events = 0u64;
    for _ in 0..10 {
        if s.is_game_over() {
            break;
        }
        let (from, to) = s.hint().unwrap();
        assert!(s.attempt_swap(from, to).is_accepted());
        while s.phase().is_resolving() {
            from_events += s.advance().score_delta() as u64;
        }
    }
    assert_eq!(s.score(), from_events);
    let stats = s.stats();
    assert!(stats.moves >= 1);
    assert!(stats.cascades >= stats.moves);
    assert!(stats.deepest_cascade >= 1);
}

#[test]
fn test_reset_zeroes_score() {
    let mut s = session(HORIZONTAL);
    s.attempt_swap(Pos::new(2, 2), Pos::new(3, 2));
    resolve(&mut s);
    assert!(s.score() > 0);

    s.reset();
    assert_eq!(s.score(), 0);
    assert_eq!(s.stats().moves, 0);
    assert_eq!(s.phase(), Phase::Idle);
}

#[test]
fn test_stalemate_marks_session_over() {
    let s = session(&[&[R, P, B, G], &[P, B, G, R], &[B, G, R, P], &[G, R, P, B]]);
    assert!(s.is_game_over());
    assert_eq!(s.phase(), Phase::GameOver);
}

#[test]
fn test_shared_session_across_threads() {
    let shared = SharedSession::new(EngineConfig::default().with_seed(8)).unwrap();

    let player = {
        let shared = shared.clone();
        thread::spawn(move || {
            for _ in 0..5 {
                let Some((from, to)) = shared.hint() else {
                    break;
                };
                assert!(shared.attempt_swap(from, to).is_accepted());
                while shared.phase().is_resolving() {
                    shared.advance();
                }
                if shared.is_game_over() {
                    break;
                }
            }
        })
    };
    let watcher = {
        let shared = shared.clone();
        thread::spawn(move || {
            for _ in 0..200 {
                let snap = shared.snapshot();
                assert_eq!((snap.width, snap.height), (8, 8));
            }
        })
    };

    player.join().unwrap();
    watcher.join().unwrap();
    assert!(shared.stats().moves >= 1);
    assert_eq!(shared.score(), shared.with(|s| s.score()));
}

//! Headless match-3 runner (default binary).
//!
//! Plays a seeded game with the greedy planner and prints the board after
//! every move, or one JSON object per line with `--json`. Logs go to stderr.

use std::io::{self, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use match3::config::AppConfig;
use match3::core::BoardSnapshot;
use match3::engine::{best_move, Session, Stats};
use match3::types::{GameEvent, Pos};

/// Deterministic match-3 engine with greedy autoplay
#[derive(Parser, Debug)]
#[command(name = "match3")]
#[command(version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Board width
    #[arg(long)]
    width: Option<u8>,

    /// Board height
    #[arg(long)]
    height: Option<u8>,

    /// Number of colors in play (3..=8)
    #[arg(long)]
    palette: Option<u8>,

    /// RNG seed; omitted means OS entropy
    #[arg(long)]
    seed: Option<u32>,

    /// Swaps to play before stopping
    #[arg(long)]
    moves: Option<u32>,

    /// Delay between engine steps in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Print JSON lines instead of text boards
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(v) = self.width {
            config.board.width = v;
        }
        if let Some(v) = self.height {
            config.board.height = v;
        }
        if let Some(v) = self.palette {
            config.board.palette_size = v;
        }
        if let Some(v) = self.seed {
            config.board.rng_seed = Some(v);
        }
        if let Some(v) = self.moves {
            config.host.max_moves = v;
        }
        if let Some(v) = self.tick_ms {
            config.host.tick_ms = v;
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Line<'a> {
    Board { snapshot: &'a BoardSnapshot, score: u64 },
    Swap { from: Pos, to: Pos },
    Event { event: &'a GameEvent },
    Summary { score: u64, stats: Stats, game_over: bool },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_env()?;
    cli.apply(&mut config);
    config.validate().context("invalid configuration")?;

    let mut session = Session::new(config.board)?;
    info!(
        width = config.board.width,
        height = config.board.height,
        seed = ?session.engine().config().rng_seed,
        "starting autoplay"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut snapshot = BoardSnapshot::default();
    let tick = Duration::from_millis(config.host.tick_ms);

    session.snapshot_into(&mut snapshot);
    print_board(&mut out, cli.json, &snapshot, session.score())?;

    for _ in 0..config.host.max_moves {
        if session.is_game_over() {
            break;
        }
        let Some(choice) = best_move(session.engine().grid()) else {
            warn!("planner found no move on a board at rest");
            break;
        };
        debug!(from = %choice.from, to = %choice.to, marked = choice.marked, "planned move");

        if !session.attempt_swap(choice.from, choice.to).is_accepted() {
            warn!(from = %choice.from, to = %choice.to, "planned swap refused");
            break;
        }
        if cli.json {
            emit(
                &mut out,
                &Line::Swap {
                    from: choice.from,
                    to: choice.to,
                },
            )?;
        } else {
            writeln!(out, "swap {} <-> {}", choice.from, choice.to)?;
        }

        let mut steps = 0;
        while session.phase().is_resolving() {
            if steps == config.host.max_cascade {
                warn!(steps, "cascade did not settle, stopping");
                break;
            }
            let batch = session.advance();
            steps += 1;
            if cli.json {
                for event in &batch {
                    emit(&mut out, &Line::Event { event })?;
                }
            }
            if !tick.is_zero() {
                thread::sleep(tick);
            }
        }
        if session.phase().is_resolving() {
            break;
        }

        session.snapshot_into(&mut snapshot);
        print_board(&mut out, cli.json, &snapshot, session.score())?;
    }

    let stats = session.stats();
    if cli.json {
        emit(
            &mut out,
            &Line::Summary {
                score: session.score(),
                stats,
                game_over: session.is_game_over(),
            },
        )?;
    } else {
        writeln!(
            out,
            "score {} after {} moves ({} pieces, deepest cascade {}){}",
            session.score(),
            stats.moves,
            stats.pieces_cleared,
            stats.deepest_cascade,
            if session.is_game_over() { ", no moves left" } else { "" }
        )?;
    }
    info!(score = session.score(), moves = stats.moves, "autoplay finished");
    Ok(())
}

fn print_board(
    out: &mut impl Write,
    json: bool,
    snapshot: &BoardSnapshot,
    score: u64,
) -> Result<()> {
    if json {
        emit(out, &Line::Board { snapshot, score })
    } else {
        writeln!(out, "score {}", score)?;
        write!(out, "{}", snapshot)?;
        writeln!(out)?;
        Ok(())
    }
}

fn emit(out: &mut impl Write, line: &Line<'_>) -> Result<()> {
    serde_json::to_writer(&mut *out, line)?;
    writeln!(out)?;
    Ok(())
}

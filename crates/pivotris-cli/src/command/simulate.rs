use std::{cmp::Ordering, path::PathBuf};

use anyhow::ensure;
use pivotris_engine::{Board, GameField, PieceSeed, Tetromino};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::util;

const MAX_BOARD_DIMENSION: usize = 1000;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Board width in cells
    #[arg(long, default_value_t = Board::DEFAULT_WIDTH)]
    width: usize,
    /// Board height in cells
    #[arg(long, default_value_t = Board::DEFAULT_HEIGHT)]
    height: usize,
    /// Stop after this many pieces even if the game is not over
    #[arg(long, default_value_t = 200)]
    max_pieces: usize,
    /// Seed as 32 hex digits; random if omitted
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Write a JSON report to this file (`-` for stdout)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SimulationReport<'a> {
    seed: PieceSeed,
    placed_pieces: usize,
    cleared_rows: usize,
    game_over: bool,
    board: &'a Board,
}

#[derive(Debug)]
struct Simulation {
    seed: PieceSeed,
    field: GameField,
    placed_pieces: usize,
    cleared_rows: usize,
}

impl Simulation {
    fn report(&self) -> SimulationReport<'_> {
        SimulationReport {
            seed: self.seed,
            placed_pieces: self.placed_pieces,
            cleared_rows: self.cleared_rows,
            game_over: self.field.is_game_over(),
            board: self.field.board(),
        }
    }
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        width,
        height,
        max_pieces,
        seed,
        output,
    } = arg;
    for (name, value) in [("width", *width), ("height", *height)] {
        ensure!(
            (1..=MAX_BOARD_DIMENSION).contains(&value),
            "board {name} must be between 1 and {MAX_BOARD_DIMENSION}, got {value}"
        );
    }

    let seed = seed.unwrap_or_else(|| rand::rng().random());
    log::info!("simulating on a {width}x{height} board with seed {seed}");

    let simulation = simulate(*width, *height, *max_pieces, seed);
    print!("{}", simulation.field.board());
    eprintln!(
        "Placed {} pieces, cleared {} rows{}",
        simulation.placed_pieces,
        simulation.cleared_rows,
        if simulation.field.is_game_over() {
            ", game over"
        } else {
            ""
        }
    );

    if let Some(path) = output {
        util::save_json(&simulation.report(), path)?;
    }
    Ok(())
}

/// Plays until top-out or `max_pieces` pieces have been locked.
///
/// Each piece gets a random number of rotations and a random target column,
/// then drops straight down. Moves that collide end that phase early.
fn simulate(width: usize, height: usize, max_pieces: usize, seed: PieceSeed) -> Simulation {
    let mut field = GameField::with_seed(width, height, seed);
    // Separate stream from the piece buffer, still fixed by the seed
    let mut move_seed = seed.to_bytes();
    move_seed.reverse();
    let mut rng = Pcg32::from_seed(move_seed);

    let mut placed_pieces = 0;
    let mut cleared_rows = 0;
    while placed_pieces < max_pieces && !field.is_game_over() {
        for _ in 0..rng.random_range(0..4) {
            if field.try_rotate().is_err() {
                break;
            }
        }

        let target = i32::try_from(rng.random_range(0..width)).unwrap_or(i32::MAX);
        loop {
            let moved = match left_edge(field.falling_piece()).cmp(&target) {
                Ordering::Less => field.try_move_right(),
                Ordering::Greater => field.try_move_left(),
                Ordering::Equal => break,
            };
            if moved.is_err() {
                break;
            }
        }

        field.hard_drop();
        let (rows, result) = field.complete_piece_drop();
        placed_pieces += 1;
        cleared_rows += rows;
        if let Err(e) = result {
            log::info!("game over after {placed_pieces} pieces: {e}");
        }
    }

    Simulation {
        seed,
        field,
        placed_pieces,
        cleared_rows,
    }
}

fn left_edge(piece: &Tetromino) -> i32 {
    piece.verts().iter().map(|v| v.x).min().unwrap_or_default()
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Food placement system that answers the world's food requests.

use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use snake_core::{CellCoord, Command, Event, FoodPlacementError, Grid};
use tracing::warn;

/// Configuration parameters required to construct the food placement system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration seeding the placement random source.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that picks a free interior cell whenever the world asks for food.
///
/// The random source is created once and lives as long as the system, so every
/// placement in a process draws from the same stream.
#[derive(Debug)]
pub struct FoodPlacement {
    rng: ChaCha8Rng,
}

impl FoodPlacement {
    /// Creates a new food placement system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes world events and emits at most one placement command.
    ///
    /// `snake` lists the live snake cells as the world reports them after the
    /// events were produced.
    pub fn handle(
        &mut self,
        events: &[Event],
        grid: Grid,
        snake: &[CellCoord],
        out: &mut Vec<Command>,
    ) {
        if !events.iter().any(requests_placement) {
            return;
        }

        match self.choose_cell(grid, snake) {
            Some(cell) => out.push(Command::PlaceFood { cell }),
            None => warn!("no free cell left for food"),
        }
    }

    /// Picks a uniformly random interior cell that the snake does not occupy.
    ///
    /// Samples are drawn inside the interior bounds and redrawn when they land
    /// on the snake, at most once per interior cell. Should every attempt miss,
    /// the remaining free cells are enumerated and one is chosen directly.
    /// Returns `None` when the snake covers the whole interior.
    pub fn choose_cell(&mut self, grid: Grid, snake: &[CellCoord]) -> Option<CellCoord> {
        let attempts = grid.interior_cell_count();
        if attempts == 0 {
            return None;
        }

        let columns = grid.interior_columns();
        let rows = grid.interior_rows();
        for _ in 0..attempts {
            let candidate = CellCoord::new(
                self.rng.gen_range(columns.clone()),
                self.rng.gen_range(rows.clone()),
            );
            if !snake.contains(&candidate) {
                return Some(candidate);
            }
        }

        let free: Vec<CellCoord> = grid
            .interior_cells()
            .filter(|cell| !snake.contains(cell))
            .collect();
        free.choose(&mut self.rng).copied()
    }
}

fn requests_placement(event: &Event) -> bool {
    match event {
        Event::FoodRequested => true,
        Event::FoodPlacementRejected { reason, .. } => {
            !matches!(reason, FoodPlacementError::AlreadyPresent)
        }
        _ => false,
    }
}

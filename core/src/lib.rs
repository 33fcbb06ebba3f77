#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the snake engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::{ops::RangeInclusive, time::Duration};

use serde::{Deserialize, Serialize};

/// Title shown by the window hosting the game.
pub const WINDOW_TITLE: &str = "Snake Game";

/// Number of cell columns spanned by the grid, walls included.
pub const GRID_COLUMNS: u32 = 34;

/// Number of cell rows spanned by the grid, walls included.
pub const GRID_ROWS: u32 = 20;

/// Thickness of the impassable border measured in cells.
pub const WALL_THICKNESS: u32 = 1;

/// Number of cells occupied by a freshly spawned snake.
pub const INITIAL_SNAKE_LENGTH: usize = 5;

/// Direction a freshly spawned snake travels in.
pub const INITIAL_DIRECTION: Direction = Direction::East;

/// Simulation ticks executed per second of wall-clock time.
pub const TICKS_PER_SECOND: u32 = 20;

/// Duration separating two consecutive simulation ticks.
pub const TICK_INTERVAL: Duration = Duration::from_millis(1_000 / TICKS_PER_SECOND as u64);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Resets the board to a fresh, not-yet-started session.
    ///
    /// The high score survives; everything else returns to its initial value.
    NewSession,
    /// Requests that the snake head in the provided direction on the next tick.
    Steer {
        /// Direction requested by the player.
        direction: Direction,
    },
    /// Requests that a running game be suspended.
    Pause,
    /// Requests that a suspended game continue.
    Resume,
    /// Requests a fresh game after the previous one ended.
    Restart,
    /// Advances the simulation by a single discrete step.
    Tick,
    /// Requests that food be placed at the provided cell.
    PlaceFood {
        /// Cell that should hold the food.
        cell: CellCoord,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    /// Announces that a snake was laid out in its starting position.
    SnakeSpawned {
        /// Cell occupied by the head of the snake.
        head: CellCoord,
        /// Number of cells occupied by the snake.
        length: usize,
    },
    /// Announces that the game moved between two play states.
    PlayStateChanged {
        /// State that was active before the transition.
        from: PlayState,
        /// State that is active after the transition.
        to: PlayState,
    },
    /// Confirms that a steering request was accepted for the next tick.
    DirectionQueued {
        /// Direction the snake will take on the next tick.
        direction: Direction,
    },
    /// Confirms that the snake moved by one cell.
    SnakeAdvanced {
        /// Cell now occupied by the head.
        head: CellCoord,
        /// Cell released by the tail, absent when the snake grew.
        vacated: Option<CellCoord>,
    },
    /// Reports that the snake ate the food.
    FoodConsumed {
        /// Cell that held the food.
        cell: CellCoord,
        /// Score after the food was eaten.
        score: u32,
    },
    /// Reports that the session's best score increased.
    HighScoreRaised {
        /// New best score.
        high_score: u32,
    },
    /// Signals that the board has no food and a placement is required.
    FoodRequested,
    /// Confirms that food was placed on the board.
    FoodPlaced {
        /// Cell now holding the food.
        cell: CellCoord,
    },
    /// Reports that a food placement request was rejected.
    FoodPlacementRejected {
        /// Cell provided in the placement request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: FoodPlacementError,
    },
    /// Reports that the snake crashed, ending the game.
    Collided {
        /// Obstacle the head ran into.
        kind: CollisionKind,
        /// Cell the head occupied when the crash was detected.
        head: CellCoord,
    },
}

/// Phases of a play session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayState {
    /// Waiting for the first directional input; the simulation is frozen.
    NotPlaying,
    /// The snake advances on every tick.
    Playing,
    /// The player suspended the game; the simulation is frozen.
    Paused,
    /// The snake crashed; frozen until a restart.
    GameOver,
}

impl PlayState {
    /// Reports whether a game has been started in the current session.
    #[must_use]
    pub const fn has_started(self) -> bool {
        !matches!(self, Self::NotPlaying)
    }
}

/// Obstacles that end a game when the head runs into them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionKind {
    /// The head entered a cell occupied by the snake's own body.
    Body,
    /// The head entered the wall or left the grid.
    Wall,
}

/// Reasons a food placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodPlacementError {
    /// The requested cell lies in the wall or outside the grid.
    OutsideInterior,
    /// The requested cell is occupied by the snake.
    OnSnake,
    /// Food is already present on the board.
    AlreadyPresent,
}

/// Cardinal movement directions available to the snake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// All directions in clockwise order starting north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Reports whether turning from `current` to `self` would reverse the snake.
    #[must_use]
    pub fn reverses(self, current: Direction) -> bool {
        self == current.opposite()
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Neighbouring cell one step away in the provided direction.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        let (column, row) = match direction {
            Direction::North => (Some(self.column), self.row.checked_sub(1)),
            Direction::East => (self.column.checked_add(1), Some(self.row)),
            Direction::South => (Some(self.column), self.row.checked_add(1)),
            Direction::West => (self.column.checked_sub(1), Some(self.row)),
        };
        Some(CellCoord::new(column?, row?))
    }
}

/// Dimensions of the board and its surrounding wall, measured in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    columns: u32,
    rows: u32,
    wall_thickness: u32,
}

impl Grid {
    /// Board used by the game: 34 × 20 cells framed by a one-cell wall.
    pub const STANDARD: Grid = Grid::new(GRID_COLUMNS, GRID_ROWS, WALL_THICKNESS);

    /// Creates a grid description.
    #[must_use]
    pub const fn new(columns: u32, rows: u32, wall_thickness: u32) -> Self {
        Self {
            columns,
            rows,
            wall_thickness,
        }
    }

    /// Number of columns, walls included.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows, walls included.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Thickness of the wall on every side.
    #[must_use]
    pub const fn wall_thickness(&self) -> u32 {
        self.wall_thickness
    }

    /// Columns that lie inside the wall.
    #[must_use]
    pub fn interior_columns(&self) -> RangeInclusive<u32> {
        interior_span(self.columns, self.wall_thickness)
    }

    /// Rows that lie inside the wall.
    #[must_use]
    pub fn interior_rows(&self) -> RangeInclusive<u32> {
        interior_span(self.rows, self.wall_thickness)
    }

    /// Reports whether the cell lies inside the playable interior.
    #[must_use]
    pub fn is_interior(&self, cell: CellCoord) -> bool {
        self.interior_columns().contains(&cell.column())
            && self.interior_rows().contains(&cell.row())
    }

    /// Number of playable cells, which bounds the length of the snake.
    #[must_use]
    pub fn interior_cell_count(&self) -> usize {
        let columns = span_len(self.interior_columns());
        let rows = span_len(self.interior_rows());
        columns.saturating_mul(rows)
    }

    /// Iterates every interior cell in row-major order.
    pub fn interior_cells(&self) -> impl Iterator<Item = CellCoord> {
        let columns = self.interior_columns();
        self.interior_rows()
            .flat_map(move |row| columns.clone().map(move |column| CellCoord::new(column, row)))
    }

    /// Cell holding the head of a freshly spawned snake.
    ///
    /// Sits at the centre of the interior so the body has room to trail
    /// behind it.
    #[must_use]
    pub const fn spawn_head(&self) -> CellCoord {
        let interior_columns = self.columns.saturating_sub(2 * self.wall_thickness);
        let interior_rows = self.rows.saturating_sub(2 * self.wall_thickness);
        CellCoord::new(interior_columns / 2, interior_rows / 2)
    }
}

fn interior_span(extent: u32, wall_thickness: u32) -> RangeInclusive<u32> {
    let first = wall_thickness;
    match extent.checked_sub(wall_thickness.saturating_add(1)) {
        Some(last) => first..=last,
        None => RangeInclusive::new(1, 0),
    }
}

fn span_len(span: RangeInclusive<u32>) -> usize {
    if span.is_empty() {
        return 0;
    }
    let len = span.end().saturating_sub(*span.start()).saturating_add(1);
    usize::try_from(len).unwrap_or(usize::MAX)
}

/// Player intent captured by an input adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlInput {
    /// One of the four directional keys.
    Steer(Direction),
    /// The single key that pauses, resumes and restarts.
    Action,
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the snake game.

use std::collections::VecDeque;

use snake_core::{
    CellCoord, CollisionKind, Command, Direction, Event, FoodPlacementError, Grid, PlayState,
    INITIAL_DIRECTION, INITIAL_SNAKE_LENGTH,
};
use tracing::{debug, info};

/// Represents the authoritative snake world state.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    snake: Snake,
    direction: Direction,
    pending_direction: Option<Direction>,
    food: Option<CellCoord>,
    score: u32,
    high_score: u32,
    play_state: PlayState,
}

impl World {
    /// Creates a world holding a freshly spawned snake on the standard grid.
    ///
    /// The board starts without food; issuing [`Command::NewSession`] announces
    /// the spawn and requests the first placement.
    #[must_use]
    pub fn new() -> Self {
        let grid = Grid::STANDARD;
        Self {
            snake: Snake::spawn(&grid),
            grid,
            direction: INITIAL_DIRECTION,
            pending_direction: None,
            food: None,
            score: 0,
            high_score: 0,
            play_state: PlayState::NotPlaying,
        }
    }

    fn reset_board(&mut self, out_events: &mut Vec<Event>) {
        self.snake = Snake::spawn(&self.grid);
        self.direction = INITIAL_DIRECTION;
        self.pending_direction = None;
        self.food = None;
        self.score = 0;

        out_events.push(Event::SnakeSpawned {
            head: self.snake.head(),
            length: self.snake.len(),
        });
        out_events.push(Event::FoodRequested);
    }

    fn transition(&mut self, to: PlayState, out_events: &mut Vec<Event>) {
        let from = self.play_state;
        if from == to {
            return;
        }
        self.play_state = to;
        debug!(?from, ?to, "play state changed");
        out_events.push(Event::PlayStateChanged { from, to });
    }

    fn queue_direction(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        if direction.reverses(self.direction) {
            debug!(?direction, current = ?self.direction, "ignoring reversal");
            return;
        }
        self.pending_direction = Some(direction);
        out_events.push(Event::DirectionQueued { direction });
    }

    fn advance(&mut self, out_events: &mut Vec<Event>) {
        if let Some(direction) = self.pending_direction.take() {
            self.direction = direction;
        }

        let Some(head) = self.snake.head().step(self.direction) else {
            self.crash(CollisionKind::Wall, self.snake.head(), out_events);
            return;
        };

        self.snake.push_head(head);
        let vacated = if self.food == Some(head) {
            self.consume_food(head, out_events);
            None
        } else {
            self.snake.drop_tail()
        };
        out_events.push(Event::SnakeAdvanced { head, vacated });

        if self.snake.body_contains(head) {
            self.crash(CollisionKind::Body, head, out_events);
        } else if !self.grid.is_interior(head) {
            self.crash(CollisionKind::Wall, head, out_events);
        }
    }

    fn consume_food(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        self.food = None;
        self.score = self.score.saturating_add(1);
        out_events.push(Event::FoodConsumed {
            cell,
            score: self.score,
        });

        if self.score > self.high_score {
            self.high_score = self.score;
            out_events.push(Event::HighScoreRaised {
                high_score: self.high_score,
            });
        }

        out_events.push(Event::FoodRequested);
    }

    fn crash(&mut self, kind: CollisionKind, head: CellCoord, out_events: &mut Vec<Event>) {
        info!(?kind, score = self.score, high_score = self.high_score, "snake crashed");
        out_events.push(Event::Collided { kind, head });
        self.transition(PlayState::GameOver, out_events);
    }

    fn place_food(&mut self, cell: CellCoord) -> Result<(), FoodPlacementError> {
        if self.food.is_some() {
            return Err(FoodPlacementError::AlreadyPresent);
        }
        if !self.grid.is_interior(cell) {
            return Err(FoodPlacementError::OutsideInterior);
        }
        if self.snake.contains(cell) {
            return Err(FoodPlacementError::OnSnake);
        }
        self.food = Some(cell);
        Ok(())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Requests that make no sense in the current play state are ignored without
/// emitting events.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::NewSession => {
            world.reset_board(out_events);
            world.transition(PlayState::NotPlaying, out_events);
        }
        Command::Steer { direction } => match world.play_state {
            PlayState::NotPlaying => {
                world.queue_direction(direction, out_events);
                world.transition(PlayState::Playing, out_events);
            }
            PlayState::Playing => world.queue_direction(direction, out_events),
            PlayState::Paused | PlayState::GameOver => {
                debug!(?direction, state = ?world.play_state, "steering ignored");
            }
        },
        Command::Pause => {
            if world.play_state == PlayState::Playing {
                world.transition(PlayState::Paused, out_events);
            }
        }
        Command::Resume => {
            if world.play_state == PlayState::Paused {
                world.transition(PlayState::Playing, out_events);
            }
        }
        Command::Restart => {
            if world.play_state == PlayState::GameOver {
                world.reset_board(out_events);
                world.transition(PlayState::Playing, out_events);
            }
        }
        Command::Tick => {
            if world.play_state == PlayState::Playing {
                world.advance(out_events);
            }
        }
        Command::PlaceFood { cell } => match world.place_food(cell) {
            Ok(()) => out_events.push(Event::FoodPlaced { cell }),
            Err(reason) => {
                debug!(?cell, ?reason, "food placement rejected");
                out_events.push(Event::FoodPlacementRejected { cell, reason });
            }
        },
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use snake_core::{CellCoord, Direction, Grid, PlayState};

    /// Reports the active play state.
    #[must_use]
    pub fn play_state(world: &World) -> PlayState {
        world.play_state
    }

    /// Provides the grid the snake moves on.
    #[must_use]
    pub fn grid(world: &World) -> Grid {
        world.grid
    }

    /// Captures a read-only view of the snake's cells.
    #[must_use]
    pub fn snake_view(world: &World) -> SnakeView<'_> {
        SnakeView {
            cells: &world.snake.cells,
        }
    }

    /// Cell currently holding the food, if any.
    #[must_use]
    pub fn food(world: &World) -> Option<CellCoord> {
        world.food
    }

    /// Score of the game in progress.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Best score observed since the process started.
    #[must_use]
    pub fn high_score(world: &World) -> u32 {
        world.high_score
    }

    /// Direction the snake moved in on its last step.
    #[must_use]
    pub fn direction(world: &World) -> Direction {
        world.direction
    }

    /// Direction that will be applied on the next tick, if one was queued.
    #[must_use]
    pub fn pending_direction(world: &World) -> Option<Direction> {
        world.pending_direction
    }

    /// Read-only view into the snake body, head first.
    #[derive(Clone, Copy, Debug)]
    pub struct SnakeView<'a> {
        cells: &'a std::collections::VecDeque<CellCoord>,
    }

    impl<'a> SnakeView<'a> {
        /// Cell occupied by the head.
        #[must_use]
        pub fn head(&self) -> Option<CellCoord> {
            self.cells.front().copied()
        }

        /// Number of live cells.
        #[must_use]
        pub fn len(&self) -> usize {
            self.cells.len()
        }

        /// Reports whether the snake has no cells.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.cells.is_empty()
        }

        /// Reports whether any live cell sits at the provided coordinate.
        #[must_use]
        pub fn contains(&self, cell: CellCoord) -> bool {
            self.cells.contains(&cell)
        }

        /// Iterator over the live cells, head first.
        pub fn iter(&self) -> impl Iterator<Item = CellCoord> + 'a {
            self.cells.iter().copied()
        }

        /// Copies the live cells into a vector, head first.
        #[must_use]
        pub fn to_vec(&self) -> Vec<CellCoord> {
            self.cells.iter().copied().collect()
        }
    }
}

/// Helpers for arranging world layouts that normal play cannot reach directly.
#[cfg(any(test, feature = "test_scaffolding"))]
pub mod scaffolding {
    use std::collections::VecDeque;

    use super::{Snake, World};
    use snake_core::{CellCoord, Direction, PlayState};

    /// Replaces the snake with the provided cells (head first) moving in `direction`.
    ///
    /// Any queued steering is discarded and the game is put into the playing
    /// state so the next tick advances the arranged snake.
    pub fn arrange_snake(world: &mut World, cells: Vec<CellCoord>, direction: Direction) {
        let capacity = world.grid.interior_cell_count().max(cells.len());
        let mut deque = VecDeque::with_capacity(capacity);
        deque.extend(cells);
        world.snake = Snake { cells: deque };
        world.direction = direction;
        world.pending_direction = None;
        world.play_state = PlayState::Playing;
    }

    /// Overrides the food cell without validation.
    pub fn set_food(world: &mut World, food: Option<CellCoord>) {
        world.food = food;
    }
}

#[derive(Clone, Debug)]
struct Snake {
    cells: VecDeque<CellCoord>,
}

impl Snake {
    fn spawn(grid: &Grid) -> Self {
        let head = grid.spawn_head();
        let mut cells = VecDeque::with_capacity(grid.interior_cell_count());
        cells.extend(
            (0..INITIAL_SNAKE_LENGTH)
                .filter_map(|offset| u32::try_from(offset).ok())
                .map(|offset| CellCoord::new(head.column().saturating_sub(offset), head.row())),
        );
        Self { cells }
    }

    fn head(&self) -> CellCoord {
        self.cells.front().copied().unwrap_or_default()
    }

    fn len(&self) -> usize {
        self.cells.len()
    }

    fn contains(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }

    fn body_contains(&self, cell: CellCoord) -> bool {
        self.cells.iter().skip(1).any(|body| *body == cell)
    }

    fn push_head(&mut self, cell: CellCoord) {
        self.cells.push_front(cell);
    }

    fn drop_tail(&mut self) -> Option<CellCoord> {
        self.cells.pop_back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started_world() -> (World, Vec<Event>) {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::NewSession, &mut events);
        (world, events)
    }

    fn steer(world: &mut World, direction: Direction) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::Steer { direction }, &mut events);
        events
    }

    fn tick(world: &mut World) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::Tick, &mut events);
        events
    }

    fn place_food(world: &mut World, cell: CellCoord) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::PlaceFood { cell }, &mut events);
        events
    }

    #[test]
    fn new_session_spawns_snake_and_requests_food() {
        let (world, events) = started_world();

        assert_eq!(
            events,
            vec![
                Event::SnakeSpawned {
                    head: CellCoord::new(16, 9),
                    length: INITIAL_SNAKE_LENGTH,
                },
                Event::FoodRequested,
            ]
        );
        assert_eq!(query::play_state(&world), PlayState::NotPlaying);
        assert_eq!(
            query::snake_view(&world).to_vec(),
            vec![
                CellCoord::new(16, 9),
                CellCoord::new(15, 9),
                CellCoord::new(14, 9),
                CellCoord::new(13, 9),
                CellCoord::new(12, 9),
            ]
        );
        assert_eq!(query::direction(&world), Direction::East);
        assert!(query::food(&world).is_none());
    }

    #[test]
    fn ticks_are_ignored_before_the_first_direction() {
        let (mut world, _) = started_world();
        let before = query::snake_view(&world).to_vec();

        assert!(tick(&mut world).is_empty());
        assert_eq!(query::snake_view(&world).to_vec(), before);
    }

    #[test]
    fn directional_input_starts_the_game_with_that_direction() {
        let (mut world, _) = started_world();

        let events = steer(&mut world, Direction::North);

        assert_eq!(
            events,
            vec![
                Event::DirectionQueued {
                    direction: Direction::North,
                },
                Event::PlayStateChanged {
                    from: PlayState::NotPlaying,
                    to: PlayState::Playing,
                },
            ]
        );
        let _ = tick(&mut world);
        assert_eq!(query::snake_view(&world).head(), Some(CellCoord::new(16, 8)));
    }

    #[test]
    fn reversed_start_input_still_starts_moving_east() {
        let (mut world, _) = started_world();

        let events = steer(&mut world, Direction::West);

        assert_eq!(
            events,
            vec![Event::PlayStateChanged {
                from: PlayState::NotPlaying,
                to: PlayState::Playing,
            }]
        );
        let _ = tick(&mut world);
        assert_eq!(query::direction(&world), Direction::East);
        assert_eq!(query::snake_view(&world).head(), Some(CellCoord::new(17, 9)));
    }

    #[test]
    fn reversal_is_rejected_for_every_direction() {
        for direction in Direction::ALL {
            let (mut world, _) = started_world();
            let start = Grid::STANDARD.spawn_head();
            let cells = (0..3)
                .filter_map(|offset| {
                    let mut cell = Some(start);
                    for _ in 0..offset {
                        cell = cell.and_then(|cell| cell.step(direction.opposite()));
                    }
                    cell
                })
                .collect();
            scaffolding::arrange_snake(&mut world, cells, direction);

            let events = steer(&mut world, direction.opposite());

            assert!(events.is_empty(), "reversal from {direction:?} was queued");
            assert_eq!(query::pending_direction(&world), None);
            let _ = tick(&mut world);
            assert_eq!(query::direction(&world), direction);
        }
    }

    #[test]
    fn last_valid_direction_before_a_tick_wins() {
        let (mut world, _) = started_world();
        let _ = steer(&mut world, Direction::East);
        let _ = tick(&mut world);

        let _ = steer(&mut world, Direction::North);
        let _ = steer(&mut world, Direction::South);

        assert_eq!(query::pending_direction(&world), Some(Direction::South));
        let head = query::snake_view(&world).head().expect("head");
        let _ = tick(&mut world);
        assert_eq!(query::snake_view(&world).head(), head.step(Direction::South));
    }

    #[test]
    fn two_quick_turns_cannot_reverse_within_one_tick() {
        let (mut world, _) = started_world();
        let _ = steer(&mut world, Direction::East);
        let _ = tick(&mut world);

        let _ = steer(&mut world, Direction::North);
        let rejected = steer(&mut world, Direction::West);

        assert!(rejected.is_empty());
        assert_eq!(query::pending_direction(&world), Some(Direction::North));
    }

    #[test]
    fn length_is_constant_while_no_food_is_eaten() {
        let (mut world, _) = started_world();
        let _ = steer(&mut world, Direction::East);

        for _ in 0..10 {
            let events = tick(&mut world);
            assert_eq!(query::snake_view(&world).len(), INITIAL_SNAKE_LENGTH);
            assert!(matches!(
                events.as_slice(),
                [Event::SnakeAdvanced {
                    vacated: Some(_),
                    ..
                }]
            ));
        }
    }

    #[test]
    fn eating_food_grows_by_one_and_scores() {
        let (mut world, _) = started_world();
        let _ = place_food(&mut world, CellCoord::new(17, 9));
        let _ = steer(&mut world, Direction::East);

        let events = tick(&mut world);

        assert_eq!(
            events,
            vec![
                Event::FoodConsumed {
                    cell: CellCoord::new(17, 9),
                    score: 1,
                },
                Event::HighScoreRaised { high_score: 1 },
                Event::FoodRequested,
                Event::SnakeAdvanced {
                    head: CellCoord::new(17, 9),
                    vacated: None,
                },
            ]
        );
        assert_eq!(query::snake_view(&world).len(), INITIAL_SNAKE_LENGTH + 1);
        assert_eq!(query::score(&world), 1);
        assert!(query::food(&world).is_none());
    }

    #[test]
    fn eating_n_times_scores_n_and_grows_by_n() {
        let (mut world, _) = started_world();
        let _ = steer(&mut world, Direction::East);

        for eaten in 1..=6u32 {
            let head = query::snake_view(&world).head().expect("head");
            let next = head.step(Direction::East).expect("next cell");
            let placed = place_food(&mut world, next);
            assert_eq!(placed, vec![Event::FoodPlaced { cell: next }]);
            let _ = tick(&mut world);
            assert_eq!(query::score(&world), eaten);
        }

        assert_eq!(query::snake_view(&world).len(), INITIAL_SNAKE_LENGTH + 6);
        assert_eq!(query::play_state(&world), PlayState::Playing);
    }

    #[test]
    fn self_collision_ends_the_game_and_freezes_the_snake() {
        let (mut world, _) = started_world();
        // Head at (5, 5) heading south into (5, 6), which the body occupies.
        let cells = vec![
            CellCoord::new(5, 5),
            CellCoord::new(6, 5),
            CellCoord::new(6, 6),
            CellCoord::new(5, 6),
            CellCoord::new(4, 6),
        ];
        scaffolding::arrange_snake(&mut world, cells, Direction::South);

        let events = tick(&mut world);

        assert!(events.contains(&Event::Collided {
            kind: CollisionKind::Body,
            head: CellCoord::new(5, 6),
        }));
        assert_eq!(query::play_state(&world), PlayState::GameOver);

        let frozen = query::snake_view(&world).to_vec();
        for _ in 0..3 {
            assert!(tick(&mut world).is_empty());
        }
        assert_eq!(query::snake_view(&world).to_vec(), frozen);
    }

    #[test]
    fn moving_into_the_vacated_tail_cell_is_safe() {
        let (mut world, _) = started_world();
        // A closed 2x2 loop: the head chases the tail, which moves first.
        let cells = vec![
            CellCoord::new(5, 5),
            CellCoord::new(6, 5),
            CellCoord::new(6, 6),
            CellCoord::new(5, 6),
        ];
        scaffolding::arrange_snake(&mut world, cells, Direction::South);

        let _ = tick(&mut world);

        assert_eq!(query::play_state(&world), PlayState::Playing);
        assert_eq!(query::snake_view(&world).head(), Some(CellCoord::new(5, 6)));
    }

    #[test]
    fn head_next_to_the_wall_crashes_on_the_next_tick() {
        let (mut world, _) = started_world();
        let cells = vec![
            CellCoord::new(32, 9),
            CellCoord::new(31, 9),
            CellCoord::new(30, 9),
        ];
        scaffolding::arrange_snake(&mut world, cells, Direction::East);

        let events = tick(&mut world);

        assert!(events.contains(&Event::Collided {
            kind: CollisionKind::Wall,
            head: CellCoord::new(33, 9),
        }));
        assert_eq!(query::play_state(&world), PlayState::GameOver);
    }

    #[test]
    fn head_two_cells_from_the_wall_survives_one_tick() {
        let (mut world, _) = started_world();
        let cells = vec![
            CellCoord::new(1, 2),
            CellCoord::new(1, 3),
            CellCoord::new(1, 4),
        ];
        scaffolding::arrange_snake(&mut world, cells, Direction::North);

        let _ = tick(&mut world);
        assert_eq!(query::play_state(&world), PlayState::Playing);

        let _ = tick(&mut world);
        assert_eq!(query::play_state(&world), PlayState::GameOver);
    }

    #[test]
    fn self_collision_takes_priority_over_the_wall() {
        let (mut world, _) = started_world();
        // The body wraps through the wall cell ahead of the head.
        let cells = vec![
            CellCoord::new(1, 5),
            CellCoord::new(1, 6),
            CellCoord::new(0, 6),
            CellCoord::new(0, 5),
            CellCoord::new(0, 4),
        ];
        scaffolding::arrange_snake(&mut world, cells, Direction::West);

        let events = tick(&mut world);

        assert!(events.contains(&Event::Collided {
            kind: CollisionKind::Body,
            head: CellCoord::new(0, 5),
        }));
    }

    #[test]
    fn pause_freezes_the_simulation_and_blocks_steering() {
        let (mut world, _) = started_world();
        let _ = steer(&mut world, Direction::East);
        let mut events = Vec::new();
        apply(&mut world, Command::Pause, &mut events);
        assert_eq!(query::play_state(&world), PlayState::Paused);

        let before = query::snake_view(&world).to_vec();
        assert!(tick(&mut world).is_empty());
        assert!(steer(&mut world, Direction::North).is_empty());
        assert_eq!(query::snake_view(&world).to_vec(), before);

        events.clear();
        apply(&mut world, Command::Resume, &mut events);
        assert_eq!(
            events,
            vec![Event::PlayStateChanged {
                from: PlayState::Paused,
                to: PlayState::Playing,
            }]
        );
        let _ = tick(&mut world);
        assert_eq!(query::direction(&world), Direction::East);
    }

    #[test]
    fn invalid_transitions_are_silent_no_ops() {
        let (mut world, _) = started_world();

        for command in [Command::Pause, Command::Resume, Command::Restart] {
            let mut events = Vec::new();
            apply(&mut world, command, &mut events);
            assert!(events.is_empty());
            assert_eq!(query::play_state(&world), PlayState::NotPlaying);
        }
    }

    #[test]
    fn restart_resets_the_board_but_keeps_the_high_score() {
        let (mut world, _) = started_world();
        let _ = place_food(&mut world, CellCoord::new(17, 9));
        let _ = steer(&mut world, Direction::East);
        let _ = tick(&mut world);
        let _ = steer(&mut world, Direction::North);
        for _ in 0..20 {
            let _ = tick(&mut world);
        }
        assert_eq!(query::play_state(&world), PlayState::GameOver);
        assert_eq!(query::high_score(&world), 1);

        let mut events = Vec::new();
        apply(&mut world, Command::Restart, &mut events);

        assert_eq!(query::play_state(&world), PlayState::Playing);
        assert_eq!(query::score(&world), 0);
        assert_eq!(query::high_score(&world), 1);
        assert_eq!(query::snake_view(&world).len(), INITIAL_SNAKE_LENGTH);
        assert_eq!(query::direction(&world), Direction::East);
        assert!(events.contains(&Event::FoodRequested));
        assert!(events.contains(&Event::PlayStateChanged {
            from: PlayState::GameOver,
            to: PlayState::Playing,
        }));
    }

    #[test]
    fn food_placement_is_validated() {
        let (mut world, _) = started_world();

        assert_eq!(
            place_food(&mut world, CellCoord::new(0, 4)),
            vec![Event::FoodPlacementRejected {
                cell: CellCoord::new(0, 4),
                reason: FoodPlacementError::OutsideInterior,
            }]
        );
        assert_eq!(
            place_food(&mut world, CellCoord::new(14, 9)),
            vec![Event::FoodPlacementRejected {
                cell: CellCoord::new(14, 9),
                reason: FoodPlacementError::OnSnake,
            }]
        );
        assert_eq!(
            place_food(&mut world, CellCoord::new(3, 3)),
            vec![Event::FoodPlaced {
                cell: CellCoord::new(3, 3),
            }]
        );
        assert_eq!(
            place_food(&mut world, CellCoord::new(4, 4)),
            vec![Event::FoodPlacementRejected {
                cell: CellCoord::new(4, 4),
                reason: FoodPlacementError::AlreadyPresent,
            }]
        );
        assert_eq!(query::food(&world), Some(CellCoord::new(3, 3)));
    }
}

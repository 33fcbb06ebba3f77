use std::time::Duration;

use snake_core::{Command, ControlInput, Event, Grid, PlayState, TICK_INTERVAL};
use snake_rendering::{hud_lines, GridPresentation, Scene, SnakePresentation, SnakeStyle};
use snake_system_controls::Controls;
use snake_system_food::{Config as FoodConfig, FoodPlacement};
use snake_world::{self as world, query, World};
use tracing::{debug, trace};

/// Upper bound on ticks executed in a single frame.
const MAX_TICKS_PER_FRAME: u32 = 5;

/// Owns the world and its systems and advances them once per rendered frame.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    controls: Controls,
    food: FoodPlacement,
    clock: TickClock,
}

impl Simulation {
    /// Creates a fresh session whose food placement draws from `seed`.
    pub(crate) fn new(seed: u64) -> Self {
        let mut simulation = Self {
            world: World::new(),
            controls: Controls::new(),
            food: FoodPlacement::new(FoodConfig::new(seed)),
            clock: TickClock::new(TICK_INTERVAL, MAX_TICKS_PER_FRAME),
        };
        simulation.execute(Command::NewSession);
        simulation
    }

    pub(crate) fn grid(&self) -> Grid {
        query::grid(&self.world)
    }

    /// Applies the frame's inputs, then runs every tick that fell due.
    pub(crate) fn step(&mut self, elapsed: Duration, inputs: &[ControlInput]) {
        let mut commands = Vec::new();
        self.controls
            .handle(inputs, query::play_state(&self.world), &mut commands);
        for command in commands {
            self.execute(command);
        }

        for _ in 0..self.clock.advance(elapsed) {
            self.execute(Command::Tick);
        }
    }

    /// Builds a scene reflecting the current world.
    pub(crate) fn scene(&self, grid: GridPresentation) -> Scene {
        let mut scene = Scene::new(
            grid,
            SnakePresentation::new(Vec::new(), SnakeStyle::Alive),
            None,
            Vec::new(),
            PlayState::NotPlaying,
        );
        self.populate_scene(&mut scene);
        scene
    }

    pub(crate) fn populate_scene(&self, scene: &mut Scene) {
        let play_state = query::play_state(&self.world);
        scene.snake = SnakePresentation::new(
            query::snake_view(&self.world).to_vec(),
            SnakeStyle::for_state(play_state),
        );
        scene.food = query::food(&self.world);
        scene.hud = hud_lines(
            &scene.grid,
            play_state,
            query::score(&self.world),
            query::high_score(&self.world),
        );
        scene.play_state = play_state;
    }

    /// Pumps a command through the world and the food system until no
    /// further commands are produced.
    fn execute(&mut self, command: Command) {
        let mut commands = vec![command];
        let mut events: Vec<Event> = Vec::new();

        while !commands.is_empty() {
            events.clear();
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            for event in &events {
                trace!(?event, "world event");
            }

            let snake = query::snake_view(&self.world).to_vec();
            self.food
                .handle(&events, query::grid(&self.world), &snake, &mut commands);
        }
    }
}

/// Converts frame time into a whole number of fixed-length ticks.
#[derive(Clone, Copy, Debug)]
struct TickClock {
    interval: Duration,
    accumulator: Duration,
    max_ticks_per_frame: u32,
}

impl TickClock {
    fn new(interval: Duration, max_ticks_per_frame: u32) -> Self {
        Self {
            interval,
            accumulator: Duration::ZERO,
            max_ticks_per_frame: max_ticks_per_frame.max(1),
        }
    }

    /// Adds `elapsed` to the backlog and returns how many ticks are due.
    ///
    /// Backlog beyond `max_ticks_per_frame` ticks is discarded.
    fn advance(&mut self, elapsed: Duration) -> u32 {
        if self.interval.is_zero() {
            return 0;
        }

        self.accumulator = self.accumulator.saturating_add(elapsed);
        let mut ticks = 0u32;
        while self.accumulator >= self.interval && ticks < self.max_ticks_per_frame {
            self.accumulator = self.accumulator.saturating_sub(self.interval);
            ticks = ticks.saturating_add(1);
        }

        if self.accumulator >= self.interval {
            debug!(
                dropped_ms = self.accumulator.as_secs_f64() * 1_000.0,
                "tick backlog dropped"
            );
            self.accumulator = Duration::ZERO;
        }

        ticks
    }
}

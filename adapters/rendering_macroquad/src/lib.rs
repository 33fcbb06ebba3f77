#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for the snake game.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.

mod assets;

pub use self::assets::{load_window_icon, AssetPaths, GameAssets, ManifestError};

use anyhow::{Context, Result};
use macroquad::{
    input::{
        utils::{register_input_subscriber, repeat_all_miniquad_input},
        KeyCode,
    },
    miniquad::{self, EventHandler, KeyMods},
    text::{Font, TextParams},
    texture::{DrawTextureParams, Texture2D},
};
use snake_core::{ControlInput, Direction};
use snake_rendering::{
    Color, FrameInput, GridPresentation, HudText, PixelRect, Presentation, RenderingBackend,
    Scene, HUD_FONT_SIZE,
};
use std::{
    collections::VecDeque,
    path::PathBuf,
    sync::mpsc,
    time::{Duration, Instant},
};
use tracing::{debug, info};

/// Width of the outline drawn around snake cells, in pixels.
const OUTLINE_THICKNESS: f32 = 1.0;

/// Keys the game reacts to together with the action they trigger.
const KEY_BINDINGS: [(KeyCode, KeyAction); 10] = [
    (KeyCode::Up, KeyAction::Control(ControlInput::Steer(Direction::North))),
    (KeyCode::W, KeyAction::Control(ControlInput::Steer(Direction::North))),
    (KeyCode::Right, KeyAction::Control(ControlInput::Steer(Direction::East))),
    (KeyCode::D, KeyAction::Control(ControlInput::Steer(Direction::East))),
    (KeyCode::Down, KeyAction::Control(ControlInput::Steer(Direction::South))),
    (KeyCode::S, KeyAction::Control(ControlInput::Steer(Direction::South))),
    (KeyCode::Left, KeyAction::Control(ControlInput::Steer(Direction::West))),
    (KeyCode::A, KeyAction::Control(ControlInput::Steer(Direction::West))),
    (KeyCode::Space, KeyAction::Control(ControlInput::Action)),
    (KeyCode::Escape, KeyAction::Quit),
];

/// Meaning of a key press for the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// The key maps onto a game control.
    Control(ControlInput),
    /// The key closes the game.
    Quit,
}

/// Returns the action bound to `key`, if any.
#[must_use]
pub fn key_action(key: KeyCode) -> Option<KeyAction> {
    KEY_BINDINGS
        .iter()
        .find(|(bound, _)| *bound == key)
        .map(|(_, action)| *action)
}

/// Key presses observed during a single frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyboardInput {
    /// Game controls in the order their keys were reported.
    pub controls: Vec<ControlInput>,
    /// Whether a quit key was pressed.
    pub quit_requested: bool,
}

impl KeyboardInput {
    /// Builds the frame input from the keys pressed during the frame.
    #[must_use]
    pub fn from_pressed_keys(keys: impl IntoIterator<Item = KeyCode>) -> Self {
        let mut input = Self::default();
        for key in keys {
            match key_action(key) {
                Some(KeyAction::Control(control)) => input.controls.push(control),
                Some(KeyAction::Quit) => input.quit_requested = true,
                None => {}
            }
        }
        input
    }
}

/// Collects key presses in the order the platform delivered them.
///
/// The render loop replays macroquad's queued input events into the recorder
/// once per frame and drains it into a [`KeyboardInput`].
#[derive(Debug, Default)]
pub struct KeyRecorder {
    pressed: Vec<KeyCode>,
}

impl KeyRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a key-down event; auto-repeat events are ignored.
    pub fn record(&mut self, key: KeyCode, repeat: bool) {
        if !repeat {
            self.pressed.push(key);
        }
    }

    /// Drains the keys recorded so far into a frame input, preserving order.
    pub fn take_input(&mut self) -> KeyboardInput {
        KeyboardInput::from_pressed_keys(self.pressed.drain(..))
    }
}

impl EventHandler for KeyRecorder {
    fn update(&mut self, _ctx: &mut miniquad::Context) {}

    fn draw(&mut self, _ctx: &mut miniquad::Context) {}

    fn key_down_event(
        &mut self,
        _ctx: &mut miniquad::Context,
        keycode: KeyCode,
        _keymods: KeyMods,
        repeat: bool,
    ) {
        self.record(keycode, repeat);
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    load_assets: bool,
    manifest_path: PathBuf,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            load_assets: true,
            manifest_path: AssetPaths::default_manifest_path(),
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Configures whether the backend should load the image and font assets.
    #[must_use]
    pub fn with_asset_loading(mut self, enabled: bool) -> Self {
        self.load_assets = enabled;
        self
    }

    /// Overrides the location of the asset manifest.
    #[must_use]
    pub fn with_asset_manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct FrameBreakdown {
    frame: Duration,
    update: Duration,
    render: Duration,
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
    update_accum: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
    avg_update: Duration,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsMetrics> {
        self.elapsed += breakdown.frame;
        self.frames = self.frames.saturating_add(1);
        self.update_accum += breakdown.update;
        self.render_accum += breakdown.render;

        self.frame_times.push_back(breakdown.frame);
        self.window_duration += breakdown.frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            let Some(removed) = self.frame_times.pop_front() else {
                break;
            };
            self.window_duration = self.window_duration.saturating_sub(removed);
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames;
        let update_accum = self.update_accum;
        let render_accum = self.render_accum;
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.update_accum = Duration::ZERO;
        self.render_accum = Duration::ZERO;

        if seconds <= f32::EPSILON || frames == 0 {
            return None;
        }

        let per_second = frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };

        Some(FpsMetrics {
            per_second,
            trailing_ten_seconds,
            avg_update: update_accum / frames,
            avg_render: render_accum / frames,
        })
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            load_assets,
            manifest_path,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: scene.grid.width().round() as i32,
            window_height: scene.grid.height().round() as i32,
            window_resizable: false,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let asset_paths = if load_assets {
            let paths = AssetPaths::from_manifest_path(&manifest_path)
                .context("failed to initialise game assets")?;
            if let Some(icon) = &paths.icon {
                config.icon = Some(load_window_icon(icon).with_context(|| {
                    format!("failed to load window icon from {}", icon.display())
                })?);
            }
            Some(paths)
        } else {
            None
        };

        let (init_sender, init_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let assets = match asset_paths.as_ref().map(GameAssets::from_paths).transpose() {
                Ok(assets) => assets,
                Err(error) => {
                    let _ = init_sender.send(Err(error.context("failed to initialise game assets")));
                    return;
                }
            };
            let _ = init_sender.send(Ok(()));

            macroquad::input::prevent_quit();
            let food_texture = assets.as_ref().map(GameAssets::food);
            let font = assets.as_ref().and_then(GameAssets::font);
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();
            let input_subscriber = register_input_subscriber();
            let mut key_recorder = KeyRecorder::new();

            loop {
                repeat_all_miniquad_input(&mut key_recorder, input_subscriber);
                let keyboard = key_recorder.take_input();
                if keyboard.quit_requested || macroquad::input::is_quit_requested() {
                    debug!("quit requested");
                    break;
                }

                let frame_dt = Duration::from_secs_f32(macroquad::time::get_frame_time().max(0.0));
                let update_start = Instant::now();
                update_scene(
                    frame_dt,
                    FrameInput {
                        controls: keyboard.controls,
                    },
                    &mut scene,
                );
                let update_duration = update_start.elapsed();

                let render_start = Instant::now();
                macroquad::window::clear_background(background);
                draw_walls(&scene.grid);
                draw_snake(&scene);
                draw_food(&scene, food_texture);
                draw_hud(&scene.hud, font);
                let render_duration = render_start.elapsed();

                let fps_metrics = fps_counter.record_frame(FrameBreakdown {
                    frame: frame_dt,
                    update: update_duration,
                    render: render_duration,
                });
                if show_fps {
                    if let Some(metrics) = fps_metrics {
                        info!(
                            fps = %format!("{:.2}", metrics.per_second),
                            fps_10s = %format!("{:.2}", metrics.trailing_ten_seconds),
                            update_ms = metrics.avg_update.as_secs_f64() * 1_000.0,
                            render_ms = metrics.avg_render.as_secs_f64() * 1_000.0,
                            "frame timing"
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        init_receiver.recv().unwrap_or_else(|_| Ok(()))?;

        Ok(())
    }
}

fn draw_walls(grid: &GridPresentation) {
    let color = to_macroquad_color(Color::WALL);
    for rect in grid.wall_rects() {
        macroquad::shapes::draw_rectangle(
            rect.origin.x,
            rect.origin.y,
            rect.size.x,
            rect.size.y,
            color,
        );
    }
}

fn draw_snake(scene: &Scene) {
    let fill = to_macroquad_color(scene.snake.style.fill());
    let outline = to_macroquad_color(Color::OUTLINE);
    for cell in &scene.snake.cells {
        let PixelRect { origin, size } = scene.grid.cell_rect(*cell);
        macroquad::shapes::draw_rectangle(origin.x, origin.y, size.x, size.y, fill);
        macroquad::shapes::draw_rectangle_lines(
            origin.x,
            origin.y,
            size.x,
            size.y,
            OUTLINE_THICKNESS,
            outline,
        );
    }
}

fn draw_food(scene: &Scene, texture: Option<Texture2D>) {
    let Some(cell) = scene.food else {
        return;
    };
    let PixelRect { origin, size } = scene.grid.cell_rect(cell);

    match texture {
        Some(texture) => macroquad::texture::draw_texture_ex(
            texture,
            origin.x,
            origin.y,
            macroquad::color::WHITE,
            DrawTextureParams {
                dest_size: Some(macroquad::math::Vec2::new(size.x, size.y)),
                ..DrawTextureParams::default()
            },
        ),
        None => macroquad::shapes::draw_rectangle(
            origin.x,
            origin.y,
            size.x,
            size.y,
            to_macroquad_color(Color::FOOD),
        ),
    }
}

fn draw_hud(lines: &[HudText], font: Option<Font>) {
    for line in lines {
        let baseline = macroquad::text::measure_text(&line.text, font, HUD_FONT_SIZE, 1.0).offset_y;
        let mut params = TextParams {
            font_size: HUD_FONT_SIZE,
            color: to_macroquad_color(line.tone.color()),
            ..TextParams::default()
        };
        if let Some(font) = font {
            params.font = font;
        }
        macroquad::text::draw_text_ex(
            &line.text,
            line.position.x,
            line.position.y + baseline,
            params,
        );
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

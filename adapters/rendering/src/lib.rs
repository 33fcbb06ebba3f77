#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for snake adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use snake_core::{CellCoord, ControlInput, Grid, PlayState};
use std::time::Duration;

/// Side length of a single grid cell in pixels.
pub const CELL_LENGTH: f32 = 20.0;

/// Pixel size used for every HUD text line.
pub const HUD_FONT_SIZE: u16 = 16;

/// Vertical distance between two stacked help lines.
const HUD_LINE_HEIGHT: f32 = 20.0;

/// Horizontal distance between the wall and the help text.
const HELP_INSET: f32 = 20.0;

/// Horizontal gap between the high-score and score labels.
const HIGH_SCORE_OFFSET: f32 = 180.0;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Background cleared before every frame.
    pub const BACKGROUND: Color = Color::from_rgb_u8(0, 0, 0);
    /// Fill of the four border walls.
    pub const WALL: Color = Color::from_rgb_u8(200, 200, 200);
    /// Fill of a live snake.
    pub const SNAKE: Color = Color::from_rgb_u8(0, 155, 0);
    /// Fill of a snake that crashed.
    pub const CRASHED_SNAKE: Color = Color::from_rgb_u8(255, 0, 0);
    /// Outline drawn around every snake cell.
    pub const OUTLINE: Color = Color::from_rgb_u8(0, 0, 0);
    /// Food fill used when no texture is available.
    pub const FOOD: Color = Color::from_rgb_u8(220, 30, 30);
    /// Text drawn over the dark playfield.
    pub const LIGHT_TEXT: Color = Color::from_rgb_u8(255, 255, 255);
    /// Text drawn over the light wall.
    pub const DARK_TEXT: Color = Color::from_rgb_u8(0, 0, 0);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Axis-aligned rectangle in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelRect {
    /// Top-left corner.
    pub origin: Vec2,
    /// Width and height.
    pub size: Vec2,
}

impl PixelRect {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Control inputs observed during the frame, in arrival order.
    pub controls: Vec<ControlInput>,
}

/// Describes the board, walls included, in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPresentation {
    /// Number of columns, walls included.
    pub columns: u32,
    /// Number of rows, walls included.
    pub rows: u32,
    /// Wall thickness in cells.
    pub wall_thickness: u32,
    /// Side length of a single cell in pixels.
    pub cell_length: f32,
}

impl GridPresentation {
    /// Creates a new grid descriptor.
    ///
    /// Returns an error when `cell_length` is not a positive, finite number.
    pub fn new(grid: Grid, cell_length: f32) -> Result<Self, RenderingError> {
        if !cell_length.is_finite() || cell_length <= 0.0 {
            return Err(RenderingError::InvalidCellLength { cell_length });
        }

        Ok(Self {
            columns: grid.columns(),
            rows: grid.rows(),
            wall_thickness: grid.wall_thickness(),
            cell_length,
        })
    }

    /// Total width in pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_length
    }

    /// Total height in pixels.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_length
    }

    /// Wall thickness in pixels.
    #[must_use]
    pub fn wall_width(&self) -> f32 {
        self.wall_thickness as f32 * self.cell_length
    }

    /// Pixel rectangle covered by a cell.
    #[must_use]
    pub fn cell_rect(&self, cell: CellCoord) -> PixelRect {
        PixelRect::new(
            Vec2::new(
                cell.column() as f32 * self.cell_length,
                cell.row() as f32 * self.cell_length,
            ),
            Vec2::splat(self.cell_length),
        )
    }

    /// The left, right, top and bottom walls, in that order.
    #[must_use]
    pub fn wall_rects(&self) -> [PixelRect; 4] {
        let width = self.width();
        let height = self.height();
        let wall = self.wall_width();
        [
            PixelRect::new(Vec2::ZERO, Vec2::new(wall, height)),
            PixelRect::new(Vec2::new(width - wall, 0.0), Vec2::new(wall, height)),
            PixelRect::new(Vec2::ZERO, Vec2::new(width, wall)),
            PixelRect::new(Vec2::new(0.0, height - wall), Vec2::new(width, wall)),
        ]
    }
}

/// Visual treatment applied to the snake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SnakeStyle {
    /// The snake is alive.
    Alive,
    /// The snake crashed and the game is over.
    Crashed,
}

impl SnakeStyle {
    /// Chooses the style matching a play state.
    #[must_use]
    pub const fn for_state(play_state: PlayState) -> Self {
        match play_state {
            PlayState::GameOver => Self::Crashed,
            PlayState::NotPlaying | PlayState::Playing | PlayState::Paused => Self::Alive,
        }
    }

    /// Fill color of each snake cell.
    #[must_use]
    pub const fn fill(self) -> Color {
        match self {
            Self::Alive => Color::SNAKE,
            Self::Crashed => Color::CRASHED_SNAKE,
        }
    }
}

/// Snake cells, head first, with their visual style.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnakePresentation {
    /// Cells occupied by the snake, head first.
    pub cells: Vec<CellCoord>,
    /// Visual treatment of every cell.
    pub style: SnakeStyle,
}

impl SnakePresentation {
    /// Creates a new snake descriptor.
    #[must_use]
    pub fn new(cells: Vec<CellCoord>, style: SnakeStyle) -> Self {
        Self { cells, style }
    }
}

/// Brightness class of a HUD label, picked for contrast with what lies beneath.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextTone {
    /// Drawn over the dark playfield.
    Light,
    /// Drawn over the light wall.
    Dark,
}

impl TextTone {
    /// Color used for the text.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Light => Color::LIGHT_TEXT,
            Self::Dark => Color::DARK_TEXT,
        }
    }
}

/// Single line of HUD text anchored at its top-left corner.
#[derive(Clone, Debug, PartialEq)]
pub struct HudText {
    /// Text content.
    pub text: String,
    /// Top-left corner in pixels.
    pub position: Vec2,
    /// Brightness class.
    pub tone: TextTone,
}

impl HudText {
    /// Creates a new HUD line.
    #[must_use]
    pub fn new(text: impl Into<String>, position: Vec2, tone: TextTone) -> Self {
        Self {
            text: text.into(),
            position,
            tone,
        }
    }
}

/// Lays out the score, high score and help lines for a play state.
///
/// The score shows once a game has started, the high score only after a crash.
/// Help lines explain the next available action.
#[must_use]
pub fn hud_lines(
    grid: &GridPresentation,
    play_state: PlayState,
    score: u32,
    high_score: u32,
) -> Vec<HudText> {
    let score_x = (grid.width() / 5.0).floor() * 4.0;
    let help_x = grid.wall_width() + HELP_INSET;
    let mut lines = Vec::new();

    match play_state {
        PlayState::NotPlaying => {
            let top = grid.wall_width();
            lines.push(HudText::new(
                "Press arrow key to play",
                Vec2::new(help_x, top),
                TextTone::Light,
            ));
            lines.push(HudText::new(
                "Press space to pause/resume",
                Vec2::new(help_x, top + HUD_LINE_HEIGHT),
                TextTone::Light,
            ));
        }
        PlayState::Playing => {}
        PlayState::Paused => lines.push(HudText::new(
            "Press space to pause/resume",
            Vec2::new(help_x, 0.0),
            TextTone::Dark,
        )),
        PlayState::GameOver => {
            lines.push(HudText::new(
                "Press space to play again",
                Vec2::new(help_x, 0.0),
                TextTone::Dark,
            ));
            lines.push(HudText::new(
                format!("highest score: {high_score}"),
                Vec2::new(score_x - HIGH_SCORE_OFFSET, 0.0),
                TextTone::Dark,
            ));
        }
    }

    if play_state.has_started() {
        lines.push(HudText::new(
            format!("score: {score}"),
            Vec2::new(score_x, 0.0),
            TextTone::Dark,
        ));
    }

    lines
}

/// Scene description combining the board, the snake, the food and the HUD.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Board geometry, walls included.
    pub grid: GridPresentation,
    /// Snake to draw.
    pub snake: SnakePresentation,
    /// Cell holding the food, if any.
    pub food: Option<CellCoord>,
    /// Text overlays.
    pub hud: Vec<HudText>,
    /// Active play state.
    pub play_state: PlayState,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(
        grid: GridPresentation,
        snake: SnakePresentation,
        food: Option<CellCoord>,
        hud: Vec<HudText>,
        play_state: PlayState,
    ) -> Self {
        Self {
            grid,
            snake,
            food,
            hud,
            play_state,
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting snake scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the elapsed frame time and
    /// the per-frame input captured by the adapter, and may mutate the scene
    /// before it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RenderingError {
    /// Cells must have a positive size.
    #[error("cell_length must be positive and finite (received {cell_length})")]
    InvalidCellLength {
        /// Provided cell length that failed validation.
        cell_length: f32,
    },
}

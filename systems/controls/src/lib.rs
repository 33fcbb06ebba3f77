#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns player inputs into world commands.

use snake_core::{Command, ControlInput, PlayState};

/// Maps directional keys and the action key onto state-machine requests.
///
/// The action key is overloaded: it pauses a running game, resumes a paused
/// one and restarts after a crash. Inputs that have no meaning in the current
/// state produce no command.
#[derive(Debug, Default)]
pub struct Controls;

impl Controls {
    /// Creates a new controls system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Consumes the inputs gathered since the last call, in arrival order.
    ///
    /// `play_state` is the world's state before any of the inputs apply; the
    /// system tracks the transitions its own commands will cause so several
    /// inputs within one frame resolve against the right state.
    pub fn handle(&self, inputs: &[ControlInput], play_state: PlayState, out: &mut Vec<Command>) {
        let mut state = play_state;
        for input in inputs {
            let Some((command, next_state)) = resolve(*input, state) else {
                continue;
            };
            out.push(command);
            state = next_state;
        }
    }
}

fn resolve(input: ControlInput, state: PlayState) -> Option<(Command, PlayState)> {
    match (input, state) {
        (ControlInput::Steer(direction), PlayState::NotPlaying | PlayState::Playing) => {
            Some((Command::Steer { direction }, PlayState::Playing))
        }
        (ControlInput::Steer(_), PlayState::Paused | PlayState::GameOver) => None,
        (ControlInput::Action, PlayState::Playing) => Some((Command::Pause, PlayState::Paused)),
        (ControlInput::Action, PlayState::Paused) => Some((Command::Resume, PlayState::Playing)),
        (ControlInput::Action, PlayState::GameOver) => Some((Command::Restart, PlayState::Playing)),
        (ControlInput::Action, PlayState::NotPlaying) => None,
    }
}

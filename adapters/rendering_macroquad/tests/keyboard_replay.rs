use macroquad::input::KeyCode;
use snake_core::{ControlInput, Direction};
use snake_rendering_macroquad::{key_action, KeyAction, KeyRecorder, KeyboardInput};

#[test]
fn arrows_and_letters_steer_alike() {
    let pairs = [
        (KeyCode::Up, KeyCode::W, Direction::North),
        (KeyCode::Right, KeyCode::D, Direction::East),
        (KeyCode::Down, KeyCode::S, Direction::South),
        (KeyCode::Left, KeyCode::A, Direction::West),
    ];

    for (arrow, letter, direction) in pairs {
        let expected = Some(KeyAction::Control(ControlInput::Steer(direction)));
        assert_eq!(key_action(arrow), expected);
        assert_eq!(key_action(letter), expected);
    }
}

#[test]
fn space_is_the_action_key_and_escape_quits() {
    assert_eq!(
        key_action(KeyCode::Space),
        Some(KeyAction::Control(ControlInput::Action))
    );
    assert_eq!(key_action(KeyCode::Escape), Some(KeyAction::Quit));
    assert_eq!(key_action(KeyCode::Enter), None);
}

#[test]
fn frame_input_keeps_key_order_and_drops_unbound_keys() {
    let keys = [KeyCode::Left, KeyCode::Tab, KeyCode::Space, KeyCode::Up];

    let first = KeyboardInput::from_pressed_keys(keys);
    let second = KeyboardInput::from_pressed_keys(keys);

    assert_eq!(
        first.controls,
        vec![
            ControlInput::Steer(Direction::West),
            ControlInput::Action,
            ControlInput::Steer(Direction::North),
        ]
    );
    assert!(!first.quit_requested);
    assert_eq!(first, second);
}

#[test]
fn quit_is_reported_alongside_controls() {
    let input = KeyboardInput::from_pressed_keys([KeyCode::Down, KeyCode::Escape]);

    assert!(input.quit_requested);
    assert_eq!(input.controls, vec![ControlInput::Steer(Direction::South)]);
}

#[test]
fn recorder_keeps_arrival_order_across_bindings() {
    let mut recorder = KeyRecorder::new();
    recorder.record(KeyCode::Space, false);
    recorder.record(KeyCode::Up, false);

    let input = recorder.take_input();

    assert_eq!(
        input.controls,
        vec![ControlInput::Action, ControlInput::Steer(Direction::North)]
    );
}

#[test]
fn recorder_ignores_auto_repeat_and_drains_each_frame() {
    let mut recorder = KeyRecorder::new();
    recorder.record(KeyCode::Left, false);
    recorder.record(KeyCode::Left, true);
    recorder.record(KeyCode::Left, true);

    assert_eq!(
        recorder.take_input().controls,
        vec![ControlInput::Steer(Direction::West)]
    );
    assert_eq!(recorder.take_input(), KeyboardInput::default());
}

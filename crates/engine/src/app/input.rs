use std::collections::HashMap;

use super::scene::{InputSnapshot, Vec2};

pub const JOYSTICK_MAX_DISTANCE: f32 = 50.0;
pub const DISPLAY_SCALE_DEFAULT: f32 = 1.0;
pub const DISPLAY_SCALE_MIN: f32 = 0.5;
pub const DISPLAY_SCALE_MAX: f32 = 2.0;
pub const DISPLAY_SCALE_STEP: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
}

const ACTION_COUNT: usize = 4;
const MOVE_ACTIONS: [InputAction; ACTION_COUNT] = [
    InputAction::MoveUp,
    InputAction::MoveDown,
    InputAction::MoveLeft,
    InputAction::MoveRight,
];

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
        }
    }

    /// Arrow keys and WASD. Letter aliases match in either case.
    pub fn from_key(key: &str) -> Option<Self> {
        match normalize_key(key).as_str() {
            "ArrowUp" | "w" => Some(Self::MoveUp),
            "ArrowDown" | "s" => Some(Self::MoveDown),
            "ArrowLeft" | "a" => Some(Self::MoveLeft),
            "ArrowRight" | "d" => Some(Self::MoveRight),
            _ => None,
        }
    }

    /// Unit step contributed while the action is held. Screen space, y grows downward.
    pub fn unit_step(self) -> Vec2 {
        match self {
            InputAction::MoveUp => Vec2 { x: 0.0, y: -1.0 },
            InputAction::MoveDown => Vec2 { x: 0.0, y: 1.0 },
            InputAction::MoveLeft => Vec2 { x: -1.0, y: 0.0 },
            InputAction::MoveRight => Vec2 { x: 1.0, y: 0.0 },
        }
    }
}

/// Discrete input delivered by the host, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    Interact,
    DragStart(Vec2),
    DragMove(Vec2),
    DragEnd,
    PinchStart(Vec2, Vec2),
    PinchMove(Vec2, Vec2),
    PinchEnd,
}

fn normalize_key(key: &str) -> String {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(single), None) => single.to_lowercase().collect(),
        _ => key.to_string(),
    }
}

fn is_interact_key(key: &str) -> bool {
    matches!(key, " " | "Space" | "Enter")
}

/// Drag-driven movement vector. The origin is fixed at drag start and the
/// vector length never exceeds [`JOYSTICK_MAX_DISTANCE`].
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualJoystick {
    origin: Option<Vec2>,
    vector: Vec2,
}

impl VirtualJoystick {
    pub fn start(&mut self, point: Vec2) {
        self.origin = Some(point);
        self.vector = Vec2::ZERO;
    }

    pub fn move_to(&mut self, point: Vec2) {
        let Some(origin) = self.origin else {
            return;
        };
        self.vector = clamp_joystick_vector(point - origin);
    }

    pub fn release(&mut self) {
        self.origin = None;
        self.vector = Vec2::ZERO;
    }

    pub fn is_active(&self) -> bool {
        self.origin.is_some()
    }

    pub fn vector(&self) -> Vec2 {
        self.vector
    }
}

fn clamp_joystick_vector(delta: Vec2) -> Vec2 {
    if !delta.x.is_finite() || !delta.y.is_finite() {
        return Vec2::ZERO;
    }
    let distance = delta.length();
    if distance <= JOYSTICK_MAX_DISTANCE {
        return delta;
    }
    delta * (JOYSTICK_MAX_DISTANCE / distance)
}

/// Cosmetic scene scale driven by pinch gestures and zoom keys.
#[derive(Debug, Clone, Copy)]
pub struct DisplayScale {
    scale: f32,
    pinch_start_distance: Option<f32>,
    pinch_start_scale: f32,
}

impl Default for DisplayScale {
    fn default() -> Self {
        Self {
            scale: DISPLAY_SCALE_DEFAULT,
            pinch_start_distance: None,
            pinch_start_scale: DISPLAY_SCALE_DEFAULT,
        }
    }
}

impl DisplayScale {
    pub fn value(&self) -> f32 {
        self.scale
    }

    pub fn pinch_start(&mut self, a: Vec2, b: Vec2) {
        let distance = a.distance(b);
        if distance.is_finite() && distance > 0.0 {
            self.pinch_start_distance = Some(distance);
            self.pinch_start_scale = self.scale;
        } else {
            self.pinch_start_distance = None;
        }
    }

    pub fn pinch_move(&mut self, a: Vec2, b: Vec2) {
        let Some(start_distance) = self.pinch_start_distance else {
            return;
        };
        let ratio = a.distance(b) / start_distance;
        self.set_clamped(self.pinch_start_scale * ratio);
    }

    pub fn pinch_end(&mut self) {
        self.pinch_start_distance = None;
    }

    pub fn apply_steps(&mut self, steps: i32) {
        if steps == 0 {
            return;
        }
        self.set_clamped(self.scale + steps as f32 * DISPLAY_SCALE_STEP);
    }

    fn set_clamped(&mut self, scale: f32) {
        self.scale = clamp_display_scale(scale);
    }
}

pub(crate) fn clamp_display_scale(scale: f32) -> f32 {
    if !scale.is_finite() {
        return DISPLAY_SCALE_DEFAULT;
    }
    scale.clamp(DISPLAY_SCALE_MIN, DISPLAY_SCALE_MAX)
}

/// Folds discrete input events into per-tick state.
///
/// Held keys and the joystick are level state; interaction presses, the
/// state-dump key and quit are edges consumed by [`Self::snapshot_for_tick`].
#[derive(Debug, Default)]
pub struct InputAggregator {
    keys: HashMap<String, bool>,
    joystick: VirtualJoystick,
    display_scale: DisplayScale,
    pending_interacts: u32,
    dump_state_pressed_edge: bool,
    quit_requested: bool,
}

impl InputAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(key) => self.handle_key(key, true),
            InputEvent::KeyUp(key) => self.handle_key(key, false),
            InputEvent::Interact => self.queue_interact(),
            InputEvent::DragStart(point) => self.joystick.start(point),
            InputEvent::DragMove(point) => self.joystick.move_to(point),
            InputEvent::DragEnd => self.joystick.release(),
            InputEvent::PinchStart(a, b) => self.display_scale.pinch_start(a, b),
            InputEvent::PinchMove(a, b) => self.display_scale.pinch_move(a, b),
            InputEvent::PinchEnd => self.display_scale.pinch_end(),
        }
    }

    pub fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_key_down(&self, key: &str) -> bool {
        self.keys
            .get(&normalize_key(key))
            .copied()
            .unwrap_or(false)
    }

    pub fn joystick(&self) -> &VirtualJoystick {
        &self.joystick
    }

    pub fn display_scale(&self) -> f32 {
        self.display_scale.value()
    }

    /// Key steps plus the joystick vector scaled by `joystick_scale`.
    pub fn movement_vector(&self, joystick_scale: f32) -> Vec2 {
        self.action_states().movement_vector() + self.joystick.vector() * joystick_scale
    }

    pub fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.action_states(),
            self.joystick.vector(),
            self.pending_interacts,
            self.display_scale.value(),
            self.dump_state_pressed_edge,
            self.quit_requested,
        );
        self.pending_interacts = 0;
        self.dump_state_pressed_edge = false;
        snapshot
    }

    fn handle_key(&mut self, key: String, is_down: bool) {
        let key = normalize_key(&key);
        let was_down = self.keys.get(&key).copied().unwrap_or(false);
        let pressed_edge = is_down && !was_down;

        if pressed_edge {
            if is_interact_key(&key) {
                self.queue_interact();
            }
            match key.as_str() {
                "=" | "+" => self.display_scale.apply_steps(1),
                "-" => self.display_scale.apply_steps(-1),
                "F3" => self.dump_state_pressed_edge = true,
                "Escape" => self.mark_quit_requested(),
                _ => {}
            }
        }

        self.keys.insert(key, is_down);
    }

    fn queue_interact(&mut self) {
        self.pending_interacts = self.pending_interacts.saturating_add(1);
    }

    fn action_states(&self) -> ActionStates {
        let mut states = ActionStates::default();
        for (key, is_down) in &self.keys {
            if !*is_down {
                continue;
            }
            if let Some(action) = InputAction::from_key(key) {
                states.set(action, true);
            }
        }
        states
    }
}

impl ActionStates {
    pub(crate) fn movement_vector(&self) -> Vec2 {
        MOVE_ACTIONS
            .into_iter()
            .filter(|action| self.is_down(*action))
            .fold(Vec2::ZERO, |sum, action| sum + action.unit_step())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_down(input: &mut InputAggregator, key: &str) {
        input.apply(InputEvent::KeyDown(key.to_string()));
    }

    fn key_up(input: &mut InputAggregator, key: &str) {
        input.apply(InputEvent::KeyUp(key.to_string()));
    }

    fn assert_vec2_close(actual: Vec2, expected: Vec2) {
        assert!(
            (actual.x - expected.x).abs() < 0.0001 && (actual.y - expected.y).abs() < 0.0001,
            "{actual:?} vs {expected:?}"
        );
    }

    #[test]
    fn wasd_and_arrow_keys_map_to_actions() {
        assert_eq!(InputAction::from_key("ArrowUp"), Some(InputAction::MoveUp));
        assert_eq!(InputAction::from_key("w"), Some(InputAction::MoveUp));
        assert_eq!(InputAction::from_key("W"), Some(InputAction::MoveUp));
        assert_eq!(InputAction::from_key("ArrowLeft"), Some(InputAction::MoveLeft));
        assert_eq!(InputAction::from_key("A"), Some(InputAction::MoveLeft));
        assert_eq!(InputAction::from_key("s"), Some(InputAction::MoveDown));
        assert_eq!(InputAction::from_key("D"), Some(InputAction::MoveRight));
        assert_eq!(InputAction::from_key("q"), None);
        assert_eq!(InputAction::from_key("arrowup"), None);
    }

    #[test]
    fn absent_input_yields_zero_vector() {
        let input = InputAggregator::new();
        assert_eq!(input.movement_vector(0.1), Vec2::ZERO);
    }

    #[test]
    fn opposite_keys_cancel_and_diagonals_sum() {
        let mut input = InputAggregator::new();
        key_down(&mut input, "ArrowLeft");
        key_down(&mut input, "d");
        assert_vec2_close(input.movement_vector(0.1), Vec2::ZERO);

        key_up(&mut input, "d");
        key_down(&mut input, "W");
        assert_vec2_close(input.movement_vector(0.1), Vec2 { x: -1.0, y: -1.0 });
    }

    #[test]
    fn letter_keys_are_case_insensitive_for_release() {
        let mut input = InputAggregator::new();
        key_down(&mut input, "W");
        key_up(&mut input, "w");
        assert!(!input.is_key_down("W"));
        assert_eq!(input.movement_vector(0.1), Vec2::ZERO);
    }

    #[test]
    fn two_aliases_held_release_one_keeps_moving() {
        let mut input = InputAggregator::new();
        key_down(&mut input, "ArrowRight");
        key_down(&mut input, "d");
        key_up(&mut input, "ArrowRight");
        assert_vec2_close(input.movement_vector(0.1), Vec2 { x: 1.0, y: 0.0 });
    }

    #[test]
    fn joystick_vector_is_scaled_and_added_to_keys() {
        let mut input = InputAggregator::new();
        key_down(&mut input, "ArrowDown");
        input.apply(InputEvent::DragStart(Vec2 { x: 10.0, y: 10.0 }));
        input.apply(InputEvent::DragMove(Vec2 { x: 40.0, y: 10.0 }));
        assert_vec2_close(input.movement_vector(0.1), Vec2 { x: 3.0, y: 1.0 });
    }

    #[test]
    fn joystick_magnitude_never_exceeds_max() {
        let mut joystick = VirtualJoystick::default();
        joystick.start(Vec2 { x: 100.0, y: 100.0 });
        for point in [
            Vec2 { x: 1000.0, y: -400.0 },
            Vec2 { x: 100.0, y: 151.0 },
            Vec2 { x: -9.0e30, y: 4.0e30 },
            Vec2 { x: 130.0, y: 140.0 },
        ] {
            joystick.move_to(point);
            assert!(
                joystick.vector().length() <= JOYSTICK_MAX_DISTANCE + 0.001,
                "point={point:?} vector={:?}",
                joystick.vector()
            );
        }
    }

    #[test]
    fn joystick_clamp_preserves_direction() {
        let mut joystick = VirtualJoystick::default();
        joystick.start(Vec2::ZERO);
        joystick.move_to(Vec2 { x: 300.0, y: 400.0 });
        assert_vec2_close(joystick.vector(), Vec2 { x: 30.0, y: 40.0 });
    }

    #[test]
    fn joystick_non_finite_delta_is_zeroed() {
        let mut joystick = VirtualJoystick::default();
        joystick.start(Vec2::ZERO);
        joystick.move_to(Vec2 {
            x: f32::NAN,
            y: 1.0,
        });
        assert_eq!(joystick.vector(), Vec2::ZERO);
        joystick.move_to(Vec2 {
            x: f32::INFINITY,
            y: 0.0,
        });
        assert_eq!(joystick.vector(), Vec2::ZERO);
    }

    #[test]
    fn joystick_resets_on_release_and_ignores_moves_without_start() {
        let mut input = InputAggregator::new();
        input.apply(InputEvent::DragMove(Vec2 { x: 30.0, y: 0.0 }));
        assert_eq!(input.joystick().vector(), Vec2::ZERO);

        input.apply(InputEvent::DragStart(Vec2::ZERO));
        input.apply(InputEvent::DragMove(Vec2 { x: 30.0, y: 0.0 }));
        assert!(input.joystick().is_active());
        input.apply(InputEvent::DragEnd);
        assert!(!input.joystick().is_active());
        assert_eq!(input.joystick().vector(), Vec2::ZERO);
    }

    #[test]
    fn interact_presses_are_counted_and_consumed_per_tick() {
        let mut input = InputAggregator::new();
        input.apply(InputEvent::Interact);
        key_down(&mut input, " ");
        let first = input.snapshot_for_tick();
        let second = input.snapshot_for_tick();

        assert_eq!(first.interact_presses(), 2);
        assert_eq!(second.interact_presses(), 0);
    }

    #[test]
    fn held_interact_key_does_not_repeat() {
        let mut input = InputAggregator::new();
        key_down(&mut input, "Enter");
        key_down(&mut input, "Enter");
        assert_eq!(input.snapshot_for_tick().interact_presses(), 1);

        key_up(&mut input, "Enter");
        key_down(&mut input, "Enter");
        assert_eq!(input.snapshot_for_tick().interact_presses(), 1);
    }

    #[test]
    fn dump_state_key_is_edge_triggered_for_single_tick() {
        let mut input = InputAggregator::new();
        key_down(&mut input, "F3");
        assert!(input.snapshot_for_tick().dump_state_pressed());
        key_down(&mut input, "F3");
        assert!(!input.snapshot_for_tick().dump_state_pressed());
    }

    #[test]
    fn escape_requests_quit() {
        let mut input = InputAggregator::new();
        key_down(&mut input, "Escape");
        assert!(input.quit_requested());
        assert!(input.snapshot_for_tick().quit_requested());
    }

    #[test]
    fn pinch_scale_is_relative_to_gesture_start() {
        let mut scale = DisplayScale::default();
        scale.pinch_start(Vec2::ZERO, Vec2 { x: 100.0, y: 0.0 });
        scale.pinch_move(Vec2::ZERO, Vec2 { x: 150.0, y: 0.0 });
        assert!((scale.value() - 1.5).abs() < 0.0001);
        scale.pinch_move(Vec2::ZERO, Vec2 { x: 120.0, y: 0.0 });
        assert!((scale.value() - 1.2).abs() < 0.0001);
        scale.pinch_end();

        scale.pinch_start(Vec2::ZERO, Vec2 { x: 0.0, y: 60.0 });
        scale.pinch_move(Vec2::ZERO, Vec2 { x: 0.0, y: 30.0 });
        assert!((scale.value() - 0.6).abs() < 0.0001);
    }

    #[test]
    fn pinch_scale_is_always_clamped() {
        let mut scale = DisplayScale::default();
        scale.pinch_start(Vec2::ZERO, Vec2 { x: 10.0, y: 0.0 });
        scale.pinch_move(Vec2::ZERO, Vec2 { x: 1000.0, y: 0.0 });
        assert_eq!(scale.value(), DISPLAY_SCALE_MAX);
        scale.pinch_move(Vec2::ZERO, Vec2 { x: 0.01, y: 0.0 });
        assert_eq!(scale.value(), DISPLAY_SCALE_MIN);
        scale.pinch_move(Vec2::ZERO, Vec2::ZERO);
        assert_eq!(scale.value(), DISPLAY_SCALE_MIN);
    }

    #[test]
    fn degenerate_pinch_start_is_ignored() {
        let mut scale = DisplayScale::default();
        scale.pinch_start(Vec2::ZERO, Vec2::ZERO);
        scale.pinch_move(Vec2::ZERO, Vec2 { x: 500.0, y: 0.0 });
        assert_eq!(scale.value(), DISPLAY_SCALE_DEFAULT);
    }

    #[test]
    fn zoom_keys_step_and_clamp_display_scale() {
        let mut input = InputAggregator::new();
        key_down(&mut input, "=");
        assert!((input.display_scale() - 1.1).abs() < 0.0001);
        key_down(&mut input, "=");
        assert!((input.display_scale() - 1.1).abs() < 0.0001);
        key_up(&mut input, "=");

        for _ in 0..30 {
            key_down(&mut input, "-");
            key_up(&mut input, "-");
        }
        assert_eq!(input.display_scale(), DISPLAY_SCALE_MIN);
        assert_eq!(input.snapshot_for_tick().display_scale(), DISPLAY_SCALE_MIN);
    }

    #[test]
    fn clamp_display_scale_rejects_non_finite() {
        assert_eq!(clamp_display_scale(f32::NAN), DISPLAY_SCALE_DEFAULT);
        assert_eq!(clamp_display_scale(3.0), DISPLAY_SCALE_MAX);
        assert_eq!(clamp_display_scale(0.1), DISPLAY_SCALE_MIN);
    }
}

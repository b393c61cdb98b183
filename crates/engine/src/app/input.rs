#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    Jump,
    Fire,
    Interact,
    Quit,
}

const ACTION_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
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
            InputAction::MoveForward => 0,
            InputAction::MoveBackward => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Jump => 4,
            InputAction::Fire => 5,
            InputAction::Interact => 6,
            InputAction::Quit => 7,
        }
    }
}

/// Normalized intent for one simulation tick, independent of whether it came
/// from a keyboard, a touch stick or a script.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IntentSnapshot {
    actions: ActionStates,
    look_delta_yaw: f32,
    look_delta_pitch: f32,
}

impl IntentSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_look_delta(mut self, yaw: f32, pitch: f32) -> Self {
        self.look_delta_yaw = if yaw.is_finite() { yaw } else { 0.0 };
        self.look_delta_pitch = if pitch.is_finite() { pitch } else { 0.0 };
        self
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn jump_pressed(&self) -> bool {
        self.is_down(InputAction::Jump)
    }

    pub fn fire_pressed(&self) -> bool {
        self.is_down(InputAction::Fire)
    }

    pub fn interact_pressed(&self) -> bool {
        self.is_down(InputAction::Interact)
    }

    pub fn quit_requested(&self) -> bool {
        self.is_down(InputAction::Quit)
    }

    pub fn look_delta(&self) -> (f32, f32) {
        (self.look_delta_yaw, self.look_delta_pitch)
    }
}

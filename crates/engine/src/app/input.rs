/// Logical actions held down across ticks. Edge-triggered buttons (attack,
/// interact, jump, menu, descend) are tracked separately by [`InputCollector`]
/// so each press is visible to exactly one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Quit,
}

const ACTION_COUNT: usize = 5;

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
            InputAction::Quit => 4,
        }
    }
}

/// Per-tick view of player input. Immutable once produced; rooms read it
/// during `update`. Builder-style `with_*` methods exist for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    attack_pressed: bool,
    interact_pressed: bool,
    jump_pressed: bool,
    menu_pressed: bool,
    descend_pressed: bool,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn attack_pressed(&self) -> bool {
        self.attack_pressed
    }

    pub fn interact_pressed(&self) -> bool {
        self.interact_pressed
    }

    pub fn jump_pressed(&self) -> bool {
        self.jump_pressed
    }

    pub fn menu_pressed(&self) -> bool {
        self.menu_pressed
    }

    pub fn descend_pressed(&self) -> bool {
        self.descend_pressed
    }

    /// Either confirm-style button advances dialogue.
    pub fn confirm_pressed(&self) -> bool {
        self.attack_pressed || self.interact_pressed
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_attack_pressed(mut self, pressed: bool) -> Self {
        self.attack_pressed = pressed;
        self
    }

    pub fn with_interact_pressed(mut self, pressed: bool) -> Self {
        self.interact_pressed = pressed;
        self
    }

    pub fn with_jump_pressed(mut self, pressed: bool) -> Self {
        self.jump_pressed = pressed;
        self
    }

    pub fn with_menu_pressed(mut self, pressed: bool) -> Self {
        self.menu_pressed = pressed;
        self
    }

    pub fn with_descend_pressed(mut self, pressed: bool) -> Self {
        self.descend_pressed = pressed;
        self
    }
}

/// Accumulates raw input between simulation ticks. Frontends feed logical
/// key states in; `snapshot_for_tick` drains press edges so a held key
/// produces exactly one press.
#[derive(Debug, Default)]
pub struct InputCollector {
    quit_requested: bool,
    action_states: ActionStates,
    attack: EdgeButton,
    interact: EdgeButton,
    jump: EdgeButton,
    menu: EdgeButton,
    descend: EdgeButton,
}

#[derive(Debug, Default)]
struct EdgeButton {
    is_down: bool,
    pressed_edge: bool,
}

impl EdgeButton {
    fn set_down(&mut self, is_down: bool) {
        if is_down && !self.is_down {
            self.pressed_edge = true;
        }
        self.is_down = is_down;
    }

    fn take_edge(&mut self) -> bool {
        let pressed = self.pressed_edge;
        self.pressed_edge = false;
        pressed
    }
}

impl InputCollector {
    pub fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    pub fn set_action_down(&mut self, action: InputAction, is_down: bool) {
        self.action_states.set(action, is_down);
        if action == InputAction::Quit && is_down {
            self.mark_quit_requested();
        }
    }

    pub fn set_attack_down(&mut self, is_down: bool) {
        self.attack.set_down(is_down);
    }

    pub fn set_interact_down(&mut self, is_down: bool) {
        self.interact.set_down(is_down);
    }

    pub fn set_jump_down(&mut self, is_down: bool) {
        self.jump.set_down(is_down);
    }

    pub fn set_menu_down(&mut self, is_down: bool) {
        self.menu.set_down(is_down);
    }

    pub fn set_descend_down(&mut self, is_down: bool) {
        self.descend.set_down(is_down);
    }

    pub fn snapshot_for_tick(&mut self) -> InputSnapshot {
        InputSnapshot {
            quit_requested: self.quit_requested,
            actions: self.action_states,
            attack_pressed: self.attack.take_edge(),
            interact_pressed: self.interact.take_edge(),
            jump_pressed: self.jump.take_edge(),
            menu_pressed: self.menu.take_edge(),
            descend_pressed: self.descend.take_edge(),
        }
    }
}

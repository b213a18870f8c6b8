use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::entities::Intents;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
    StrafeLeft,
    StrafeRight,
    Fire,
    Reload,
    /// Zero-based weapon slot.
    SelectWeapon(usize),
    Confirm,
}

impl Command {
    #[inline]
    pub fn is_held(self) -> bool {
        matches!(
            self,
            Command::Forward
                | Command::Backward
                | Command::TurnLeft
                | Command::TurnRight
                | Command::StrafeLeft
                | Command::StrafeRight
        )
    }
}

pub fn command_for_key(code: KeyCode) -> Option<Command> {
    let cmd = match code {
        KeyCode::KeyW | KeyCode::ArrowUp => Command::Forward,
        KeyCode::KeyS | KeyCode::ArrowDown => Command::Backward,
        KeyCode::ArrowLeft | KeyCode::KeyQ => Command::TurnLeft,
        KeyCode::ArrowRight | KeyCode::KeyE => Command::TurnRight,
        KeyCode::KeyA => Command::StrafeLeft,
        KeyCode::KeyD => Command::StrafeRight,
        KeyCode::Space | KeyCode::ControlLeft => Command::Fire,
        KeyCode::KeyR => Command::Reload,
        KeyCode::Enter | KeyCode::NumpadEnter => Command::Confirm,
        KeyCode::Digit1 => Command::SelectWeapon(0),
        KeyCode::Digit2 => Command::SelectWeapon(1),
        KeyCode::Digit3 => Command::SelectWeapon(2),
        KeyCode::Digit4 => Command::SelectWeapon(3),
        KeyCode::Digit5 => Command::SelectWeapon(4),
        _ => return None,
    };
    Some(cmd)
}

/// Pointer clicks fire.
pub fn command_for_mouse(button: MouseButton) -> Option<Command> {
    (button == MouseButton::Left).then_some(Command::Fire)
}

#[derive(Debug, Default)]
pub struct InputState {
    intents: Intents,
    pending: Vec<Command>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `repeat` is the OS key-repeat flag; repeats never re-trigger actions.
    pub fn press(&mut self, cmd: Command, repeat: bool) {
        if cmd.is_held() {
            self.set_held(cmd, true);
        } else if !repeat {
            self.pending.push(cmd);
        }
    }

    pub fn release(&mut self, cmd: Command) {
        if cmd.is_held() {
            self.set_held(cmd, false);
        }
    }

    fn set_held(&mut self, cmd: Command, down: bool) {
        let i = &mut self.intents;
        match cmd {
            Command::Forward => i.forward = down,
            Command::Backward => i.backward = down,
            Command::TurnLeft => i.turn_left = down,
            Command::TurnRight => i.turn_right = down,
            Command::StrafeLeft => i.strafe_left = down,
            Command::StrafeRight => i.strafe_right = down,
            _ => {}
        }
    }

    #[inline]
    pub fn intents(&self) -> Intents {
        self.intents
    }

    /// Take every queued edge-triggered command, oldest first.
    pub fn drain(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.pending)
    }

    /// Drop held intents, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.intents = Intents::default();
        self.pending.clear();
    }
}

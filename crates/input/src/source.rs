use glam::Vec2;
use std::collections::HashSet;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Wheel units reported per scrolled line.
pub const WHEEL_DELTA_PER_LINE: f32 = 120.0;

/// Keys held at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardSnapshot {
    down: HashSet<KeyCode>,
}

impl KeyboardSnapshot {
    pub fn from_keys<I: IntoIterator<Item = KeyCode>>(keys: I) -> Self {
        Self {
            down: keys.into_iter().collect(),
        }
    }

    pub fn is_down(&self, key: KeyCode) -> bool {
        self.down.contains(&key)
    }

    /// Whether the whole chord is held. An empty chord is never down.
    pub fn are_keys_down(&self, keys: &[KeyCode]) -> bool {
        !keys.is_empty() && keys.iter().all(|k| self.is_down(*k))
    }
}

/// Input state sampled by camera control.
pub trait InputSource {
    fn is_focused(&self) -> bool;
    fn keyboard(&self) -> KeyboardSnapshot;
    /// Right mouse button.
    fn is_secondary_down(&self) -> bool;
    /// Cursor position in window pixels.
    fn cursor_position(&self) -> Vec2;
}

/// Input state tracked from winit window events.
#[derive(Debug, Clone, Default)]
pub struct WindowInput {
    focused: bool,
    keys: HashSet<KeyCode>,
    secondary: bool,
    cursor: Vec2,
}

impl WindowInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a window event into the tracked state. Returns the wheel delta
    /// when the event is a scroll.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> Option<f32> {
        match event {
            WindowEvent::Focused(focused) => self.set_focused(*focused),
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.set_key(code, event.state == ElementState::Pressed);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.set_button(*button, *state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.set_cursor(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::MouseWheel { delta, .. } => return Some(wheel_delta(delta)),
            _ => {}
        }
        None
    }

    /// Losing focus releases everything held.
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if !focused {
            self.keys.clear();
            self.secondary = false;
        }
    }

    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.keys.insert(key);
        } else {
            self.keys.remove(&key);
        }
    }

    pub fn set_button(&mut self, button: MouseButton, pressed: bool) {
        if button == MouseButton::Right {
            self.secondary = pressed;
        }
    }

    pub fn set_cursor(&mut self, position: Vec2) {
        self.cursor = position;
    }
}

impl InputSource for WindowInput {
    fn is_focused(&self) -> bool {
        self.focused
    }

    fn keyboard(&self) -> KeyboardSnapshot {
        KeyboardSnapshot {
            down: self.keys.clone(),
        }
    }

    fn is_secondary_down(&self) -> bool {
        self.secondary
    }

    fn cursor_position(&self) -> Vec2 {
        self.cursor
    }
}

/// Convert a winit scroll into wheel units.
pub fn wheel_delta(delta: &MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y * WHEEL_DELTA_PER_LINE,
        MouseScrollDelta::PixelDelta(position) => position.y as f32,
    }
}

/// Input state set directly, for scripted runs.
#[derive(Debug, Clone, Default)]
pub struct ManualInput {
    pub focused: bool,
    pub keys: Vec<KeyCode>,
    pub secondary: bool,
    pub cursor: Vec2,
}

impl ManualInput {
    pub fn focused() -> Self {
        Self {
            focused: true,
            ..Self::default()
        }
    }
}

impl InputSource for ManualInput {
    fn is_focused(&self) -> bool {
        self.focused
    }

    fn keyboard(&self) -> KeyboardSnapshot {
        KeyboardSnapshot::from_keys(self.keys.iter().copied())
    }

    fn is_secondary_down(&self) -> bool {
        self.secondary
    }

    fn cursor_position(&self) -> Vec2 {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn chord_needs_every_key() {
        let snap = KeyboardSnapshot::from_keys([KeyCode::ShiftLeft, KeyCode::KeyW]);
        assert!(snap.are_keys_down(&[KeyCode::KeyW]));
        assert!(snap.are_keys_down(&[KeyCode::ShiftLeft, KeyCode::KeyW]));
        assert!(!snap.are_keys_down(&[KeyCode::ControlLeft, KeyCode::KeyW]));
        assert!(!snap.are_keys_down(&[]));
    }

    #[test]
    fn window_input_tracks_keys_and_buttons() {
        let mut input = WindowInput::new();
        assert_eq!(input.handle_window_event(&WindowEvent::Focused(true)), None);
        input.set_key(KeyCode::KeyW, true);
        input.set_button(MouseButton::Right, true);
        input.set_cursor(Vec2::new(10.0, 20.0));

        assert!(input.is_focused());
        assert!(input.keyboard().is_down(KeyCode::KeyW));
        assert!(input.is_secondary_down());
        assert_eq!(input.cursor_position(), Vec2::new(10.0, 20.0));

        input.set_button(MouseButton::Left, false);
        assert!(input.is_secondary_down());
        input.set_key(KeyCode::KeyW, false);
        assert!(!input.keyboard().is_down(KeyCode::KeyW));
    }

    #[test]
    fn losing_focus_releases_held_input() {
        let mut input = WindowInput::new();
        input.set_focused(true);
        input.set_key(KeyCode::KeyS, true);
        input.set_button(MouseButton::Right, true);

        input.handle_window_event(&WindowEvent::Focused(false));
        assert!(!input.is_focused());
        assert!(!input.keyboard().is_down(KeyCode::KeyS));
        assert!(!input.is_secondary_down());
    }

    #[test]
    fn wheel_lines_scale_to_units() {
        assert_eq!(wheel_delta(&MouseScrollDelta::LineDelta(0.0, 1.0)), 120.0);
        assert_eq!(wheel_delta(&MouseScrollDelta::LineDelta(0.0, -2.0)), -240.0);
        assert_eq!(
            wheel_delta(&MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 35.0))),
            35.0
        );
    }
}

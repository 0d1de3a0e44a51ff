use crate::action::{CameraAction, MoveAxis};
use crate::bindings::{CameraBindings, ConfigError};
use crate::clock::{Clock, SystemClock};
use crate::source::InputSource;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use terrastream_common::{Camera, PositionChanged, PositionSender};

/// World units moved per second while a movement key is held.
pub const SPEED_FACTOR: f32 = 100.0;

/// World units moved per wheel unit.
pub const SPEED_FACTOR_WHEEL: f32 = 0.5;

/// Tunables of [`CameraControl`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraControlConfig {
    /// Degrees of rotation per pixel of cursor motion.
    pub turn_factor: f32,
    pub invert_x: bool,
    pub invert_y: bool,
}

impl Default for CameraControlConfig {
    fn default() -> Self {
        Self {
            turn_factor: 0.2,
            invert_x: false,
            invert_y: false,
        }
    }
}

impl CameraControlConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }
}

/// Turns sampled input into camera motion once per tick.
///
/// Translation scales with the time since the previous tick. Rotation follows
/// cursor motion while the right button is held. Any translation sends one
/// [`PositionChanged`] notification; it asks for terrain re-evaluation only
/// when a horizontal move happened.
pub struct CameraControl<C: Clock = SystemClock> {
    config: CameraControlConfig,
    bindings: CameraBindings,
    clock: C,
    positions: PositionSender,
    last_update: Instant,
    last_cursor: Vec2,
}

impl CameraControl<SystemClock> {
    pub fn new(
        config: CameraControlConfig,
        bindings: CameraBindings,
        positions: PositionSender,
    ) -> Self {
        Self::with_clock(config, bindings, positions, SystemClock)
    }
}

impl<C: Clock> CameraControl<C> {
    pub fn with_clock(
        config: CameraControlConfig,
        bindings: CameraBindings,
        positions: PositionSender,
        clock: C,
    ) -> Self {
        let last_update = clock.now();
        Self {
            config,
            bindings,
            clock,
            positions,
            last_update,
            last_cursor: Vec2::ZERO,
        }
    }

    /// Process one tick. Without focus, or with `state_only`, only the time
    /// and cursor baselines are refreshed. Returns the notification sent, if
    /// any.
    pub fn update(
        &mut self,
        camera: &mut dyn Camera,
        input: &dyn InputSource,
        state_only: bool,
    ) -> Option<PositionChanged> {
        let now = self.clock.now();
        let cursor = input.cursor_position();
        if !input.is_focused() || state_only {
            self.last_cursor = cursor;
            self.last_update = now;
            return None;
        }

        let elapsed = now.saturating_duration_since(self.last_update).as_secs_f32();
        let keys = input.keyboard();
        let mut moved = false;
        let mut update_terrain = false;

        for action in CameraAction::ALL {
            if !keys.are_keys_down(self.bindings.keys(action)) {
                continue;
            }
            let distance = action.sign() * elapsed * SPEED_FACTOR;
            match action.axis() {
                MoveAxis::Forward => camera.move_forward(distance),
                MoveAxis::Right => camera.move_right(distance),
                MoveAxis::Up => camera.move_up(distance),
            }
            moved = true;
            update_terrain |= action.is_terrain_affecting();
        }

        if input.is_secondary_down() {
            let delta = cursor - self.last_cursor;
            if delta.x != 0.0 {
                camera.yaw(delta.x * self.config.turn_factor * axis_sign(self.config.invert_x));
            }
            if delta.y != 0.0 {
                camera.pitch(delta.y * self.config.turn_factor * axis_sign(self.config.invert_y));
            }
        }

        let notification = moved.then(|| PositionChanged {
            position: camera.position(),
            update_terrain,
        });
        if let Some(changed) = notification {
            if !self.positions.send(changed.position, changed.update_terrain) {
                tracing::warn!("position channel closed; camera move not streamed");
            }
        }

        self.last_update = now;
        self.last_cursor = cursor;
        notification
    }

    /// Dolly along the view direction while the right button is held, and
    /// ask for terrain re-evaluation right away. Returns whether the camera
    /// moved.
    pub fn handle_mouse_wheel(
        &mut self,
        camera: &mut dyn Camera,
        input: &dyn InputSource,
        delta: f32,
    ) -> bool {
        if !input.is_secondary_down() {
            return false;
        }
        camera.move_forward(delta * SPEED_FACTOR_WHEEL);
        if !self.positions.send(camera.position(), true) {
            tracing::warn!("position channel closed; wheel move not streamed");
        }
        true
    }

    pub fn config(&self) -> &CameraControlConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut CameraControlConfig {
        &mut self.config
    }

    pub fn bindings(&self) -> &CameraBindings {
        &self.bindings
    }
}

fn axis_sign(inverted: bool) -> f32 {
    if inverted { 1.0 } else { -1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::source::ManualInput;
    use glam::Vec3;
    use std::time::Duration;
    use terrastream_common::{BoundingBox, PositionReceiver, position_channel};
    use winit::keyboard::KeyCode;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Forward(f32),
        Right(f32),
        Up(f32),
        Yaw(f32),
        Pitch(f32),
    }

    /// Records every call; moves only its position.
    #[derive(Default)]
    struct RecordingCamera {
        position: Vec3,
        calls: Vec<Call>,
    }

    impl Camera for RecordingCamera {
        fn move_forward(&mut self, distance: f32) {
            self.position.z -= distance;
            self.calls.push(Call::Forward(distance));
        }
        fn move_right(&mut self, distance: f32) {
            self.position.x += distance;
            self.calls.push(Call::Right(distance));
        }
        fn move_up(&mut self, distance: f32) {
            self.position.y += distance;
            self.calls.push(Call::Up(distance));
        }
        fn yaw(&mut self, angle: f32) {
            self.calls.push(Call::Yaw(angle));
        }
        fn pitch(&mut self, angle: f32) {
            self.calls.push(Call::Pitch(angle));
        }
        fn position(&self) -> Vec3 {
            self.position
        }
        fn contains(&self, _: &BoundingBox) -> bool {
            true
        }
    }

    fn control() -> (CameraControl<ManualClock>, ManualClock, PositionReceiver) {
        let (tx, rx) = position_channel();
        let clock = ManualClock::new();
        let control = CameraControl::with_clock(
            CameraControlConfig::default(),
            CameraBindings::default(),
            tx,
            clock.clone(),
        );
        (control, clock, rx)
    }

    fn holding(keys: &[KeyCode]) -> ManualInput {
        ManualInput {
            keys: keys.to_vec(),
            ..ManualInput::focused()
        }
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn unfocused_window_never_moves_or_notifies() {
        let (mut c, clock, rx) = control();
        let mut cam = RecordingCamera::default();
        let input = ManualInput {
            focused: false,
            keys: vec![KeyCode::KeyW, KeyCode::KeyQ],
            secondary: true,
            cursor: Vec2::new(50.0, 50.0),
        };

        clock.advance(Duration::from_secs(1));
        assert_eq!(c.update(&mut cam, &input, false), None);
        assert!(cam.calls.is_empty());
        assert!(rx.is_empty());
    }

    #[test]
    fn state_only_resyncs_baselines() {
        let (mut c, clock, rx) = control();
        let mut cam = RecordingCamera::default();

        clock.advance(Duration::from_secs(30));
        c.update(&mut cam, &holding(&[KeyCode::KeyW]), true);
        assert!(cam.calls.is_empty());
        assert!(rx.is_empty());

        // The 30 s spent state-only does not turn into a jump.
        clock.advance(Duration::from_millis(100));
        c.update(&mut cam, &holding(&[KeyCode::KeyW]), false);
        assert_eq!(cam.calls.len(), 1);
        let Call::Forward(d) = cam.calls[0] else {
            panic!("expected forward move, got {:?}", cam.calls[0]);
        };
        assert!(approx(d, 10.0));
    }

    #[test]
    fn up_moves_without_terrain_update() {
        let (mut c, clock, rx) = control();
        let mut cam = RecordingCamera::default();

        clock.advance(Duration::from_millis(500));
        let sent = c.update(&mut cam, &holding(&[KeyCode::KeyQ]), false).unwrap();
        assert!(!sent.update_terrain);
        assert_eq!(cam.calls.len(), 1);
        assert!(matches!(cam.calls[0], Call::Up(d) if approx(d, 50.0)));

        let got: Vec<_> = rx.drain().collect();
        assert_eq!(got.len(), 1);
        assert!(!got[0].update_terrain);
        assert!(approx(got[0].position.y, 50.0));
    }

    #[test]
    fn forward_moves_with_terrain_update() {
        let (mut c, clock, rx) = control();
        let mut cam = RecordingCamera::default();

        clock.advance(Duration::from_millis(250));
        let sent = c.update(&mut cam, &holding(&[KeyCode::KeyW]), false).unwrap();
        assert!(sent.update_terrain);
        assert!(matches!(cam.calls[0], Call::Forward(d) if approx(d, 25.0)));
        assert_eq!(rx.drain().count(), 1);
    }

    #[test]
    fn each_bound_action_signs_its_move() {
        let (mut c, clock, rx) = control();
        let mut cam = RecordingCamera::default();
        let all = [
            KeyCode::KeyW,
            KeyCode::KeyS,
            KeyCode::KeyD,
            KeyCode::KeyA,
            KeyCode::KeyQ,
            KeyCode::KeyE,
        ];

        clock.advance(Duration::from_millis(100));
        let sent = c.update(&mut cam, &holding(&all), false).unwrap();
        assert!(sent.update_terrain);
        assert_eq!(cam.calls.len(), 6);
        assert!(matches!(cam.calls[0], Call::Forward(d) if approx(d, 10.0)));
        assert!(matches!(cam.calls[1], Call::Forward(d) if approx(d, -10.0)));
        assert!(matches!(cam.calls[2], Call::Right(d) if approx(d, 10.0)));
        assert!(matches!(cam.calls[3], Call::Right(d) if approx(d, -10.0)));
        assert!(matches!(cam.calls[4], Call::Up(d) if approx(d, 10.0)));
        assert!(matches!(cam.calls[5], Call::Up(d) if approx(d, -10.0)));
        // One notification per tick however many keys fired.
        assert_eq!(rx.drain().count(), 1);
    }

    #[test]
    fn no_keys_no_notification() {
        let (mut c, clock, rx) = control();
        let mut cam = RecordingCamera::default();
        clock.advance(Duration::from_millis(100));
        assert_eq!(c.update(&mut cam, &ManualInput::focused(), false), None);
        assert!(rx.is_empty());
    }

    #[test]
    fn right_drag_rotates_with_negative_default_sign() {
        let (mut c, clock, rx) = control();
        let mut cam = RecordingCamera::default();
        let mut input = ManualInput::focused();
        input.cursor = Vec2::new(100.0, 100.0);
        c.update(&mut cam, &input, true);

        input.secondary = true;
        input.cursor = Vec2::new(110.0, 95.0);
        clock.advance(Duration::from_millis(16));
        assert_eq!(c.update(&mut cam, &input, false), None);

        assert_eq!(cam.calls.len(), 2);
        assert!(matches!(cam.calls[0], Call::Yaw(a) if approx(a, -2.0)));
        assert!(matches!(cam.calls[1], Call::Pitch(a) if approx(a, 1.0)));
        // Rotation alone never notifies.
        assert!(rx.is_empty());
    }

    #[test]
    fn inverted_axes_flip_rotation_independently() {
        let (mut c, clock, _rx) = control();
        c.config_mut().invert_x = true;
        let mut cam = RecordingCamera::default();
        let mut input = ManualInput::focused();
        c.update(&mut cam, &input, true);

        input.secondary = true;
        input.cursor = Vec2::new(10.0, 10.0);
        clock.advance(Duration::from_millis(16));
        c.update(&mut cam, &input, false);

        assert!(matches!(cam.calls[0], Call::Yaw(a) if approx(a, 2.0)));
        assert!(matches!(cam.calls[1], Call::Pitch(a) if approx(a, -2.0)));
    }

    #[test]
    fn zero_cursor_delta_does_not_rotate() {
        let (mut c, clock, _rx) = control();
        let mut cam = RecordingCamera::default();
        let mut input = ManualInput::focused();
        input.cursor = Vec2::new(40.0, 40.0);
        c.update(&mut cam, &input, true);

        input.secondary = true;
        input.cursor = Vec2::new(40.0, 55.0);
        clock.advance(Duration::from_millis(16));
        c.update(&mut cam, &input, false);
        assert!(matches!(cam.calls[..], [Call::Pitch(a)] if approx(a, -3.0)));
    }

    #[test]
    fn cursor_motion_without_button_only_moves_baseline() {
        let (mut c, clock, _rx) = control();
        let mut cam = RecordingCamera::default();
        let mut input = ManualInput::focused();
        c.update(&mut cam, &input, false);

        input.cursor = Vec2::new(300.0, 0.0);
        clock.advance(Duration::from_millis(16));
        c.update(&mut cam, &input, false);
        assert!(cam.calls.is_empty());

        // Rotation is measured from the last sample, not the old origin.
        input.secondary = true;
        input.cursor = Vec2::new(305.0, 0.0);
        clock.advance(Duration::from_millis(16));
        c.update(&mut cam, &input, false);
        assert!(matches!(cam.calls[..], [Call::Yaw(a)] if approx(a, -1.0)));
    }

    #[test]
    fn wheel_with_secondary_moves_and_notifies_immediately() {
        let (mut c, _clock, rx) = control();
        let mut cam = RecordingCamera::default();
        let mut input = ManualInput::focused();
        input.secondary = true;

        assert!(c.handle_mouse_wheel(&mut cam, &input, 120.0));
        assert!(matches!(cam.calls[..], [Call::Forward(d)] if approx(d, 60.0)));
        let got: Vec<_> = rx.drain().collect();
        assert_eq!(got.len(), 1);
        assert!(got[0].update_terrain);
        assert!(approx(got[0].position.z, -60.0));
    }

    #[test]
    fn wheel_without_secondary_is_ignored() {
        let (mut c, _clock, rx) = control();
        let mut cam = RecordingCamera::default();
        assert!(!c.handle_mouse_wheel(&mut cam, &ManualInput::focused(), 120.0));
        assert!(cam.calls.is_empty());
        assert!(rx.is_empty());
    }

    #[test]
    fn wheel_and_tick_share_one_ordered_channel() {
        let (mut c, clock, rx) = control();
        let mut cam = RecordingCamera::default();
        let mut input = holding(&[KeyCode::KeyQ]);
        input.secondary = true;

        clock.advance(Duration::from_millis(100));
        c.update(&mut cam, &input, false);
        c.handle_mouse_wheel(&mut cam, &input, -240.0);

        let got: Vec<_> = rx.drain().collect();
        assert_eq!(got.len(), 2);
        assert!(!got[0].update_terrain);
        assert!(got[1].update_terrain);
        assert!(approx(got[1].position.z, 120.0));
    }

    #[test]
    fn control_config_yaml_keeps_defaults() {
        let config = CameraControlConfig::from_yaml_str("invert_y: true\n").unwrap();
        assert!(config.invert_y);
        assert!(!config.invert_x);
        assert!((config.turn_factor - 0.2).abs() < 1e-6);
    }

    #[test]
    fn control_config_errors_are_config_errors() {
        let err = CameraControlConfig::from_yaml_str("turn_factor: fast\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = CameraControlConfig::load(Path::new("/nonexistent/camera.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/camera.yaml"));
    }
}

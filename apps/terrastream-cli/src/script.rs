use glam::Vec2;
use terrastream_input::{CameraAction, CameraBindings, ManualInput};

/// Input for one simulated tick.
#[derive(Debug, Clone)]
pub struct ScriptedTick {
    pub input: ManualInput,
    pub wheel: Option<f32>,
    /// Sculpt the terrain under the camera this tick.
    pub edit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leg {
    Cruise,
    Strafe,
    Climb,
    Turn,
    Hover,
}

const LEGS: [Leg; 5] = [Leg::Cruise, Leg::Strafe, Leg::Climb, Leg::Turn, Leg::Hover];

/// Deterministic fly-through: legs of forward flight, strafing, climbing,
/// right-drag turning with wheel dollies, and hovering over a terrain edit.
#[derive(Debug, Clone)]
pub struct FlightScript {
    state: u64,
    leg: Leg,
    ticks_left: u32,
    cursor: Vec2,
    drift: Vec2,
}

impl FlightScript {
    pub fn new(seed: u64) -> Self {
        Self {
            state: (seed ^ 0x9E37_79B9_7F4A_7C15).max(1),
            leg: Leg::Cruise,
            ticks_left: 60,
            cursor: Vec2::new(640.0, 360.0),
            drift: Vec2::ZERO,
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    fn range(&mut self, lo: u32, hi: u32) -> u32 {
        lo + (self.next_u64() % u64::from(hi - lo + 1)) as u32
    }

    fn start_leg(&mut self) -> bool {
        self.leg = LEGS[self.next_u64() as usize % LEGS.len()];
        self.ticks_left = self.range(30, 120);
        if self.leg == Leg::Turn {
            let dx = self.range(0, 8) as f32 - 4.0;
            let dy = self.range(0, 2) as f32 - 1.0;
            self.drift = Vec2::new(dx, dy);
        }
        self.leg == Leg::Hover
    }

    pub fn next_tick(&mut self, bindings: &CameraBindings) -> ScriptedTick {
        let mut edit = false;
        if self.ticks_left == 0 {
            edit = self.start_leg();
        }
        self.ticks_left -= 1;

        let mut input = ManualInput::focused();
        let mut wheel = None;
        match self.leg {
            Leg::Cruise => hold(&mut input, bindings, CameraAction::Forward),
            Leg::Strafe => {
                hold(&mut input, bindings, CameraAction::Forward);
                hold(&mut input, bindings, CameraAction::Right);
            }
            Leg::Climb => hold(&mut input, bindings, CameraAction::Up),
            Leg::Turn => {
                self.cursor += self.drift;
                input.secondary = true;
                if self.ticks_left % 20 == 0 {
                    wheel = Some(120.0);
                }
            }
            Leg::Hover => {}
        }
        input.cursor = self.cursor;

        ScriptedTick { input, wheel, edit }
    }
}

fn hold(input: &mut ManualInput, bindings: &CameraBindings, action: CameraAction) {
    input.keys.extend_from_slice(bindings.keys(action));
}

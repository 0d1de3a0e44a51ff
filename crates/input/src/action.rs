use serde::{Deserialize, Serialize};

/// Camera motion bound to a key chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CameraAction {
    Forward,
    Backward,
    Right,
    Left,
    Up,
    Down,
}

/// Axis a [`CameraAction`] moves along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveAxis {
    Forward,
    Right,
    Up,
}

impl CameraAction {
    /// Every action, in the order they are tested each tick.
    pub const ALL: [CameraAction; 6] = [
        CameraAction::Forward,
        CameraAction::Backward,
        CameraAction::Right,
        CameraAction::Left,
        CameraAction::Up,
        CameraAction::Down,
    ];

    pub fn axis(self) -> MoveAxis {
        match self {
            CameraAction::Forward | CameraAction::Backward => MoveAxis::Forward,
            CameraAction::Right | CameraAction::Left => MoveAxis::Right,
            CameraAction::Up | CameraAction::Down => MoveAxis::Up,
        }
    }

    /// +1 or -1 along [`axis`](Self::axis).
    pub fn sign(self) -> f32 {
        match self {
            CameraAction::Forward | CameraAction::Right | CameraAction::Up => 1.0,
            CameraAction::Backward | CameraAction::Left | CameraAction::Down => -1.0,
        }
    }

    /// Horizontal moves can change which areas are needed; altitude alone
    /// never does.
    pub fn is_terrain_affecting(self) -> bool {
        self.axis() != MoveAxis::Up
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_vertical_moves_skip_terrain() {
        let affecting: Vec<_> = CameraAction::ALL
            .into_iter()
            .filter(|a| a.is_terrain_affecting())
            .collect();
        assert_eq!(
            affecting,
            vec![
                CameraAction::Forward,
                CameraAction::Backward,
                CameraAction::Right,
                CameraAction::Left
            ]
        );
    }

    #[test]
    fn opposite_actions_share_axis_with_opposite_sign() {
        assert_eq!(CameraAction::Up.axis(), CameraAction::Down.axis());
        assert_eq!(CameraAction::Up.sign(), -CameraAction::Down.sign());
        assert_eq!(CameraAction::Left.sign(), -1.0);
    }
}

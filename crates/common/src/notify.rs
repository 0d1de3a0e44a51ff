use crossbeam_channel::{Receiver, Sender, TryIter};
use glam::Vec3;

/// Camera position notification consumed by the streaming manager.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionChanged {
    pub position: Vec3,
    /// Whether the visible tile set must be re-evaluated for this move.
    pub update_terrain: bool,
}

/// Producer side of the position channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PositionSender(Sender<PositionChanged>);

/// Single consumer side of the position channel, drained once per tick.
#[derive(Debug)]
pub struct PositionReceiver(Receiver<PositionChanged>);

/// Create the ordered notification channel shared by every input path.
pub fn position_channel() -> (PositionSender, PositionReceiver) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (PositionSender(tx), PositionReceiver(rx))
}

impl PositionSender {
    /// Enqueue a notification. Returns false once the receiver is gone.
    pub fn send(&self, position: Vec3, update_terrain: bool) -> bool {
        self.0
            .send(PositionChanged {
                position,
                update_terrain,
            })
            .is_ok()
    }
}

impl PositionReceiver {
    /// Pending notifications in send order, without blocking.
    pub fn drain(&self) -> TryIter<'_, PositionChanged> {
        self.0.try_iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifications_keep_send_order() {
        let (tx, rx) = position_channel();
        let wheel = tx.clone();
        tx.send(Vec3::X, false);
        wheel.send(Vec3::Y, true);
        tx.send(Vec3::Z, true);

        let got: Vec<_> = rx.drain().collect();
        assert_eq!(got.len(), 3);
        assert_eq!(got[0].position, Vec3::X);
        assert!(!got[0].update_terrain);
        assert_eq!(got[1].position, Vec3::Y);
        assert_eq!(got[2].position, Vec3::Z);
        assert!(rx.is_empty());
    }

    #[test]
    fn send_after_receiver_dropped_reports_false() {
        let (tx, rx) = position_channel();
        drop(rx);
        assert!(!tx.send(Vec3::ZERO, true));
    }
}

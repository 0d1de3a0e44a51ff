use crossbeam_channel::{Receiver, Sender};

type Task = Box<dyn FnOnce() + Send>;

/// Work queue drained by the thread that owns the graphics device.
///
/// Any thread may enqueue through a [`RenderQueueHandle`]; tasks run only when
/// the render thread calls [`RenderQueue::drain`].
pub struct RenderQueue {
    tx: Sender<Task>,
    rx: Receiver<Task>,
}

/// Enqueue side of a [`RenderQueue`]. Cheap to clone and `Send`.
#[derive(Clone)]
pub struct RenderQueueHandle {
    tx: Sender<Task>,
}

impl RenderQueue {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { tx, rx }
    }

    pub fn handle(&self) -> RenderQueueHandle {
        RenderQueueHandle {
            tx: self.tx.clone(),
        }
    }

    /// Run every pending task in submission order. Returns how many ran.
    pub fn drain(&self) -> usize {
        let mut ran = 0;
        for task in self.rx.try_iter() {
            task();
            ran += 1;
        }
        if ran > 0 {
            tracing::trace!(ran, "render queue drained");
        }
        ran
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

impl Default for RenderQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderQueueHandle {
    /// Fire-and-forget: schedule `task` on the render thread.
    pub fn begin_invoke<F: FnOnce() + Send + 'static>(&self, task: F) {
        if self.tx.send(Box::new(task)).is_err() {
            tracing::warn!("render queue closed; task dropped without running");
        }
    }
}

impl std::fmt::Debug for RenderQueueHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderQueueHandle").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn tasks_run_only_on_drain_in_order() {
        let queue = RenderQueue::new();
        let handle = queue.handle();
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));

        for i in 0..3 {
            let log = Arc::clone(&log);
            handle.begin_invoke(move || log.lock().unwrap().push(i));
        }
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(queue.pending(), 3);

        assert_eq!(queue.drain(), 3);
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(queue.drain(), 0);
    }

    #[test]
    fn tasks_enqueued_from_other_threads() {
        let queue = RenderQueue::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = queue.handle();
        let c = Arc::clone(&counter);
        std::thread::spawn(move || {
            handle.begin_invoke(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        })
        .join()
        .unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        queue.drain();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}

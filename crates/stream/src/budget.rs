use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use terrastream_render::FrameStats;

/// Streaming configuration: load/unload radii, per-frame budgets and loader
/// worker count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Radius (in areas) around the camera's area that is requested.
    pub load_radius: i32,
    /// Areas farther than this (in areas) are unloaded.
    pub unload_radius: i32,
    /// Maximum number of completed loads handed to areas per frame.
    pub load_budget: usize,
    /// Maximum number of areas disposed per frame.
    pub unload_budget: usize,
    /// Loader worker threads.
    pub workers: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            load_radius: 1,
            unload_radius: 2,
            load_budget: 4,
            unload_budget: 4,
            workers: 2,
        }
    }
}

/// Streaming counters for instrumentation. Load counters accumulate; the
/// rest describe the last frame.
#[derive(Debug, Clone, Default)]
pub struct StreamStats {
    pub loads_requested: usize,
    pub loads_completed: usize,
    pub loads_failed: usize,
    /// Completions for areas that were unloaded or re-requested meanwhile.
    pub stale_completions: usize,
    pub areas_unloaded: usize,
    pub areas_tracked: usize,
    pub areas_loaded: usize,
    pub loaded_this_frame: usize,
    pub unloaded_this_frame: usize,
    pub last_frame: FrameStats,
    pub frame_time: Duration,
}

/// Rolling window of frame times.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    history: VecDeque<Duration>,
    capacity: usize,
    total_frames: u64,
}

impl FrameTimer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
            total_frames: 0,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(dt);
        self.total_frames += 1;
    }

    pub fn average(&self) -> Duration {
        if self.history.is_empty() {
            return Duration::ZERO;
        }
        self.history.iter().sum::<Duration>() / self.history.len() as u32
    }

    pub fn max(&self) -> Duration {
        self.history.iter().copied().max().unwrap_or_default()
    }

    pub fn min(&self) -> Duration {
        self.history.iter().copied().min().unwrap_or_default()
    }

    /// Frames currently in the window.
    pub fn count(&self) -> usize {
        self.history.len()
    }

    /// Frames recorded since creation.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(120)
    }
}

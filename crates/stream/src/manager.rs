use crate::budget::{FrameTimer, StreamConfig, StreamStats};
use crate::grid::{area_at, area_distance, areas_in_radius, areas_under_brush};
use crate::pool::{LoadResult, LoaderPool, StreamError};
use glam::Vec3;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use terrastream_common::{
    AreaIndex, Camera, PositionReceiver, PositionSender, position_channel,
};
use terrastream_render::{
    ChunkMesh, DoodadRef, DoodadVisibility, FrameContext, FrameOutput, GraphicsDevice,
    MapAreaRender, RenderQueue, ViewDirtyQuery,
};
use terrastream_terrain::{AreaLoader, TerrainChangeParams, TextureChangeParams};

struct AreaSlot {
    area: MapAreaRender,
    ticket: u64,
    /// Load requested and not yet delivered.
    pending: bool,
}

/// Streams areas around the camera and drives their per-frame work.
///
/// Owns the render-thread side of streaming: the render queue, the shared
/// chunk mesh and the doodad visibility set. Loads run on a [`LoaderPool`];
/// their results are handed to areas at the start of a frame, at most
/// `load_budget` per frame.
pub struct MapManager {
    config: StreamConfig,
    pool: LoaderPool,
    areas: BTreeMap<AreaIndex, AreaSlot>,
    render_queue: RenderQueue,
    mesh: ChunkMesh,
    doodads: DoodadVisibility,
    view_dirty: ViewDirtyQuery,
    positions: PositionReceiver,
    position_tx: PositionSender,
    ready: VecDeque<LoadResult>,
    outstanding: usize,
    next_ticket: u64,
    center: Option<AreaIndex>,
    position: Vec3,
    initial_load: bool,
    timer: FrameTimer,
    stats: StreamStats,
}

impl MapManager {
    pub fn new(config: StreamConfig, loader: Arc<dyn AreaLoader>) -> Result<Self, StreamError> {
        let pool = LoaderPool::spawn(loader, config.workers)?;
        let (position_tx, positions) = position_channel();
        let doodads = DoodadVisibility::new();
        let view_dirty = doodads.query();
        Ok(Self {
            config,
            pool,
            areas: BTreeMap::new(),
            render_queue: RenderQueue::new(),
            mesh: ChunkMesh::new(),
            doodads,
            view_dirty,
            positions,
            position_tx,
            ready: VecDeque::new(),
            outstanding: 0,
            next_ticket: 1,
            center: None,
            position: Vec3::ZERO,
            initial_load: false,
            timer: FrameTimer::default(),
            stats: StreamStats::default(),
        })
    }

    /// Sender for camera position notifications, consumed by
    /// [`process_position_updates`](Self::process_position_updates).
    pub fn position_sender(&self) -> PositionSender {
        self.position_tx.clone()
    }

    /// Start streaming around `position`. Culling stays off until every area
    /// requested here has been delivered.
    pub fn enter_world(&mut self, position: Vec3) {
        self.initial_load = true;
        self.position = position;
        self.doodads.mark_view_changed();
        let requested = self.evaluate(position);
        tracing::info!(area = %area_at(position), requested, "entering world");
        if requested == 0 {
            self.finish_initial_load();
        }
    }

    /// Record a camera move. The visible tile set is re-evaluated only when
    /// `immediate` is set.
    pub fn update_position(&mut self, position: Vec3, immediate: bool) {
        self.position = position;
        self.doodads.mark_view_changed();
        if immediate {
            self.evaluate(position);
        }
    }

    /// Apply queued position notifications in send order. Returns how many
    /// were applied.
    pub fn process_position_updates(&mut self) -> usize {
        let updates: Vec<_> = self.positions.drain().collect();
        for update in &updates {
            self.update_position(update.position, update.update_terrain);
        }
        updates.len()
    }

    /// Request every missing area within the load radius. Returns how many
    /// loads were requested.
    fn evaluate(&mut self, position: Vec3) -> usize {
        let center = area_at(position);
        if self.center != Some(center) {
            tracing::debug!(%center, "camera entered area");
        }
        self.center = Some(center);

        let mut requested = 0;
        for index in areas_in_radius(center, self.config.load_radius) {
            if self.areas.contains_key(&index) {
                continue;
            }
            let ticket = self.next_ticket;
            self.next_ticket += 1;
            if !self.pool.request(index, ticket) {
                tracing::warn!(%index, "loader pool closed; area not requested");
                continue;
            }
            self.areas.insert(
                index,
                AreaSlot {
                    area: MapAreaRender::new(index, self.render_queue.handle()),
                    ticket,
                    pending: true,
                },
            );
            self.outstanding += 1;
            self.stats.loads_requested += 1;
            requested += 1;
        }
        requested
    }

    /// Block until every requested load has been delivered by the pool or
    /// `timeout` passes. Returns whether nothing is left in flight.
    pub fn wait_for_loads(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.outstanding > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let Some(result) = self.pool.recv_timeout(remaining) else {
                return false;
            };
            self.outstanding -= 1;
            self.ready.push_back(result);
        }
        true
    }

    fn next_result(&mut self) -> Option<LoadResult> {
        if let Some(result) = self.ready.pop_front() {
            return Some(result);
        }
        let result = self.pool.try_recv()?;
        self.outstanding = self.outstanding.saturating_sub(1);
        Some(result)
    }

    /// Hand up to `load_budget` completed loads to their areas.
    fn apply_completed_loads(&mut self) -> usize {
        let mut applied = 0;
        while applied < self.config.load_budget {
            let Some(done) = self.next_result() else {
                break;
            };
            let slot = self
                .areas
                .get_mut(&done.index)
                .filter(|slot| slot.pending && slot.ticket == done.ticket);
            let Some(slot) = slot else {
                tracing::debug!(index = %done.index, ticket = done.ticket, "stale load result dropped");
                self.stats.stale_completions += 1;
                continue;
            };

            match done.result {
                Ok(payload) => {
                    slot.pending = false;
                    slot.area.async_loaded(payload);
                    self.stats.loads_completed += 1;
                    applied += 1;
                }
                Err(err) => {
                    tracing::warn!(index = %done.index, error = %err, "area load failed");
                    self.areas.remove(&done.index);
                    self.stats.loads_failed += 1;
                }
            }
        }
        applied
    }

    /// Dispose up to `unload_budget` areas beyond the unload radius.
    fn unload_distant(&mut self) -> usize {
        let Some(center) = self.center else {
            return 0;
        };
        let distant: Vec<AreaIndex> = self
            .areas
            .keys()
            .copied()
            .filter(|&index| area_distance(index, center) > self.config.unload_radius)
            .take(self.config.unload_budget)
            .collect();
        for index in &distant {
            if let Some(mut slot) = self.areas.remove(index) {
                tracing::debug!(%index, "unloading area");
                slot.area.dispose();
            }
        }
        self.stats.areas_unloaded += distant.len();
        distant.len()
    }

    fn finish_initial_load(&mut self) {
        self.initial_load = false;
        tracing::info!(areas = self.areas.len(), "initial load complete");
    }

    /// Run one frame on the render thread: apply pending position
    /// notifications, release queued GPU resources, unload and deliver areas
    /// within budget, then let every area cull and record its draws.
    pub fn on_frame(&mut self, camera: &dyn Camera, device: &dyn GraphicsDevice) -> FrameOutput {
        let _span = tracing::debug_span!("map_frame").entered();
        let start = Instant::now();

        let moved = self.process_position_updates();
        if moved > 0 {
            tracing::trace!(moved, "position notifications applied at frame start");
        }
        self.render_queue.drain();
        let unloaded = self.unload_distant();
        let loaded = self.apply_completed_loads();

        let mut output = FrameOutput::new();
        let mut ctx = FrameContext {
            camera,
            device,
            mesh: &mut self.mesh,
            output: &mut output,
            initial_load: self.initial_load,
            view_dirty: self.view_dirty.is_dirty(),
        };
        for slot in self.areas.values_mut() {
            slot.area.on_frame(&mut ctx);
        }
        self.doodads.end_frame(&output);

        if self.initial_load && !self.areas.values().any(|slot| slot.pending) {
            self.finish_initial_load();
        }

        let elapsed = start.elapsed();
        self.timer.record(elapsed);
        self.stats.loaded_this_frame = loaded;
        self.stats.unloaded_this_frame = unloaded;
        self.stats.areas_tracked = self.areas.len();
        self.stats.areas_loaded = self
            .areas
            .values()
            .filter(|slot| slot.area.is_async_loaded())
            .count();
        self.stats.last_frame = output.stats;
        self.stats.frame_time = elapsed;

        tracing::trace!(
            draws = output.draws.len(),
            loaded,
            unloaded,
            "map frame complete"
        );
        output
    }

    /// Sculpt every area under the brush. Returns how many areas changed.
    pub fn on_terrain_change(&mut self, params: &TerrainChangeParams) -> usize {
        let mut changed = 0;
        for index in areas_under_brush(params.center, params.outer_radius) {
            if let Some(slot) = self.areas.get_mut(&index) {
                if slot.area.on_terrain_change(params) {
                    changed += 1;
                }
            }
        }
        if changed > 0 {
            tracing::debug!(changed, "terrain edited");
        }
        changed
    }

    pub fn on_texture_change(&mut self, params: &TextureChangeParams) {
        for index in areas_under_brush(params.center, params.outer_radius) {
            if let Some(slot) = self.areas.get_mut(&index) {
                slot.area.on_texture_change(params);
            }
        }
    }

    pub fn on_update_model_positions(&mut self, params: &TerrainChangeParams) {
        for index in areas_under_brush(params.center, params.outer_radius) {
            if let Some(slot) = self.areas.get_mut(&index) {
                slot.area.on_update_model_positions(params);
            }
        }
    }

    pub fn is_initial_load(&self) -> bool {
        self.initial_load
    }

    pub fn area(&self, index: AreaIndex) -> Option<&MapAreaRender> {
        self.areas.get(&index).map(|slot| &slot.area)
    }

    /// Areas whose payload has been bound, in index order.
    pub fn loaded_areas(&self) -> impl Iterator<Item = AreaIndex> + '_ {
        self.areas
            .iter()
            .filter(|(_, slot)| slot.area.is_async_loaded())
            .map(|(index, _)| *index)
    }

    /// Every area currently tracked, loaded or not.
    pub fn tracked_areas(&self) -> impl Iterator<Item = AreaIndex> + '_ {
        self.areas.keys().copied()
    }

    pub fn center(&self) -> Option<AreaIndex> {
        self.center
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Read-only handle on the doodad view-dirty signal.
    pub fn view_dirty(&self) -> ViewDirtyQuery {
        self.view_dirty.clone()
    }

    pub fn visible_doodads(&self) -> &BTreeSet<DoodadRef> {
        self.doodads.visible()
    }

    pub fn mesh(&self) -> &ChunkMesh {
        &self.mesh
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }
}

impl Drop for MapManager {
    fn drop(&mut self) {
        self.areas.clear();
        let released = self.render_queue.drain();
        tracing::debug!(released, "map manager shut down");
    }
}

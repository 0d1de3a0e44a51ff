use crate::config::AppConfig;
use crate::script::FlightScript;
use anyhow::Context;
use glam::Vec3;
use std::sync::Arc;
use std::time::Duration;
use terrastream_common::{AreaIndex, FlyCamera};
use terrastream_input::{CameraControl, ManualClock};
use terrastream_render::{FrameStats, GraphicsDevice, HeadlessDevice};
use terrastream_render_wgpu::{TerrainPass, WgpuGraphicsDevice};
use terrastream_stream::{MapManager, StreamStats, area_at};
use terrastream_terrain::{
    Falloff, ProceduralLoader, TerrainChangeParams, TextureChangeParams,
};

/// How long a deterministic run waits for outstanding loads each tick.
const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

const BRUSH_RADIUS: f32 = 40.0;
const BRUSH_AMOUNT: f32 = 8.0;

#[derive(Debug, Clone)]
pub struct SimOptions {
    pub ticks: u64,
    pub seed: u64,
    pub dt: Duration,
    /// Render through wgpu instead of the counting device.
    pub gpu: bool,
    /// Sleep `dt` per tick and let loads arrive whenever they finish.
    pub realtime: bool,
}

#[derive(Debug, Clone)]
pub struct SimSummary {
    pub ticks: u64,
    pub totals: FrameStats,
    pub draws: usize,
    pub stream: StreamStats,
    pub edits: usize,
    pub edits_changed: usize,
    pub loaded_areas: usize,
    pub visible_doodads: usize,
    pub final_position: Vec3,
    pub final_area: AreaIndex,
    pub gpu_draws: usize,
    pub frame_avg: Duration,
    pub frame_max: Duration,
}

pub fn run(config: &AppConfig, opts: &SimOptions) -> anyhow::Result<SimSummary> {
    let _span = tracing::info_span!("simulate", seed = opts.seed, ticks = opts.ticks).entered();

    let loader = ProceduralLoader::new(opts.seed, config.terrain.clone())
        .with_missing(config.missing_areas.iter().copied());
    let mut manager = MapManager::new(config.stream.clone(), Arc::new(loader))
        .context("starting area streaming")?;

    let gpu = if opts.gpu {
        Some(WgpuGraphicsDevice::headless().context("--gpu requested but no GPU is usable")?)
    } else {
        None
    };
    let headless = HeadlessDevice::new();
    let device: &dyn GraphicsDevice = match &gpu {
        Some(gpu) => gpu,
        None => &headless,
    };
    let pass = gpu
        .as_ref()
        .map(|gpu| TerrainPass::new(gpu, manager.mesh(), 1280, 720));

    let clock = ManualClock::new();
    let mut control = CameraControl::with_clock(
        config.camera.clone(),
        config.bindings.camera.clone(),
        manager.position_sender(),
        clock.clone(),
    );
    let mut camera = FlyCamera::at(config.start);
    let mut script = FlightScript::new(opts.seed);

    manager.enter_world(camera.position);

    let mut totals = FrameStats::default();
    let mut draws = 0;
    let mut gpu_draws = 0;
    let mut edits = 0;
    let mut edits_changed = 0;

    for tick in 0..opts.ticks {
        let step = script.next_tick(control.bindings());
        clock.advance(opts.dt);
        control.update(&mut camera, &step.input, false);
        if let Some(delta) = step.wheel {
            control.handle_mouse_wheel(&mut camera, &step.input, delta);
        }

        if step.edit {
            edits += 1;
            let brush = TerrainChangeParams::raise(camera.position, BRUSH_RADIUS, BRUSH_AMOUNT);
            if manager.on_terrain_change(&brush) > 0 {
                edits_changed += 1;
                manager.on_update_model_positions(&brush);
            }
            manager.on_texture_change(&TextureChangeParams {
                center: camera.position,
                inner_radius: BRUSH_RADIUS * 0.5,
                outer_radius: BRUSH_RADIUS,
                amount: 0.5,
                texture: "rock".into(),
                falloff: Falloff::Linear,
            });
        }

        manager.process_position_updates();
        if !opts.realtime && !manager.wait_for_loads(LOAD_TIMEOUT) {
            tracing::warn!(tick, "loads still outstanding after timeout");
        }

        let output = manager.on_frame(&camera, device);
        if let (Some(pass), Some(gpu)) = (&pass, &gpu) {
            gpu_draws += pass.render(gpu, camera.view_projection(), &output.draws);
        }
        totals += output.stats;
        draws += output.draws.len();

        if tick % 100 == 0 {
            tracing::info!(
                tick,
                area = %area_at(camera.position),
                loaded = manager.loaded_areas().count(),
                draws = output.draws.len(),
                "simulation progress"
            );
        }
        if opts.realtime {
            std::thread::sleep(opts.dt);
        }
    }

    Ok(SimSummary {
        ticks: opts.ticks,
        totals,
        draws,
        stream: manager.stats().clone(),
        edits,
        edits_changed,
        loaded_areas: manager.loaded_areas().count(),
        visible_doodads: manager.visible_doodads().len(),
        final_position: camera.position,
        final_area: area_at(camera.position),
        gpu_draws,
        frame_avg: manager.timer().average(),
        frame_max: manager.timer().max(),
    })
}

impl SimSummary {
    pub fn print(&self) {
        println!("Simulated {} ticks", self.ticks);
        println!(
            "  final position: ({:.1}, {:.1}, {:.1}) in area {}",
            self.final_position.x, self.final_position.y, self.final_position.z, self.final_area
        );
        println!(
            "  loads: requested={} completed={} failed={} stale={} unloaded={}",
            self.stream.loads_requested,
            self.stream.loads_completed,
            self.stream.loads_failed,
            self.stream.stale_completions,
            self.stream.areas_unloaded
        );
        println!(
            "  areas: loaded={} visited={} culled={} doodads-only={}",
            self.loaded_areas,
            self.totals.areas_visited,
            self.totals.areas_culled,
            self.totals.areas_doodads_only
        );
        println!(
            "  chunks: dispatched={} drawn={} draws={}",
            self.totals.chunks_dispatched, self.totals.chunks_drawn, self.draws
        );
        println!(
            "  buffers: created={} uploads={}",
            self.totals.buffers_created, self.totals.buffer_uploads
        );
        println!(
            "  edits: {} ({} changed terrain), visible doodads: {}",
            self.edits, self.edits_changed, self.visible_doodads
        );
        if self.gpu_draws > 0 {
            println!("  gpu: {} chunk draws submitted", self.gpu_draws);
        }
        println!(
            "  frame time: avg={:?} max={:?}",
            self.frame_avg, self.frame_max
        );
    }
}

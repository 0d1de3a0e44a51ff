use std::hint::black_box;
use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec3;
use terrastream_common::{AREA_SIZE, AreaIndex, FlyCamera};
use terrastream_render::HeadlessDevice;
use terrastream_stream::{MapManager, StreamConfig, areas_in_radius};
use terrastream_terrain::{HeightmapArea, ProceduralLoader, TerrainShape};

fn bench_areas_in_radius(radius: i32, iterations: usize) {
    let center = AreaIndex::new(32, 32);
    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(areas_in_radius(black_box(center), black_box(radius)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  radius query (r={radius}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn bench_generate(iterations: usize) {
    let shape = TerrainShape::default();
    let start = Instant::now();
    for i in 0..iterations {
        let index = AreaIndex::new(i as i32 % 64, 0);
        let _ = black_box(HeightmapArea::generate(black_box(index), 7, &shape));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  generate area ({iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn bench_frames(load_radius: i32, frames: usize) {
    let config = StreamConfig {
        load_radius,
        unload_radius: load_radius + 1,
        load_budget: 64,
        unload_budget: 64,
        workers: 4,
    };
    let loader = Arc::new(ProceduralLoader::new(7, TerrainShape::default()));
    let Ok(mut manager) = MapManager::new(config, loader) else {
        println!("  frames: loader pool failed to start");
        return;
    };
    let device = HeadlessDevice::new();
    let start_position = Vec3::new(32.5 * AREA_SIZE, 120.0, 32.5 * AREA_SIZE);
    manager.enter_world(start_position);
    manager.wait_for_loads(Duration::from_secs(60));

    let mut camera = FlyCamera::at(start_position);
    let start = Instant::now();
    for i in 0..frames {
        camera.position.x = start_position.x + (i % 200) as f32;
        manager.update_position(camera.position, false);
        let _ = black_box(manager.on_frame(&camera, &device));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / frames as u32;
    println!(
        "  map frame (r={load_radius}, {} areas, {frames} frames): {per_iter:?}/frame, total {elapsed:?}",
        manager.loaded_areas().count()
    );
}

fn main() {
    println!("=== Area Streaming Benchmarks ===\n");

    println!("Radius query:");
    bench_areas_in_radius(1, 10000);
    bench_areas_in_radius(3, 10000);
    bench_areas_in_radius(8, 1000);

    println!("\nArea generation:");
    bench_generate(10);

    println!("\nMap frame (culling + doodad refresh):");
    bench_frames(1, 500);
    bench_frames(2, 200);

    println!("\n=== Done ===");
}

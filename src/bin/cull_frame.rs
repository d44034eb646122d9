//! Frame culling demo: compacts a grid of instance boxes against a camera.
//!
//! Usage: cargo run --release --bin cull_frame -- [OPTIONS]
//!
//! Options:
//!   --grid <N>        Instances per side of the N x N x N grid (default: 64)
//!   --spacing <M>     Distance between instances in meters (default: 2.0)
//!   --fov <DEG>       Vertical field of view (default: 60)
//!   --jobs <N>        Worker threads (default: all cores)
//!   --batch <N>       Minimum 64-element chunks per task (default: 16)
//!   --config <PATH>   JSON CompactionConfig; overrides --jobs/--batch
//!   --frames <N>      Passes per strategy (default: 10)

use std::time::Instant;

use glam::{Mat4, Vec3};

use frustum_compact::compact::{CompactionConfig, CompactionPipeline, MergeStrategy};
use frustum_compact::math::Frustum;
use frustum_compact::predicate::BoxCenterPredicate;

/// Per-instance payload as an engine would upload it
#[derive(Clone, Copy, Debug, Default)]
struct Instance {
    translation: Vec3,
    id: u32,
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp_millis()
    .init();

    let args: Vec<String> = std::env::args().collect();
    let grid = parse_usize_arg(&args, "--grid").unwrap_or(64);
    let spacing = parse_f32_arg(&args, "--spacing").unwrap_or(2.0);
    let fov = parse_f32_arg(&args, "--fov").unwrap_or(60.0);
    let frames = parse_usize_arg(&args, "--frames").unwrap_or(10).max(1);

    let base_config = match parse_str_arg(&args, "--config") {
        Some(path) => match CompactionConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load config {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => CompactionConfig {
            batch_size: parse_usize_arg(&args, "--batch").unwrap_or(16),
            worker_threads: parse_usize_arg(&args, "--jobs"),
            ..Default::default()
        },
    };

    let instances = build_grid(grid, spacing);
    let extent = grid as f32 * spacing;

    // Camera outside the grid corner, looking at its center
    let eye = Vec3::new(-0.25, 0.6, -0.25) * extent;
    let target = Vec3::splat(extent * 0.5);
    let view = Mat4::look_at_rh(eye, target, Vec3::Y);
    let proj = Mat4::perspective_rh(fov.to_radians(), 16.0 / 9.0, 0.1, extent * 2.0);
    let frustum = Frustum::from_view_projection(&(proj * view));

    let predicate = BoxCenterPredicate::new(
        frustum,
        |instance: &Instance| instance.translation,
        Vec3::splat(spacing * 0.5),
    );

    println!("=== Frame Culling ===");
    println!("Instances: {} ({}^3)", instances.len(), grid);
    println!("Camera:    {} -> {}", eye, target);
    println!();

    let mut visible = vec![Instance::default(); instances.len()];
    let mut results = Vec::new();

    for strategy in [MergeStrategy::Sequential, MergeStrategy::Parallel] {
        let config = CompactionConfig { strategy, ..base_config.clone() };
        let mut pipeline = match CompactionPipeline::new(config) {
            Ok(pipeline) => pipeline,
            Err(e) => {
                log::error!("Failed to create pipeline: {}", e);
                std::process::exit(1);
            }
        };

        let start = Instant::now();
        let mut count = 0;
        for _ in 0..frames {
            count = match pipeline.compact(&instances, &predicate, &mut visible) {
                Ok(count) => count,
                Err(e) => {
                    log::error!("Compaction failed: {}", e);
                    std::process::exit(1);
                }
            };
        }
        let per_frame = start.elapsed().as_secs_f64() * 1000.0 / frames as f64;

        log::info!(
            "{:?}: {} visible of {} ({:.1}%), {:.3}ms/frame",
            strategy,
            count,
            instances.len(),
            count as f64 * 100.0 / instances.len() as f64,
            per_frame
        );
        results.push((strategy, count, visible[..count].iter().map(|i| i.id).collect::<Vec<_>>()));
    }

    let agree = results.windows(2).all(|w| w[0].1 == w[1].1 && w[0].2 == w[1].2);
    println!();
    for (strategy, count, _) in &results {
        println!("{:<12} {} visible", format!("{:?}", strategy), count);
    }
    println!("Strategies agree: {}", agree);
    if !agree {
        std::process::exit(2);
    }
}

fn build_grid(grid: usize, spacing: f32) -> Vec<Instance> {
    let mut instances = Vec::with_capacity(grid * grid * grid);
    for z in 0..grid {
        for y in 0..grid {
            for x in 0..grid {
                instances.push(Instance {
                    translation: Vec3::new(x as f32, y as f32, z as f32) * spacing,
                    id: instances.len() as u32,
                });
            }
        }
    }
    instances
}

fn parse_f32_arg(args: &[String], flag: &str) -> Option<f32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_usize_arg(args: &[String], flag: &str) -> Option<usize> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

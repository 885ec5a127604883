//! Quadrant Shadow Walkthrough
//!
//! Walks a viewer in a circle under a directional light and reports which
//! quadrant holds the high-resolution shadow map each frame, then casts
//! tile grid shadows for the same sun.
//!
//! Usage: cargo run -p quadrant-walk [optional-config.json]
//! Set RUST_LOG=debug to see quadrant switches.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use void_quadshadow::prelude::*;
use void_tilegrid::{GridConfig, TileGrid};

// ============================================================================
// Configuration
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
struct DemoConfig {
    shadows: QuadShadowConfig,
    grid: GridConfig,
    /// Half extent of the light's orthographic frustum
    frustum_extent: f32,
    light_position: [f32; 3],
    walk_radius: f32,
    walk_steps: u32,
    /// (x, z, height) obstacles placed on the tile grid
    obstacles: Vec<(i32, i32, f32)>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            shadows: QuadShadowConfig::default(),
            grid: GridConfig::new(10, 10, 1.0),
            frustum_extent: 10.0,
            light_position: [0.0, 50.0, 0.0],
            walk_radius: 6.0,
            walk_steps: 16,
            obstacles: vec![(5, 5, 4.0), (2, 7, 2.0)],
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<DemoConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            log::info!("Loading config from {}", path.display());
            let text = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&text)?)
        }
        None => {
            log::info!("No config given, using defaults");
            Ok(DemoConfig::default())
        }
    }
}

// ============================================================================
// Walkthrough
// ============================================================================

fn run_walk(config: &DemoConfig) -> Result<(), Box<dyn std::error::Error>> {
    let extent = config.frustum_extent;
    let bounds = ShadowFrustumBounds::new(-extent, extent, extent, -extent, 0.5, 500.0)?;

    let mut graph = SceneGraph::new();
    let light_node = graph.add(NodeKind::Light, graph.root());
    let scene = graph.into_handle();

    let light = DirectionalLight::new(light_node, Vec3::from_array(config.light_position), Vec3::ZERO)
        .with_bounds(bounds)
        .into_handle();
    let camera = ViewerCamera::at(Vec3::new(config.walk_radius, 1.8, 0.0)).into_handle();

    let recorder = std::sync::Arc::new(RecordingObserver::new());
    let mut shadows = QuadrantShadowAllocator::new(config.shadows.clone())
        .with_light(light)
        .with_camera(camera.clone())
        .with_scene(scene.clone())
        .with_observer(LogObserver)
        .with_observer(recorder.clone());

    let expr = shadows.build_visibility_expression()?;
    println!("Visibility expression: {}", expr.to_wgsl());
    println!("Scene nodes after initialize: {}", scene.read().len());

    let steps = config.walk_steps.max(1);
    for step in 0..steps {
        let angle = step as f32 / steps as f32 * std::f32::consts::TAU;
        camera.write().position =
            Vec3::new(angle.cos() * config.walk_radius, 1.8, angle.sin() * config.walk_radius);

        let report = shadows.update_before_frame()?;
        let rendered: Vec<usize> = shadows
            .casters()
            .iter()
            .filter(|caster| caster.needs_update)
            .map(|caster| caster.slot)
            .collect();
        shadows.mark_rendered();

        println!(
            "frame {:>3}  active {}  slots {:?}  rendered {:?}{}",
            report.frame,
            report.active_quadrant,
            report.slot_quadrants,
            rendered,
            if report.switched { "  (switch)" } else { "" },
        );
    }

    println!("Quadrant switches: {}", recorder.len());
    println!("Shadow uniform block: {} bytes", shadows.gpu_data().as_bytes().len());

    shadows.dispose();
    println!("Scene nodes after dispose: {}", scene.read().len());
    Ok(())
}

fn run_grid(config: &DemoConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut grid: TileGrid = config.grid.build()?;
    for &(x, z, height) in &config.obstacles {
        if !grid.set_tile_height(x, z, height) {
            log::warn!("Obstacle ({}, {}) is outside the grid", x, z);
        }
    }

    let sun = -Vec3::from_array(config.light_position).normalize_or_zero();
    // An overhead light casts no tile shadows; tilt it for the grid
    let sun = if sun.x.abs() < 1e-3 { Vec3::new(1.0, -1.0, 0.0) } else { sun };
    let reached = grid.calculate_all_shadows(sun)?;
    println!("Tile shadows reached {} tiles (sun {:?})", reached, sun);

    for z in 0..grid.height() as i32 {
        let row: String = (0..grid.width() as i32)
            .map(|x| match grid.tile(x, z) {
                Some(tile) if tile.is_obstructed() => '#',
                Some(tile) if tile.shadow_height() > 0.0 => '+',
                _ => '.',
            })
            .collect();
        println!("  {}", row);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let path = std::env::args().nth(1);
    let config = load_config(path.as_deref().map(Path::new))?;

    run_walk(&config)?;
    run_grid(&config)?;
    Ok(())
}

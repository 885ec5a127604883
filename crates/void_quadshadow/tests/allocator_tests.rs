//! Integration tests for the quadrant shadow allocator
//!
//! These tests drive the allocator the way a renderer does: shared light,
//! camera and scene handles, one update per frame.

use std::sync::Arc;

use glam::Vec3;
use void_quadshadow::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct World {
    scene: SceneHandle,
    light: LightHandle,
    camera: CameraHandle,
}

/// Sun straight above the origin. With the light looking down -Y, light-space
/// x runs along world -X and light-space y along world +Z.
fn overhead_world() -> World {
    let mut graph = SceneGraph::new();
    let node = graph.add(NodeKind::Light, graph.root());

    let bounds = ShadowFrustumBounds::new(-10.0, 10.0, 10.0, -10.0, 0.5, 200.0).unwrap();
    let light = DirectionalLight::new(node, Vec3::new(0.0, 50.0, 0.0), Vec3::ZERO)
        .with_bounds(bounds)
        .with_intensity(3.0);

    World {
        scene: graph.into_handle(),
        light: light.into_handle(),
        camera: ViewerCamera::at(Vec3::new(5.0, 2.0, 5.0)).into_handle(),
    }
}

/// World position at the center of a quadrant for `overhead_world`
fn quadrant_center(quadrant: usize) -> Vec3 {
    match quadrant {
        0 => Vec3::new(5.0, 2.0, 5.0),
        1 => Vec3::new(-5.0, 2.0, 5.0),
        2 => Vec3::new(-5.0, 2.0, -5.0),
        _ => Vec3::new(5.0, 2.0, -5.0),
    }
}

fn allocator_for(world: &World, config: QuadShadowConfig) -> QuadrantShadowAllocator {
    QuadrantShadowAllocator::new(config)
        .with_light(world.light.clone())
        .with_camera(world.camera.clone())
        .with_scene(world.scene.clone())
}

fn assert_permutation(allocator: &QuadrantShadowAllocator) {
    let mut tags = allocator.slot_quadrants();
    assert_eq!(tags[0], allocator.active_quadrant());
    tags.sort();
    assert_eq!(tags, [0, 1, 2, 3]);
}

#[test]
fn test_camera_inside_each_quadrant() {
    init_logging();
    let world = overhead_world();
    let mut allocator = allocator_for(&world, QuadShadowConfig::default());
    allocator.initialize().unwrap();

    for quadrant in [3, 1, 0, 2, 2, 3] {
        world.camera.write().position = quadrant_center(quadrant);
        let report = allocator.update_before_frame().unwrap();

        assert_eq!(report.active_quadrant, quadrant);
        assert_permutation(&allocator);
    }
}

#[test]
fn test_transposition_when_moving_quadrant_zero_to_two() {
    init_logging();
    let world = overhead_world();
    let mut allocator = allocator_for(&world, QuadShadowConfig::default());
    allocator.initialize().unwrap();

    world.camera.write().position = quadrant_center(0);
    allocator.update_before_frame().unwrap();
    let slot0_before = allocator.caster(0).unwrap().bounds;
    let slot2_before = allocator.caster(2).unwrap().bounds;
    assert_eq!(allocator.slot_quadrants(), [0, 1, 2, 3]);

    world.camera.write().position = quadrant_center(2);
    let report = allocator.update_before_frame().unwrap();

    assert!(report.switched);
    assert_eq!(report.slot_quadrants, [2, 1, 0, 3]);
    assert_eq!(allocator.caster(0).unwrap().bounds, slot2_before);
    assert_eq!(allocator.caster(2).unwrap().bounds, slot0_before);
}

#[test]
fn test_high_resolution_stays_in_slot_zero() {
    let world = overhead_world();
    let mut allocator = allocator_for(&world, QuadShadowConfig::default());
    allocator.initialize().unwrap();

    for quadrant in [1, 3, 2, 0] {
        world.camera.write().position = quadrant_center(quadrant);
        allocator.update_before_frame().unwrap();

        let high = allocator.caster(0).unwrap();
        assert_eq!(high.resolution, ShadowMapSize::square(4096));
        assert_eq!(high.bounds, allocator.quadrant_bounds(quadrant).unwrap());
        assert!(high.needs_update);
        for slot in 1..4 {
            assert_eq!(allocator.caster(slot).unwrap().resolution, ShadowMapSize::square(256));
        }
    }
}

#[test]
fn test_permutation_holds_along_a_walk() {
    let world = overhead_world();
    let mut allocator = allocator_for(&world, QuadShadowConfig::default());
    allocator.initialize().unwrap();

    // Circle around the light's footprint, crossing every quadrant edge
    for step in 0..64 {
        let angle = step as f32 / 64.0 * std::f32::consts::TAU;
        world.camera.write().position = Vec3::new(angle.cos() * 7.0, 1.5, angle.sin() * 7.0);
        allocator.update_before_frame().unwrap();
        assert_permutation(&allocator);
    }
}

#[test]
fn test_boundary_tie_goes_to_higher_quadrant() {
    let world = overhead_world();
    let recorder = Arc::new(RecordingObserver::new());
    let config = QuadShadowConfig { clip_slack: 0.2, ..Default::default() };
    let mut allocator = allocator_for(&world, config).with_observer(recorder.clone());
    allocator.initialize().unwrap();

    // World x = 0 is the edge shared by quadrants 0 and 1; with slack both
    // casters accept the camera
    world.camera.write().position = Vec3::new(0.0, 2.0, 5.0);
    let report = allocator.update_before_frame().unwrap();
    assert_eq!(report.active_quadrant, 1);
    assert_eq!(report.slot_quadrants, [1, 0, 2, 3]);
    assert!(report.switched);

    // Slots 0 and 1 now hold the two quadrants swapped; a still camera must
    // stay on quadrant 1
    for _ in 0..5 {
        let report = allocator.update_before_frame().unwrap();
        assert_eq!(report.active_quadrant, 1);
        assert!(!report.switched);
        assert_eq!(report.slot_quadrants, [1, 0, 2, 3]);
    }
    assert_eq!(recorder.len(), 1);
}

#[test]
fn test_exact_boundary_without_slack_is_sticky() {
    let world = overhead_world();
    let mut allocator = allocator_for(&world, QuadShadowConfig::default());
    allocator.initialize().unwrap();

    world.camera.write().position = quadrant_center(3);
    allocator.update_before_frame().unwrap();

    // On the edge between 0 and 1: neither strict test passes
    world.camera.write().position = Vec3::new(0.0, 2.0, 5.0);
    let report = allocator.update_before_frame().unwrap();
    assert_eq!(report.active_quadrant, 3);
    assert!(!report.switched);
}

#[test]
fn test_observer_receives_switches() {
    init_logging();
    let world = overhead_world();
    let recorder = Arc::new(RecordingObserver::new());
    let mut allocator = allocator_for(&world, QuadShadowConfig::default())
        .with_observer(recorder.clone())
        .with_observer(LogObserver);
    allocator.initialize().unwrap();

    for quadrant in [0, 0, 1, 1, 3] {
        world.camera.write().position = quadrant_center(quadrant);
        allocator.update_before_frame().unwrap();
    }

    let events = recorder.events();
    assert_eq!(events.len(), 2);
    assert_eq!((events[0].from, events[0].to, events[0].frame), (0, 1, 3));
    assert_eq!((events[1].from, events[1].to, events[1].frame), (1, 3, 5));
    assert_eq!(events[1].slot_quadrants, [3, 1, 2, 0]);
}

#[test]
fn test_casters_follow_moving_sun() {
    let world = overhead_world();
    let mut allocator = allocator_for(&world, QuadShadowConfig::default());
    allocator.initialize().unwrap();

    {
        let mut light = world.light.write();
        light.position = Vec3::new(10.0, 40.0, 0.0);
        light.intensity = 0.5;
    }
    allocator.update_before_frame().unwrap();

    for caster in allocator.casters() {
        assert_eq!(caster.position, Vec3::new(10.0, 40.0, 0.0));
        assert_eq!(caster.intensity, 0.5);
    }
}

#[test]
fn test_visibility_expression_combines_with_min() {
    let world = overhead_world();
    let mut allocator = allocator_for(&world, QuadShadowConfig::default());

    let expr = allocator.build_visibility_expression().unwrap();
    assert!(allocator.is_initialized());

    // Only the caster covering the point reports an occluder
    let covering: Vec<usize> = allocator
        .casters()
        .iter()
        .filter(|c| c.contains_xy(quadrant_center(2), 0.0))
        .map(|c| c.slot)
        .collect();
    assert_eq!(covering, vec![2]);

    let sampler = |slot: usize, _: Vec3| -> f32 { if slot == 2 { 0.1 } else { 1.0 } };
    let color = expr.evaluate(&sampler, quadrant_center(2));
    assert!((color.x - 0.1).abs() < 1e-6);
    assert!((color.w - 0.1).abs() < 1e-6);
}

#[test]
fn test_dispose_leaves_scene_clean() {
    let world = overhead_world();
    let node_count = world.scene.read().len();
    let mut allocator = allocator_for(&world, QuadShadowConfig::default());

    allocator.initialize().unwrap();
    assert_eq!(world.scene.read().len(), node_count + 8);
    assert!(!world.light.read().visible);

    allocator.dispose();

    let scene = world.scene.read();
    assert_eq!(scene.len(), node_count);
    assert_eq!(scene.count_kind(|k| matches!(k, NodeKind::ShadowCaster(_) | NodeKind::CasterTarget(_))), 0);
    assert!(world.light.read().visible);
}

#[test]
fn test_gpu_upload_bytes() {
    let world = overhead_world();
    let mut allocator = allocator_for(&world, QuadShadowConfig::default());
    allocator.initialize().unwrap();
    world.camera.write().position = quadrant_center(1);
    allocator.update_before_frame().unwrap();

    let data = allocator.gpu_data();
    assert_eq!(data.as_bytes().len(), GpuQuadrantShadows::SIZE);
    assert_eq!(data.active_quadrant, 1);
    assert_eq!(data.casters[0].quadrant, 1);
    assert_eq!(data.casters[1].quadrant, 0);
}

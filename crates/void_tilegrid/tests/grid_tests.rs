//! Integration tests for the tile occlusion grid

use glam::Vec3;
use void_tilegrid::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_city_block_shadows() {
    init_logging();
    let mut grid = GridConfig::new(16, 16, 2.0).build().unwrap();

    // A row of towers along z = 8
    for (x, height) in [(2, 6.0), (3, 2.0), (10, 3.0)] {
        grid.set_tile_height(x, 8, height);
    }

    let reached = grid.calculate_all_shadows(Vec3::new(1.0, -2.0, 0.0)).unwrap();
    // Lengths 3, 1 and 1.5 tiles
    assert_eq!(reached, 3 + 1 + 1);

    // Tower at x=2 shades x=3..=5; the short tower at x=3 adds a zero tail
    assert!((grid.tile(3, 8).unwrap().shadow_height() - 4.0).abs() < 1e-5);
    assert!((grid.tile(4, 8).unwrap().shadow_height() - 2.0).abs() < 1e-5);
    assert!((grid.tile(11, 8).unwrap().shadow_height() - 1.0).abs() < 1e-5);
    assert_eq!(grid.tile(12, 8).unwrap().shadow_height(), 0.0);

    // Nothing leaks into other rows
    assert!(grid
        .tiles()
        .filter(|(coord, _)| coord.z != 8)
        .all(|(_, tile)| tile.shadow_height() == 0.0));
}

#[test]
fn test_moving_sun_needs_clear() {
    let mut grid = TileGrid::new(10, 10, 1.0).unwrap();
    grid.set_tile_height(5, 5, 4.0);

    grid.calculate_all_shadows(Vec3::new(1.0, -1.0, 0.0)).unwrap();
    grid.calculate_all_shadows(Vec3::new(-1.0, -1.0, 0.0)).unwrap();
    assert!(grid.is_shadowed(6, 5, 1.0));
    assert!(grid.is_shadowed(4, 5, 1.0));

    grid.clear_shadows();
    grid.calculate_all_shadows(Vec3::new(-1.0, -1.0, 0.0)).unwrap();
    assert!(!grid.is_shadowed(6, 5, 0.0));
    assert!(grid.is_shadowed(4, 5, 1.0));
}

#[test]
fn test_world_queries() {
    let mut grid = TileGrid::new(20, 10, 0.5).unwrap();
    assert_eq!(grid.world_width(), 10.0);
    assert_eq!(grid.world_height(), 5.0);

    let coord = grid.world_to_tile(1.2, -0.3);
    assert_eq!(coord, TileCoord::new(12, 4));
    assert!(grid.set_tile_max_height(coord.x, coord.z, Some(4.0)));

    assert_eq!(grid.tile_at_world(1.2, -0.3).unwrap().max_height(), Some(4.0));
    assert!(grid.tile_at_world(5.0, 0.0).is_none());
}

#[test]
fn test_invalid_arguments() {
    assert!(matches!(
        TileGrid::new(4, 4, -0.5),
        Err(TileGridError::InvalidArgument(_))
    ));

    let mut grid = TileGrid::new(4, 4, 1.0).unwrap();
    let err = grid.calculate_all_shadows(Vec3::new(1.0, 0.0, 1.0)).unwrap_err();
    assert!(err.to_string().starts_with("Invalid argument"));
}

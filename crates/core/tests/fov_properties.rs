use delve_core::fov::{self, VisibilityGrid};
use delve_core::mapgen::{MapGenerator, MapKind};
use delve_core::{Map, MapMemory, Pos, TileKind, VisibilityState};
use proptest::{
    arbitrary::any,
    strategy::Strategy,
    test_runner::{Config as ProptestConfig, TestCaseError, TestRunner},
};

fn open_floor(width: usize, height: usize) -> Map {
    let mut map = Map::new(width, height);
    map.fill(TileKind::Floor);
    map
}

#[test]
fn test_origin_is_always_visible() {
    let mut map = Map::default();
    MapGenerator::default().generate(&mut map, MapKind::Procedural, 31);

    let cases = (0..map.width() as i32, 0..map.height() as i32, 0..15_i32);
    let mut runner = TestRunner::new(ProptestConfig::with_cases(64));
    runner
        .run(&cases, |(x, y, radius)| {
            let origin = Pos::new(x, y);
            let mut grid = VisibilityGrid::default();
            fov::calculate(&map, origin, radius, &mut grid);
            if !grid.is_visible(origin) {
                return Err(TestCaseError::fail(format!("origin {origin:?} hidden at r{radius}")));
            }
            Ok(())
        })
        .expect("the viewer's own cell is always in view");
}

#[test]
fn test_visibility_never_exceeds_the_radius() {
    let map = open_floor(40, 40);
    let cases = (any::<u8>().prop_map(|r| i32::from(r % 20)), 0..40_i32, 0..40_i32);
    let mut runner = TestRunner::new(ProptestConfig::with_cases(32));
    runner
        .run(&cases, |(radius, x, y)| {
            let origin = Pos::new(x, y);
            for pos in fov::visible_tiles(&map, origin, radius) {
                if pos.distance_squared(origin) > i64::from(radius * radius) {
                    return Err(TestCaseError::fail(format!("{pos:?} beyond r{radius}")));
                }
            }
            Ok(())
        })
        .expect("visible cells lie inside the radius circle");
}

#[test]
fn test_wall_between_viewer_and_target_hides_target() {
    let mut map = open_floor(30, 30);
    let origin = Pos::new(15, 15);
    let target = Pos::new(15, 11);
    assert!(fov::is_visible(&map, origin, target, 10));

    map.set_tile(Pos::new(15, 13), TileKind::Wall);
    assert!(!fov::is_visible(&map, origin, target, 10));
    assert!(fov::is_visible(&map, origin, Pos::new(15, 13), 10), "the wall itself is seen");
}

#[test]
fn test_radius_boundary_is_inclusive() {
    let map = open_floor(30, 30);
    let visible = fov::visible_tiles(&map, Pos::new(15, 15), 5);
    assert!(visible.contains(&Pos::new(15, 10)));
    assert!(!visible.contains(&Pos::new(15, 9)));
}

#[test]
fn test_memory_tracks_explored_cells_across_moves() {
    let mut map = open_floor(40, 10);
    map.set_tile(Pos::new(20, 5), TileKind::Wall);
    let mut memory = MapMemory::for_map(&map);

    let mut grid = VisibilityGrid::default();
    fov::calculate(&map, Pos::new(5, 5), 4, &mut grid);
    memory.update(&map, &grid);
    assert_eq!(memory.visibility(Pos::new(7, 5)), VisibilityState::Visible);

    fov::calculate(&map, Pos::new(30, 5), 4, &mut grid);
    memory.update(&map, &grid);
    assert_eq!(memory.visibility(Pos::new(7, 5)), VisibilityState::Remembered);
    assert_eq!(memory.remembered(Pos::new(7, 5)), TileKind::Floor);
    assert_eq!(memory.visibility(Pos::new(20, 5)), VisibilityState::Unknown);
}

#[test]
fn test_explored_is_a_one_way_ratchet() {
    let mut map = open_floor(30, 30);
    map.update_visibility(Pos::new(5, 5), 3);
    let first_view: Vec<Pos> = map.explored_points();

    map.update_visibility(Pos::new(25, 25), 3);
    assert!(!map.is_visible(Pos::new(5, 5)));
    for pos in first_view {
        assert!(map.is_explored(pos), "{pos:?} was forgotten");
    }
}

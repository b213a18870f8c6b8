use gridshot::assets::{ENEMY, NoAssets, PILLAR};
use gridshot::camera::Camera;
use gridshot::caster::{DepthBuffer, RayHit, cast_ray, cast_walls};
use gridshot::config::RenderConfig;
use gridshot::renderer::{View, render_frame, wall_span};
use gridshot::sprites::{Billboard, SpriteClass, compose};
use gridshot::world::GridMap;

use std::f32::consts::{FRAC_PI_2, FRAC_PI_3};

const WIDTH: usize = 96;
const HEIGHT: usize = 64;

/// Tall open room with a solid wall column at x = 5.
fn wall_at_five() -> GridMap {
    let mut map = GridMap::bordered(12, 40);
    for y in 0..40 {
        map.set(5, y, 1);
    }
    map
}

fn cast(map: &GridMap, camera: &Camera, rays: usize) -> (Vec<RayHit>, DepthBuffer) {
    let mut hits = Vec::new();
    let mut depth = DepthBuffer::new();
    cast_walls(map, camera, rays, 24.0, &mut hits, &mut depth);
    (hits, depth)
}

fn enemy_at(pos: [f32; 2]) -> Billboard {
    Billboard {
        pos,
        class: SpriteClass::Tall,
        texture: ENEMY,
        scale: 1.0,
        opacity: 1.0,
    }
}

// ── wall casting ──────────────────────────────────────────────────────────────

#[test]
fn central_ray_reports_distance_to_facing_wall() {
    let camera = Camera::new([2.5, 20.5], 0.0, FRAC_PI_3);
    let (hits, depth) = cast(&wall_at_five(), &camera, 9);
    assert_eq!(hits.len(), 9);
    assert_eq!(depth.len(), 9);
    assert!((hits[4].distance - 2.5).abs() < 1e-4);
    assert!((depth.get(4) - 2.5).abs() < 1e-4);
}

#[test]
fn flat_wall_has_constant_perpendicular_depth() {
    // Every ray hits the same plane, so no fisheye bulge is allowed
    let camera = Camera::new([2.5, 20.5], 0.0, FRAC_PI_3);
    let (_, depth) = cast(&wall_at_five(), &camera, 61);
    for (i, d) in depth.as_slice().iter().enumerate() {
        assert!((d - 2.5).abs() < 1e-3, "ray {i} depth {d}");
    }

    // Wall slices therefore share one height, all standing on the horizon
    let cfg = RenderConfig::default();
    let horizon = camera.horizon(HEIGHT as f32);
    let (top_l, bot_l) = wall_span(&camera, depth.get(0), WIDTH, HEIGHT, &cfg);
    let (top_c, bot_c) = wall_span(&camera, depth.get(30), WIDTH, HEIGHT, &cfg);
    assert!((top_l - top_c).abs() < 0.05);
    assert_eq!(bot_l, horizon);
    assert_eq!(bot_c, horizon);
    assert!(top_c < horizon);
}

#[test]
fn single_ray_distance_is_euclidean() {
    let map = wall_at_five();
    // Direction (0.8, 0.6) from (1, 1) meets x = 5 at (5, 4)
    let hit = cast_ray(&map, [1.0, 1.0], 0.6f32.atan2(0.8), 24.0);
    assert!(hit.is_hit());
    assert!((hit.distance - 5.0).abs() < 1e-4);

    // Straight down +Y into the bottom border row
    let hit = cast_ray(&GridMap::bordered(6, 8), [2.5, 2.5], FRAC_PI_2, 24.0);
    assert!((hit.distance - 4.5).abs() < 1e-4);
}

#[test]
fn open_map_reports_max_distance() {
    let map = GridMap::new(64, 3, vec![0; 64 * 3]).unwrap();
    let hit = cast_ray(&map, [1.5, 1.5], 0.0, 10.0);
    assert!(!hit.is_hit());
    assert_eq!(hit.distance, 10.0);
}

// ── sprites against the depth buffer ─────────────────────────────────────────

#[test]
fn sprite_behind_wall_is_hidden() {
    let camera = Camera::new([2.5, 20.5], 0.0, FRAC_PI_3);
    let (_, depth) = cast(&wall_at_five(), &camera, WIDTH);
    let cfg = RenderConfig::default();

    let sprites = compose(
        &camera,
        &[enemy_at([7.5, 20.5])],
        &depth,
        WIDTH,
        HEIGHT,
        &cfg,
    );
    assert!(sprites.is_empty());
}

#[test]
fn sprite_in_front_of_wall_is_drawn() {
    let camera = Camera::new([2.5, 20.5], 0.0, FRAC_PI_3);
    let (_, depth) = cast(&wall_at_five(), &camera, WIDTH);
    let cfg = RenderConfig::default();

    let sprites = compose(
        &camera,
        &[enemy_at([4.0, 20.5])],
        &depth,
        WIDTH,
        HEIGHT,
        &cfg,
    );
    assert_eq!(sprites.len(), 1);
    assert!((sprites[0].distance - 1.5).abs() < 1e-4);
    assert!((sprites[0].center_x - (WIDTH - 1) as f32 * 0.5).abs() < 0.5);
}

#[test]
fn visible_sprites_are_sorted_far_to_near() {
    let camera = Camera::new([2.5, 20.5], 0.0, FRAC_PI_3);
    let (_, depth) = cast(&wall_at_five(), &camera, WIDTH);
    let cfg = RenderConfig::default();
    let billboards = [
        enemy_at([3.5, 20.4]),
        Billboard {
            texture: PILLAR,
            ..enemy_at([4.5, 20.7])
        },
        enemy_at([4.0, 20.2]),
    ];

    let sprites = compose(&camera, &billboards, &depth, WIDTH, HEIGHT, &cfg);
    assert_eq!(sprites.len(), 3);
    assert_eq!(sprites[0].texture, PILLAR);
    assert!(sprites.windows(2).all(|w| w[0].distance >= w[1].distance));
}

// ── full frame ───────────────────────────────────────────────────────────────

#[test]
fn frame_shows_sprite_over_wall() {
    let map = wall_at_five();
    let cfg = RenderConfig::default();
    let camera = Camera::new([2.5, 20.5], 0.0, FRAC_PI_3);
    let mut depth = DepthBuffer::new();

    let mut empty = vec![0u32; WIDTH * HEIGHT];
    let view = View {
        camera,
        map: &map,
        billboards: Vec::new(),
        tint: None,
    };
    render_frame(&mut empty, WIDTH, HEIGHT, &view, &cfg, &mut depth, &NoAssets);
    assert_eq!(depth.len(), WIDTH);

    let mut with_enemy = vec![0u32; WIDTH * HEIGHT];
    let view = View {
        billboards: vec![enemy_at([4.0, 20.5])],
        ..view
    };
    render_frame(&mut with_enemy, WIDTH, HEIGHT, &view, &cfg, &mut depth, &NoAssets);

    let center = HEIGHT / 2 * WIDTH + WIDTH / 2;
    assert_ne!(empty[center], with_enemy[center]);
    // Far corners are outside the sprite and stay identical
    assert_eq!(empty[0], with_enemy[0]);
    assert_eq!(empty[WIDTH * HEIGHT - 1], with_enemy[WIDTH * HEIGHT - 1]);
}

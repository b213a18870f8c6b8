use rayon::iter::{IndexedParallelIterator, IntoParallelRefMutIterator, ParallelIterator};

use crate::camera::{Camera, MIN_DISTANCE, direction};
use crate::world::GridMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Crossed a vertical grid line (x = const).
    X,
    /// Crossed a horizontal grid line (y = const).
    Y,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Perpendicular distance; `max_distance` when nothing was hit.
    pub distance: f32,
    pub side: Side,
    /// Horizontal texture coordinate in [0, 1).
    pub tex_u: f32,
    /// Wall code of the hit cell, 0 for a miss.
    pub cell: u8,
}

impl RayHit {
    pub fn miss(max_distance: f32) -> Self {
        Self {
            distance: max_distance,
            side: Side::X,
            tex_u: 0.0,
            cell: 0,
        }
    }

    #[inline]
    pub fn is_hit(&self) -> bool {
        self.cell != 0
    }
}

/// Nearest-wall depth per ray for the current frame.
///
/// Owned by the caller, refilled by [`cast_walls`] every frame and read by
/// the floor and sprite stages of that same frame.
#[derive(Debug, Default, Clone)]
pub struct DepthBuffer {
    depths: Vec<f32>,
}

impl DepthBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    #[inline]
    pub fn get(&self, ray: usize) -> f32 {
        self.depths.get(ray).copied().unwrap_or(f32::INFINITY)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.depths
    }

    /// Ray index covering framebuffer column `col` of `width`.
    #[inline]
    pub fn ray_for_column(&self, col: usize, width: usize) -> usize {
        let n = self.depths.len();
        if n <= 1 || width <= 1 {
            return 0;
        }
        let t = col.min(width - 1) as f32 / (width - 1) as f32;
        ((t * (n - 1) as f32).round() as usize).min(n - 1)
    }

    /// Depth seen by framebuffer column `col`.
    #[inline]
    pub fn at_column(&self, col: usize, width: usize) -> f32 {
        self.get(self.ray_for_column(col, width))
    }

    fn fill_from(&mut self, hits: &[RayHit]) {
        self.depths.clear();
        self.depths.extend(hits.iter().map(|h| h.distance));
    }
}

/// March a single ray through the grid.
///
/// Returns the Euclidean distance along the ray to the first solid cell
/// boundary; callers convert to perpendicular depth.
pub fn cast_ray(map: &GridMap, origin: [f32; 2], angle: f32, max_distance: f32) -> RayHit {
    let [dx, dy] = direction(angle);

    let mut map_x = origin[0].floor() as i32;
    let mut map_y = origin[1].floor() as i32;

    let delta_x = if dx.abs() < f32::EPSILON {
        f32::INFINITY
    } else {
        (1.0 / dx).abs()
    };
    let delta_y = if dy.abs() < f32::EPSILON {
        f32::INFINITY
    } else {
        (1.0 / dy).abs()
    };

    let (step_x, mut side_x) = if dx < 0.0 {
        (-1, first_boundary(origin[0] - map_x as f32, delta_x))
    } else {
        (1, first_boundary(map_x as f32 + 1.0 - origin[0], delta_x))
    };
    let (step_y, mut side_y) = if dy < 0.0 {
        (-1, first_boundary(origin[1] - map_y as f32, delta_y))
    } else {
        (1, first_boundary(map_y as f32 + 1.0 - origin[1], delta_y))
    };

    loop {
        // Distance to the boundary about to be crossed
        let (dist, side) = if side_x < side_y {
            let d = side_x;
            side_x += delta_x;
            map_x += step_x;
            (d, Side::X)
        } else {
            let d = side_y;
            side_y += delta_y;
            map_y += step_y;
            (d, Side::Y)
        };

        if !dist.is_finite() || dist >= max_distance {
            return RayHit::miss(max_distance);
        }

        let cell = map.cell(map_x, map_y);
        if cell != 0 {
            let hit_x = origin[0] + dx * dist;
            let hit_y = origin[1] + dy * dist;
            let mut tex_u = match side {
                Side::X => hit_y - hit_y.floor(),
                Side::Y => hit_x - hit_x.floor(),
            };
            // Keep textures reading left-to-right from every viewing side
            if (side == Side::X && dx < 0.0) || (side == Side::Y && dy > 0.0) {
                tex_u = 1.0 - tex_u;
            }
            return RayHit {
                distance: dist.max(MIN_DISTANCE),
                side,
                tex_u: tex_u.clamp(0.0, 0.9999),
                cell,
            };
        }
    }
}

/// Ray length to the first grid line; an axis-parallel ray never gets there.
#[inline]
fn first_boundary(offset: f32, delta: f32) -> f32 {
    if delta.is_infinite() {
        f32::INFINITY
    } else {
        offset * delta
    }
}

/// Cast `rays` rays across the camera FOV.
///
/// `hits` receives one entry per ray with perpendicular distances, and
/// `depth` is refilled from it.
pub fn cast_walls(
    map: &GridMap,
    camera: &Camera,
    rays: usize,
    max_distance: f32,
    hits: &mut Vec<RayHit>,
    depth: &mut DepthBuffer,
) {
    hits.clear();
    hits.resize(rays, RayHit::miss(max_distance));

    hits.par_iter_mut().enumerate().for_each(|(i, out)| {
        let angle = camera.ray_angle(i, rays);
        let mut hit = cast_ray(map, camera.pos, angle, max_distance);
        if hit.is_hit() {
            // Project onto the view axis to remove fisheye
            let perp = hit.distance * (angle - camera.angle).cos();
            hit.distance = perp.clamp(MIN_DISTANCE, max_distance);
        }
        *out = hit;
    });

    depth.fill_from(hits);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> GridMap {
        // 12 x 5, wall column at x = 5
        let mut map = GridMap::bordered(12, 5);
        for y in 0..5 {
            map.set(5, y, 2);
        }
        map
    }

    #[test]
    fn straight_ray_hits_wall_column() {
        let hit = cast_ray(&corridor(), [2.5, 2.5], 0.0, 20.0);
        assert!((hit.distance - 2.5).abs() < 1e-5);
        assert_eq!(hit.side, Side::X);
        assert_eq!(hit.cell, 2);
        assert!((hit.tex_u - 0.5).abs() < 1e-5);
    }

    #[test]
    fn diagonal_ray_reports_euclidean_distance() {
        let map = GridMap::bordered(10, 10);
        // From (5, 5) at 45 degrees the first solid boundary is x = 9 (or y = 9)
        let hit = cast_ray(&map, [5.0, 5.0], std::f32::consts::FRAC_PI_4, 50.0);
        assert!((hit.distance - 4.0 * 2f32.sqrt()).abs() < 1e-3);
    }

    #[test]
    fn ray_facing_negative_y_hits_top_border() {
        let map = GridMap::bordered(8, 8);
        let hit = cast_ray(&map, [3.25, 4.5], -std::f32::consts::FRAC_PI_2, 50.0);
        assert!((hit.distance - 3.5).abs() < 1e-4);
        assert_eq!(hit.side, Side::Y);
        assert!((hit.tex_u - 0.25).abs() < 1e-4);
    }

    #[test]
    fn far_walls_are_misses() {
        let hit = cast_ray(&corridor(), [2.5, 2.5], 0.0, 2.0);
        assert!(!hit.is_hit());
        assert_eq!(hit.distance, 2.0);
    }

    #[test]
    fn depth_buffer_matches_hits() {
        let map = corridor();
        let cam = Camera::new([2.5, 2.5], 0.0, 1.0);
        let mut hits = Vec::new();
        let mut depth = DepthBuffer::new();
        cast_walls(&map, &cam, 9, 20.0, &mut hits, &mut depth);
        assert_eq!(depth.len(), 9);
        for (i, h) in hits.iter().enumerate() {
            assert_eq!(depth.get(i), h.distance);
        }
    }

    #[test]
    fn column_to_ray_mapping_spans_both_ends() {
        let mut depth = DepthBuffer::new();
        depth.fill_from(&[RayHit::miss(1.0); 4]);
        assert_eq!(depth.ray_for_column(0, 640), 0);
        assert_eq!(depth.ray_for_column(639, 640), 3);
        assert_eq!(depth.ray_for_column(320, 640), 2);
    }
}

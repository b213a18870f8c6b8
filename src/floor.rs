use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

use crate::assets::{AssetProvider, FLOOR, fallback_color};
use crate::camera::{Camera, direction};
use crate::caster::DepthBuffer;
use crate::config::RenderConfig;
use crate::renderer::{attenuation, shade};

/// Rows closer to the horizon than this have no usable projected distance.
const HORIZON_EPSILON: f32 = 1e-3;

/// View-axis distance of the floor seen on screen row `y`.
///
/// `None` on and above the horizon.
#[inline]
pub fn row_distance(y: usize, horizon: f32, proj: f32, eye_height: f32) -> Option<f32> {
    let offset = y as f32 - horizon;
    if offset < HORIZON_EPSILON {
        return None;
    }
    Some(proj * eye_height / offset)
}

/// World-space endpoints of a floor row: where the left and right FOV edge
/// rays cross the floor at view-axis distance `dist`.
#[inline]
pub fn row_endpoints(camera: &Camera, dist: f32) -> ([f32; 2], [f32; 2]) {
    let half = 0.5 * camera.fov;
    // Edge rays travel farther than the view axis to reach the same depth
    let reach = dist / half.cos();
    let l = direction(camera.angle - half);
    let r = direction(camera.angle + half);
    (
        [camera.pos[0] + l[0] * reach, camera.pos[1] + l[1] * reach],
        [camera.pos[0] + r[0] * reach, camera.pos[1] + r[1] * reach],
    )
}

/// Fill every floor pixel below the horizon that is nearer than the wall in
/// its column. Suppressed pixels keep whatever is already in `buf`.
pub fn draw_floor(
    buf: &mut [u32],
    width: usize,
    height: usize,
    camera: &Camera,
    cfg: &RenderConfig,
    depth: &DepthBuffer,
    assets: &dyn AssetProvider,
) {
    if width == 0 || height == 0 {
        return;
    }
    let horizon = camera.horizon(height as f32);
    let proj = camera.projection_plane(width as f32);
    let texture = assets.texture(FLOOR);
    let flat = fallback_color(FLOOR);

    let column_depth: Vec<f32> = (0..width).map(|x| depth.at_column(x, width)).collect();
    let steps = (width.max(2) - 1) as f32;

    buf[..width * height]
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let Some(dist) = row_distance(y, horizon, proj, cfg.eye_height) else {
                return;
            };
            if dist > cfg.max_distance {
                return;
            }

            let (left, right) = row_endpoints(camera, dist);
            let step_x = (right[0] - left[0]) / steps;
            let step_y = (right[1] - left[1]) / steps;
            let light = attenuation(dist, cfg);

            let mut wx = left[0];
            let mut wy = left[1];
            for (x, px) in row.iter_mut().enumerate() {
                if dist <= column_depth[x] {
                    let texel = match texture {
                        Some(t) => t.sample_wrapped(wx, wy),
                        None => flat,
                    };
                    *px = shade(texel, light);
                }
                wx += step_x;
                wy += step_y;
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::NoAssets;
    use crate::caster::cast_walls;
    use crate::world::GridMap;

    #[test]
    fn horizon_row_has_no_distance() {
        assert_eq!(row_distance(100, 100.0, 200.0, 0.5), None);
        assert_eq!(row_distance(40, 100.0, 200.0, 0.5), None);
        assert_eq!(row_distance(150, 100.0, 200.0, 0.5), Some(2.0));
    }

    #[test]
    fn row_endpoints_sit_at_requested_depth() {
        let cam = Camera::new([1.0, 2.0], 0.3, 1.0);
        let (l, r) = row_endpoints(&cam, 3.0);
        assert!((cam.perpendicular_distance(l) - 3.0).abs() < 1e-4);
        assert!((cam.perpendicular_distance(r) - 3.0).abs() < 1e-4);
    }

    #[test]
    fn floor_stops_at_the_wall() {
        let cfg = RenderConfig::default();
        let (w, h) = (64, 48);
        let mut map = GridMap::bordered(16, 16);
        for y in 0..16 {
            map.set(5, y, 1);
        }
        let cam = Camera::new([2.5, 8.5], 0.0, cfg.fov);
        let mut hits = Vec::new();
        let mut depth = DepthBuffer::new();
        cast_walls(&map, &cam, w, cfg.max_distance, &mut hits, &mut depth);

        let sentinel = 0x00AB_CDEF;
        let mut buf = vec![sentinel; w * h];
        draw_floor(&mut buf, w, h, &cam, &cfg, &depth, &NoAssets);

        let horizon = cam.horizon(h as f32);
        let proj = cam.projection_plane(w as f32);
        let col = w / 2;
        for y in 0..h {
            let px = buf[y * w + col];
            match row_distance(y, horizon, proj, cfg.eye_height) {
                Some(d) if d <= depth.at_column(col, w) => assert_ne!(px, sentinel, "row {y}"),
                _ => assert_eq!(px, sentinel, "row {y}"),
            }
        }
    }
}

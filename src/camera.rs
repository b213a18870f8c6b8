use std::f32::consts::{PI, TAU};

/// Smallest distance any projection divides by.
pub const MIN_DISTANCE: f32 = 1e-4;

pub struct Camera {
    pub pos: [f32; 2], // (x, y) position in map units
    pub angle: f32,    // radians, 0 faces +X, increasing angles turn toward +Y
    pub fov: f32,      // horizontal field of view, radians
}

impl Camera {
    pub fn new(pos: [f32; 2], angle: f32, fov: f32) -> Self {
        Self { pos, angle, fov }
    }

    /// Angle of ray `i` out of `n`, spanning the FOV edge to edge.
    #[inline]
    pub fn ray_angle(&self, i: usize, n: usize) -> f32 {
        if n <= 1 {
            return self.angle;
        }
        let t = i as f32 / (n - 1) as f32;
        self.angle - 0.5 * self.fov + t * self.fov
    }

    #[inline]
    pub fn forward(&self) -> [f32; 2] {
        direction(self.angle)
    }

    /// Distance from the eye to a virtual screen `width` pixels wide.
    #[inline]
    pub fn projection_plane(&self, width: f32) -> f32 {
        0.5 * width / (0.5 * self.fov).tan()
    }

    /// Signed angle from the view axis to a world point, in (-pi, pi].
    #[inline]
    pub fn relative_angle(&self, p: [f32; 2]) -> f32 {
        let dx = p[0] - self.pos[0];
        let dy = p[1] - self.pos[1];
        normalize_angle(dy.atan2(dx) - self.angle)
    }

    #[inline]
    pub fn distance_to(&self, p: [f32; 2]) -> f32 {
        let dx = p[0] - self.pos[0];
        let dy = p[1] - self.pos[1];
        (dx * dx + dy * dy).sqrt()
    }

    /// Depth of a world point along the view axis, clamped to `MIN_DISTANCE`.
    #[inline]
    pub fn perpendicular_distance(&self, p: [f32; 2]) -> f32 {
        let dx = p[0] - self.pos[0];
        let dy = p[1] - self.pos[1];
        let f = self.forward();
        (dx * f[0] + dy * f[1]).max(MIN_DISTANCE)
    }

    /// Screen x for a relative angle; linear across the FOV.
    #[inline]
    pub fn column_for_angle(&self, rel: f32, width: usize) -> f32 {
        (rel / self.fov + 0.5) * (width.max(1) - 1) as f32
    }

    /// Projected height in pixels of something `size` units tall at depth `d`.
    #[inline]
    pub fn project_height(&self, size: f32, d: f32, width: f32) -> f32 {
        self.projection_plane(width) * size / d.max(MIN_DISTANCE)
    }

    #[inline]
    pub fn horizon(&self, screen_h: f32) -> f32 {
        0.5 * screen_h
    }
}

#[inline]
pub fn direction(angle: f32) -> [f32; 2] {
    [angle.cos(), angle.sin()]
}

/// Wrap into (-pi, pi].
#[inline]
pub fn normalize_angle(a: f32) -> f32 {
    let mut a = a % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_wraps_into_half_open_range() {
        assert!((normalize_angle(2.5 * PI) - 0.5 * PI).abs() < 1e-5);
        assert!((normalize_angle(-PI) - PI).abs() < 1e-5);
        assert!((normalize_angle(0.25) - 0.25).abs() < 1e-6);
        assert!((normalize_angle(-7.0) - (-7.0 + TAU)).abs() < 1e-5);
    }

    #[test]
    fn rays_span_fov_symmetrically() {
        let cam = Camera::new([0.0, 0.0], 1.0, 1.2);
        assert!((cam.ray_angle(0, 5) - 0.4).abs() < 1e-6);
        assert!((cam.ray_angle(2, 5) - 1.0).abs() < 1e-6);
        assert!((cam.ray_angle(4, 5) - 1.6).abs() < 1e-6);
        assert_eq!(cam.ray_angle(0, 1), 1.0);
    }

    #[test]
    fn perpendicular_distance_ignores_lateral_offset() {
        let cam = Camera::new([1.0, 1.0], 0.0, 1.0);
        assert!((cam.perpendicular_distance([4.0, 3.0]) - 3.0).abs() < 1e-6);
        assert_eq!(cam.perpendicular_distance([0.0, 1.0]), MIN_DISTANCE);
    }

    #[test]
    fn center_angle_maps_to_center_column() {
        let cam = Camera::new([0.0, 0.0], 0.0, 1.0);
        assert!((cam.column_for_angle(0.0, 101) - 50.0).abs() < 1e-4);
        assert!((cam.column_for_angle(-0.5, 101)).abs() < 1e-4);
        assert!((cam.column_for_angle(0.5, 101) - 100.0).abs() < 1e-4);
    }
}

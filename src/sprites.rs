use crate::assets::{AssetProvider, COLOR_KEY, fallback_color};
use crate::camera::{Camera, MIN_DISTANCE};
use crate::caster::DepthBuffer;
use crate::config::RenderConfig;
use crate::renderer::{attenuation, blend, shade};

/// Sprites closer than this to the eye are not drawn.
const NEAR: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpriteClass {
    /// Roughly wall height; enemies and pillars.
    Tall,
    /// Knee height props.
    Short,
}

/// A point entity to be drawn as a camera-facing quad.
#[derive(Clone, Debug, PartialEq)]
pub struct Billboard {
    pub pos: [f32; 2],
    pub class: SpriteClass,
    pub texture: &'static str,
    /// Extra size factor, 1.0 normally, shrinks toward 0 while dying.
    pub scale: f32,
    pub opacity: f32,
}

/// A billboard after projection, in screen pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct ScreenSprite {
    pub texture: &'static str,
    pub center_x: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    /// View-axis distance, comparable with depth buffer entries.
    pub distance: f32,
    pub light: f32,
    pub opacity: f32,
}

impl ScreenSprite {
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Project one billboard; `None` when it is outside the FOV or behind the eye.
pub fn project(
    camera: &Camera,
    b: &Billboard,
    width: usize,
    height: usize,
    cfg: &RenderConfig,
) -> Option<ScreenSprite> {
    let rel = camera.relative_angle(b.pos);
    if rel.abs() > 0.5 * camera.fov {
        return None;
    }
    let dist = camera.distance_to(b.pos);
    if dist < NEAR || b.scale <= 0.0 {
        return None;
    }

    // Cosine correction keeps sprites on the same depth scale as walls
    let perp = (dist * rel.cos()).max(MIN_DISTANCE);
    let (class_height, drop) = match b.class {
        SpriteClass::Tall => (cfg.tall_sprite_height, cfg.tall_sprite_drop),
        SpriteClass::Short => (cfg.short_sprite_height, cfg.short_sprite_drop),
    };
    let size = camera.project_height(class_height * b.scale, perp, width as f32);

    // Bottom edge sits `drop` of the sprite's own height below the horizon
    let bottom = camera.horizon(height as f32) + drop * size;

    Some(ScreenSprite {
        texture: b.texture,
        center_x: camera.column_for_angle(rel, width),
        top: bottom - size,
        width: size,
        height: size,
        distance: perp,
        light: attenuation(perp, cfg),
        opacity: b.opacity.clamp(0.0, 1.0),
    })
}

/// Project, occlude against walls, and sort back-to-front.
///
/// A sprite survives only if it is strictly nearer than the wall recorded
/// for the column under its center.
pub fn compose(
    camera: &Camera,
    billboards: &[Billboard],
    depth: &DepthBuffer,
    width: usize,
    height: usize,
    cfg: &RenderConfig,
) -> Vec<ScreenSprite> {
    let mut visible: Vec<ScreenSprite> = billboards
        .iter()
        .filter_map(|b| project(camera, b, width, height, cfg))
        .filter(|s| {
            let col = (s.center_x.round().max(0.0) as usize).min(width.saturating_sub(1));
            s.distance < depth.at_column(col, width)
        })
        .collect();

    visible.sort_by(|a, b| {
        b.distance
            .partial_cmp(&a.distance)
            .unwrap_or(std::cmp::Ordering::Equal) // farthest first
    });
    visible
}

/// Paint sprites in the given order; later sprites cover earlier ones.
pub fn draw_sprites(
    buf: &mut [u32],
    width: usize,
    height: usize,
    sprites: &[ScreenSprite],
    assets: &dyn AssetProvider,
) {
    for s in sprites {
        if s.width < 1.0 || s.height < 1.0 || s.opacity <= 0.0 {
            continue;
        }
        let texture = assets.texture(s.texture);
        let flat = fallback_color(s.texture);

        let left = s.center_x - 0.5 * s.width;
        let x0 = left.max(0.0).floor() as usize;
        let x1 = ((left + s.width).ceil().max(0.0) as usize).min(width);
        let y0 = s.top.max(0.0).floor() as usize;
        let y1 = (s.bottom().ceil().max(0.0) as usize).min(height);

        for x in x0..x1 {
            let u = (x as f32 + 0.5 - left) / s.width;
            for y in y0..y1 {
                let v = (y as f32 + 0.5 - s.top) / s.height;
                let texel = match texture {
                    Some(t) => t.sample_clamped(u, v),
                    None => flat,
                };
                if texel == COLOR_KEY {
                    continue;
                }
                let idx = y * width + x;
                let lit = shade(texel, s.light);
                buf[idx] = if s.opacity >= 1.0 {
                    lit
                } else {
                    blend(buf[idx], lit, s.opacity)
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ENEMY;

    fn billboard(pos: [f32; 2], class: SpriteClass) -> Billboard {
        Billboard {
            pos,
            class,
            texture: ENEMY,
            scale: 1.0,
            opacity: 1.0,
        }
    }

    #[test]
    fn sprite_on_axis_projects_to_center() {
        let cfg = RenderConfig::default();
        let cam = Camera::new([0.0, 0.0], 0.0, cfg.fov);
        let s = project(&cam, &billboard([4.0, 0.0], SpriteClass::Tall), 101, 80, &cfg).unwrap();
        assert!((s.center_x - 50.0).abs() < 1e-3);
        assert!((s.distance - 4.0).abs() < 1e-5);
    }

    #[test]
    fn sprites_outside_fov_or_behind_are_culled() {
        let cfg = RenderConfig::default();
        let cam = Camera::new([0.0, 0.0], 0.0, cfg.fov);
        assert!(project(&cam, &billboard([-3.0, 0.0], SpriteClass::Tall), 100, 80, &cfg).is_none());
        assert!(project(&cam, &billboard([1.0, 3.0], SpriteClass::Tall), 100, 80, &cfg).is_none());
    }

    #[test]
    fn off_axis_scale_uses_perpendicular_depth() {
        let cfg = RenderConfig::default();
        let cam = Camera::new([0.0, 0.0], 0.0, cfg.fov);
        let centered = project(&cam, &billboard([3.0, 0.0], SpriteClass::Tall), 200, 100, &cfg).unwrap();
        let offset = project(&cam, &billboard([3.0, 1.0], SpriteClass::Tall), 200, 100, &cfg).unwrap();
        assert!((centered.height - offset.height).abs() < 1e-3);
    }

    #[test]
    fn short_sprites_sit_lower_than_tall_ones() {
        let cfg = RenderConfig::default();
        let cam = Camera::new([0.0, 0.0], 0.0, cfg.fov);
        let tall = project(&cam, &billboard([3.0, 0.0], SpriteClass::Tall), 200, 100, &cfg).unwrap();
        let short = project(&cam, &billboard([3.0, 0.0], SpriteClass::Short), 200, 100, &cfg).unwrap();
        let horizon = cam.horizon(100.0);
        assert!(tall.top < horizon && tall.bottom() > horizon);
        assert!((tall.bottom() - horizon - cfg.tall_sprite_drop * tall.height).abs() < 1e-3);
        assert!((short.bottom() - horizon - cfg.short_sprite_drop * short.height).abs() < 1e-3);
        assert!(short.bottom() > tall.bottom());
        assert!(short.top > tall.top);
    }

    #[test]
    fn composition_is_back_to_front() {
        let cfg = RenderConfig::default();
        let cam = Camera::new([0.0, 0.0], 0.0, cfg.fov);
        let mut depth = DepthBuffer::new();
        crate::caster::cast_walls(
            &crate::world::GridMap::bordered(40, 40),
            &Camera::new([20.0, 20.0], 0.0, cfg.fov),
            100,
            cfg.max_distance,
            &mut Vec::new(),
            &mut depth,
        );
        let list = [
            billboard([2.0, 0.0], SpriteClass::Tall),
            billboard([6.0, 0.1], SpriteClass::Short),
            billboard([4.0, -0.1], SpriteClass::Tall),
        ];
        let out = compose(&cam, &list, &depth, 100, 80, &cfg);
        let d: Vec<f32> = out.iter().map(|s| s.distance.round()).collect();
        assert_eq!(d, vec![6.0, 4.0, 2.0]);
    }
}

use crate::assets::{AssetProvider, fallback_color, wall_name};
use crate::camera::{Camera, MIN_DISTANCE};
use crate::caster::{DepthBuffer, RayHit, Side, cast_walls};
use crate::config::RenderConfig;
use crate::floor::draw_floor;
use crate::sprites::{Billboard, compose, draw_sprites};
use crate::world::GridMap;

/// Full-screen color wash, used for muzzle and damage flashes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tint {
    pub color: u32,
    /// 0 = invisible, 1 = solid.
    pub strength: f32,
}

/// Everything the renderer reads for one frame.
pub struct View<'a> {
    pub camera: Camera,
    pub map: &'a GridMap,
    pub billboards: Vec<Billboard>,
    pub tint: Option<Tint>,
}

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    // BGRA8 in little-endian memory
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
    // Alpha at 0
}

#[inline]
pub fn unpack_rgb(c: u32) -> (u32, u32, u32) {
    ((c >> 16) & 0xFF, (c >> 8) & 0xFF, c & 0xFF)
}

/// Scale every channel by `k` in [0, 1].
#[inline]
pub fn shade(c: u32, k: f32) -> u32 {
    let k = (k.clamp(0.0, 1.0) * 256.0) as u32;
    let rb = ((c & 0x00FF00FF) * k >> 8) & 0x00FF00FF;
    let g = ((c & 0x0000FF00) * k >> 8) & 0x0000FF00;
    rb | g
}

/// Mix `src` over `dst`; `alpha` in [0, 1].
#[inline]
pub fn blend(dst: u32, src: u32, alpha: f32) -> u32 {
    let w = (alpha.clamp(0.0, 1.0) * 256.0) as u32;
    let inv = 256 - w;
    let rb = ((dst & 0x00FF00FF) * inv + (src & 0x00FF00FF) * w) >> 8 & 0x00FF00FF;
    let g = ((dst & 0x0000FF00) * inv + (src & 0x0000FF00) * w) >> 8 & 0x0000FF00;
    rb | g
}

/// Brightness for something `d` units away: full up to `near`, then 1/d falloff.
#[inline]
pub fn attenuation(d: f32, cfg: &RenderConfig) -> f32 {
    (cfg.shade_near / d.max(MIN_DISTANCE)).clamp(cfg.shade_min, 1.0)
}

pub const SKY_TOP: u32 = 0x0014_1830;
pub const SKY_HORIZON: u32 = 0x0046_4C64;
/// Left visible wherever no floor or wall is drawn below the horizon.
pub const BACKGROUND: u32 = 0x0010_1010;

/// Draw one frame into `buf`.
///
/// Stage order is fixed: walls fill `depth`, then floor and sprites read it.
/// `depth` belongs to the caller and is fully rewritten here.
pub fn render_frame(
    buf: &mut [u32],
    width: usize,
    height: usize,
    view: &View,
    cfg: &RenderConfig,
    depth: &mut DepthBuffer,
    assets: &dyn AssetProvider,
) {
    if width == 0 || height == 0 {
        return;
    }
    clear_background(buf, width, height);

    let rays = cfg.ray_count.unwrap_or(width).max(1);
    let mut hits = Vec::with_capacity(rays);
    cast_walls(
        view.map,
        &view.camera,
        rays,
        cfg.max_distance,
        &mut hits,
        depth,
    );

    draw_floor(buf, width, height, &view.camera, cfg, depth, assets);
    draw_walls(buf, width, height, &view.camera, cfg, &hits, depth, assets);

    let sprites = compose(&view.camera, &view.billboards, depth, width, height, cfg);
    draw_sprites(buf, width, height, &sprites, assets);

    if let Some(tint) = view.tint {
        if tint.strength > 0.0 {
            for px in buf.iter_mut() {
                *px = blend(*px, tint.color, tint.strength);
            }
        }
    }
}

fn clear_background(buf: &mut [u32], width: usize, height: usize) {
    let mid = height / 2;
    for y in 0..mid {
        let t = y as f32 / mid.max(1) as f32;
        let c = blend(SKY_TOP, SKY_HORIZON, t);
        let row = y * width;
        buf[row..row + width].fill(c);
    }
    buf[mid * width..height * width].fill(BACKGROUND);
}

/// Screen rows covered by a wall slice at perpendicular distance `d`.
///
/// The bottom sits on the horizon and the slice grows upward from it, so a
/// clipped top never leaves the wall floating.
#[inline]
pub fn wall_span(camera: &Camera, d: f32, width: usize, height: usize, cfg: &RenderConfig) -> (f32, f32) {
    let bottom = camera.horizon(height as f32);
    let top = bottom - camera.project_height(cfg.wall_height, d, width as f32);
    (top, bottom)
}

fn draw_walls(
    buf: &mut [u32],
    width: usize,
    height: usize,
    camera: &Camera,
    cfg: &RenderConfig,
    hits: &[RayHit],
    depth: &DepthBuffer,
    assets: &dyn AssetProvider,
) {
    for x in 0..width {
        let hit = hits[depth.ray_for_column(x, width)];
        if !hit.is_hit() {
            continue; // sky and background show through
        }

        let (top, bottom) = wall_span(camera, hit.distance, width, height, cfg);
        let span = bottom - top;
        if span <= 0.0 {
            continue;
        }

        let name = wall_name(hit.cell);
        let texture = assets.texture(name);
        let flat = fallback_color(name);
        let mut light = attenuation(hit.distance, cfg);
        if hit.side == Side::Y {
            light *= 0.78;
        }

        // Clamp to screen
        let y0 = top.max(0.0).floor() as usize;
        let y1 = (bottom.ceil() as usize).min(height);
        let mut idx = y0 * width + x;
        for y in y0..y1 {
            let v = (y as f32 + 0.5 - top) / span;
            let texel = match texture {
                Some(t) => t.sample_clamped(hit.tex_u, v),
                None => flat,
            };
            buf[idx] = shade(texel, light);
            idx += width;
        }
    }
}

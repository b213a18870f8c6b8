use std::collections::HashMap;

use crate::renderer::pack_rgb;

/// Texel value treated as transparent in sprite textures.
pub const COLOR_KEY: u32 = 0x00FF_00FF;

pub const FLOOR: &str = "floor";
pub const ENEMY: &str = "enemy";
pub const PILLAR: &str = "pillar";
pub const BARREL: &str = "barrel";

const WALLS: [&str; 10] = [
    "wall0", "wall1", "wall2", "wall3", "wall4", "wall5", "wall6", "wall7", "wall8", "wall9",
];

/// Logical texture name for a wall cell code.
pub fn wall_name(code: u8) -> &'static str {
    WALLS[(code as usize).min(WALLS.len() - 1)]
}

/// Decoded pixels, row-major, 0x00RRGGBB.
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl Texture {
    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> u32) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Sample with wrap-around; `u`/`v` may be any value.
    #[inline]
    pub fn sample_wrapped(&self, u: f32, v: f32) -> u32 {
        let fu = u - u.floor();
        let fv = v - v.floor();
        let x = ((fu * self.width as f32) as usize).min(self.width - 1);
        let y = ((fv * self.height as f32) as usize).min(self.height - 1);
        self.pixels[y * self.width + x]
    }

    /// Sample with `u`/`v` clamped into [0, 1].
    #[inline]
    pub fn sample_clamped(&self, u: f32, v: f32) -> u32 {
        let x = ((u.clamp(0.0, 1.0) * self.width as f32) as usize).min(self.width - 1);
        let y = ((v.clamp(0.0, 1.0) * self.height as f32) as usize).min(self.height - 1);
        self.pixels[y * self.width + x]
    }
}

pub trait AssetProvider {
    /// `None` while missing or not yet loaded.
    fn texture(&self, name: &str) -> Option<&Texture>;
}

/// Provider with nothing in it; every lookup falls back to a flat color.
pub struct NoAssets;

impl AssetProvider for NoAssets {
    fn texture(&self, _name: &str) -> Option<&Texture> {
        None
    }
}

/// Flat color used when a texture is unavailable.
pub fn fallback_color(name: &str) -> u32 {
    match name {
        FLOOR => pack_rgb(70, 64, 56),
        ENEMY => pack_rgb(190, 40, 40),
        PILLAR => pack_rgb(150, 150, 140),
        BARREL => pack_rgb(120, 90, 40),
        "wall2" => pack_rgb(110, 120, 150),
        "wall3" => pack_rgb(130, 100, 70),
        _ => pack_rgb(160, 160, 160),
    }
}

/// In-memory textures generated at startup.
pub struct ProceduralAssets {
    textures: HashMap<&'static str, Texture>,
}

impl Default for ProceduralAssets {
    fn default() -> Self {
        Self::new(64)
    }
}

impl ProceduralAssets {
    pub fn new(size: usize) -> Self {
        let size = size.max(8);
        let mut textures = HashMap::new();
        textures.insert("wall1", brick(size, (150, 60, 45), (90, 85, 80)));
        textures.insert("wall2", stone(size));
        textures.insert("wall3", planks(size));
        textures.insert(FLOOR, tiles(size));
        textures.insert(ENEMY, enemy(size));
        textures.insert(PILLAR, pillar(size));
        textures.insert(BARREL, barrel(size));
        Self { textures }
    }
}

impl AssetProvider for ProceduralAssets {
    fn texture(&self, name: &str) -> Option<&Texture> {
        self.textures.get(name)
    }
}

// Cheap per-texel noise so flat areas do not band
#[inline]
fn hash(x: usize, y: usize) -> u32 {
    let mut h = (x as u32).wrapping_mul(374_761_393) ^ (y as u32).wrapping_mul(668_265_263);
    h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
    h ^ (h >> 16)
}

#[inline]
fn jitter(c: (u8, u8, u8), x: usize, y: usize, amount: i32) -> u32 {
    let n = (hash(x, y) % (2 * amount as u32 + 1)) as i32 - amount;
    let ch = |v: u8| (v as i32 + n).clamp(0, 255) as u8;
    pack_rgb(ch(c.0), ch(c.1), ch(c.2))
}

fn brick(size: usize, face: (u8, u8, u8), mortar: (u8, u8, u8)) -> Texture {
    let row_h = size / 4;
    let brick_w = size / 2;
    Texture::from_fn(size, size, |x, y| {
        let row = y / row_h;
        let offset = if row % 2 == 0 { 0 } else { brick_w / 2 };
        let bx = (x + offset) % brick_w;
        if y % row_h == 0 || bx == 0 {
            jitter(mortar, x, y, 6)
        } else {
            jitter(face, x, y, 14)
        }
    })
}

fn stone(size: usize) -> Texture {
    let block = size / 2;
    Texture::from_fn(size, size, |x, y| {
        let edge = x % block == 0 || y % block == 0;
        if edge {
            pack_rgb(50, 55, 70)
        } else {
            let shade = 100 + ((x / block + y / block) % 2) as u8 * 20;
            jitter((shade, shade + 10, shade + 40), x, y, 10)
        }
    })
}

fn planks(size: usize) -> Texture {
    let plank = (size / 6).max(2);
    Texture::from_fn(size, size, |x, y| {
        if x % plank == 0 {
            pack_rgb(60, 40, 25)
        } else {
            let grain = ((y as f32 * 0.35 + (x / plank) as f32 * 2.1).sin() * 12.0) as i32;
            let base = (130 + grain).clamp(0, 255) as u8;
            jitter((base, (base as u16 * 3 / 4) as u8, base / 2), x, y, 6)
        }
    })
}

fn tiles(size: usize) -> Texture {
    let half = size / 2;
    Texture::from_fn(size, size, |x, y| {
        if x % half == 0 || y % half == 0 {
            pack_rgb(40, 36, 32)
        } else if (x / half + y / half) % 2 == 0 {
            jitter((96, 88, 76), x, y, 8)
        } else {
            jitter((78, 72, 62), x, y, 8)
        }
    })
}

fn enemy(size: usize) -> Texture {
    let s = size as f32;
    Texture::from_fn(size, size, |x, y| {
        let u = (x as f32 + 0.5) / s - 0.5;
        let v = (y as f32 + 0.5) / s;
        // Body: a rounded blob on the bottom two thirds
        let body = (u * u) / 0.16 + ((v - 0.62) * (v - 0.62)) / 0.14 <= 1.0;
        if !body {
            return COLOR_KEY;
        }
        let eye = |cx: f32| (u - cx).powi(2) + (v - 0.5).powi(2) <= 0.004;
        if eye(-0.12) || eye(0.12) {
            pack_rgb(250, 230, 80)
        } else if (0.72..0.76).contains(&v) && u.abs() < 0.15 {
            pack_rgb(40, 10, 10)
        } else {
            jitter((170, 35, 35), x, y, 18)
        }
    })
}

fn pillar(size: usize) -> Texture {
    let s = size as f32;
    Texture::from_fn(size, size, |x, y| {
        let u = (x as f32 + 0.5) / s - 0.5;
        let v = (y as f32 + 0.5) / s;
        let cap = !(0.1..=0.9).contains(&v);
        let half_w = if cap { 0.3 } else { 0.18 };
        if u.abs() > half_w {
            return COLOR_KEY;
        }
        // Fake cylinder lighting across the shaft
        let light = 1.0 - (u / half_w).abs() * 0.5;
        let c = (160.0 * light) as u8;
        jitter((c, c, (c as f32 * 0.92) as u8), x, y, 6)
    })
}

fn barrel(size: usize) -> Texture {
    let s = size as f32;
    Texture::from_fn(size, size, |x, y| {
        let u = (x as f32 + 0.5) / s - 0.5;
        let v = (y as f32 + 0.5) / s;
        let bulge = 0.32 + 0.05 * (v * std::f32::consts::PI).sin();
        if u.abs() > bulge {
            return COLOR_KEY;
        }
        if (0.2..0.26).contains(&v) || (0.74..0.8).contains(&v) {
            pack_rgb(70, 70, 75)
        } else {
            let light = 1.0 - (u / bulge).abs() * 0.5;
            jitter(
                ((140.0 * light) as u8, (95.0 * light) as u8, (40.0 * light) as u8),
                x,
                y,
                8,
            )
        }
    })
}

use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Precomputed source neighbors and weights for every destination pixel.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StretchLut {
    x0: Vec<usize>,
    x1: Vec<usize>,
    wx: Vec<u16>,
    y0: Vec<usize>,
    y1: Vec<usize>,
    wy: Vec<u16>,
}

impl StretchLut {
    pub fn new(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize) -> Self {
        let (x0, x1, wx) = axis(dst_w, src_w);
        let (y0, y1, wy) = axis(dst_h, src_h);
        Self {
            x0,
            x1,
            wx,
            y0,
            y1,
            wy,
        }
    }

    #[inline]
    pub fn dst_width(&self) -> usize {
        self.x0.len()
    }

    #[inline]
    pub fn dst_height(&self) -> usize {
        self.y0.len()
    }
}

// One axis of the lookup: left/right source index and 8.8 fixed-point weight
fn axis(dst: usize, src: usize) -> (Vec<usize>, Vec<usize>, Vec<u16>) {
    let mut i0 = vec![0; dst];
    let mut i1 = vec![0; dst];
    let mut w = vec![0; dst];
    if dst == 0 || src == 0 {
        return (i0, i1, w);
    }
    let scale = src as f32 / dst as f32;
    let last = src - 1;
    for d in 0..dst {
        let f = d as f32 * scale;
        let lo = (f.floor() as usize).min(last);
        i0[d] = lo;
        i1[d] = (lo + 1).min(last);
        w[d] = ((f - lo as f32) * 256.0).round().clamp(0.0, 256.0) as u16;
    }
    (i0, i1, w)
}

#[inline]
fn lerp_color(a: u32, b: u32, w256: u32) -> u32 {
    // w256 in [0, 256]; inv = 256 - w256
    let inv = 256 - w256;
    // R and B together (00RR00BB), G on its own
    let rb = ((a & 0x00FF00FF) * inv + (b & 0x00FF00FF) * w256) >> 8 & 0x00FF00FF;
    let g = ((a & 0x0000FF00) * inv + (b & 0x0000FF00) * w256) >> 8 & 0x0000FF00;
    rb | g
}

/// Bilinear upscale of `src` into `dst`, rows in parallel.
pub fn blit_stretch(dst: &mut [u32], src: &[u32], src_w: usize, lut: &StretchLut) {
    let dw = lut.dst_width();
    if dw == 0 || src_w == 0 {
        return;
    }
    dst.par_chunks_mut(dw)
        .take(lut.dst_height())
        .enumerate()
        .for_each(|(y, dst_row)| {
            let row0 = lut.y0[y] * src_w;
            let row1 = lut.y1[y] * src_w;
            let wy = lut.wy[y] as u32;

            for (x, out) in dst_row.iter_mut().enumerate() {
                let (x0, x1) = (lut.x0[x], lut.x1[x]);
                let wx = lut.wx[x] as u32;
                let top = lerp_color(src[row0 + x0], src[row0 + x1], wx);
                let bot = lerp_color(src[row1 + x0], src[row1 + x1], wx);
                *out = lerp_color(top, bot, wy);
            }
        });
}

/// Internal framebuffer size for a window: fixed height, width from aspect.
pub fn internal_size(dst_w: usize, dst_h: usize, target_h: usize) -> (usize, usize) {
    let aspect = if dst_h > 0 {
        dst_w as f32 / dst_h as f32
    } else {
        1.0
    };
    let mut w = ((target_h as f32 * aspect).round() as usize).max(160);
    // Even widths keep the horizontal center between two columns
    if w % 2 != 0 {
        w += 1;
    }
    (w, target_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_stretch_copies_pixels() {
        let src: Vec<u32> = (0..12).map(|i| i * 0x010101).collect();
        let lut = StretchLut::new(4, 3, 4, 3);
        let mut dst = vec![0; 12];
        blit_stretch(&mut dst, &src, 4, &lut);
        assert_eq!(dst, src);
    }

    #[test]
    fn doubling_interpolates_between_neighbors() {
        let src = vec![0x000000, 0x00C8C8C8];
        let lut = StretchLut::new(4, 1, 2, 1);
        let mut dst = vec![0; 4];
        blit_stretch(&mut dst, &src, 2, &lut);
        assert_eq!(dst[0], 0);
        assert_eq!(dst[1], 0x00646464);
        assert_eq!(dst[2], 0x00C8C8C8);
    }

    #[test]
    fn internal_size_tracks_aspect() {
        assert_eq!(internal_size(1600, 900, 360), (640, 360));
        assert_eq!(internal_size(100, 900, 360), (160, 360));
        assert_eq!(internal_size(801, 600, 480).0 % 2, 0);
    }
}

use std::collections::HashMap;

use crate::{config::model::DitherMethod, palette::quantize::Rgb};

/// Nearest-color lookup with a per-frame memo.
pub struct PaletteMapper<'a> {
    palette: &'a [Rgb],
    cache: HashMap<Rgb, u8>,
}

impl<'a> PaletteMapper<'a> {
    /// Wrap a non-empty palette of at most 256 entries.
    pub fn new(palette: &'a [Rgb]) -> Self {
        Self {
            palette,
            cache: HashMap::new(),
        }
    }

    /// Index of the palette entry closest to `rgb` in squared RGB distance.
    pub fn nearest(&mut self, rgb: Rgb) -> u8 {
        if let Some(&i) = self.cache.get(&rgb) {
            return i;
        }
        let mut best = 0usize;
        let mut best_dist = u32::MAX;
        for (i, p) in self.palette.iter().enumerate() {
            let d = dist2(rgb, *p);
            if d < best_dist {
                best_dist = d;
                best = i;
                if d == 0 {
                    break;
                }
            }
        }
        let idx = best as u8;
        self.cache.insert(rgb, idx);
        idx
    }
}

fn dist2(a: Rgb, b: Rgb) -> u32 {
    (0..3)
        .map(|c| {
            let d = i32::from(a[c]) - i32::from(b[c]);
            (d * d) as u32
        })
        .sum()
}

/// Map a packed RGB8 frame onto `palette`, returning one index per pixel.
pub fn map_pixels(
    rgb: &[u8],
    width: u32,
    height: u32,
    palette: &[Rgb],
    method: DitherMethod,
) -> Vec<u8> {
    let mut mapper = PaletteMapper::new(palette);
    match method {
        DitherMethod::None => rgb
            .chunks_exact(3)
            .map(|p| mapper.nearest([p[0], p[1], p[2]]))
            .collect(),
        DitherMethod::FloydSteinberg => floyd_steinberg(rgb, width, height, palette, &mut mapper),
        DitherMethod::Ordered => ordered(rgb, width, height, &mut mapper),
    }
}

fn floyd_steinberg(
    rgb: &[u8],
    width: u32,
    height: u32,
    palette: &[Rgb],
    mapper: &mut PaletteMapper<'_>,
) -> Vec<u8> {
    let w = width as usize;
    let mut out = Vec::with_capacity(w * height as usize);
    // Error rows in sixteenths, padded one pixel on each side.
    let mut cur = vec![0i32; (w + 2) * 3];
    let mut next = vec![0i32; (w + 2) * 3];

    for y in 0..height as usize {
        for x in 0..w {
            let i = (y * w + x) * 3;
            let mut want = [0u8; 3];
            for c in 0..3 {
                let v = i32::from(rgb[i + c]) + cur[(x + 1) * 3 + c] / 16;
                want[c] = v.clamp(0, 255) as u8;
            }
            let idx = mapper.nearest(want);
            out.push(idx);

            let got = palette[usize::from(idx)];
            for c in 0..3 {
                let e = i32::from(want[c]) - i32::from(got[c]);
                cur[(x + 2) * 3 + c] += e * 7;
                next[x * 3 + c] += e * 3;
                next[(x + 1) * 3 + c] += e * 5;
                next[(x + 2) * 3 + c] += e;
            }
        }
        std::mem::swap(&mut cur, &mut next);
        next.fill(0);
    }
    out
}

const BAYER_8X8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

/// Peak-to-peak amplitude of the ordered dither pattern.
const ORDERED_SPREAD: f32 = 32.0;

fn ordered(rgb: &[u8], width: u32, height: u32, mapper: &mut PaletteMapper<'_>) -> Vec<u8> {
    let w = width as usize;
    let mut out = Vec::with_capacity(w * height as usize);
    for (i, p) in rgb.chunks_exact(3).enumerate() {
        let (x, y) = (i % w, i / w);
        let t = (f32::from(BAYER_8X8[y % 8][x % 8]) + 0.5) / 64.0 - 0.5;
        let offset = t * ORDERED_SPREAD;
        let want = [0, 1, 2].map(|c| (f32::from(p[c]) + offset).round().clamp(0.0, 255.0) as u8);
        out.push(mapper.nearest(want));
    }
    out
}

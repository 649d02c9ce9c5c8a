use rayon::prelude::*;

use crate::foundation::error::{FadeGifError, FadeGifResult};

const Q16_ONE: u32 = 1 << 16;

/// Normalized 1-D Gaussian taps in Q16 fixed point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GaussianKernel {
    taps: Vec<u32>,
}

impl GaussianKernel {
    /// Kernel for `sigma`, spanning `ceil(3 * sigma)` taps on each side, at most `max_radius`.
    ///
    /// Taps past the longest edge of the image only repeat the clamped border, so callers pass
    /// `max(width, height)`. Returns `None` when the radius is zero and blurring would be a no-op.
    pub fn new(sigma: f32, max_radius: usize) -> FadeGifResult<Option<Self>> {
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(FadeGifError::validation("blur sigma must be finite and >= 0"));
        }
        let wanted = (f64::from(sigma) * 3.0).ceil();
        let radius = wanted.min(max_radius.min(i32::MAX as usize) as f64) as i32;
        if radius == 0 {
            return Ok(None);
        }

        let two_s2 = 2.0 * f64::from(sigma).powi(2);
        let raw: Vec<f64> = (-radius..=radius)
            .map(|i| {
                let x = f64::from(i);
                (-(x * x) / two_s2).exp()
            })
            .collect();
        let total: f64 = raw.iter().sum();
        let mut taps: Vec<u32> = raw
            .iter()
            .map(|w| ((w / total) * f64::from(Q16_ONE)).round() as u32)
            .collect();

        // Keep the sum at exactly one so flat regions stay flat.
        let sum: i64 = taps.iter().map(|&t| i64::from(t)).sum();
        let mid = radius as usize;
        taps[mid] = (i64::from(taps[mid]) + i64::from(Q16_ONE) - sum).max(0) as u32;
        Ok(Some(Self { taps }))
    }

    /// Taps on each side of the center.
    pub fn radius(&self) -> usize {
        self.taps.len() / 2
    }

    /// Filter one channel sample at `pos` along a line of `len` samples, clamping at the ends.
    fn apply(&self, pos: usize, len: usize, sample: impl Fn(usize) -> u8) -> u8 {
        let r = self.radius() as isize;
        let last = len as isize - 1;
        let acc: u64 = self
            .taps
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                let at = (pos as isize + i as isize - r).clamp(0, last) as usize;
                u64::from(w) * u64::from(sample(at))
            })
            .sum();
        ((acc + u64::from(Q16_ONE / 2)) >> 16).min(255) as u8
    }
}

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Separable Gaussian blur over a straight RGBA8 buffer; edges clamp.
pub fn gaussian_blur_rgba8(
    src: &[u8],
    width: u32,
    height: u32,
    sigma: f32,
) -> FadeGifResult<Vec<u8>> {
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| FadeGifError::validation("blur buffer size overflow"))?;
    if src.len() != len {
        return Err(FadeGifError::validation(format!(
            "blur expects {len} bytes for {width}x{height}, got {}",
            src.len()
        )));
    }
    let max_radius = width.max(height) as usize;
    let Some(kernel) = GaussianKernel::new(sigma, max_radius)? else {
        return Ok(src.to_vec());
    };
    if len == 0 {
        return Ok(Vec::new());
    }

    let (w, h) = (width as usize, height as usize);
    let across = convolve(src, w, h, &kernel, Axis::Horizontal);
    Ok(convolve(&across, w, h, &kernel, Axis::Vertical))
}

fn convolve(src: &[u8], w: usize, h: usize, kernel: &GaussianKernel, axis: Axis) -> Vec<u8> {
    let stride = w * 4;
    let mut out = vec![0u8; src.len()];
    out.par_chunks_mut(stride).enumerate().for_each(|(y, row)| {
        for x in 0..w {
            for c in 0..4 {
                row[x * 4 + c] = match axis {
                    Axis::Horizontal => kernel.apply(x, w, |sx| src[y * stride + sx * 4 + c]),
                    Axis::Vertical => kernel.apply(y, h, |sy| src[sy * stride + x * 4 + c]),
                };
            }
        }
    });
    out
}

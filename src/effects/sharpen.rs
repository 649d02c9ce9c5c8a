use crate::{
    assets::decode::SourceImage,
    effects::blur::gaussian_blur_rgba8,
    foundation::error::FadeGifResult,
};

/// Channel difference below which a pixel is left untouched.
pub const UNSHARP_THRESHOLD: u8 = 3;

/// Unsharp-mask parameters derived from a single user-facing strength.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnsharpMask {
    /// Gaussian sigma of the blurred copy.
    pub radius: f32,
    /// Amount of the high-pass added back, in percent.
    pub percent: f32,
    /// Minimum absolute difference that gets sharpened.
    pub threshold: u8,
}

impl UnsharpMask {
    /// `radius = strength`, `percent = 100 * strength`, threshold 3.
    pub fn from_strength(strength: f32) -> Self {
        Self {
            radius: strength,
            percent: 100.0 * strength,
            threshold: UNSHARP_THRESHOLD,
        }
    }
}

/// Sharpen the color channels of an image; alpha is preserved.
pub fn sharpen_image(img: &SourceImage, strength: f32) -> FadeGifResult<SourceImage> {
    if strength <= 0.0 {
        return Ok(img.clone());
    }
    let mask = UnsharpMask::from_strength(strength);
    let rgba8 = unsharp_mask_rgba8(&img.rgba8, img.width, img.height, mask)?;
    Ok(SourceImage {
        rgba8,
        ..img.clone()
    })
}

/// Apply `mask` to a straight RGBA8 buffer.
pub fn unsharp_mask_rgba8(
    src: &[u8],
    width: u32,
    height: u32,
    mask: UnsharpMask,
) -> FadeGifResult<Vec<u8>> {
    let blurred = gaussian_blur_rgba8(src, width, height, mask.radius)?;
    let amount = mask.percent / 100.0;
    let threshold = i32::from(mask.threshold);

    let mut out = src.to_vec();
    for (o, b) in out.chunks_exact_mut(4).zip(blurred.chunks_exact(4)) {
        for c in 0..3 {
            let orig = i32::from(o[c]);
            let diff = orig - i32::from(b[c]);
            if diff.abs() < threshold {
                continue;
            }
            let v = orig as f32 + diff as f32 * amount;
            o[c] = v.round().clamp(0.0, 255.0) as u8;
        }
    }
    Ok(out)
}

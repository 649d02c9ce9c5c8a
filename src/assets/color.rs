use moxcms::{ColorProfile, Layout, TransformOptions};

use crate::assets::decode::SourceImage;

/// Outcome of normalizing an image to sRGB.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorOutcome {
    /// No embedded profile; pixels were used as-is.
    NoProfile,
    /// Pixels were converted from the embedded profile to sRGB.
    Converted,
    /// Conversion failed; the original pixels were kept.
    FellBack,
}

/// Convert an image carrying an embedded ICC profile to sRGB.
///
/// Never fails: when the profile cannot be parsed or applied, the original pixel data is
/// returned unchanged and the failure is logged.
pub fn normalize_to_srgb(mut img: SourceImage) -> (SourceImage, ColorOutcome) {
    let Some(icc) = img.icc_profile.as_deref() else {
        return (img, ColorOutcome::NoProfile);
    };

    match icc_to_srgb_rgba8(icc, &img.rgba8) {
        Ok(converted) => {
            img.rgba8 = converted;
            (img, ColorOutcome::Converted)
        }
        Err(e) => {
            tracing::warn!(
                path = %img.path.display(),
                error = %e,
                "color profile conversion failed; keeping original pixels"
            );
            (img, ColorOutcome::FellBack)
        }
    }
}

fn icc_to_srgb_rgba8(icc: &[u8], src: &[u8]) -> Result<Vec<u8>, String> {
    let src_profile = ColorProfile::new_from_slice(icc).map_err(|e| format!("parse icc: {e}"))?;
    let dst_profile = ColorProfile::new_srgb();
    let transform = src_profile
        .create_transform_8bit(
            Layout::Rgba,
            &dst_profile,
            Layout::Rgba,
            TransformOptions::default(),
        )
        .map_err(|e| format!("create transform: {e}"))?;

    let mut dst = vec![0u8; src.len()];
    transform
        .transform(src, &mut dst)
        .map_err(|e| format!("apply transform: {e}"))?;
    Ok(dst)
}

use rayon::prelude::*;

use crate::{
    config::model::PipelineConfig,
    foundation::{
        error::{FadeGifError, FadeGifResult},
        math::lerp_u8,
    },
    render::frame::{CanvasImage, Frame, FramePixels, FrameRole, FrameSequence},
};

/// Blend weight of transition frame `k` out of `steps`.
///
/// Spans `0.0..=1.0` inclusive, so the first and last transition frames equal the outgoing and
/// incoming keyframes. A single step uses weight `1.0`.
pub fn blend_weight(k: u32, steps: u32) -> f32 {
    if steps <= 1 {
        return 1.0;
    }
    k as f32 / (steps - 1) as f32
}

/// Per-channel `a * (1 - alpha) + b * alpha` over straight RGBA8, alpha channel included.
pub fn blend_rgba8(a: &[u8], b: &[u8], alpha: f32) -> FadeGifResult<Vec<u8>> {
    if a.len() != b.len() || !a.len().is_multiple_of(4) {
        return Err(FadeGifError::validation(
            "blend_rgba8 expects equal-length rgba8 buffers",
        ));
    }
    let t = alpha.clamp(0.0, 1.0);
    Ok(a.iter().zip(b).map(|(&x, &y)| lerp_u8(x, y, t)).collect())
}

/// Interleave keyframes with synthesized cross-fades.
///
/// Output order is `image0, fades(0 -> 1), image1, ..., imageN-1`. All images must share one
/// canvas.
#[tracing::instrument(level = "debug", skip_all, fields(images = images.len(), steps = cfg.fade_steps))]
pub fn synthesize(images: &[CanvasImage], cfg: &PipelineConfig) -> FadeGifResult<FrameSequence> {
    if images.len() < 2 {
        return Err(FadeGifError::InsufficientImages {
            found: images.len(),
        });
    }
    let canvas = images[0].canvas;
    if let Some(odd) = images.iter().find(|img| img.canvas != canvas) {
        return Err(FadeGifError::validation(format!(
            "image canvas {} differs from sequence canvas {canvas}",
            odd.canvas
        )));
    }

    let steps = cfg.fade_steps;
    let fades: Vec<Vec<Vec<u8>>> = images
        .par_windows(2)
        .map(|pair| {
            (0..steps)
                .map(|k| blend_rgba8(&pair[0].rgba8, &pair[1].rgba8, blend_weight(k, steps)))
                .collect::<FadeGifResult<Vec<_>>>()
        })
        .collect::<FadeGifResult<Vec<_>>>()?;

    let mut seq = FrameSequence::new(canvas);
    let mut fades = fades.into_iter();
    for (i, img) in images.iter().enumerate() {
        seq.push(Frame {
            pixels: FramePixels::Rgba(img.rgba8.clone()),
            duration_ms: cfg.hold_duration_ms,
            role: FrameRole::Keyframe,
        })?;
        if i + 1 == images.len() {
            break;
        }
        for rgba in fades.next().unwrap_or_default() {
            seq.push(Frame {
                pixels: FramePixels::Rgba(rgba),
                duration_ms: cfg.fade_duration_ms,
                role: FrameRole::Transition,
            })?;
        }
    }

    tracing::debug!(frames = seq.len(), "synthesized transitions");
    Ok(seq)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/transitions.rs"]
mod tests;

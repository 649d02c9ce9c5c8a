use rayon::prelude::*;

use crate::{
    config::model::{DitherMethod, PipelineConfig},
    foundation::{
        core::Canvas,
        error::{FadeGifError, FadeGifResult},
        math::mul_div255_u16,
    },
    palette::{
        dither::map_pixels,
        quantize::{MAX_PALETTE_COLORS, build_palette, histogram},
    },
    render::frame::{FramePixels, FrameSequence, IndexedPixels},
};

/// Frames reduced per parallel batch.
const REDUCE_CHUNK: usize = 8;

/// Composite straight RGBA8 onto an opaque background, yielding packed RGB8.
pub fn flatten_onto_background(rgba: &[u8], background: [u8; 3]) -> FadeGifResult<Vec<u8>> {
    if !rgba.len().is_multiple_of(4) {
        return Err(FadeGifError::validation(
            "flatten_onto_background expects an rgba8 buffer",
        ));
    }
    let bg = background.map(u16::from);
    let mut out = Vec::with_capacity(rgba.len() / 4 * 3);
    for s in rgba.chunks_exact(4) {
        let a = u16::from(s[3]);
        if a == 255 {
            out.extend_from_slice(&s[..3]);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            let v = mul_div255_u16(u16::from(s[c]), a) + mul_div255_u16(bg[c], inv);
            out.push(v.min(255) as u8);
        }
    }
    Ok(out)
}

/// Quantize one opaque RGB8 frame to its own palette.
///
/// Frames with at most 256 distinct colors map exactly; others use the configured quantizer and
/// dithering.
pub fn reduce_adaptive(
    rgb: &[u8],
    canvas: Canvas,
    cfg: &PipelineConfig,
) -> FadeGifResult<IndexedPixels> {
    if rgb.len() != canvas.pixel_count() * 3 {
        return Err(FadeGifError::validation(format!(
            "rgb8 buffer of {} bytes does not match canvas {canvas}",
            rgb.len()
        )));
    }
    let hist = histogram(rgb);
    let exact = hist.len() <= MAX_PALETTE_COLORS;
    let palette = build_palette(&hist, cfg.quantize, MAX_PALETTE_COLORS);
    let dither = if exact { DitherMethod::None } else { cfg.dither };
    let indices = map_pixels(rgb, canvas.width, canvas.height, &palette, dither);
    Ok(IndexedPixels { palette, indices })
}

/// Composite one frame and, when preserving quality, quantize it.
pub fn reduce_frame(
    pixels: &FramePixels,
    canvas: Canvas,
    cfg: &PipelineConfig,
) -> FadeGifResult<FramePixels> {
    let rgb = match pixels {
        FramePixels::Rgba(rgba) => flatten_onto_background(rgba, cfg.background)?,
        FramePixels::Rgb(rgb) => rgb.clone(),
        FramePixels::Indexed(_) => return Ok(pixels.clone()),
    };
    if cfg.preserve_quality {
        Ok(FramePixels::Indexed(reduce_adaptive(&rgb, canvas, cfg)?))
    } else {
        Ok(FramePixels::Rgb(rgb))
    }
}

/// Reduce every frame of a sequence in parallel batches, keeping order, durations and roles.
///
/// `on_done(n)` runs on the calling thread once the first `n` frames are reduced and may stop
/// the stage by returning an error.
#[tracing::instrument(level = "debug", skip_all, fields(frames = seq.len(), adaptive = cfg.preserve_quality))]
pub fn reduce_sequence(
    mut seq: FrameSequence,
    cfg: &PipelineConfig,
    on_done: &mut dyn FnMut(usize) -> FadeGifResult<()>,
) -> FadeGifResult<FrameSequence> {
    let canvas = seq.canvas();
    let mut pixels = Vec::with_capacity(seq.len());
    for chunk in seq.frames().chunks(REDUCE_CHUNK) {
        let batch = chunk
            .par_iter()
            .map(|f| reduce_frame(&f.pixels, canvas, cfg))
            .collect::<FadeGifResult<Vec<_>>>()?;
        for px in batch {
            pixels.push(px);
            on_done(pixels.len())?;
        }
    }
    seq.replace_pixels(pixels)?;
    Ok(seq)
}

#[cfg(test)]
#[path = "../../tests/unit/palette/reduce.rs"]
mod tests;

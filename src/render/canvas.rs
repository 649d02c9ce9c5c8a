use rayon::prelude::*;

use crate::{
    assets::decode::SourceImage,
    config::model::{PipelineConfig, TargetCanvas},
    encode::writer::MAX_GIF_DIMENSION,
    foundation::{
        core::Canvas,
        error::{FadeGifError, FadeGifResult},
    },
    render::{frame::CanvasImage, resample::multi_stage_resize},
};

/// Images resampled per parallel batch.
const NORMALIZE_CHUNK: usize = 8;

/// Pick the common output canvas for a set of images.
///
/// Quality preservation and [`TargetCanvas::FitToLargest`] both use the per-axis maximum over the
/// set; otherwise the fixed target applies.
///
/// Fails with [`FadeGifError::Encode`] when the canvas is wider or taller than the container
/// allows, before any pixel work is done.
pub fn resolve_canvas(images: &[SourceImage], cfg: &PipelineConfig) -> FadeGifResult<Canvas> {
    let canvas = match (cfg.preserve_quality, cfg.target_canvas) {
        (false, TargetCanvas::Fixed { width, height }) => Canvas::new(width, height)?,
        _ => {
            let width = images.iter().map(|img| img.width).max().unwrap_or(0);
            let height = images.iter().map(|img| img.height).max().unwrap_or(0);
            Canvas::new(width, height)?
        }
    };
    if canvas.width > MAX_GIF_DIMENSION || canvas.height > MAX_GIF_DIMENSION {
        return Err(FadeGifError::encode(format!(
            "canvas {canvas} exceeds the {MAX_GIF_DIMENSION} pixel limit"
        )));
    }
    Ok(canvas)
}

/// Largest size with the aspect ratio of `src` that fits inside `canvas`.
pub fn fit_size(src: (u32, u32), canvas: Canvas) -> (u32, u32) {
    let (sw, sh) = (f64::from(src.0.max(1)), f64::from(src.1.max(1)));
    let scale = (f64::from(canvas.width) / sw).min(f64::from(canvas.height) / sh);
    let w = (sw * scale).round().clamp(1.0, f64::from(canvas.width)) as u32;
    let h = (sh * scale).round().clamp(1.0, f64::from(canvas.height)) as u32;
    (w, h)
}

/// Scale one image into `canvas` and center it on transparent padding.
pub fn normalize_image(
    img: &SourceImage,
    canvas: Canvas,
    cfg: &PipelineConfig,
) -> FadeGifResult<CanvasImage> {
    if cfg.preserve_quality && (img.width, img.height) == (canvas.width, canvas.height) {
        return CanvasImage::new(canvas, img.rgba8.clone());
    }

    let (w, h) = fit_size((img.width, img.height), canvas);
    let resized = multi_stage_resize(&img.to_rgba_image()?, (w, h), cfg.resample_filter)?;

    let x0 = ((canvas.width - w) / 2) as usize;
    let y0 = ((canvas.height - h) / 2) as usize;
    let stride = canvas.width as usize * 4;
    let row = w as usize * 4;
    let mut out = vec![0u8; canvas.rgba_len()?];
    for (y, src_row) in resized.as_raw().chunks_exact(row).enumerate() {
        let start = (y0 + y) * stride + x0 * 4;
        out[start..start + row].copy_from_slice(src_row);
    }
    CanvasImage::new(canvas, out)
}

/// Normalize every image onto `canvas`, preserving input order.
///
/// Images are resampled in parallel batches; `on_done(n)` runs on the calling thread once the
/// first `n` images are ready and may stop the stage by returning an error.
#[tracing::instrument(level = "debug", skip_all, fields(images = images.len(), %canvas))]
pub fn normalize_all(
    images: &[SourceImage],
    canvas: Canvas,
    cfg: &PipelineConfig,
    on_done: &mut dyn FnMut(usize) -> FadeGifResult<()>,
) -> FadeGifResult<Vec<CanvasImage>> {
    let mut out = Vec::with_capacity(images.len());
    for chunk in images.chunks(NORMALIZE_CHUNK) {
        let batch = chunk
            .par_iter()
            .map(|img| normalize_image(img, canvas, cfg))
            .collect::<FadeGifResult<Vec<_>>>()?;
        for img in batch {
            out.push(img);
            on_done(out.len())?;
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/canvas.rs"]
mod tests;

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::{
    assets::{
        color::{ColorOutcome, normalize_to_srgb},
        decode::{SourceImage, load_image},
    },
    config::model::{MissingInputPolicy, PipelineConfig},
    effects::{crop::crop_image, sharpen::sharpen_image},
    foundation::error::{FadeGifError, FadeGifResult},
};

/// Images decoded per parallel batch.
pub(crate) const LOAD_CHUNK: usize = 4;

/// Load one image and apply color, crop and sharpen steps in that order.
#[tracing::instrument(level = "debug", skip(cfg))]
pub fn preprocess_image(path: &Path, cfg: &PipelineConfig) -> FadeGifResult<SourceImage> {
    let img = load_image(path)?;
    let (mut img, outcome) = normalize_to_srgb(img);
    if outcome == ColorOutcome::Converted {
        tracing::debug!("converted embedded color profile to sRGB");
    }
    if let Some(rect) = cfg.crop {
        img = crop_image(&img, rect)?;
    }
    if cfg.sharpen_strength > 0.0 {
        img = sharpen_image(&img, cfg.sharpen_strength)?;
    }
    Ok(img)
}

/// Preprocess `paths` in order.
///
/// `on_loaded(done, total)` runs on the calling thread after each path, including skipped
/// ones, and may abort the batch by returning an error.
pub fn preprocess_all(
    paths: &[PathBuf],
    cfg: &PipelineConfig,
    on_loaded: &mut dyn FnMut(usize, usize) -> FadeGifResult<()>,
) -> FadeGifResult<Vec<SourceImage>> {
    let total = paths.len();
    let mut out = Vec::with_capacity(total);
    let mut done = 0usize;
    for chunk in paths.chunks(LOAD_CHUNK) {
        let results: Vec<_> = chunk
            .par_iter()
            .map(|p| preprocess_image(p, cfg))
            .collect();
        for (path, res) in chunk.iter().zip(results) {
            match res {
                Ok(img) => out.push(img),
                Err(err @ FadeGifError::MissingInput { .. })
                    if cfg.missing_input == MissingInputPolicy::Skip =>
                {
                    tracing::warn!(path = %path.display(), error = %err, "skipping unreadable input");
                }
                Err(err) => return Err(err),
            }
            done += 1;
            on_loaded(done, total)?;
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/preprocess.rs"]
mod tests;

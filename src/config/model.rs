use std::{fs::File, io::BufReader, path::Path};

use crate::{
    encode::writer::MAX_GIF_DIMENSION,
    foundation::{
        core::{Canvas, CropRect},
        error::{FadeGifError, FadeGifResult},
    },
};

/// Quality at or above which the encoder skips byte-size optimization.
pub const OPTIMIZE_QUALITY_THRESHOLD: u8 = 90;

/// Immutable configuration for one generation job.
///
/// Built once per job and passed explicitly through every stage. Missing JSON fields fall back
/// to [`PipelineConfig::default`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Transition frames synthesized between each pair of consecutive images.
    pub fade_steps: u32,
    /// Display time of each keyframe.
    pub hold_duration_ms: u32,
    /// Display time of each transition frame.
    pub fade_duration_ms: u32,
    /// Number of animation loops; `0` loops forever.
    pub loop_count: u16,
    /// Canvas policy when `preserve_quality` is off.
    pub target_canvas: TargetCanvas,
    /// Size the canvas to the largest input and quantize each frame adaptively.
    pub preserve_quality: bool,
    /// Requested fidelity, `0..=100`.
    pub quality: u8,
    /// Resampling kernel used by the canvas normalizer.
    pub resample_filter: ResampleFilter,
    /// Optional crop applied to every input image.
    pub crop: Option<CropRect>,
    /// Unsharp-mask strength; `0` disables sharpening.
    pub sharpen_strength: f32,
    /// Dithering used by the adaptive palette path.
    pub dither: DitherMethod,
    /// Palette construction algorithm used by the adaptive palette path.
    pub quantize: QuantizeMethod,
    /// What to do with inputs that cannot be read.
    pub missing_input: MissingInputPolicy,
    /// Opaque RGB color that translucent pixels are composited onto.
    pub background: [u8; 3],
    /// Worker threads for data-parallel stages; `None` uses the global rayon pool.
    pub threads: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fade_steps: 15,
            hold_duration_ms: 500,
            fade_duration_ms: 50,
            loop_count: 0,
            target_canvas: TargetCanvas::Fixed {
                width: 1920,
                height: 1080,
            },
            preserve_quality: false,
            quality: 95,
            resample_filter: ResampleFilter::Lanczos,
            crop: None,
            sharpen_strength: 0.0,
            dither: DitherMethod::FloydSteinberg,
            quantize: QuantizeMethod::MedianCut,
            missing_input: MissingInputPolicy::Fail,
            background: [255, 255, 255],
            threads: None,
        }
    }
}

impl PipelineConfig {
    /// Load a JSON job configuration from disk.
    pub fn from_path(path: impl AsRef<Path>) -> FadeGifResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            FadeGifError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            FadeGifError::validation(format!("parse config JSON '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check value ranges that the type system does not enforce.
    pub fn validate(&self) -> FadeGifResult<()> {
        if self.fade_steps == 0 {
            return Err(FadeGifError::validation("fade_steps must be >= 1"));
        }
        if self.hold_duration_ms == 0 {
            return Err(FadeGifError::validation("hold_duration_ms must be > 0"));
        }
        if self.fade_duration_ms == 0 {
            return Err(FadeGifError::validation("fade_duration_ms must be > 0"));
        }
        if self.quality > 100 {
            return Err(FadeGifError::validation("quality must be within 0..=100"));
        }
        if !self.sharpen_strength.is_finite() || self.sharpen_strength < 0.0 {
            return Err(FadeGifError::validation(
                "sharpen_strength must be finite and >= 0",
            ));
        }
        if self.threads == Some(0) {
            return Err(FadeGifError::validation("threads must be >= 1 when set"));
        }
        if let TargetCanvas::Fixed { width, height } = self.target_canvas {
            Canvas::new(width, height)?;
            if width > MAX_GIF_DIMENSION || height > MAX_GIF_DIMENSION {
                return Err(FadeGifError::validation(format!(
                    "fixed canvas {width}x{height} exceeds the {MAX_GIF_DIMENSION} pixel limit"
                )));
            }
        }
        if let Some(crop) = self.crop
            && crop.is_empty()
        {
            return Err(FadeGifError::invalid_crop(format!(
                "crop rectangle ({}, {}, {}, {}) is empty",
                crop.left, crop.top, crop.right, crop.bottom
            )));
        }
        Ok(())
    }

    /// Whether the encoder should spend extra time shrinking the output.
    pub fn optimize_output(&self) -> bool {
        self.quality < OPTIMIZE_QUALITY_THRESHOLD
    }

    /// Number of frames a job over `images` inputs produces.
    pub fn expected_frame_count(&self, images: usize) -> usize {
        if images == 0 {
            return 0;
        }
        images + (images - 1) * self.fade_steps as usize
    }
}

/// How the common output canvas is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TargetCanvas {
    /// A fixed output size.
    Fixed {
        /// Canvas width in pixels.
        width: u32,
        /// Canvas height in pixels.
        height: u32,
    },
    /// The bounding box of the largest input image.
    FitToLargest,
}

/// Resampling kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleFilter {
    /// Lanczos with a 3-lobe window (best).
    Lanczos,
    /// Cubic (Catmull-Rom).
    Bicubic,
    /// Linear (triangle).
    Bilinear,
    /// Nearest neighbor.
    Nearest,
}

impl ResampleFilter {
    pub(crate) fn filter_type(self) -> image::imageops::FilterType {
        use image::imageops::FilterType;
        match self {
            Self::Lanczos => FilterType::Lanczos3,
            Self::Bicubic => FilterType::CatmullRom,
            Self::Bilinear => FilterType::Triangle,
            Self::Nearest => FilterType::Nearest,
        }
    }
}

/// Dithering applied while mapping pixels onto a palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DitherMethod {
    /// Floyd-Steinberg error diffusion.
    FloydSteinberg,
    /// 8x8 Bayer ordered dithering.
    Ordered,
    /// Nearest palette color, no dithering.
    None,
}

/// Palette construction algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantizeMethod {
    /// Population-weighted median cut.
    MedianCut,
    /// Extent-driven box splitting that maximizes color-space coverage.
    MaxCoverage,
    /// Octree reduction.
    FastOctree,
}

/// Policy for inputs that cannot be read or decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingInputPolicy {
    /// Fail the job.
    Fail,
    /// Drop the input with a warning and continue.
    Skip,
}

#[cfg(test)]
#[path = "../../tests/unit/config/model.rs"]
mod tests;

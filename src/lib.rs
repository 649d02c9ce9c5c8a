//! fadegif turns an ordered list of still images into a looping cross-fade GIF.
//!
//! The pipeline runs in fixed stages:
//!
//! - Load each input, normalize its color profile, then crop and sharpen it
//! - Fit every image onto one canvas with multi-stage resampling and letterboxing
//! - Synthesize blended transition frames between consecutive images
//! - Composite onto an opaque background and reduce each frame to a palette
//! - Write the frames, durations and loop count to disk atomically
//!
//! Use [`generate`] for a blocking call, or [`JobWorker`] to run a job on a background thread
//! with progress events and cancellation.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Input decoding and color normalization.
pub mod assets;
/// Job configuration.
pub mod config;
/// Pixel operations: crop, blur, sharpen and cross-fade synthesis.
pub mod effects;
/// Output container writing and inspection.
pub mod encode;
mod foundation;
/// Palette construction, dithering and frame reduction.
pub mod palette;
/// Stage orchestration, progress and background jobs.
pub mod pipeline;
/// Canvas normalization and frame types.
pub mod render;

pub use crate::assets::decode::SourceImage;
pub use crate::config::model::{
    DitherMethod, MissingInputPolicy, PipelineConfig, QuantizeMethod, ResampleFilter, TargetCanvas,
};
pub use crate::encode::inspect::{AnimationInfo, decode_gif_frames, inspect_gif};
pub use crate::foundation::core::{Canvas, CropRect};
pub use crate::foundation::error::{ErrorKind, FadeGifError, FadeGifResult};
pub use crate::pipeline::generate::{JobResult, generate, run_job};
pub use crate::pipeline::progress::CancelFlag;
pub use crate::pipeline::worker::{JobEvent, JobHandle, JobRequest, JobWorker};
pub use crate::render::frame::{Frame, FramePixels, FrameRole, FrameSequence};

use std::path::{Path, PathBuf};

use crate::{
    config::model::PipelineConfig,
    effects::transitions::synthesize,
    encode::writer::{GifEncodeOpts, write_gif_with_progress},
    foundation::error::{ErrorKind, FadeGifError, FadeGifResult},
    palette::reduce::reduce_sequence,
    pipeline::{
        preprocess::preprocess_all,
        progress::{CancelFlag, ProgressTracker},
    },
    render::canvas::{normalize_all, resolve_canvas},
};

/// Outcome of one generation job. Exactly one is produced per job.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobResult {
    /// The animation was written to this path.
    Success(PathBuf),
    /// The job stopped; no output file was left behind.
    Failure {
        /// Stable error classification.
        kind: ErrorKind,
        /// Human-readable description.
        message: String,
    },
}

impl JobResult {
    /// Whether the job produced its output.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Failure kind, if any.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success(_) => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }
}

impl From<FadeGifResult<PathBuf>> for JobResult {
    fn from(res: FadeGifResult<PathBuf>) -> Self {
        match res {
            Ok(path) => Self::Success(path),
            Err(err) => Self::Failure {
                kind: err.kind(),
                message: err.to_string(),
            },
        }
    }
}

/// Run a whole job and fold the outcome into a [`JobResult`].
///
/// `on_progress` sees a non-decreasing percentage that starts at 0 and, on success, ends at 100.
pub fn generate(
    paths: &[PathBuf],
    output: &Path,
    cfg: &PipelineConfig,
    mut on_progress: impl FnMut(u8) + Send,
) -> JobResult {
    run_job(paths, output, cfg, &mut on_progress, &CancelFlag::new()).into()
}

/// Run a whole job: preprocess, normalize, synthesize, reduce, encode.
///
/// `cancel` is polled between units of work.
#[tracing::instrument(level = "info", skip_all, fields(inputs = paths.len(), output = %output.display()))]
pub fn run_job(
    paths: &[PathBuf],
    output: &Path,
    cfg: &PipelineConfig,
    on_progress: &mut (dyn FnMut(u8) + Send),
    cancel: &CancelFlag,
) -> FadeGifResult<PathBuf> {
    cfg.validate()?;
    let mut progress = ProgressTracker::start(on_progress);
    if paths.len() < 2 {
        return Err(FadeGifError::InsufficientImages { found: paths.len() });
    }

    match build_thread_pool(cfg.threads)? {
        Some(pool) => pool.install(|| run_stages(paths, output, cfg, &mut progress, cancel)),
        None => run_stages(paths, output, cfg, &mut progress, cancel),
    }?;

    progress.finish();
    tracing::info!("animation written");
    Ok(output.to_path_buf())
}

fn run_stages(
    paths: &[PathBuf],
    output: &Path,
    cfg: &PipelineConfig,
    progress: &mut ProgressTracker<'_>,
    cancel: &CancelFlag,
) -> FadeGifResult<()> {
    cancel.check()?;
    let images = preprocess_all(paths, cfg, &mut |done, total| {
        cancel.check()?;
        progress.loaded(done, total);
        Ok(())
    })?;
    if images.len() < 2 {
        return Err(FadeGifError::InsufficientImages {
            found: images.len(),
        });
    }

    let canvas = resolve_canvas(&images, cfg)?;
    let frame_count = cfg.expected_frame_count(images.len());
    let units = images.len() + 2 * frame_count;
    let mut done = 0usize;
    tracing::info!(images = images.len(), frames = frame_count, %canvas, "inputs loaded");

    let normalized = normalize_all(&images, canvas, cfg, &mut |_| {
        done += 1;
        cancel.check()?;
        progress.processed(done, units);
        Ok(())
    })?;
    drop(images);

    let seq = synthesize(&normalized, cfg)?;
    drop(normalized);
    cancel.check()?;

    let seq = reduce_sequence(seq, cfg, &mut |_| {
        done += 1;
        cancel.check()?;
        progress.processed(done, units);
        Ok(())
    })?;

    let opts = GifEncodeOpts::from_config(cfg);
    write_gif_with_progress(&seq, output, &opts, &mut |_| {
        done += 1;
        cancel.check()?;
        progress.processed(done, units);
        Ok(())
    })
}

fn build_thread_pool(threads: Option<usize>) -> FadeGifResult<Option<rayon::ThreadPool>> {
    let Some(n) = threads else {
        return Ok(None);
    };
    rayon::ThreadPoolBuilder::new()
        .num_threads(n)
        .thread_name(|i| format!("fadegif-worker-{i}"))
        .build()
        .map(Some)
        .map_err(|e| FadeGifError::Other(anyhow::anyhow!("build thread pool: {e}")))
}

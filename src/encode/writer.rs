use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use rayon::prelude::*;

use crate::{
    config::model::PipelineConfig,
    foundation::error::{FadeGifError, FadeGifResult},
    render::frame::{FramePixels, FrameSequence, IndexedPixels},
};

/// Largest canvas dimension the container can describe.
pub const MAX_GIF_DIMENSION: u32 = u16::MAX as u32;

/// Frames converted to container frames per parallel batch.
const ENCODE_CHUNK: usize = 8;

/// Container-level encoding options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GifEncodeOpts {
    /// `0` loops forever.
    pub loop_count: u16,
    /// Trim each local palette to the entries actually used.
    pub optimize: bool,
    /// Fidelity of the encoder's own quantizer for RGB frames, `0..=100`.
    pub quality: u8,
}

impl GifEncodeOpts {
    /// Options for the job described by `cfg`.
    pub fn from_config(cfg: &PipelineConfig) -> Self {
        Self {
            loop_count: cfg.loop_count,
            optimize: cfg.optimize_output(),
            quality: cfg.quality,
        }
    }

    /// NeuQuant sampling factor: 1 at quality 100, 30 at quality 0.
    pub fn neuquant_speed(&self) -> i32 {
        let q = i32::from(self.quality.min(100));
        30 - q * 29 / 100
    }

    fn repeat(&self) -> gif::Repeat {
        match self.loop_count {
            0 => gif::Repeat::Infinite,
            n => gif::Repeat::Finite(n),
        }
    }
}

/// Display time in centiseconds, rounded to nearest and at least 1.
pub fn delay_centis(duration_ms: u32) -> u16 {
    let cs = (duration_ms.saturating_add(5)) / 10;
    cs.clamp(1, u32::from(u16::MAX)) as u16
}

/// Write `seq` to `out` as an animated GIF.
pub fn write_gif(seq: &FrameSequence, out: &Path, opts: &GifEncodeOpts) -> FadeGifResult<()> {
    write_gif_with_progress(seq, out, opts, &mut |_| Ok(()))
}

/// Write `seq` to `out`, calling `on_frame` with the number of frames written so far.
///
/// The file is assembled next to `out` and renamed into place only after the last frame; any
/// error (including one returned by `on_frame`) leaves no file behind.
#[tracing::instrument(level = "debug", skip(seq, opts, on_frame), fields(frames = seq.len()))]
pub fn write_gif_with_progress(
    seq: &FrameSequence,
    out: &Path,
    opts: &GifEncodeOpts,
    on_frame: &mut dyn FnMut(usize) -> FadeGifResult<()>,
) -> FadeGifResult<()> {
    check_output_path(out)?;
    let canvas = seq.canvas();
    if canvas.width > MAX_GIF_DIMENSION || canvas.height > MAX_GIF_DIMENSION {
        return Err(FadeGifError::encode(format!(
            "canvas {canvas} exceeds the {MAX_GIF_DIMENSION} pixel limit"
        )));
    }
    if seq.is_empty() {
        return Err(FadeGifError::encode("no frames to encode"));
    }
    let (w, h) = (canvas.width as u16, canvas.height as u16);

    let parent = match out.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".fadegif-")
        .suffix(".gif.tmp")
        .tempfile_in(parent)
        .map_err(|e| {
            FadeGifError::encode(format!(
                "create temporary file in '{}': {e}",
                parent.display()
            ))
        })?;

    {
        let writer = BufWriter::new(tmp.as_file_mut());
        let mut encoder = gif::Encoder::new(writer, w, h, &[])
            .map_err(|e| FadeGifError::encode(format!("write gif header: {e}")))?;
        encoder
            .set_repeat(opts.repeat())
            .map_err(|e| FadeGifError::encode(format!("write loop extension: {e}")))?;

        let mut written = 0usize;
        for chunk in seq.frames().chunks(ENCODE_CHUNK) {
            let frames = chunk
                .par_iter()
                .map(|f| to_gif_frame(&f.pixels, f.duration_ms, w, h, opts))
                .collect::<FadeGifResult<Vec<_>>>()?;
            for frame in frames {
                encoder
                    .write_frame(&frame)
                    .map_err(|e| FadeGifError::encode(format!("write frame {written}: {e}")))?;
                written += 1;
                on_frame(written)?;
            }
        }

        let mut writer = encoder
            .into_inner()
            .map_err(|e| FadeGifError::encode(format!("finish gif stream: {e}")))?;
        writer
            .flush()
            .map_err(|e| FadeGifError::encode(format!("flush gif stream: {e}")))?;
    }

    tmp.as_file()
        .sync_all()
        .map_err(|e| FadeGifError::encode(format!("sync temporary file: {e}")))?;
    tmp.persist(out).map_err(|e| {
        FadeGifError::encode(format!("move output into '{}': {}", out.display(), e.error))
    })?;
    tracing::debug!(path = %out.display(), "gif written");
    Ok(())
}

fn check_output_path(out: &Path) -> FadeGifResult<()> {
    let is_gif = out
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gif"));
    if !is_gif {
        return Err(FadeGifError::encode(format!(
            "output path '{}' must have a .gif extension",
            out.display()
        )));
    }
    if out.is_dir() {
        return Err(FadeGifError::encode(format!(
            "output path '{}' is a directory",
            out.display()
        )));
    }
    Ok(())
}

fn to_gif_frame(
    pixels: &FramePixels,
    duration_ms: u32,
    w: u16,
    h: u16,
    opts: &GifEncodeOpts,
) -> FadeGifResult<gif::Frame<'static>> {
    let mut frame = match pixels {
        FramePixels::Indexed(ix) if opts.optimize => palette_frame(&trim_palette(ix), w, h),
        FramePixels::Indexed(ix) => palette_frame(ix, w, h),
        FramePixels::Rgb(rgb) => {
            let frame = gif::Frame::from_rgb_speed(w, h, rgb, opts.neuquant_speed());
            let trimmed = match &frame.palette {
                Some(palette) if opts.optimize => Some(trim_palette(&IndexedPixels {
                    palette: palette.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect(),
                    indices: frame.buffer.to_vec(),
                })),
                _ => None,
            };
            match trimmed {
                Some(ix) => palette_frame(&ix, w, h),
                None => frame,
            }
        }
        FramePixels::Rgba(_) => {
            return Err(FadeGifError::encode(
                "frames must be composited onto an opaque background before encoding",
            ));
        }
    };
    frame.delay = delay_centis(duration_ms);
    frame.dispose = gif::DisposalMethod::Background;
    Ok(frame)
}

fn palette_frame(ix: &IndexedPixels, w: u16, h: u16) -> gif::Frame<'static> {
    let palette: Vec<u8> = ix.palette.iter().flatten().copied().collect();
    gif::Frame::from_palette_pixels(w, h, ix.indices.clone(), palette, None)
}

/// Drop palette entries no pixel references and renumber the rest, keeping first-use order.
pub fn trim_palette(ix: &IndexedPixels) -> IndexedPixels {
    let mut remap = [u8::MAX; 256];
    let mut used = [false; 256];
    let mut palette = Vec::new();
    let mut indices = Vec::with_capacity(ix.indices.len());
    for &i in &ix.indices {
        let slot = usize::from(i);
        if !used[slot] {
            used[slot] = true;
            remap[slot] = palette.len() as u8;
            palette.push(ix.palette[slot]);
        }
        indices.push(remap[slot]);
    }
    IndexedPixels { palette, indices }
}

/// Open `path` for reading, mapping failures to encode errors.
pub(crate) fn open_gif(path: &Path) -> FadeGifResult<File> {
    File::open(path)
        .map_err(|e| FadeGifError::encode(format!("open '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/writer.rs"]
mod tests;

use std::{io::BufReader, path::Path};

use crate::{
    encode::writer::open_gif,
    foundation::error::{FadeGifError, FadeGifResult},
};

/// Summary of an animated GIF read back from disk.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct AnimationInfo {
    /// Logical screen width.
    pub width: u32,
    /// Logical screen height.
    pub height: u32,
    /// Number of frames.
    pub frame_count: usize,
    /// Per-frame display time in milliseconds.
    pub durations_ms: Vec<u32>,
    /// `Some(0)` loops forever, `Some(n)` loops `n` times, `None` plays once.
    pub loop_count: Option<u16>,
}

impl AnimationInfo {
    /// Sum of all frame durations.
    pub fn total_duration_ms(&self) -> u64 {
        self.durations_ms.iter().map(|&d| u64::from(d)).sum()
    }
}

fn decoder(path: &Path) -> FadeGifResult<gif::Decoder<BufReader<std::fs::File>>> {
    let mut opts = gif::DecodeOptions::new();
    opts.set_color_output(gif::ColorOutput::RGBA);
    opts.read_info(BufReader::new(open_gif(path)?))
        .map_err(|e| FadeGifError::encode(format!("read gif '{}': {e}", path.display())))
}

/// Read frame count, durations, loop count and canvas size of a GIF file.
pub fn inspect_gif(path: impl AsRef<Path>) -> FadeGifResult<AnimationInfo> {
    let path = path.as_ref();
    let mut dec = decoder(path)?;
    let mut durations_ms = Vec::new();
    while let Some(frame) = dec
        .next_frame_info()
        .map_err(|e| FadeGifError::encode(format!("read gif frame: {e}")))?
    {
        durations_ms.push(u32::from(frame.delay) * 10);
    }
    let loop_count = match dec.repeat() {
        gif::Repeat::Infinite => Some(0),
        gif::Repeat::Finite(0) => None,
        gif::Repeat::Finite(n) => Some(n),
    };
    Ok(AnimationInfo {
        width: u32::from(dec.width()),
        height: u32::from(dec.height()),
        frame_count: durations_ms.len(),
        durations_ms,
        loop_count,
    })
}

/// Decode every frame of a GIF onto its logical screen, as straight RGBA8.
///
/// Each returned buffer is the screen after drawing that frame. Disposal is applied before the
/// next frame is drawn.
pub fn decode_gif_frames(path: impl AsRef<Path>) -> FadeGifResult<Vec<Vec<u8>>> {
    let path = path.as_ref();
    let mut dec = decoder(path)?;
    let (sw, sh) = (usize::from(dec.width()), usize::from(dec.height()));
    let mut screen = vec![0u8; sw * sh * 4];
    let mut out = Vec::new();

    while let Some(frame) = dec
        .read_next_frame()
        .map_err(|e| FadeGifError::encode(format!("decode gif frame: {e}")))?
    {
        let (left, top) = (usize::from(frame.left), usize::from(frame.top));
        let fw = usize::from(frame.width);
        // Visible part of the frame; foreign files may place frames partly off screen.
        let vis_w = fw.min(sw.saturating_sub(left));
        let vis_h = usize::from(frame.height).min(sh.saturating_sub(top));
        let before = screen.clone();
        for y in 0..vis_h {
            for x in 0..vis_w {
                let src = (y * fw + x) * 4;
                let px = &frame.buffer[src..src + 4];
                if px[3] == 0 {
                    continue;
                }
                let dst = ((top + y) * sw + left + x) * 4;
                screen[dst..dst + 4].copy_from_slice(px);
            }
        }
        out.push(screen.clone());

        match frame.dispose {
            gif::DisposalMethod::Background => {
                for y in 0..vis_h {
                    let dst = ((top + y) * sw + left) * 4;
                    screen[dst..dst + vis_w * 4].fill(0);
                }
            }
            gif::DisposalMethod::Previous => screen = before,
            _ => {}
        }
    }
    Ok(out)
}

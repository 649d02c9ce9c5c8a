use crate::foundation::{
    core::Canvas,
    error::{FadeGifError, FadeGifResult},
};

/// A straight-alpha RGBA8 image that fills the common output canvas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanvasImage {
    /// Canvas the pixels cover.
    pub canvas: Canvas,
    /// Tightly packed straight RGBA8, row-major.
    pub rgba8: Vec<u8>,
}

impl CanvasImage {
    /// Wrap a buffer, checking its length against `canvas`.
    pub fn new(canvas: Canvas, rgba8: Vec<u8>) -> FadeGifResult<Self> {
        if rgba8.len() != canvas.rgba_len()? {
            return Err(FadeGifError::validation(format!(
                "rgba8 buffer of {} bytes does not match canvas {canvas}",
                rgba8.len()
            )));
        }
        Ok(Self { canvas, rgba8 })
    }

    /// Straight RGBA of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.canvas.width as usize + x as usize) * 4;
        [
            self.rgba8[i],
            self.rgba8[i + 1],
            self.rgba8[i + 2],
            self.rgba8[i + 3],
        ]
    }
}

/// Whether a frame is a held source image or a synthesized blend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameRole {
    /// A normalized source image, shown for the hold duration.
    Keyframe,
    /// A cross-fade blend between two keyframes.
    Transition,
}

/// A palette plus one palette index per pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedPixels {
    /// At most 256 opaque RGB entries.
    pub palette: Vec<[u8; 3]>,
    /// One index into `palette` per pixel, row-major.
    pub indices: Vec<u8>,
}

/// Pixel storage of a frame as it moves through the pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FramePixels {
    /// Straight-alpha RGBA8, as synthesized.
    Rgba(Vec<u8>),
    /// Opaque RGB8 after compositing onto the background.
    Rgb(Vec<u8>),
    /// Opaque, palette-reduced pixels.
    Indexed(IndexedPixels),
}

impl FramePixels {
    /// Short name used in logs and errors.
    pub fn format_name(&self) -> &'static str {
        match self {
            Self::Rgba(_) => "rgba8",
            Self::Rgb(_) => "rgb8",
            Self::Indexed(_) => "indexed",
        }
    }

    /// Resolve each pixel to opaque RGB; `None` for RGBA storage.
    pub fn to_rgb8(&self) -> Option<Vec<u8>> {
        match self {
            Self::Rgba(_) => None,
            Self::Rgb(rgb) => Some(rgb.clone()),
            Self::Indexed(ix) => {
                let mut out = Vec::with_capacity(ix.indices.len() * 3);
                for &i in &ix.indices {
                    out.extend_from_slice(&ix.palette[usize::from(i)]);
                }
                Some(out)
            }
        }
    }
}

/// One frame of the output animation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Pixel storage.
    pub pixels: FramePixels,
    /// Display time in milliseconds.
    pub duration_ms: u32,
    /// Keyframe or transition.
    pub role: FrameRole,
}

/// Ordered frames sharing one canvas. Order is animation order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameSequence {
    canvas: Canvas,
    frames: Vec<Frame>,
}

impl FrameSequence {
    /// An empty sequence over `canvas`.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            frames: Vec::new(),
        }
    }

    /// Append a frame, checking that its storage matches the canvas.
    pub fn push(&mut self, frame: Frame) -> FadeGifResult<()> {
        check_pixels(self.canvas, &frame.pixels)?;
        self.frames.push(frame);
        Ok(())
    }

    /// Canvas shared by every frame.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Return `true` when there are no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Borrow the frames in order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Per-frame durations in order.
    pub fn durations_ms(&self) -> Vec<u32> {
        self.frames.iter().map(|f| f.duration_ms).collect()
    }

    /// Replace every frame's pixels in order, keeping durations and roles.
    pub fn replace_pixels(&mut self, new_pixels: Vec<FramePixels>) -> FadeGifResult<()> {
        if new_pixels.len() != self.frames.len() {
            return Err(FadeGifError::validation(format!(
                "replacement has {} frames, sequence has {}",
                new_pixels.len(),
                self.frames.len()
            )));
        }
        for px in &new_pixels {
            check_pixels(self.canvas, px)?;
        }
        for (frame, px) in self.frames.iter_mut().zip(new_pixels) {
            frame.pixels = px;
        }
        Ok(())
    }
}

fn check_pixels(canvas: Canvas, pixels: &FramePixels) -> FadeGifResult<()> {
    let n = canvas.pixel_count();
    let ok = match pixels {
        FramePixels::Rgba(data) => data.len() == n * 4,
        FramePixels::Rgb(data) => data.len() == n * 3,
        FramePixels::Indexed(ix) => {
            ix.indices.len() == n
                && !ix.palette.is_empty()
                && ix.palette.len() <= 256
                && ix.indices.iter().all(|&i| usize::from(i) < ix.palette.len())
        }
    };
    if !ok {
        return Err(FadeGifError::validation(format!(
            "{} frame storage does not match canvas {canvas}",
            pixels.format_name()
        )));
    }
    Ok(())
}

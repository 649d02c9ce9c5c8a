use crate::foundation::error::{FadeGifError, FadeGifResult};

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated, non-empty canvas.
    pub fn new(width: u32, height: u32) -> FadeGifResult<Self> {
        if width == 0 || height == 0 {
            return Err(FadeGifError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        Ok(Self { width, height })
    }

    /// Number of pixels covered by the canvas.
    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Byte length of a tightly packed RGBA8 buffer of this size.
    pub fn rgba_len(self) -> FadeGifResult<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| FadeGifError::validation("canvas buffer size overflow"))
    }
}

impl std::fmt::Display for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pixel rectangle `[left, right) x [top, bottom)` used for cropping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CropRect {
    /// Inclusive left edge.
    pub left: u32,
    /// Inclusive top edge.
    pub top: u32,
    /// Exclusive right edge.
    pub right: u32,
    /// Exclusive bottom edge.
    pub bottom: u32,
}

impl CropRect {
    /// Build a rectangle from `(left, top, right, bottom)` edges.
    pub fn from_edges(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Width of the rectangle, zero when degenerate.
    pub fn width(self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    /// Height of the rectangle, zero when degenerate.
    pub fn height(self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    /// Return `true` when the rectangle covers no pixels.
    pub fn is_empty(self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Check that the rectangle is non-empty and lies inside a `width x height` image.
    pub fn check_within(self, width: u32, height: u32) -> FadeGifResult<()> {
        if self.is_empty() {
            return Err(FadeGifError::invalid_crop(format!(
                "crop rectangle ({}, {}, {}, {}) is empty",
                self.left, self.top, self.right, self.bottom
            )));
        }
        if self.right > width || self.bottom > height {
            return Err(FadeGifError::invalid_crop(format!(
                "crop rectangle ({}, {}, {}, {}) exceeds image bounds {}x{}",
                self.left, self.top, self.right, self.bottom, width, height
            )));
        }
        Ok(())
    }
}

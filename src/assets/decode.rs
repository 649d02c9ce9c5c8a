use std::{
    io::Cursor,
    path::{Path, PathBuf},
};

use image::{DynamicImage, ImageDecoder, ImageReader};

use crate::foundation::error::{FadeGifError, FadeGifResult};

/// A decoded input image in straight (non-premultiplied) RGBA8.
#[derive(Clone, Debug)]
pub struct SourceImage {
    /// Where the image was loaded from.
    pub path: PathBuf,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Tightly packed straight RGBA8, row-major.
    pub rgba8: Vec<u8>,
    /// Embedded ICC profile bytes, when the container carried one.
    pub icc_profile: Option<Vec<u8>>,
}

impl SourceImage {
    /// Wrap an in-memory RGBA8 buffer.
    pub fn from_rgba8(
        path: impl Into<PathBuf>,
        width: u32,
        height: u32,
        rgba8: Vec<u8>,
    ) -> FadeGifResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| FadeGifError::validation("image buffer size overflow"))?;
        if width == 0 || height == 0 || rgba8.len() != expected {
            return Err(FadeGifError::validation(format!(
                "rgba8 buffer of {} bytes does not match {width}x{height}",
                rgba8.len()
            )));
        }
        Ok(Self {
            path: path.into(),
            width,
            height,
            rgba8,
            icc_profile: None,
        })
    }

    /// View the pixels as an `image` buffer without copying the metadata.
    pub(crate) fn to_rgba_image(&self) -> FadeGifResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.rgba8.clone())
            .ok_or_else(|| FadeGifError::validation("rgba8 buffer does not match dimensions"))
    }
}

/// Read and decode one input image.
///
/// Any failure to read or decode the file is reported as [`FadeGifError::MissingInput`].
#[tracing::instrument(level = "debug")]
pub fn load_image(path: &Path) -> FadeGifResult<SourceImage> {
    let bytes = std::fs::read(path).map_err(|e| FadeGifError::missing_input(path, e))?;
    let mut img = decode_image(&bytes).map_err(|e| FadeGifError::missing_input(path, e))?;
    img.path = path.to_path_buf();
    tracing::debug!(
        width = img.width,
        height = img.height,
        icc = img.icc_profile.is_some(),
        "decoded input image"
    );
    Ok(img)
}

/// Decode an encoded image held in memory, keeping any embedded ICC profile.
pub fn decode_image(bytes: &[u8]) -> Result<SourceImage, image::ImageError> {
    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?
        .into_decoder()?;
    // Profile extraction is best-effort; a broken profile chunk should not block decoding.
    let icc_profile = decoder.icc_profile().ok().flatten();
    let dyn_img = DynamicImage::from_decoder(decoder)?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(SourceImage {
        path: PathBuf::new(),
        width,
        height,
        rgba8: rgba.into_raw(),
        icc_profile,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;

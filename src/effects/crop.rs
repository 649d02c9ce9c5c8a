use crate::{
    assets::decode::SourceImage,
    foundation::{core::CropRect, error::FadeGifResult},
};

/// Clip an image to `rect`.
///
/// Fails with [`crate::FadeGifError::InvalidCrop`] when the rectangle is empty or reaches
/// outside the image.
pub fn crop_image(img: &SourceImage, rect: CropRect) -> FadeGifResult<SourceImage> {
    rect.check_within(img.width, img.height)?;

    let (w, h) = (rect.width() as usize, rect.height() as usize);
    let src_stride = img.width as usize * 4;
    let mut out = Vec::with_capacity(w * h * 4);
    for y in rect.top as usize..rect.bottom as usize {
        let start = y * src_stride + rect.left as usize * 4;
        out.extend_from_slice(&img.rgba8[start..start + w * 4]);
    }

    Ok(SourceImage {
        path: img.path.clone(),
        width: rect.width(),
        height: rect.height(),
        rgba8: out,
        icc_profile: img.icc_profile.clone(),
    })
}

/// Embedded color-profile normalization.
pub mod color;
/// Input image loading and decoding.
pub mod decode;

/// Error diffusion, ordered dithering and nearest-color mapping.
pub mod dither;
/// Color histograms and palette construction.
pub mod quantize;
/// Background compositing and per-frame reduction.
pub mod reduce;

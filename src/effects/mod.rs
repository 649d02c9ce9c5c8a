/// Separable Gaussian blur.
pub mod blur;
/// Rectangle cropping.
pub mod crop;
/// Unsharp masking.
pub mod sharpen;
/// Cross-fade frame synthesis.
pub mod transitions;

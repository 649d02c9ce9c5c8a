/// Canvas selection and letterboxing.
pub mod canvas;
/// Frame and sequence types shared by the later stages.
pub mod frame;
/// Multi-stage resampling.
pub mod resample;

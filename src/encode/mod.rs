/// Read-back of produced files.
pub mod inspect;
/// Animated GIF writer.
pub mod writer;

/// Canvas and crop geometry.
pub mod core;
/// Error taxonomy.
pub mod error;
pub(crate) mod math;

/// Job orchestration and results.
pub mod generate;
/// Per-image load and preprocessing.
pub mod preprocess;
/// Progress reporting and cancellation.
pub mod progress;
/// Background job runner.
pub mod worker;

/// Job configuration model and JSON loading.
pub mod model;

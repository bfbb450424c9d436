// THEORY:
// This file is the main entry point for the `skin_vision` library crate. It
// exposes the `SkinPipeline` and `BatchPipeline` as the high-level interface,
// together with the data structures they report (`Cluster`, `CharacterBoundary`,
// `Report`, ...).
//
// The `core_modules` are public as well. Each one is a small, independently
// testable stage: pixel storage, color conversion, classification,
// binarization, boundary extraction, clustering, and overlays. Callers that need
// a single stage can use it directly without going through a pipeline.

pub mod batch_pipeline;
pub mod core_modules;
pub mod error;
pub mod pipeline;

pub use error::{Result, VisionError};

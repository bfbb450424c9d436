pub mod binarizer;
pub mod boundary_extractor;
pub mod cluster;
pub mod cluster_engine;
pub mod color_space;
pub mod overlay;
pub mod palette;
pub mod pixel_buffer;
pub mod skin_classifier;
pub mod utils;

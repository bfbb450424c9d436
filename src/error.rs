use thiserror::Error;

/// Errors raised by the skin_vision engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VisionError {
    #[error("coordinate ({x}, {y}) is outside a {width}x{height} buffer")]
    OutOfBounds {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("image i/o failed: {0}")]
    Image(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("worker failed: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, VisionError>;

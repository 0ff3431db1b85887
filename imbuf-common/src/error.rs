use crate::math::MathError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Unsupported number of channels: {0}")]
    UnsupportedChannels(u8),
    #[error("Pixel buffer has {actual} samples but {expected} are required")]
    BufferSizeMismatch { expected: usize, actual: usize },
    #[error("Math: {0}")]
    Math(#[from] MathError),
}

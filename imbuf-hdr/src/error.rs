use imbuf_common::math::MathError;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Unexpected end of file")]
    UnexpectedEof,
    #[error("Invalid magic bytes: {0:x?}")]
    InvalidMagicBytes(Vec<u8>),
    #[error("Pixel format {0:?} is not supported")]
    UnsupportedFormat(String),
    #[error("Invalid resolution string {0:?}")]
    InvalidResolution(String),
    #[error("Invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("{len} bytes of pixel data cannot hold {pixels} pixels")]
    InsufficientData { pixels: usize, len: usize },
    #[error("Invalid run length encoded scanline")]
    InvalidScanline,
    #[error("Math: {0}")]
    Math(#[from] MathError),
    #[error("Image: {0}")]
    Image(#[from] imbuf_common::error::Error),
}

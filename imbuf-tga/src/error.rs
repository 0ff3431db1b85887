use imbuf_common::math::MathError;

use crate::ImageType;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Unexpected end of file")]
    UnexpectedEof,
    #[error("Unknown color map type {0}")]
    UnknownColorMapType(u8),
    #[error("Image type {0:?} is not supported")]
    UnsupportedImageType(ImageType),
    #[error("Pixel depth {depth} is not supported for {image_type:?}")]
    UnsupportedPixelDepth { image_type: ImageType, depth: u8 },
    #[error("Color map depth {0} is not supported")]
    UnsupportedColorMapDepth(u8),
    #[error("Color mapped image without color map")]
    NoColorMap,
    #[error("Invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u16, height: u16 },
    #[error("{len} bytes of run length encoded data cannot expand to {needed} bytes")]
    InsufficientData { needed: usize, len: usize },
    #[error("Color map index {0} is out of range")]
    ColorMapIndexOutOfRange(u16),
    #[error("Image is too large for TGA: {width}x{height}")]
    TooLarge { width: u32, height: u32 },
    #[error("Math: {0}")]
    Math(#[from] MathError),
    #[error("Image: {0}")]
    Image(#[from] imbuf_common::error::Error),
}

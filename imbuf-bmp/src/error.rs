use imbuf_common::math::MathError;
use imbuf_common::read::ReadError;

use crate::Compression;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Unexpected end of file")]
    UnexpectedEof,
    #[error("Invalid magic bytes: {0:x?}")]
    InvalidMagicBytes(Vec<u8>),
    #[error("Unknown info header size {0}")]
    UnknownHeaderSize(u32),
    #[error("Invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },
    #[error("Bit depth {0} is not supported")]
    UnsupportedBitDepth(u16),
    #[error("Compression {0:?} is not supported")]
    UnsupportedCompression(Compression),
    #[error("Channel mask {0:#010x} is not contiguous")]
    InvalidMask(u32),
    #[error("Palette index {0} is out of range")]
    PaletteIndexOutOfRange(u8),
    #[error("Read: {0}")]
    Read(ReadError),
    #[error("Math: {0}")]
    Math(#[from] MathError),
    #[error("Image: {0}")]
    Image(#[from] imbuf_common::error::Error),
}

impl From<ReadError> for Error {
    fn from(err: ReadError) -> Self {
        if err.is_eof() {
            Self::UnexpectedEof
        } else {
            Self::Read(err)
        }
    }
}

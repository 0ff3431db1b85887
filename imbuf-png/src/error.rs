use imbuf_common::math::MathError;
use miniz_oxide::inflate::DecompressError;

use crate::{ChunkType, ColorType};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unexpected end of file")]
    UnexpectedEof,
    #[error("Invalid magic bytes: {0:x?}")]
    InvalidMagicBytes(Vec<u8>),
    #[error("Position too large")]
    PositionTooLarge,
    #[error("Unexpected end of chunk data")]
    UnexpectedEndOfChunkData,
    #[error("CRC of chunk {chunk_type:?} is {actual:08x} but should be {expected:08x}")]
    CrcMismatch {
        chunk_type: ChunkType,
        expected: u32,
        actual: u32,
    },
    #[error("No IHDR chunk")]
    NoIhdrChunk,
    #[error("No IDAT chunk")]
    NoIdatChunk,
    #[error("Unknown color type {0}")]
    UnknownColorType(u8),
    #[error("Bit depth {bit_depth} is not allowed for color type {color_type:?}")]
    InvalidBitDepth { color_type: ColorType, bit_depth: u8 },
    #[error("Unknown compression method {0}")]
    UnknownCompressionMethod(u8),
    #[error("Unknown filter method {0}")]
    UnknownFilterMethod(u8),
    #[error("Unknown interlace method {0}")]
    UnknownInterlaceMethod(u8),
    #[error("Unknown filter type {0} at the start of a scanline")]
    UnknownFilterType(u8),
    #[error("Indexed image without PLTE chunk")]
    NoPalette,
    #[error("Invalid palette length {0}")]
    InvalidPaletteLength(usize),
    #[error("Palette index {0} is out of range")]
    PaletteIndexOutOfRange(u16),
    #[error("Image data is shorter than the header requires")]
    UnexpectedEndOfImageData,
    #[error("Zlib decompression error: {0}")]
    Zlib(DecompressError),
    #[error("Math: {0}")]
    Math(#[from] MathError),
    #[error("Image: {0}")]
    Image(#[from] imbuf_common::error::Error),
}

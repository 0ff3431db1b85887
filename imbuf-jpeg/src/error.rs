use imbuf_common::math::MathError;

use crate::Marker;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Unexpected end of file")]
    UnexpectedEof,
    #[error("Invalid magic bytes: {0:x?}")]
    InvalidMagicBytes(Vec<u8>),
    #[error("Expected marker at position {0}")]
    ExpectedMarker(usize),
    #[error("Invalid segment length {0}")]
    InvalidSegmentLength(u16),
    #[error("No start of frame segment")]
    NoSof,
    #[error("No start of scan segment")]
    NoSos,
    #[error("Coding process {0:?} is not supported")]
    UnsupportedProcess(Marker),
    #[error("Sample precision {0} is not supported")]
    UnsupportedPrecision(u8),
    #[error("Images with {0} components are not supported")]
    UnsupportedComponentCount(usize),
    #[error("Invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u16, height: u16 },
    #[error("Invalid sampling factor {h}x{v}")]
    InvalidSamplingFactor { h: u8, v: u8 },
    #[error("Scan references unknown component {0}")]
    UnknownComponent(u8),
    #[error("Unknown DQT precision {0}")]
    UnknownPq(u8),
    #[error("Quantization table {0} is not defined")]
    MissingQuantizationTable(u8),
    #[error("Huffman table class {class} destination {id} is not defined")]
    MissingHuffmanTable { class: u8, id: u8 },
    #[error("Huffman table defines more codes than possible")]
    InvalidHuffmanTable,
    #[error("Invalid Huffman code in scan data")]
    InvalidHuffmanCode,
    #[error("Coefficient run exceeds block")]
    CoefficientOutOfRange,
    #[error("Coefficient exceeds the value range")]
    CoefficientOverflow,
    #[error("{len} bytes of entropy coded data cannot hold {blocks} blocks")]
    InsufficientData { blocks: usize, len: usize },
    #[error("Image is too large for JPEG: {width}x{height}")]
    TooLarge { width: u32, height: u32 },
    #[error("Float samples must be converted before encoding")]
    FloatSamples,
    #[cfg(feature = "encoder")]
    #[error("Encoder: {0}")]
    Encoder(#[from] jpeg_encoder::EncodingError),
    #[error("Math: {0}")]
    Math(#[from] MathError),
    #[error("Image: {0}")]
    Image(#[from] imbuf_common::error::Error),
}

//! BMP support for imbuf
//!
//! Uncompressed and bitfield encoded Windows bitmaps with 1 to 32 bits per
//! pixel are decoded. Images are written as 24 bit, or 32 bit if they have an
//! alpha channel.

mod decode;
mod encode;
mod error;
mod header;

pub use decode::decode;
pub use encode::encode;
pub use error::*;
pub use header::*;

pub const MAGIC_BYTES: &[u8] = b"BM";

/// Checks for the `BM` signature and a known info header size
pub fn is_filetype(data: &[u8]) -> bool {
    let Some(size) = data.get(14..18) else {
        return false;
    };
    let size = u32::from_le_bytes([size[0], size[1], size[2], size[3]]);

    data.starts_with(MAGIC_BYTES) && InfoHeader::KNOWN_SIZES.contains(&size)
}

//! Radiance HDR support for imbuf
//!
//! Pixels are stored as RGBE: three 8 bit mantissas sharing one exponent.
//! Decoded images have float samples that can exceed 1.0.

mod decode;
mod encode;
mod error;
mod header;
mod rgbe;

pub use decode::decode;
pub use encode::encode;
pub use error::*;
pub use header::*;
pub use rgbe::*;

pub const MAGIC_BYTES: &[u8] = b"#?RADIANCE";
/// Signature written by some older programs
pub const MAGIC_BYTES_RGBE: &[u8] = b"#?RGBE";

pub fn is_filetype(data: &[u8]) -> bool {
    data.starts_with(MAGIC_BYTES) || data.starts_with(MAGIC_BYTES_RGBE)
}

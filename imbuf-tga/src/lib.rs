//! Truevision Targa support for imbuf

mod decode;
mod encode;
mod error;
mod header;

pub use decode::decode;
pub use encode::encode;
pub use error::*;
pub use header::*;

/// Signature at the end of TGA 2.0 files
pub const FOOTER_SIGNATURE: &[u8] = b"TRUEVISION-XFILE.\0";

/// Targa files have no magic bytes, the header values have to be plausible
pub fn is_filetype(data: &[u8]) -> bool {
    Header::from_data(data).is_ok()
}

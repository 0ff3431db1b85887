//! Types shared between the imbuf format crates
//!
//! The format crates only depend on this crate. They exchange decoded images
//! as [`ImageBuffer`](image::ImageBuffer) and read their save settings from
//! [`EncodeOptions`](options::EncodeOptions).

pub mod error;
pub mod flags;
pub mod format_id;
pub mod image;
pub mod math;
pub mod options;
pub mod read;
pub mod utils;

#[doc(hidden)]
pub use paste;

pub mod prelude {
    pub use crate::error::Error;
    pub use crate::flags::{ColorRole, FormatFlags};
    pub use crate::format_id::FormatId;
    pub use crate::image::{ImageBuffer, Pixels, Thumbnail};
    pub use crate::options::EncodeOptions;
}

//! Image file type registry
//!
//! A [`Registry`] is an ordered table of [`FormatDescriptor`]s. Each
//! descriptor knows how to recognize, decode and optionally encode one file
//! type. [`Registry::builtin`] contains the formats compiled in via cargo
//! features.
//!
//! ```
//! use imbuf::{EncodeOptions, FormatId, ImageBuffer, Registry};
//!
//! let registry = Registry::builtin();
//! let image = ImageBuffer::from_bytes(2, 1, 3, vec![255, 0, 0, 0, 0, 255]).unwrap();
//!
//! let data = registry
//!     .save(&image, FormatId::PNG, &EncodeOptions::default())
//!     .unwrap();
//! let loaded = registry.load(&data).unwrap();
//!
//! assert_eq!(loaded.ftype(), Some(FormatId::PNG));
//! assert_eq!(loaded.as_bytes(), image.as_bytes());
//! ```

pub mod builtin;
mod descriptor;
mod error;
mod registry;

pub use descriptor::*;
pub use error::*;
pub use imbuf_common::flags::{ColorRole, FormatFlags};
pub use imbuf_common::format_id::FormatId;
pub use imbuf_common::image::{ImageBuffer, Pixels, Thumbnail};
pub use imbuf_common::options::EncodeOptions;
pub use registry::*;

#[cfg(feature = "bmp")]
pub use imbuf_bmp as bmp;
#[cfg(feature = "hdr")]
pub use imbuf_hdr as hdr;
#[cfg(feature = "jpeg")]
pub use imbuf_jpeg as jpeg;
#[cfg(feature = "png")]
pub use imbuf_png as png;
#[cfg(feature = "tga")]
pub use imbuf_tga as tga;

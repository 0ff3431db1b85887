//! PNG support for imbuf
//!
//! [`decode`] and [`encode`] convert between PNG files and
//! [`ImageBuffer`](imbuf_common::image::ImageBuffer). [`Png`] gives access to
//! the chunk structure of a file.

mod chunk;
mod chunk_type;
mod decode;
mod encode;
mod error;
mod filter;
mod header;
mod png;

pub use chunk::*;
pub use chunk_type::*;
pub use decode::decode;
pub use encode::encode;
pub use error::*;
pub use header::*;
pub use png::*;

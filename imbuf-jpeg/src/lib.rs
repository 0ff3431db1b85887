//! JPEG support for imbuf
//!
//! [`decode`] handles baseline and extended sequential Huffman coded files
//! with one or three components. [`thumbnail`] decodes only the DC
//! coefficients which yields an image at an eighth of the size without
//! running the inverse DCT.
//!
//! The tables used by the decoder are shared between calls after [`init`]
//! and released by [`exit`].

mod context;
mod decode;
#[cfg(feature = "encoder")]
mod encode;
mod error;
mod huffman;
mod segments;

use std::io::Cursor;

use imbuf_common::math::*;
use imbuf_common::read::ReadExt;

pub use context::{exit, init, is_initialized};
pub use decode::{decode, thumbnail};
#[cfg(feature = "encoder")]
pub use encode::encode;
pub use error::*;
pub use huffman::HuffmanTable;
pub use segments::*;

pub const MAGIC_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF];
pub const JFIF_IDENTIFIER_STRING: &[u8] = b"JFIF\0";
pub const ADOBE_IDENTIFIER_STRING: &[u8] = b"Adobe";

#[derive(Clone, Debug)]
pub struct Segment<'a> {
    marker: Marker,
    pos: usize,
    data: &'a [u8],
    entropy_coded_data: &'a [u8],
}

impl<'a> Segment<'a> {
    pub fn marker(&self) -> Marker {
        self.marker
    }

    /// Position of the marker in the file
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Segment data without marker and length
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Entropy coded data following a [`SOS`](Marker::SOS) segment
    ///
    /// Includes restart markers. Empty for all other segments.
    pub fn entropy_coded_data(&self) -> &'a [u8] {
        self.entropy_coded_data
    }
}

/// Segment structure of a JPEG file
#[derive(Debug, Clone)]
pub struct Jpeg<'a> {
    segments: Vec<Segment<'a>>,
}

#[forbid(
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap
)]
impl<'a> Jpeg<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self, Error> {
        let segments = Self::find_segments(data)?;
        Ok(Self { segments })
    }

    /// Checks if passed data start with an SOI marker followed by another
    /// marker
    pub fn is_filetype(data: &[u8]) -> bool {
        data.starts_with(MAGIC_BYTES)
    }

    /// List all segments in their order of appearance
    pub fn segments(&self) -> &[Segment<'a>] {
        &self.segments
    }

    /// List all segments with the given marker
    pub fn segments_marker(&self, marker: Marker) -> impl Iterator<Item = &Segment<'a>> {
        self.segments.iter().filter(move |x| x.marker == marker)
    }

    /// Frame header and the marker of the frame
    pub fn sof(&self) -> Result<(Marker, Sof), Error> {
        let segment = self
            .segments
            .iter()
            .find(|x| x.marker.is_sof())
            .ok_or(Error::NoSof)?;

        Ok((segment.marker, Sof::from_data(segment.data)?))
    }

    /// Components are stored as RGB instead of YCbCr
    ///
    /// Signaled by an Adobe `APP14` segment with transform 0 or by component
    /// identifiers `R`, `G` and `B`.
    pub fn is_rgb(&self, sof: &Sof) -> bool {
        let adobe_transform = self
            .segments_marker(Marker::APP14)
            .find(|x| x.data.starts_with(ADOBE_IDENTIFIER_STRING))
            .and_then(|x| x.data.get(11).copied());

        match adobe_transform {
            Some(transform) => transform == 0,
            None => {
                let ids = sof.parameters.iter().map(|x| x.c).collect::<Vec<_>>();
                ids == b"RGB"
            }
        }
    }

    fn find_segments(data: &'a [u8]) -> Result<Vec<Segment<'a>>, Error> {
        let mut cur = Cursor::new(data);

        let soi = cur.read_array::<2>().map_err(|_| Error::UnexpectedEof)?;
        if soi != [0xFF, Marker::SOI.into()] {
            return Err(Error::InvalidMagicBytes(soi.to_vec()));
        }

        let mut segments = Vec::new();
        loop {
            let pos = cur.position().usize()?;
            let Ok(start) = cur.read_byte() else {
                tracing::debug!("JPEG ends without EOI marker");
                break;
            };
            if start != 0xFF {
                return Err(Error::ExpectedMarker(pos));
            }

            // Fill bytes
            let mut byte = cur.read_byte().map_err(|_| Error::UnexpectedEof)?;
            while byte == 0xFF {
                byte = cur.read_byte().map_err(|_| Error::UnexpectedEof)?;
            }
            let marker = Marker::from(byte);

            if marker == Marker::EOI {
                segments.push(Segment {
                    marker,
                    pos,
                    data: &[],
                    entropy_coded_data: &[],
                });
                break;
            }

            if marker.is_standalone() {
                continue;
            }

            let len = cur.read_be_u16().map_err(|_| Error::UnexpectedEof)?;
            let data_len = len
                .checked_sub(2)
                .ok_or(Error::InvalidSegmentLength(len))?;
            let data_start = cur.position().usize()?;
            let data_end = data_start.safe_add(usize::from(data_len))?;
            let segment_data = data.get(data_start..data_end).ok_or(Error::UnexpectedEof)?;

            let entropy_coded_data = if marker == Marker::SOS {
                let len = entropy_coded_len(data.get(data_end..).unwrap_or_default());
                let end = data_end.safe_add(len)?;
                data.get(data_end..end).ok_or(Error::UnexpectedEof)?
            } else {
                &[]
            };

            cur.set_position(
                data_end
                    .safe_add(entropy_coded_data.len())?
                    .u64()?,
            );

            segments.push(Segment {
                marker,
                pos,
                data: segment_data,
                entropy_coded_data,
            });
        }

        tracing::trace!("Found {} JPEG segments", segments.len());

        Ok(segments)
    }
}

/// Length of entropy coded data up to the next marker that is not a restart
/// marker
#[forbid(clippy::arithmetic_side_effects)]
fn entropy_coded_len(data: &[u8]) -> usize {
    let mut i = 0_usize;
    while let Some(pos) = data.get(i..).and_then(|x| x.iter().position(|b| *b == 0xFF)) {
        let ff = i.saturating_add(pos);
        let next = ff.saturating_add(1);
        match data.get(next) {
            None => return data.len(),
            // Stuffed zero, fill byte, restart marker
            Some(0x00 | 0xFF | 0xD0..=0xD7) => i = next,
            Some(_) => return ff,
        }
    }
    data.len()
}

imbuf_common::utils::convertible_enum!(
    #[repr(u8)]
    #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
    pub enum Marker {
        /// Baseline DCT
        SOF0 = 0xC0,
        /// Extended sequential DCT, Huffman coding
        SOF1 = 0xC1,
        /// Progressive DCT, Huffman coding
        SOF2 = 0xC2,
        /// Lossless, Huffman coding
        SOF3 = 0xC3,
        /// Define Huffman table
        DHT = 0xC4,
        SOF5 = 0xC5,
        SOF6 = 0xC6,
        SOF7 = 0xC7,
        SOF9 = 0xC9,
        SOF10 = 0xCA,
        SOF11 = 0xCB,
        /// Define arithmetic coding conditioning
        DAC = 0xCC,
        SOF13 = 0xCD,
        SOF14 = 0xCE,
        SOF15 = 0xCF,
        RST0 = 0xD0,
        RST1 = 0xD1,
        RST2 = 0xD2,
        RST3 = 0xD3,
        RST4 = 0xD4,
        RST5 = 0xD5,
        RST6 = 0xD6,
        RST7 = 0xD7,
        /// Start of image
        SOI = 0xD8,
        /// End of image
        EOI = 0xD9,
        /// Start of scan
        SOS = 0xDA,
        /// Define quantization table
        DQT = 0xDB,
        /// Define number of lines
        DNL = 0xDC,
        /// Define restart interval
        DRI = 0xDD,
        /// JFIF
        APP0 = 0xE0,
        /// Exif, XMP
        APP1 = 0xE1,
        /// ICC color profile
        APP2 = 0xE2,
        /// Adobe color transform
        APP14 = 0xEE,
        /// Comment
        COM = 0xFE,
    }
);

impl Marker {
    /// Start of frame markers
    pub fn is_sof(self) -> bool {
        let v = u8::from(self);
        (0xC0..=0xCF).contains(&v) && !matches!(self, Self::DHT | Self::DAC) && v != 0xC8
    }

    /// Markers without a length and data
    pub fn is_standalone(self) -> bool {
        let v = u8::from(self);
        (0xD0..=0xD8).contains(&v) || v == 0x01
    }
}

use std::io::Cursor;

use imbuf_common::math::*;
use imbuf_common::read::ReadExt;

use crate::Error;

imbuf_common::utils::maybe_convertible_enum!(
    #[repr(u8)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Color type as stored in the `IHDR` chunk
    pub enum ColorType {
        Grayscale = 0,
        Rgb = 2,
        Indexed = 3,
        GrayscaleAlpha = 4,
        Rgba = 6,
    }
);

impl ColorType {
    /// Number of samples per pixel in the image data
    pub fn samples(self) -> u8 {
        match self {
            Self::Grayscale | Self::Indexed => 1,
            Self::GrayscaleAlpha => 2,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    pub fn allowed_bit_depths(self) -> &'static [u8] {
        match self {
            Self::Grayscale => &[1, 2, 4, 8, 16],
            Self::Indexed => &[1, 2, 4, 8],
            Self::Rgb | Self::GrayscaleAlpha | Self::Rgba => &[8, 16],
        }
    }

    /// Color type for an image with `channels` channels
    pub fn for_channels(channels: u8) -> Option<Self> {
        match channels {
            1 => Some(Self::Grayscale),
            2 => Some(Self::GrayscaleAlpha),
            3 => Some(Self::Rgb),
            4 => Some(Self::Rgba),
            _ => None,
        }
    }
}

/// Contents of the `IHDR` chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_type: ColorType,
    /// Adam7 interlacing
    pub interlaced: bool,
}

impl Header {
    pub const LEN: usize = 13;

    pub fn from_data(data: &[u8]) -> Result<Self, Error> {
        let mut cur = Cursor::new(data);
        let eof = |_| Error::UnexpectedEndOfChunkData;

        let width = cur.read_be_u32().map_err(eof)?;
        let height = cur.read_be_u32().map_err(eof)?;
        let bit_depth = cur.read_byte().map_err(eof)?;
        let color_type = cur.read_byte().map_err(eof)?;
        let compression_method = cur.read_byte().map_err(eof)?;
        let filter_method = cur.read_byte().map_err(eof)?;
        let interlace_method = cur.read_byte().map_err(eof)?;

        let color_type =
            ColorType::try_from(color_type).map_err(|err| Error::UnknownColorType(err.0))?;

        if !color_type.allowed_bit_depths().contains(&bit_depth) {
            return Err(Error::InvalidBitDepth {
                color_type,
                bit_depth,
            });
        }

        if compression_method != 0 {
            return Err(Error::UnknownCompressionMethod(compression_method));
        }

        if filter_method != 0 {
            return Err(Error::UnknownFilterMethod(filter_method));
        }

        let interlaced = match interlace_method {
            0 => false,
            1 => true,
            other => return Err(Error::UnknownInterlaceMethod(other)),
        };

        Ok(Self {
            width,
            height,
            bit_depth,
            color_type,
            interlaced,
        })
    }

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut bytes = [0; Self::LEN];
        bytes[0..4].copy_from_slice(&self.width.to_be_bytes());
        bytes[4..8].copy_from_slice(&self.height.to_be_bytes());
        bytes[8] = self.bit_depth;
        bytes[9] = self.color_type.into();
        // Compression and filter method are always 0
        bytes[12] = u8::from(self.interlaced);
        bytes
    }

    pub fn bits_per_pixel(&self) -> usize {
        usize::from(self.color_type.samples()) * usize::from(self.bit_depth)
    }

    /// Distance to the corresponding byte of the previous pixel, used by
    /// filters
    pub fn filter_distance(&self) -> usize {
        (self.bits_per_pixel() / 8).max(1)
    }

    /// Bytes in a scanline of `width` pixels, without the filter type byte
    pub fn row_bytes(&self, width: u32) -> Result<usize, MathError> {
        let width = width.usize()?;
        let bits = self.bits_per_pixel();
        checked![width];

        ((width * bits + 7_usize) / 8_usize).check()
    }

    /// Sub-images the image data is made of
    ///
    /// Non-interlaced images consist of a single pass covering all pixels.
    pub fn passes(&self) -> Vec<Pass> {
        if !self.interlaced {
            return vec![Pass {
                x0: 0,
                y0: 0,
                dx: 1,
                dy: 1,
                width: self.width,
                height: self.height,
            }];
        }

        const ADAM7: [(u32, u32, u32, u32); 7] = [
            (0, 0, 8, 8),
            (4, 0, 8, 8),
            (0, 4, 4, 8),
            (2, 0, 4, 4),
            (0, 2, 2, 4),
            (1, 0, 2, 2),
            (0, 1, 1, 2),
        ];

        ADAM7
            .into_iter()
            .map(|(x0, y0, dx, dy)| Pass {
                x0,
                y0,
                dx,
                dy,
                width: self.width.saturating_sub(x0).div_ceil(dx),
                height: self.height.saturating_sub(y0).div_ceil(dy),
            })
            .collect()
    }

    /// Size of the decompressed image data including filter type bytes
    pub fn image_data_len(&self) -> Result<usize, MathError> {
        let mut len = 0_usize;
        for pass in self.passes().iter().filter(|x| !x.is_empty()) {
            let row = self.row_bytes(pass.width)?.safe_add(1)?;
            len = len.safe_add(row.safe_mul(pass.height.usize()?)?)?;
        }
        Ok(len)
    }
}

/// Part of the image data that is stored as its own filtered image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pass {
    pub x0: u32,
    pub y0: u32,
    pub dx: u32,
    pub dy: u32,
    pub width: u32,
    pub height: u32,
}

impl Pass {
    /// Empty passes have no data, not even filter type bytes
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

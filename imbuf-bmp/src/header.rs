use std::io::Cursor;

use imbuf_common::math::{MathError, SafeMul, ToUsize};
use imbuf_common::read::ReadExt;

use crate::{Error, MAGIC_BYTES};

/// Length of the file header before the info header
pub const FILE_HEADER_LEN: usize = 14;

imbuf_common::utils::convertible_enum!(
    #[repr(u32)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Compression {
        Rgb = 0,
        Rle8 = 1,
        Rle4 = 2,
        Bitfields = 3,
        Jpeg = 4,
        Png = 5,
        AlphaBitfields = 6,
    }
);

/// Channel masks for 16 and 32 bit images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Masks {
    pub red: u32,
    pub green: u32,
    pub blue: u32,
    pub alpha: u32,
}

impl Masks {
    pub const RGB555: Self = Self {
        red: 0x7C00,
        green: 0x03E0,
        blue: 0x001F,
        alpha: 0,
    };

    pub const BGRA8888: Self = Self {
        red: 0x00FF_0000,
        green: 0x0000_FF00,
        blue: 0x0000_00FF,
        alpha: 0xFF00_0000,
    };

    /// Mask without set bits in between its lowest and highest set bit
    pub fn is_contiguous(mask: u32) -> bool {
        let shifted = mask.checked_shr(mask.trailing_zeros()).unwrap_or(0);
        shifted & shifted.wrapping_add(1) == 0
    }
}

/// Combined file header and info header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoHeader {
    /// Offset of the pixel data from the file start
    pub data_offset: u32,
    /// Size of the info header which determines its version
    pub header_size: u32,
    pub width: i32,
    /// Negative for images stored top to bottom
    pub height: i32,
    pub bit_count: u16,
    pub compression: Compression,
    /// Number of palette entries, 0 for the maximum for the bit depth
    pub colors_used: u32,
    pub masks: Option<Masks>,
}

impl InfoHeader {
    /// `BITMAPINFOHEADER` and its later versions
    pub const KNOWN_SIZES: [u32; 5] = [40, 52, 56, 108, 124];

    pub fn from_data(data: &[u8]) -> Result<Self, Error> {
        let mut cur = Cursor::new(data);

        let magic_bytes = cur.read_array::<2>()?;
        if magic_bytes != MAGIC_BYTES {
            return Err(Error::InvalidMagicBytes(magic_bytes.to_vec()));
        }

        // File size and reserved fields
        cur.skip(8)?;
        let data_offset = cur.read_le_u32()?;

        let header_size = cur.read_le_u32()?;
        if !Self::KNOWN_SIZES.contains(&header_size) {
            return Err(Error::UnknownHeaderSize(header_size));
        }

        let width = cur.read_le_i32()?;
        let height = cur.read_le_i32()?;
        let _planes = cur.read_le_u16()?;
        let bit_count = cur.read_le_u16()?;
        let compression = Compression::from(cur.read_le_u32()?);
        // Image size and resolution
        cur.skip(12)?;
        let colors_used = cur.read_le_u32()?;
        let _colors_important = cur.read_le_u32()?;

        // Masks follow the 40 byte header directly, either as part of a later
        // header version or as separate fields
        let masks = match compression {
            Compression::Bitfields | Compression::AlphaBitfields => {
                let red = cur.read_le_u32()?;
                let green = cur.read_le_u32()?;
                let blue = cur.read_le_u32()?;
                let alpha = if header_size >= 56 || compression == Compression::AlphaBitfields {
                    cur.read_le_u32()?
                } else {
                    0
                };
                if let Some(mask) = [red, green, blue, alpha]
                    .into_iter()
                    .find(|x| !Masks::is_contiguous(*x))
                {
                    return Err(Error::InvalidMask(mask));
                }

                Some(Masks {
                    red,
                    green,
                    blue,
                    alpha,
                })
            }
            _ => None,
        };

        if width <= 0 || height == 0 || height == i32::MIN {
            return Err(Error::InvalidDimensions { width, height });
        }

        Ok(Self {
            data_offset,
            header_size,
            width,
            height,
            bit_count,
            compression,
            colors_used,
            masks,
        })
    }

    pub fn width(&self) -> u32 {
        self.width.unsigned_abs()
    }

    pub fn height(&self) -> u32 {
        self.height.unsigned_abs()
    }

    pub fn is_top_down(&self) -> bool {
        self.height < 0
    }

    /// Offset of the palette from the file start
    pub fn palette_offset(&self) -> usize {
        let mut offset = FILE_HEADER_LEN + self.header_size as usize;
        // Masks stored after a plain BITMAPINFOHEADER
        if self.header_size == 40 {
            match self.compression {
                Compression::Bitfields => offset += 12,
                Compression::AlphaBitfields => offset += 16,
                _ => {}
            }
        }
        offset
    }

    /// Bytes per row including padding to four bytes
    pub fn row_stride(&self) -> Result<usize, MathError> {
        let bits = self.width().usize()?.safe_mul(usize::from(self.bit_count))?;
        bits.div_ceil(32).safe_mul(4)
    }
}

use std::io::Cursor;

use imbuf_common::read::ReadExt;

use crate::Error;

pub const HEADER_LEN: usize = 18;

imbuf_common::utils::convertible_enum!(
    #[repr(u8)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ImageType {
        NoImageData = 0,
        ColorMapped = 1,
        TrueColor = 2,
        Grayscale = 3,
        RleColorMapped = 9,
        RleTrueColor = 10,
        RleGrayscale = 11,
    }
);

impl ImageType {
    pub fn is_rle(self) -> bool {
        matches!(
            self,
            Self::RleColorMapped | Self::RleTrueColor | Self::RleGrayscale
        )
    }

    pub fn is_color_mapped(self) -> bool {
        matches!(self, Self::ColorMapped | Self::RleColorMapped)
    }

    pub fn is_grayscale(self) -> bool {
        matches!(self, Self::Grayscale | Self::RleGrayscale)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Length of the image ID field following the header
    pub id_length: u8,
    pub color_map_type: u8,
    pub image_type: ImageType,
    /// Index of the first color map entry
    pub color_map_first: u16,
    pub color_map_length: u16,
    pub color_map_depth: u8,
    pub width: u16,
    pub height: u16,
    pub pixel_depth: u8,
    /// Alpha bits and origin
    pub descriptor: u8,
}

impl Header {
    /// Descriptor bit for images stored right to left
    pub const RIGHT_TO_LEFT: u8 = 0b01_0000;
    /// Descriptor bit for images stored top to bottom
    pub const TOP_TO_BOTTOM: u8 = 0b10_0000;

    /// Parses and validates the header
    pub fn from_data(data: &[u8]) -> Result<Self, Error> {
        let mut cur = Cursor::new(data);
        let eof = |_| Error::UnexpectedEof;

        let id_length = cur.read_byte().map_err(eof)?;
        let color_map_type = cur.read_byte().map_err(eof)?;
        let image_type = ImageType::from(cur.read_byte().map_err(eof)?);
        let color_map_first = cur.read_le_u16().map_err(eof)?;
        let color_map_length = cur.read_le_u16().map_err(eof)?;
        let color_map_depth = cur.read_byte().map_err(eof)?;
        // Origin is only relevant for displays
        let _x_origin = cur.read_le_u16().map_err(eof)?;
        let _y_origin = cur.read_le_u16().map_err(eof)?;
        let width = cur.read_le_u16().map_err(eof)?;
        let height = cur.read_le_u16().map_err(eof)?;
        let pixel_depth = cur.read_byte().map_err(eof)?;
        let descriptor = cur.read_byte().map_err(eof)?;

        let header = Self {
            id_length,
            color_map_type,
            image_type,
            color_map_first,
            color_map_length,
            color_map_depth,
            width,
            height,
            pixel_depth,
            descriptor,
        };
        header.validate()?;

        Ok(header)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.color_map_type > 1 {
            return Err(Error::UnknownColorMapType(self.color_map_type));
        }

        // True color images may carry a color map that is skipped
        if self.color_map_type == 1
            && self.color_map_length > 0
            && !matches!(self.color_map_depth, 15 | 16 | 24 | 32)
        {
            return Err(Error::UnsupportedColorMapDepth(self.color_map_depth));
        }

        let depth_ok = match self.image_type {
            ImageType::ColorMapped | ImageType::RleColorMapped => {
                if self.color_map_type != 1 {
                    return Err(Error::NoColorMap);
                }
                if !matches!(self.color_map_depth, 15 | 16 | 24 | 32) {
                    return Err(Error::UnsupportedColorMapDepth(self.color_map_depth));
                }
                matches!(self.pixel_depth, 8 | 16)
            }
            ImageType::TrueColor | ImageType::RleTrueColor => {
                matches!(self.pixel_depth, 15 | 16 | 24 | 32)
            }
            ImageType::Grayscale | ImageType::RleGrayscale => {
                matches!(self.pixel_depth, 8 | 16)
            }
            other => return Err(Error::UnsupportedImageType(other)),
        };

        if !depth_ok {
            return Err(Error::UnsupportedPixelDepth {
                image_type: self.image_type,
                depth: self.pixel_depth,
            });
        }

        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }

        Ok(())
    }

    pub fn alpha_bits(&self) -> u8 {
        self.descriptor & 0b1111
    }

    pub fn is_top_to_bottom(&self) -> bool {
        self.descriptor & Self::TOP_TO_BOTTOM != 0
    }

    pub fn is_right_to_left(&self) -> bool {
        self.descriptor & Self::RIGHT_TO_LEFT != 0
    }

    /// Bytes per stored pixel or color map index
    pub fn bytes_per_pixel(&self) -> usize {
        usize::from(self.pixel_depth).div_ceil(8)
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0; HEADER_LEN];
        bytes[0] = self.id_length;
        bytes[1] = self.color_map_type;
        bytes[2] = self.image_type.into();
        bytes[3..5].copy_from_slice(&self.color_map_first.to_le_bytes());
        bytes[5..7].copy_from_slice(&self.color_map_length.to_le_bytes());
        bytes[7] = self.color_map_depth;
        // Origin stays zero
        bytes[12..14].copy_from_slice(&self.width.to_le_bytes());
        bytes[14..16].copy_from_slice(&self.height.to_le_bytes());
        bytes[16] = self.pixel_depth;
        bytes[17] = self.descriptor;
        bytes
    }
}

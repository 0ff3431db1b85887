//! Decoded image data

use std::borrow::Cow;

use crate::error::Error;
use crate::flags::ColorRole;
use crate::format_id::FormatId;
use crate::math::*;

/// Pixel samples, interleaved by channel, rows from top to bottom
#[derive(Debug, Clone, PartialEq)]
pub enum Pixels {
    /// Samples from 0 to 255
    Byte(Vec<u8>),
    /// Samples nominally from 0.0 to 1.0, may exceed 1.0 for HDR data
    Float(Vec<f32>),
}

impl Pixels {
    pub fn len(&self) -> usize {
        match self {
            Self::Byte(x) => x.len(),
            Self::Float(x) => x.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float(_))
    }

    /// Role that describes the current sample type
    pub fn role(&self) -> ColorRole {
        match self {
            Self::Byte(_) => ColorRole::DefaultByte,
            Self::Float(_) => ColorRole::DefaultFloat,
        }
    }
}

/// Decoded image as exchanged with codecs
///
/// Supported channel layouts are gray (1), gray with alpha (2), RGB (3) and
/// RGBA (4).
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    channels: u8,
    pixels: Pixels,
    /// File type the image was decoded from
    ftype: Option<FormatId>,
}

impl ImageBuffer {
    pub fn new(width: u32, height: u32, channels: u8, pixels: Pixels) -> Result<Self, Error> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }

        if !(1..=4).contains(&channels) {
            return Err(Error::UnsupportedChannels(channels));
        }

        let expected = Self::sample_count(width, height, channels)?;
        if pixels.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            channels,
            pixels,
            ftype: None,
        })
    }

    pub fn from_bytes(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self, Error> {
        Self::new(width, height, channels, Pixels::Byte(data))
    }

    pub fn from_floats(
        width: u32,
        height: u32,
        channels: u8,
        data: Vec<f32>,
    ) -> Result<Self, Error> {
        Self::new(width, height, channels, Pixels::Float(data))
    }

    /// Number of samples an image of the given size holds
    ///
    /// ```
    /// # use imbuf_common::image::ImageBuffer;
    /// assert_eq!(ImageBuffer::sample_count(4, 2, 3).unwrap(), 24);
    /// assert!(ImageBuffer::sample_count(u32::MAX, u32::MAX, 4).is_err());
    /// ```
    pub fn sample_count(width: u32, height: u32, channels: u8) -> Result<usize, MathError> {
        let width = width.usize()?;
        let height = height.usize()?;
        let channels = usize::from(channels);
        checked![width];

        (width * height * channels).check()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn has_alpha(&self) -> bool {
        matches!(self.channels, 2 | 4)
    }

    pub fn pixels(&self) -> &Pixels {
        &self.pixels
    }

    pub fn into_pixels(self) -> Pixels {
        self.pixels
    }

    pub fn is_float(&self) -> bool {
        self.pixels.is_float()
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.pixels {
            Pixels::Byte(x) => Some(x),
            Pixels::Float(_) => None,
        }
    }

    pub fn as_floats(&self) -> Option<&[f32]> {
        match &self.pixels {
            Pixels::Float(x) => Some(x),
            Pixels::Byte(_) => None,
        }
    }

    pub fn ftype(&self) -> Option<FormatId> {
        self.ftype
    }

    pub fn set_ftype(&mut self, ftype: Option<FormatId>) {
        self.ftype = ftype;
    }

    pub fn with_ftype(mut self, ftype: FormatId) -> Self {
        self.ftype = Some(ftype);
        self
    }

    /// Samples of the pixel at `x`, `y` if the image has byte samples
    pub fn pixel_bytes(&self, x: u32, y: u32) -> Option<&[u8]> {
        let range = self.pixel_range(x, y)?;
        self.as_bytes()?.get(range)
    }

    /// Samples of the pixel at `x`, `y` if the image has float samples
    pub fn pixel_floats(&self, x: u32, y: u32) -> Option<&[f32]> {
        let range = self.pixel_range(x, y)?;
        self.as_floats()?.get(range)
    }

    fn pixel_range(&self, x: u32, y: u32) -> Option<std::ops::Range<usize>> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let channels = usize::from(self.channels);
        let start = y
            .usize()
            .ok()?
            .checked_mul(self.width.usize().ok()?)?
            .checked_add(x.usize().ok()?)?
            .checked_mul(channels)?;
        Some(start..start.checked_add(channels)?)
    }

    /// Copy with byte samples
    ///
    /// Float samples are clamped to `0.0..=1.0` before scaling.
    pub fn to_byte(&self) -> Self {
        let pixels = match &self.pixels {
            Pixels::Byte(x) => Pixels::Byte(x.clone()),
            Pixels::Float(x) => Pixels::Byte(x.iter().map(|v| f32_to_u8(*v)).collect()),
        };
        self.with_pixels(pixels)
    }

    /// Copy with float samples
    pub fn to_float(&self) -> Self {
        let pixels = match &self.pixels {
            Pixels::Byte(x) => Pixels::Float(x.iter().map(|v| f32::from(*v) / 255.).collect()),
            Pixels::Float(x) => Pixels::Float(x.clone()),
        };
        self.with_pixels(pixels)
    }

    /// Image with the sample type belonging to `role`
    pub fn with_role(&self, role: ColorRole) -> Cow<'_, Self> {
        if self.pixels.role() == role {
            return Cow::Borrowed(self);
        }

        match role {
            ColorRole::DefaultByte => Cow::Owned(self.to_byte()),
            ColorRole::DefaultFloat => Cow::Owned(self.to_float()),
        }
    }

    /// Image with a different channel layout
    ///
    /// Gray is replicated into RGB, RGB is reduced to Rec. 709 luma, missing
    /// alpha is filled opaque and superfluous alpha is dropped.
    pub fn with_channels(&self, channels: u8) -> Result<Cow<'_, Self>, Error> {
        if !(1..=4).contains(&channels) {
            return Err(Error::UnsupportedChannels(channels));
        }

        if channels == self.channels {
            return Ok(Cow::Borrowed(self));
        }

        let pixels = match &self.pixels {
            Pixels::Byte(x) => Pixels::Byte(remap_channels(x, self.channels, channels)),
            Pixels::Float(x) => Pixels::Float(remap_channels(x, self.channels, channels)),
        };

        Ok(Cow::Owned(Self::new(
            self.width,
            self.height,
            channels,
            pixels,
        )?
        .with_optional_ftype(self.ftype)))
    }

    /// Downscale with a box filter so that no side exceeds `max_size`
    ///
    /// The aspect ratio is kept and images are never enlarged.
    pub fn scaled_to_fit(&self, max_size: u32) -> Cow<'_, Self> {
        let max_size = max_size.max(1);
        if self.width <= max_size && self.height <= max_size {
            return Cow::Borrowed(self);
        }

        let longest = u64::from(self.width.max(self.height));
        let scale = |side: u32| -> u32 {
            let scaled = (u64::from(side) * u64::from(max_size) + longest / 2) / longest;
            u32::try_from(scaled).unwrap_or(max_size).clamp(1, max_size)
        };
        let width = scale(self.width);
        let height = scale(self.height);

        let pixels = match &self.pixels {
            Pixels::Byte(x) => Pixels::Byte(box_filter(x, self, width, height)),
            Pixels::Float(x) => Pixels::Float(box_filter(x, self, width, height)),
        };

        Cow::Owned(Self {
            width,
            height,
            channels: self.channels,
            pixels,
            ftype: self.ftype,
        })
    }

    fn with_pixels(&self, pixels: Pixels) -> Self {
        Self {
            width: self.width,
            height: self.height,
            channels: self.channels,
            pixels,
            ftype: self.ftype,
        }
    }

    fn with_optional_ftype(mut self, ftype: Option<FormatId>) -> Self {
        self.ftype = ftype;
        self
    }
}

/// Reduced size image as returned by thumbnail loaders
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    pub image: ImageBuffer,
    /// Width of the image the thumbnail was created from
    pub full_width: u32,
    /// Height of the image the thumbnail was created from
    pub full_height: u32,
}

impl Thumbnail {
    /// Thumbnail from a fully decoded image
    pub fn from_image(image: ImageBuffer, max_size: u32) -> Self {
        let full_width = image.width();
        let full_height = image.height();
        let scaled = match image.scaled_to_fit(max_size) {
            Cow::Owned(scaled) => Some(scaled),
            Cow::Borrowed(_) => None,
        };
        let image = scaled.unwrap_or(image);

        Self {
            image,
            full_width,
            full_height,
        }
    }
}

/// Converts a nominal `0.0..=1.0` float sample to a byte
///
/// ```
/// # use imbuf_common::image::f32_to_u8;
/// assert_eq!(f32_to_u8(1.0), 255);
/// assert_eq!(f32_to_u8(2.5), 255);
/// assert_eq!(f32_to_u8(-1.0), 0);
/// assert_eq!(f32_to_u8(0.5), 128);
/// ```
pub fn f32_to_u8(v: f32) -> u8 {
    // NaN saturates to 0
    (v.clamp(0., 1.) * 255.).round() as u8
}

trait Sample: Copy {
    const OPAQUE: Self;

    fn to_f32(self) -> f32;
    fn from_f32(v: f32) -> Self;
}

impl Sample for u8 {
    const OPAQUE: Self = u8::MAX;

    fn to_f32(self) -> f32 {
        f32::from(self)
    }

    fn from_f32(v: f32) -> Self {
        v.round().clamp(0., 255.) as u8
    }
}

impl Sample for f32 {
    const OPAQUE: Self = 1.;

    fn to_f32(self) -> f32 {
        self
    }

    fn from_f32(v: f32) -> Self {
        v
    }
}

fn remap_channels<T: Sample>(src: &[T], from: u8, to: u8) -> Vec<T> {
    let from = usize::from(from);
    let mut out = Vec::with_capacity(src.len() / from * usize::from(to));

    for p in src.chunks_exact(from) {
        let (rgb, alpha) = match *p {
            [v] => ([v, v, v], T::OPAQUE),
            [v, a] => ([v, v, v], a),
            [r, g, b] => ([r, g, b], T::OPAQUE),
            [r, g, b, a, ..] => ([r, g, b], a),
            [] => continue,
        };

        let gray = || {
            if from <= 2 {
                rgb[0]
            } else {
                T::from_f32(
                    0.2126 * rgb[0].to_f32() + 0.7152 * rgb[1].to_f32() + 0.0722 * rgb[2].to_f32(),
                )
            }
        };

        match to {
            1 => out.push(gray()),
            2 => out.extend_from_slice(&[gray(), alpha]),
            3 => out.extend_from_slice(&rgb),
            _ => out.extend_from_slice(&[rgb[0], rgb[1], rgb[2], alpha]),
        }
    }

    out
}

fn box_filter<T: Sample>(src: &[T], image: &ImageBuffer, width: u32, height: u32) -> Vec<T> {
    let channels = usize::from(image.channels);
    let src_width = image.width as usize;
    let src_height = image.height as usize;
    let (width, height) = (width as usize, height as usize);

    let mut out = Vec::with_capacity(width * height * channels);
    let mut acc = vec![0_f32; channels];

    for y in 0..height {
        let y0 = y * src_height / height;
        let y1 = ((y + 1) * src_height / height).max(y0 + 1);
        for x in 0..width {
            let x0 = x * src_width / width;
            let x1 = ((x + 1) * src_width / width).max(x0 + 1);

            acc.iter_mut().for_each(|v| *v = 0.);
            for sy in y0..y1 {
                let row = sy * src_width;
                for sx in x0..x1 {
                    let offset = (row + sx) * channels;
                    for (c, v) in acc.iter_mut().enumerate() {
                        *v += src[offset + c].to_f32();
                    }
                }
            }

            let n = ((y1 - y0) * (x1 - x0)) as f32;
            out.extend(acc.iter().map(|v| T::from_f32(v / n)));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remap_gray_to_rgba() {
        let out = remap_channels(&[10_u8, 20], 1, 4);
        assert_eq!(out, vec![10, 10, 10, 255, 20, 20, 20, 255]);
    }

    #[test]
    fn remap_rgba_to_gray_alpha() {
        let out = remap_channels(&[255_u8, 255, 255, 7], 4, 2);
        assert_eq!(out, vec![255, 7]);
    }

    #[test]
    fn box_filter_averages() {
        let image = ImageBuffer::from_bytes(2, 2, 1, vec![0, 100, 200, 100]).unwrap();
        let out = box_filter(image.as_bytes().unwrap(), &image, 1, 1);
        assert_eq!(out, vec![100]);
    }
}

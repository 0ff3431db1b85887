use crate::flags::ColorRole;

/// Settings passed through to encoders
///
/// Each encoder only reads the fields relevant to its file type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EncodeOptions {
    /// Lossy quality from 1 to 100
    pub quality: u8,
    /// Lossless compression effort from 0 to 100
    pub compression: u8,
    /// Use run length encoding where the format has it
    pub rle: bool,
    /// Overrides the default color role of the file type
    pub color_role: Option<ColorRole>,
}

impl EncodeOptions {
    pub const DEFAULT_QUALITY: u8 = 90;
    pub const DEFAULT_COMPRESSION: u8 = 15;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    pub fn with_compression(mut self, compression: u8) -> Self {
        self.compression = compression.min(100);
        self
    }

    pub fn with_rle(mut self, rle: bool) -> Self {
        self.rle = rle;
        self
    }

    pub fn with_color_role(mut self, color_role: ColorRole) -> Self {
        self.color_role = Some(color_role);
        self
    }

    /// Maps `compression` onto a deflate level from 0 to 10
    ///
    /// ```
    /// # use imbuf_common::options::EncodeOptions;
    /// assert_eq!(EncodeOptions::new().with_compression(0).deflate_level(), 0);
    /// assert_eq!(EncodeOptions::new().with_compression(100).deflate_level(), 10);
    /// assert_eq!(EncodeOptions::new().deflate_level(), 2);
    /// ```
    pub fn deflate_level(&self) -> u8 {
        let compression = u16::from(self.compression.min(100));
        // Rounded to nearest, 100 maps to 10
        u8::try_from((compression * 10 + 50) / 100).unwrap_or(10)
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            quality: Self::DEFAULT_QUALITY,
            compression: Self::DEFAULT_COMPRESSION,
            rle: true,
            color_role: None,
        }
    }
}

//! Numeric file type tags

use std::fmt;
use std::num::NonZeroU16;

/// Identifier of an image file type
///
/// Zero is reserved for "no file type" and can not be represented, so a
/// `FormatId` is always a valid key into a format table.
///
/// ```
/// # use imbuf_common::format_id::FormatId;
/// assert_eq!(FormatId::new(3), Some(FormatId::JPEG));
/// assert_eq!(FormatId::new(0), None);
/// assert_eq!(FormatId::PNG.get(), 1);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FormatId(NonZeroU16);

impl FormatId {
    pub const PNG: Self = Self::known(1);
    pub const TGA: Self = Self::known(2);
    pub const JPEG: Self = Self::known(3);
    pub const BMP: Self = Self::known(4);
    pub const OPENEXR: Self = Self::known(5);
    /// SGI Iris
    pub const IMAGIC: Self = Self::known(6);
    pub const PSD: Self = Self::known(7);
    /// JPEG 2000
    pub const JP2: Self = Self::known(8);
    pub const RADIANCE_HDR: Self = Self::known(9);
    pub const TIFF: Self = Self::known(10);
    pub const CINEON: Self = Self::known(11);
    pub const DPX: Self = Self::known(12);
    pub const DDS: Self = Self::known(13);
    pub const WEBP: Self = Self::known(14);

    const WELL_KNOWN: [(Self, &'static str); 14] = [
        (Self::PNG, "PNG"),
        (Self::TGA, "TGA"),
        (Self::JPEG, "JPEG"),
        (Self::BMP, "BMP"),
        (Self::OPENEXR, "OpenEXR"),
        (Self::IMAGIC, "Iris"),
        (Self::PSD, "PSD"),
        (Self::JP2, "JPEG 2000"),
        (Self::RADIANCE_HDR, "Radiance HDR"),
        (Self::TIFF, "TIFF"),
        (Self::CINEON, "Cineon"),
        (Self::DPX, "DPX"),
        (Self::DDS, "DDS"),
        (Self::WEBP, "WebP"),
    ];

    const fn known(value: u16) -> Self {
        match NonZeroU16::new(value) {
            Some(value) => Self(value),
            None => panic!("file type ids start at 1"),
        }
    }

    /// Returns `None` for the reserved value `0`
    pub const fn new(value: u16) -> Option<Self> {
        match NonZeroU16::new(value) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    pub const fn get(self) -> u16 {
        self.0.get()
    }

    /// Name of the file type if this is one of the predefined ids
    pub fn well_known_name(self) -> Option<&'static str> {
        Self::WELL_KNOWN
            .iter()
            .find(|(id, _)| *id == self)
            .map(|(_, name)| *name)
    }
}

impl fmt::Debug for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.well_known_name() {
            Some(name) => write!(f, "FormatId({}, {name})", self.get()),
            None => write!(f, "FormatId({})", self.get()),
        }
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.well_known_name() {
            Some(name) => f.write_str(name),
            None => write!(f, "#{}", self.get()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("File type id 0 is reserved")]
pub struct ReservedFormatId;

impl TryFrom<u16> for FormatId {
    type Error = ReservedFormatId;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(ReservedFormatId)
    }
}

impl From<FormatId> for u16 {
    fn from(value: FormatId) -> Self {
        value.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_names_are_unique() {
        for (i, (id, _)) in FormatId::WELL_KNOWN.iter().enumerate() {
            assert!(FormatId::WELL_KNOWN
                .iter()
                .skip(i + 1)
                .all(|(other, _)| other != id));
        }
    }

    #[test]
    fn display() {
        assert_eq!(FormatId::RADIANCE_HDR.to_string(), "Radiance HDR");
        assert_eq!(FormatId::new(99).unwrap().to_string(), "#99");
        assert_eq!(format!("{:?}", FormatId::PNG), "FormatId(1, PNG)");
    }
}

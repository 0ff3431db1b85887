//! Capabilities of a file type and pixel interpretation on save

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Set of optional features a file type supports
///
/// ```
/// # use imbuf_common::flags::FormatFlags;
/// let flags = FormatFlags::FLOAT | FormatFlags::ALPHA;
/// assert!(flags.contains(FormatFlags::FLOAT));
/// assert!(!flags.contains(FormatFlags::LOSSY));
/// assert!(FormatFlags::EMPTY.is_empty());
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FormatFlags(u8);

impl FormatFlags {
    pub const EMPTY: Self = Self(0);
    /// Stores floating point pixel data
    pub const FLOAT: Self = Self(1 << 0);
    /// Can store an alpha channel
    pub const ALPHA: Self = Self(1 << 1);
    /// Compression discards information
    pub const LOSSY: Self = Self(1 << 2);

    const NAMES: [(Self, &'static str); 3] = [
        (Self::FLOAT, "float"),
        (Self::ALPHA, "alpha"),
        (Self::LOSSY, "lossy"),
    ];

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Names of all set flags
    pub fn iter_names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMES
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }
}

impl BitOr for FormatFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl BitOrAssign for FormatFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl fmt::Debug for FormatFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter_names()).finish()
    }
}

/// Pixel interpretation used when saving
///
/// Images are converted to byte or float samples before they are handed to an
/// encoder. No color space transform is applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorRole {
    #[default]
    DefaultByte,
    DefaultFloat,
}

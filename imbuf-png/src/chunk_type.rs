use std::fmt::Debug;

imbuf_common::utils::convertible_enum!(
    #[repr(u32)]
    #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
    #[non_exhaustive]
    #[allow(non_camel_case_types)]
    /// Type of a chunk
    ///
    /// The value is stored as big endian [`u32`] of the original byte string.
    pub enum ChunkType {
        /// Header
        IHDR = b(b"IHDR"),
        /// Palette
        PLTE = b(b"PLTE"),
        /// Image Data
        IDAT = b(b"IDAT"),
        /// End of file
        IEND = b(b"IEND"),

        /// Background Color
        bKGD = b(b"bKGD"),
        /// Image gamma
        gAMA = b(b"gAMA"),
        /// Embedded ICC profile
        iCCP = b(b"iCCP"),
        /// Physical pixel dimensions
        pHYs = b(b"pHYs"),
        /// Image uses sRGB color space with the given rendering intent
        sRGB = b(b"sRGB"),
        /// Textual information
        tEXt = b(b"tEXt"),
        /// Transparency
        ///
        /// Alpha values for palette entries or a single transparent color.
        tRNS = b(b"tRNS"),
    }
);

impl Debug for ChunkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = self.bytes().escape_ascii().to_string();
        if let Self::Unknown(_) = self {
            write!(f, "Unknown({name})")
        } else {
            f.write_str(&name)
        }
    }
}

impl ChunkType {
    /// Returns the byte string of the chunk
    pub fn bytes(self) -> [u8; 4] {
        u32::to_be_bytes(self.into())
    }

    /// Chunks that have to be understood to decode the image
    pub fn is_critical(self) -> bool {
        self.bytes()[0].is_ascii_uppercase()
    }
}

/// Convert bytes to u32
const fn b(d: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*d)
}

use imbuf_common::math::SafeAdd;

use crate::*;

#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    chunk_type: ChunkType,
    chunk_data: &'a [u8],
}

impl<'a> Chunk<'a> {
    pub fn new(chunk_type: ChunkType, chunk_data: &'a [u8]) -> Self {
        Self {
            chunk_type,
            chunk_data,
        }
    }

    pub fn chunk_type(&self) -> ChunkType {
        self.chunk_type
    }

    pub fn chunk_data(&self) -> &'a [u8] {
        self.chunk_data
    }

    /// CRC over chunk type and chunk data
    pub fn calculate_crc(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&self.chunk_type.bytes());
        hasher.update(self.chunk_data);
        hasher.finalize()
    }

    /// Returns keyword and value of a [`tEXt`](ChunkType::tEXt) chunk
    pub fn text(&self) -> Result<(&'a [u8], &'a [u8]), Error> {
        let data = self.chunk_data;
        let keyword_length = data
            .iter()
            .position(|x| *x == 0)
            .ok_or(Error::UnexpectedEndOfChunkData)?;

        let keyword = data
            .get(..keyword_length)
            .ok_or(Error::UnexpectedEndOfChunkData)?;
        let text = data
            .get(keyword_length.safe_add(1)?..)
            .ok_or(Error::UnexpectedEndOfChunkData)?;

        Ok((keyword, text))
    }

    /// Appends the complete chunk including length and CRC
    pub fn write_to(&self, buf: &mut Vec<u8>) -> Result<(), Error> {
        let length = u32::try_from(self.chunk_data.len()).map_err(|_| Error::PositionTooLarge)?;
        buf.extend_from_slice(&length.to_be_bytes());
        buf.extend_from_slice(&self.chunk_type.bytes());
        buf.extend_from_slice(self.chunk_data);
        buf.extend_from_slice(&self.calculate_crc().to_be_bytes());
        Ok(())
    }
}

use std::io::Cursor;

use imbuf_common::math::*;
use imbuf_common::read::ReadExt;

use crate::*;

pub const MAGIC_BYTES: &[u8] = &[137, 80, 78, 71, 13, 10, 26, 10];

/// Chunk structure of a PNG file
#[derive(Debug, Clone)]
pub struct Png<'a> {
    /// Chunks in the order in which they appear in the data
    chunks: Vec<Chunk<'a>>,
}

impl<'a> Png<'a> {
    /// Returns PNG image representation
    ///
    /// * `data`: PNG image data starting with magic bytes
    ///
    /// Chunks with a wrong CRC are rejected.
    pub fn new(data: &'a [u8]) -> Result<Self, Error> {
        let chunks = Self::find_chunks(data)?;
        Ok(Self { chunks })
    }

    /// Checks if passed data have PNG magic bytes
    pub fn is_filetype(data: &[u8]) -> bool {
        data.starts_with(MAGIC_BYTES)
    }

    /// Returns all chunks
    pub fn chunks(&self) -> &[Chunk<'a>] {
        &self.chunks
    }

    pub fn chunks_of_type(&self, chunk_type: ChunkType) -> impl Iterator<Item = &Chunk<'a>> {
        self.chunks
            .iter()
            .filter(move |x| x.chunk_type() == chunk_type)
    }

    fn first_chunk(&self, chunk_type: ChunkType) -> Option<&Chunk<'a>> {
        self.chunks_of_type(chunk_type).next()
    }

    pub fn header(&self) -> Result<Header, Error> {
        let ihdr = self.first_chunk(ChunkType::IHDR).ok_or(Error::NoIhdrChunk)?;
        Header::from_data(ihdr.chunk_data())
    }

    /// Palette entries as RGB triplets
    pub fn palette(&self) -> Result<Option<Vec<[u8; 3]>>, Error> {
        let Some(plte) = self.first_chunk(ChunkType::PLTE) else {
            return Ok(None);
        };

        let data = plte.chunk_data();
        if data.is_empty() || data.len() % 3 != 0 || data.len() > 256 * 3 {
            return Err(Error::InvalidPaletteLength(data.len()));
        }

        Ok(Some(
            data.chunks_exact(3).map(|x| [x[0], x[1], x[2]]).collect(),
        ))
    }

    /// Raw content of the `tRNS` chunk
    pub fn transparency(&self) -> Option<&'a [u8]> {
        self.first_chunk(ChunkType::tRNS).map(|x| x.chunk_data())
    }

    /// Concatenated data of all `IDAT` chunks
    pub fn image_data(&self) -> Result<Vec<u8>, Error> {
        let mut idat = self.chunks_of_type(ChunkType::IDAT).peekable();
        if idat.peek().is_none() {
            return Err(Error::NoIdatChunk);
        }

        Ok(idat.flat_map(|x| x.chunk_data()).copied().collect())
    }

    /// List all chunks in the data
    fn find_chunks(data: &'a [u8]) -> Result<Vec<Chunk<'a>>, Error> {
        let mut cur = Cursor::new(data);
        let magic_bytes = cur
            .read_array::<8>()
            .map_err(|_| Error::UnexpectedEof)?;

        if magic_bytes != MAGIC_BYTES {
            return Err(Error::InvalidMagicBytes(magic_bytes.to_vec()));
        }

        let mut chunks = Vec::new();
        loop {
            // First 4 bytes are length
            let length = cur.read_be_u32().map_err(|_| Error::UnexpectedEof)?;
            // Next 4 bytes are chunk type
            let chunk_type = ChunkType::from(cur.read_be_u32().map_err(|_| Error::UnexpectedEof)?);

            // Next are the data
            let data_start = cur.position().usize().map_err(|_| Error::PositionTooLarge)?;
            let data_end = data_start
                .safe_add(length.usize()?)
                .map_err(|_| Error::PositionTooLarge)?;
            let chunk_data = data.get(data_start..data_end).ok_or(Error::UnexpectedEof)?;

            // Last 4 bytes after the data are a CRC
            cur.set_position(data_end.u64()?);
            let crc = cur.read_be_u32().map_err(|_| Error::UnexpectedEof)?;

            let chunk = Chunk::new(chunk_type, chunk_data);
            let actual = chunk.calculate_crc();
            if actual != crc {
                return Err(Error::CrcMismatch {
                    chunk_type,
                    expected: crc,
                    actual,
                });
            }

            chunks.push(chunk);

            if chunk_type == ChunkType::IEND {
                break;
            }
        }

        tracing::trace!("Found {} PNG chunks", chunks.len());

        Ok(chunks)
    }
}

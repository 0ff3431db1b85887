//! Reading fixed size values from in-memory files

use std::io::{Cursor, Seek};

use crate::math::*;

pub trait ReadExt: std::io::BufRead + std::io::Seek {
    fn read_array<const T: usize>(&mut self) -> Result<[u8; T], ReadError> {
        let buf = &mut [0; T];
        self.read_exact(buf)?;
        Ok(*buf)
    }

    fn read_byte(&mut self) -> Result<u8, ReadError> {
        let buf = &mut [0; 1];
        self.read_exact(buf)?;
        Ok(buf[0])
    }

    fn read_le_u16(&mut self) -> Result<u16, ReadError> {
        self.read_array().map(u16::from_le_bytes)
    }

    fn read_be_u16(&mut self) -> Result<u16, ReadError> {
        self.read_array().map(u16::from_be_bytes)
    }

    fn read_le_u32(&mut self) -> Result<u32, ReadError> {
        self.read_array().map(u32::from_le_bytes)
    }

    fn read_be_u32(&mut self) -> Result<u32, ReadError> {
        self.read_array().map(u32::from_be_bytes)
    }

    fn read_le_i32(&mut self) -> Result<i32, ReadError> {
        self.read_array().map(i32::from_le_bytes)
    }

    /// Move forward by `n` bytes without reading them
    fn skip(&mut self, n: u64) -> Result<(), ReadError> {
        let n = i64::try_from(n).map_err(|_| MathError::ConversionFailed(Some(n)))?;
        self.seek_relative(n)?;
        Ok(())
    }
}

impl<T: AsRef<[u8]>> ReadExt for Cursor<T> {}

pub trait SliceExt<'a>: std::io::BufRead + std::io::Seek {
    fn slice_until(&mut self, byte: u8) -> Result<&'a [u8], ReadError>;
    fn slice_to_end(&mut self) -> Result<&'a [u8], ReadError>;
}

impl<'a> SliceExt<'a> for Cursor<&'a [u8]> {
    /// Read until `byte` and return as slice
    ///
    /// The delimiter is consumed but not included. Reaching the end of the data
    /// before the delimiter is an error.
    ///
    /// ```
    /// # use std::io::Cursor;
    /// # use imbuf_common::read::*;
    /// let mut s = Cursor::new(b"#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n".as_slice());
    /// assert_eq!(s.slice_until(b'\n').unwrap(), b"#?RADIANCE");
    /// assert_eq!(s.slice_until(b'\n').unwrap(), b"FORMAT=32-bit_rle_rgbe");
    /// assert!(s.slice_until(b'\n').is_err());
    /// ```
    fn slice_until(&mut self, byte: u8) -> Result<&'a [u8], ReadError> {
        let data: &'a [u8] = *self.get_ref();
        let start = self.position().usize()?;
        let rest = data.get(start..).ok_or(ReadError::UnexpectedEof)?;
        let len = rest
            .iter()
            .position(|x| *x == byte)
            .ok_or(ReadError::UnexpectedEof)?;
        let end = start.safe_add(len)?;

        self.set_position(end.safe_add(1)?.u64()?);

        data.get(start..end).ok_or(ReadError::UnexpectedEof)
    }

    /// Read until end and return as slice
    ///
    /// ```
    /// # use std::io::Cursor;
    /// # use imbuf_common::read::*;
    /// let mut s = Cursor::new(b"-Y 2 +X 3\n\x02\x02".as_slice());
    /// assert_eq!(s.slice_until(b'\n').unwrap(), b"-Y 2 +X 3");
    /// assert_eq!(s.slice_to_end().unwrap(), b"\x02\x02");
    /// ```
    fn slice_to_end(&mut self) -> Result<&'a [u8], ReadError> {
        let data: &'a [u8] = *self.get_ref();
        let start = self.position().usize()?;
        let end = data.len();

        self.seek(std::io::SeekFrom::Start(end.u64()?))?;

        data.get(start..end).ok_or(ReadError::UnexpectedEof)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("Unexpected end of data")]
    UnexpectedEof,
    #[error("Math: {0}")]
    Math(#[from] MathError),
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
}

impl ReadError {
    /// Whether the error was caused by truncated data
    pub fn is_eof(&self) -> bool {
        match self {
            Self::UnexpectedEof => true,
            Self::Io(err) => err.kind() == std::io::ErrorKind::UnexpectedEof,
            Self::Math(_) => false,
        }
    }
}

use std::io::Cursor;

use imbuf_common::math::ToUsize;
use imbuf_common::read::SliceExt;

use crate::*;

pub const FORMAT_RGBE: &str = "32-bit_rle_rgbe";

/// Information header and resolution string
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// Value of the `FORMAT` line if present
    pub format: Option<String>,
    /// Product of all `EXPOSURE` lines
    pub exposure: Option<f32>,
    pub width: u32,
    pub height: u32,
    /// Scanlines are stored from bottom to top (`+Y`)
    pub bottom_up: bool,
}

impl Header {
    /// Parses the header and returns the offset of the pixel data
    pub fn from_data(data: &[u8]) -> Result<(Self, usize), Error> {
        let mut cur = Cursor::new(data);
        let eof = |_| Error::UnexpectedEof;

        let magic = cur.slice_until(b'\n').map_err(eof)?;
        if !is_filetype(magic) {
            return Err(Error::InvalidMagicBytes(
                magic.iter().take(10).copied().collect(),
            ));
        }

        let mut format = None;
        let mut exposure = None;

        // Variables until the first empty line
        loop {
            let line = cur.slice_until(b'\n').map_err(eof)?;
            if line.is_empty() {
                break;
            }

            let line = String::from_utf8_lossy(line);
            if line.starts_with('#') {
                continue;
            }

            match line.split_once('=') {
                Some(("FORMAT", value)) => format = Some(value.trim().to_string()),
                Some(("EXPOSURE", value)) => {
                    if let Ok(value) = value.trim().parse::<f32>() {
                        exposure = Some(exposure.unwrap_or(1.) * value);
                    }
                }
                _ => tracing::trace!("Ignoring header line {line:?}"),
            }
        }

        if let Some(format) = &format {
            if format != FORMAT_RGBE {
                return Err(Error::UnsupportedFormat(format.clone()));
            }
        }

        let resolution = cur.slice_until(b'\n').map_err(eof)?;
        let resolution = String::from_utf8_lossy(resolution);
        let invalid = || Error::InvalidResolution(resolution.to_string());

        let (bottom_up, height, width) = match resolution.split_whitespace().collect::<Vec<_>>()[..] {
            ["-Y", h, "+X", w] => (false, h, w),
            ["+Y", h, "+X", w] => (true, h, w),
            _ => return Err(invalid()),
        };
        let height = height.parse::<u32>().map_err(|_| invalid())?;
        let width = width.parse::<u32>().map_err(|_| invalid())?;

        let offset = cur.position().usize()?;

        Ok((
            Self {
                format,
                exposure,
                width,
                height,
                bottom_up,
            },
            offset,
        ))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = MAGIC_BYTES.to_vec();
        out.push(b'\n');
        out.extend_from_slice(b"# Written by imbuf\n");
        out.extend_from_slice(
            format!("FORMAT={}\n", self.format.as_deref().unwrap_or(FORMAT_RGBE)).as_bytes(),
        );
        if let Some(exposure) = self.exposure {
            out.extend_from_slice(format!("EXPOSURE={exposure}\n").as_bytes());
        }
        out.push(b'\n');

        let y = if self.bottom_up { "+Y" } else { "-Y" };
        out.extend_from_slice(format!("{y} {} +X {}\n", self.height, self.width).as_bytes());
        out
    }
}

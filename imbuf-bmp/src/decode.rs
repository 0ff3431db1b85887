use imbuf_common::image::ImageBuffer;
use imbuf_common::math::*;

use crate::*;

/// Decodes a BMP file
///
/// Palette and 24 bit images are returned as RGB. 16 and 32 bit images get an
/// alpha channel if their masks define one. 32 bit images where every alpha
/// value is zero are treated as opaque.
pub fn decode(data: &[u8]) -> Result<ImageBuffer, Error> {
    let header = InfoHeader::from_data(data)?;

    tracing::debug!(
        "Decoding BMP {}x{} with {} bits per pixel, {:?}",
        header.width,
        header.height,
        header.bit_count,
        header.compression
    );

    match header.compression {
        Compression::Rgb | Compression::Bitfields | Compression::AlphaBitfields => {}
        other => return Err(Error::UnsupportedCompression(other)),
    }

    let width = header.width().usize()?;
    let height = header.height().usize()?;
    let stride = header.row_stride()?;

    let start = header.data_offset.usize()?;
    let end = start.safe_add(stride.safe_mul(height)?)?;
    let pixel_data = data.get(start..end).ok_or(Error::UnexpectedEof)?;

    // Rows in top to bottom order
    let rows = (0..height).map(|y| {
        let row = if header.is_top_down() {
            y
        } else {
            height - 1 - y
        };
        &pixel_data[row * stride..(row + 1) * stride]
    });

    let (channels, pixels) = match header.bit_count {
        1 | 2 | 4 | 8 => {
            let palette = read_palette(data, &header)?;
            let mut out = Vec::with_capacity(width.safe_mul(height)?.safe_mul(3)?);
            let bits = header.bit_count as u8;
            for row in rows {
                for x in 0..width {
                    let index = palette_index(row, x, bits);
                    let color = palette
                        .get(usize::from(index))
                        .ok_or(Error::PaletteIndexOutOfRange(index))?;
                    out.extend_from_slice(color);
                }
            }
            (3, out)
        }
        24 => {
            let mut out = Vec::with_capacity(width.safe_mul(height)?.safe_mul(3)?);
            for row in rows {
                for bgr in row.chunks_exact(3).take(width) {
                    out.extend_from_slice(&[bgr[2], bgr[1], bgr[0]]);
                }
            }
            (3, out)
        }
        16 | 32 => {
            let masks = header.masks.unwrap_or(if header.bit_count == 16 {
                Masks::RGB555
            } else {
                Masks::BGRA8888
            });
            let has_alpha = masks.alpha != 0;
            let channels = if has_alpha { 4 } else { 3 };
            let bytes = usize::from(header.bit_count / 8);

            let mut out = Vec::with_capacity(width.safe_mul(height)?.safe_mul(channels)?);
            for row in rows {
                for px in row.chunks_exact(bytes).take(width) {
                    let v = match *px {
                        [a, b] => u32::from(u16::from_le_bytes([a, b])),
                        [a, b, c, d] => u32::from_le_bytes([a, b, c, d]),
                        _ => 0,
                    };
                    out.extend_from_slice(&[
                        extract(v, masks.red),
                        extract(v, masks.green),
                        extract(v, masks.blue),
                    ]);
                    if has_alpha {
                        out.push(extract(v, masks.alpha));
                    }
                }
            }

            if has_alpha && out.chunks_exact(4).all(|x| x[3] == 0) {
                tracing::debug!("All alpha values are zero, treating image as opaque");
                out.chunks_exact_mut(4).for_each(|x| x[3] = u8::MAX);
            }

            (channels as u8, out)
        }
        other => return Err(Error::UnsupportedBitDepth(other)),
    };

    Ok(ImageBuffer::from_bytes(
        header.width(),
        header.height(),
        channels,
        pixels,
    )?)
}

fn read_palette(data: &[u8], header: &InfoHeader) -> Result<Vec<[u8; 3]>, Error> {
    let max = 1_usize << header.bit_count;
    let count = match header.colors_used.usize()? {
        0 => max,
        n => n.min(max),
    };

    let start = header.palette_offset();
    let end = start.safe_add(count.safe_mul(4)?)?;
    let palette = data.get(start..end).ok_or(Error::UnexpectedEof)?;

    // Stored as BGR with an unused fourth byte
    Ok(palette
        .chunks_exact(4)
        .map(|x| [x[2], x[1], x[0]])
        .collect())
}

/// Index of pixel `x` in a row with `bits` per pixel, packed from the most
/// significant bit
fn palette_index(row: &[u8], x: usize, bits: u8) -> u8 {
    let per_byte = usize::from(8 / bits);
    let byte = row.get(x / per_byte).copied().unwrap_or(0);
    let shift = 8 - bits as usize * (x % per_byte + 1);
    let mask = ((1_u16 << bits) - 1) as u8;
    (byte >> shift) & mask
}

/// Extracts a masked value and scales it to 8 bit
///
/// Masks are contiguous, checked when reading the header.
fn extract(v: u32, mask: u32) -> u8 {
    if mask == 0 {
        return 0;
    }
    let shift = mask.trailing_zeros();
    let bits = (mask >> shift).trailing_ones();
    let value = u64::from((v & mask) >> shift);
    let max = (1_u64 << bits) - 1;
    u8::try_from(value * 255 / max).unwrap_or(u8::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks() {
        assert_eq!(extract(0x7C00, Masks::RGB555.red), 255);
        assert_eq!(extract(0x0010, Masks::RGB555.blue), 131);
        assert_eq!(extract(0x1234_5678, Masks::BGRA8888.alpha), 0x12);
        assert_eq!(extract(0xFFFF_FFFF, 0), 0);
    }

    #[test]
    fn packed_indices() {
        let row = [0b1011_0001];
        assert_eq!(palette_index(&row, 0, 1), 1);
        assert_eq!(palette_index(&row, 1, 1), 0);
        assert_eq!(palette_index(&row, 0, 4), 0b1011);
        assert_eq!(palette_index(&row, 1, 4), 0b0001);
        assert_eq!(palette_index(&row, 2, 2), 0b00);
    }
}

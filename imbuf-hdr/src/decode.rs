use imbuf_common::image::ImageBuffer;
use imbuf_common::math::*;

use crate::*;

/// Scanlines with a width in this range may use adaptive run length encoding
const RLE_WIDTH: std::ops::RangeInclusive<usize> = 8..=0x7FFF;

/// Pixels a single byte can expand to
///
/// One old style run repeats a pixel up to 255 times with four bytes. Chained
/// runs can expand further but are not accepted beyond this limit.
const MAX_PIXELS_PER_BYTE: usize = 64;

/// Decodes a Radiance HDR file into a float RGB image
pub fn decode(data: &[u8]) -> Result<ImageBuffer, Error> {
    let (header, offset) = Header::from_data(data)?;

    tracing::debug!(
        "Decoding HDR {}x{}, bottom up: {}",
        header.width,
        header.height,
        header.bottom_up
    );

    if header.width == 0 || header.height == 0 {
        return Err(Error::InvalidDimensions {
            width: header.width,
            height: header.height,
        });
    }

    let width = header.width.usize()?;
    let height = header.height.usize()?;
    let mut rest = data.get(offset..).unwrap_or_default();

    let pixel_count = width.safe_mul(height)?;
    if pixel_count > rest.len().saturating_mul(MAX_PIXELS_PER_BYTE) {
        return Err(Error::InsufficientData {
            pixels: pixel_count,
            len: rest.len(),
        });
    }

    let mut pixels = vec![0_f32; pixel_count.safe_mul(3)?];
    let mut scanline = vec![[0_u8; 4]; width];

    for row in 0..height {
        rest = read_scanline(rest, &mut scanline)?;

        let y = if header.bottom_up {
            height - 1 - row
        } else {
            row
        };
        let start = y * width * 3;
        for (out, rgbe) in pixels[start..start + width * 3]
            .chunks_exact_mut(3)
            .zip(&scanline)
        {
            out.copy_from_slice(&rgbe_to_float(*rgbe));
        }
    }

    Ok(ImageBuffer::from_floats(
        header.width,
        header.height,
        3,
        pixels,
    )?)
}

/// Reads one scanline and returns the remaining data
fn read_scanline<'a>(data: &'a [u8], scanline: &mut [[u8; 4]]) -> Result<&'a [u8], Error> {
    let width = scanline.len();

    match data {
        [2, 2, hi, lo, rest @ ..]
            if RLE_WIDTH.contains(&width)
                && hi & 0x80 == 0
                && usize::from(u16::from_be_bytes([*hi, *lo])) == width =>
        {
            read_adaptive_rle(rest, scanline)
        }
        _ => read_flat(data, scanline),
    }
}

/// Channels are stored one after another, each with its own runs
fn read_adaptive_rle<'a>(mut data: &'a [u8], scanline: &mut [[u8; 4]]) -> Result<&'a [u8], Error> {
    let width = scanline.len();

    for channel in 0..4 {
        let mut x = 0;
        while x < width {
            let (&count, rest) = data.split_first().ok_or(Error::UnexpectedEof)?;
            data = rest;

            if count > 128 {
                let count = usize::from(count - 128);
                let (&value, rest) = data.split_first().ok_or(Error::UnexpectedEof)?;
                data = rest;
                let run = scanline
                    .get_mut(x..x + count)
                    .ok_or(Error::InvalidScanline)?;
                run.iter_mut().for_each(|px| px[channel] = value);
                x += count;
            } else {
                let count = usize::from(count);
                if count == 0 {
                    return Err(Error::InvalidScanline);
                }
                let values = data.get(..count).ok_or(Error::UnexpectedEof)?;
                data = &data[count..];
                let target = scanline
                    .get_mut(x..x + count)
                    .ok_or(Error::InvalidScanline)?;
                for (px, value) in target.iter_mut().zip(values) {
                    px[channel] = *value;
                }
                x += count;
            }
        }
    }

    Ok(data)
}

/// Uncompressed pixels, possibly with old style runs that repeat the previous
/// pixel
fn read_flat<'a>(mut data: &'a [u8], scanline: &mut [[u8; 4]]) -> Result<&'a [u8], Error> {
    let mut x = 0;
    let mut shift = 0;

    while x < scanline.len() {
        let (px, rest) = data
            .split_first_chunk::<4>()
            .ok_or(Error::UnexpectedEof)?;
        data = rest;

        if px[..3] == [1, 1, 1] && x > 0 {
            let count = usize::from(px[3])
                .checked_shl(shift)
                .ok_or(Error::InvalidScanline)?;
            let previous = scanline[x - 1];
            let end = x.safe_add(count)?;
            let run = scanline.get_mut(x..end).ok_or(Error::InvalidScanline)?;
            run.fill(previous);
            x += count;
            shift += 8;
        } else {
            scanline[x] = *px;
            x += 1;
            shift = 0;
        }
    }

    Ok(data)
}

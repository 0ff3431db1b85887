use imbuf_common::image::ImageBuffer;
use imbuf_common::math::*;

use crate::*;

/// Decodes a Targa file
///
/// Gray images are returned with one channel, or two if they are stored with
/// 16 bit. Color mapped and true color images are RGB, or RGBA if they carry
/// alpha.
pub fn decode(data: &[u8]) -> Result<ImageBuffer, Error> {
    let header = Header::from_data(data)?;

    tracing::debug!(
        "Decoding TGA {}x{} {:?} with {} bits per pixel",
        header.width,
        header.height,
        header.image_type,
        header.pixel_depth
    );

    let mut pos = HEADER_LEN.safe_add(usize::from(header.id_length))?;

    let color_map: Vec<[u8; 4]> = if header.color_map_type == 1 && header.color_map_length > 0 {
        let entry_len = usize::from(header.color_map_depth).div_ceil(8);
        let len = usize::from(header.color_map_length).safe_mul(entry_len)?;
        let end = pos.safe_add(len)?;
        let raw = data.get(pos..end).ok_or(Error::UnexpectedEof)?;
        pos = end;

        raw.chunks_exact(entry_len)
            .map(|x| convert_color(x, header.color_map_depth, false))
            .collect()
    } else {
        Vec::new()
    };

    let width = usize::from(header.width);
    let height = usize::from(header.height);
    let bpp = header.bytes_per_pixel();
    let stored_len = width.safe_mul(height)?.safe_mul(bpp)?;
    let rest = data.get(pos..).unwrap_or_default();

    let stored = if header.image_type.is_rle() {
        decode_rle(rest, bpp, stored_len)?
    } else {
        rest.get(..stored_len)
            .ok_or(Error::UnexpectedEof)?
            .to_vec()
    };

    let channels: u8 = if header.image_type.is_color_mapped() {
        if header.color_map_depth == 32 {
            4
        } else {
            3
        }
    } else if header.image_type.is_grayscale() {
        if header.pixel_depth == 16 {
            2
        } else {
            1
        }
    } else {
        match header.pixel_depth {
            32 => 4,
            16 if header.alpha_bits() > 0 => 4,
            _ => 3,
        }
    };
    let n = usize::from(channels);

    let mut out = vec![0; width.safe_mul(height)?.safe_mul(n)?];
    for (i, px) in stored.chunks_exact(bpp).enumerate() {
        let (sx, sy) = (i % width, i / width);
        let x = if header.is_right_to_left() {
            width - 1 - sx
        } else {
            sx
        };
        let y = if header.is_top_to_bottom() {
            sy
        } else {
            height - 1 - sy
        };

        let rgba = if header.image_type.is_color_mapped() {
            let index = match *px {
                [a] => u16::from(a),
                [a, b, ..] => u16::from_le_bytes([a, b]),
                [] => 0,
            };
            index
                .checked_sub(header.color_map_first)
                .and_then(|i| color_map.get(usize::from(i)))
                .copied()
                .ok_or(Error::ColorMapIndexOutOfRange(index))?
        } else if header.image_type.is_grayscale() {
            let alpha = px.get(1).copied().unwrap_or(u8::MAX);
            [px[0], alpha, 0, 0]
        } else {
            convert_color(px, header.pixel_depth, header.alpha_bits() > 0)
        };

        let offset = (y * width + x) * n;
        out[offset..offset + n].copy_from_slice(&rgba[..n]);
    }

    Ok(ImageBuffer::from_bytes(
        u32::from(header.width),
        u32::from(header.height),
        channels,
        out,
    )?)
}

/// Pixels a single packet can repeat
const MAX_PACKET_PIXELS: usize = 128;

/// Expands run length encoded packets until `len` bytes are produced
fn decode_rle(data: &[u8], bpp: usize, len: usize) -> Result<Vec<u8>, Error> {
    // Each packet takes at least one byte
    let max_len = data
        .len()
        .saturating_mul(MAX_PACKET_PIXELS)
        .saturating_mul(bpp);
    if len > max_len {
        return Err(Error::InsufficientData {
            needed: len,
            len: data.len(),
        });
    }

    let mut out = Vec::with_capacity(len);
    let mut pos = 0;

    while out.len() < len {
        let packet = *data.get(pos).ok_or(Error::UnexpectedEof)?;
        pos += 1;
        let count = usize::from(packet & 0x7F) + 1;

        if packet & 0x80 != 0 {
            let px = data.get(pos..pos + bpp).ok_or(Error::UnexpectedEof)?;
            pos += bpp;
            for _ in 0..count {
                out.extend_from_slice(px);
            }
        } else {
            let raw_len = count * bpp;
            let raw = data.get(pos..pos + raw_len).ok_or(Error::UnexpectedEof)?;
            pos += raw_len;
            out.extend_from_slice(raw);
        }
    }

    // The last packet may exceed the image
    out.truncate(len);
    Ok(out)
}

/// Converts a stored BGR(A) or 5-5-5 value to RGBA
fn convert_color(px: &[u8], depth: u8, alpha_bit: bool) -> [u8; 4] {
    match (depth, px) {
        (15 | 16, [a, b, ..]) => {
            let v = u16::from_le_bytes([*a, *b]);
            let scale = |c: u16| ((c & 0x1F) * 255 / 31) as u8;
            let alpha = if alpha_bit && depth == 16 && v & 0x8000 == 0 {
                0
            } else {
                u8::MAX
            };
            [scale(v >> 10), scale(v >> 5), scale(v), alpha]
        }
        (24, [b, g, r, ..]) => [*r, *g, *b, u8::MAX],
        (32, [b, g, r, a, ..]) => [*r, *g, *b, *a],
        _ => [0, 0, 0, u8::MAX],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rle_packets() {
        // Run of three, raw of two
        let data = [0x82, 7, 0x01, 8, 9];
        assert_eq!(decode_rle(&data, 1, 5).unwrap(), [7, 7, 7, 8, 9]);
        // Packet exceeding the requested length
        assert_eq!(decode_rle(&data, 1, 2).unwrap(), [7, 7]);
        assert!(matches!(decode_rle(&data, 1, 6), Err(Error::UnexpectedEof)));
        // More than the packets could ever expand to
        assert!(matches!(
            decode_rle(&data, 1, 641),
            Err(Error::InsufficientData { needed: 641, len: 5 })
        ));
    }

    #[test]
    fn five_bit_colors() {
        assert_eq!(convert_color(&[0x00, 0x7C], 16, false), [255, 0, 0, 255]);
        assert_eq!(convert_color(&[0x1F, 0x00], 16, true), [0, 0, 255, 0]);
        assert_eq!(convert_color(&[0x1F, 0x80], 16, true), [0, 0, 255, 255]);
    }
}
